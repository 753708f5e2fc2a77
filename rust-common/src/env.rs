//! Environment variable parsing.
//!
//! Every helper takes a lookup function so configuration can be assembled
//! from something other than the process environment in tests. Empty values
//! are treated the same as unset ones.

use crate::{PlatformError, PlatformResult};
use std::str::FromStr;

/// Look up a variable in the process environment.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Parse a variable obtained through `lookup`, falling back to `default`.
///
/// # Errors
///
/// Returns [`PlatformError::InvalidInput`] if the value does not parse as `T`.
pub fn parse_env_with<T, F>(lookup: F, name: &str, default: T) -> PlatformResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match optional_env(lookup, name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| PlatformError::invalid_input(format!("{name}: {e}"))),
        None => Ok(default),
    }
}

/// Read a variable that must be present and non-empty.
///
/// # Errors
///
/// Returns [`PlatformError::NotFound`] naming the variable when it is unset
/// or empty.
pub fn required_env<F>(lookup: F, name: &str) -> PlatformResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional_env(lookup, name).ok_or_else(|| PlatformError::not_found(name))
}

/// Read a variable, mapping unset and empty values to `None`.
pub fn optional_env<F>(lookup: F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: u64 = parse_env_with(lookup(&[]), "ZK_REFRESH_INTERVAL_SECS", 30).unwrap();
        assert_eq!(value, 30);
    }

    #[test]
    fn test_parse_env_parses_value() {
        let value: u16 = parse_env_with(lookup(&[("ZK_PORT", " 2182 ")]), "ZK_PORT", 2181).unwrap();
        assert_eq!(value, 2182);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        let err = parse_env_with::<u16, _>(lookup(&[("ZK_PORT", "abc")]), "ZK_PORT", 2181)
            .unwrap_err();
        assert!(matches!(err, PlatformError::InvalidInput(ref msg) if msg.starts_with("ZK_PORT")));
    }

    #[test]
    fn test_required_env() {
        assert_eq!(
            required_env(lookup(&[("SERVICE_NAME", "orders")]), "SERVICE_NAME").unwrap(),
            "orders"
        );
        assert_eq!(
            required_env(lookup(&[("SERVICE_NAME", "")]), "SERVICE_NAME").unwrap_err(),
            PlatformError::not_found("SERVICE_NAME")
        );
        assert!(required_env(lookup(&[]), "SERVICE_NAME").is_err());
    }

    #[test]
    fn test_optional_env_treats_blank_as_unset() {
        assert_eq!(optional_env(lookup(&[("COMMON_LIB_NAME", "  ")]), "COMMON_LIB_NAME"), None);
        assert_eq!(
            optional_env(lookup(&[("COMMON_LIB_NAME", "shared")]), "COMMON_LIB_NAME"),
            Some("shared".to_string())
        );
    }
}
