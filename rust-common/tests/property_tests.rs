//! Property-based tests for rust-common crate.
//!
//! These tests verify universal properties across all inputs using proptest.

use proptest::prelude::*;
use rust_common::{
    Environment, PlatformError, TracingConfig, optional_env, parse_env_with, required_env,
};

// Numeric variables round-trip through the environment parser, and values
// that are absent fall back to the default.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_parse_env_accepts_any_u64(value in any::<u64>(), default in any::<u64>()) {
        let text = value.to_string();
        let parsed = parse_env_with(|_| Some(text.clone()), "ZK_REFRESH_INTERVAL_SECS", default);
        prop_assert_eq!(parsed, Ok(value));

        let fallback = parse_env_with(|_| None, "ZK_REFRESH_INTERVAL_SECS", default);
        prop_assert_eq!(fallback, Ok(default));
    }

    #[test]
    fn prop_parse_env_rejects_non_numeric(text in "[a-zA-Z][a-zA-Z0-9]{0,20}") {
        let parsed = parse_env_with::<u16, _>(|_| Some(text.clone()), "ZK_PORT", 2181);
        prop_assert!(matches!(parsed, Err(PlatformError::InvalidInput(_))));
    }

    #[test]
    fn prop_blank_values_are_unset(spaces in " {0,8}") {
        prop_assert_eq!(optional_env(|_| Some(spaces.clone()), "COMMON_LIB_NAME"), None);
    }
}

// Only "production" (in any case) selects the production logger preset, and
// required variables name themselves when missing.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_non_production_environments_use_development(name in "[a-z]{1,12}") {
        prop_assume!(name != "production");
        let config = TracingConfig::from_lookup(|var| (var == "ENVIRONMENT").then(|| name.clone()));
        prop_assert_eq!(config.environment, Environment::Development);
        prop_assert!(!config.json_output);
    }

    #[test]
    fn prop_required_env_names_missing_variable(name in "[A-Z][A-Z_]{0,20}") {
        prop_assert_eq!(required_env(|_| None, &name), Err(PlatformError::not_found(&name)));
        prop_assert_eq!(
            required_env(|_| Some("orders".to_string()), &name),
            Ok("orders".to_string())
        );
    }
}
