//! Shared proptest generators for configuration documents.

use proptest::prelude::*;
use serde_json::{Map, Value};

/// Generate configuration keys in the `UPPER_SNAKE` style used in documents.
pub fn config_key_strategy() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9_]{0,15}"
}

/// Generate scalar JSON values.
///
/// Floats are quarter steps so they survive a text round trip exactly.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-4_000_000i32..4_000_000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
        "[a-zA-Z0-9 .:/_-]{0,24}".prop_map(Value::String),
    ]
}

/// Generate JSON values nested up to three levels deep.
pub fn config_value_strategy() -> impl Strategy<Value = Value> {
    scalar_value_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate a whole configuration document (a JSON object).
pub fn document_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(config_key_strategy(), config_value_strategy(), 0..8)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

/// Generate payloads that are not valid base64.
pub fn malformed_base64_strategy() -> impl Strategy<Value = Vec<u8>> {
    "[A-Za-z0-9+/]{1,40}[!@#$%^&*]{1,4}".prop_map(String::into_bytes)
}

/// Generate text that is not a JSON object.
pub fn non_object_json_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("{not json".to_string()),
        Just("null".to_string()),
        any::<i64>().prop_map(|n| n.to_string()),
        "[a-z]{1,10}".prop_map(|s| format!("[\"{s}\"]")),
        "[a-z]{1,10}".prop_map(|s| format!("\"{s}\"")),
    ]
}
