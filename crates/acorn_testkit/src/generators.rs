//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random keys, bucket names, and
//! JSON-like values for exercising the facade.

use proptest::prelude::*;
use serde_json::Value;

/// Strategy for generating valid bucket names.
pub fn bucket_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("invalid regex")
}

/// Strategy for generating entry keys.
///
/// Keys are arbitrary non-empty UTF-8, including characters outside
/// ASCII, since ordering is defined over the raw byte encoding.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(".{1,24}").expect("invalid regex")
}

/// Strategy for generating sets of distinct keys.
pub fn key_set_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(key_strategy(), 1..max)
        .prop_map(|set| set.into_iter().collect())
}

/// Strategy for generating JSON leaf values.
fn json_leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        ".{0,32}".prop_map(Value::String),
    ]
}

/// Strategy for generating arbitrary JSON values, nested up to three
/// levels deep.
pub fn json_value_strategy() -> impl Strategy<Value = Value> {
    json_leaf_strategy().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn keys_are_distinct(keys in key_set_strategy(16)) {
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), keys.len());
        }

        #[test]
        fn json_values_are_serializable(value in json_value_strategy()) {
            let bytes = serde_json::to_vec(&value).unwrap();
            let back: Value = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(value, back);
        }
    }
}
