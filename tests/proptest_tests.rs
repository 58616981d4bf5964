//! Property-based tests using proptest.
//!
//! These tests verify invariants of substitution, the bencode codec and
//! key paths using randomly generated inputs.

use proptest::prelude::*;

use announcebulk::KeyPath;
use announcebulk::bencode::{Dict, Value, decode, encode};
use announcebulk::transform::{substitute, substitute_regex};

/// Strategy for arbitrary document trees.
///
/// Dictionary keys are deduplicated since duplicate keys do not decode.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Value::Bytes),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            proptest::collection::vec(
                (proptest::collection::vec(any::<u8>(), 0..8), inner),
                0..6
            )
            .prop_map(|pairs| {
                let mut dict = Dict::new();
                for (key, value) in pairs {
                    dict.insert(key, value);
                }
                Value::Dict(dict)
            }),
        ]
    })
}

proptest! {
    /// Substituting text that does not occur returns the input unchanged.
    #[test]
    fn substitute_absent_find_is_identity(
        haystack in "[a-m]{0,40}",
        find in "[n-z]{1,8}",
        replace in "[a-z]{0,8}",
    ) {
        let out = substitute(haystack.as_bytes(), find.as_bytes(), replace.as_bytes());
        prop_assert_eq!(out, haystack.as_bytes());
    }

    /// Substitution splices exactly the first occurrence.
    #[test]
    fn substitute_replaces_first_occurrence(
        prefix in "[a-m]{0,20}",
        suffix in "[a-z]{0,20}",
        find in "[n-z]{1,8}",
        replace in "[a-z]{0,12}",
    ) {
        let haystack = format!("{prefix}{find}{suffix}");
        let out = substitute(haystack.as_bytes(), find.as_bytes(), replace.as_bytes());
        prop_assert_eq!(out, format!("{prefix}{replace}{suffix}").into_bytes());
    }

    /// A literal regex behaves like literal substitution.
    #[test]
    fn regex_literal_matches_substitute(
        haystack in "[a-z]{0,30}",
        find in "[a-z]{1,4}",
        replace in "[a-z]{0,6}",
    ) {
        let pattern = regex::bytes::Regex::new(&regex::escape(&find)).unwrap();
        prop_assert_eq!(
            substitute_regex(haystack.as_bytes(), &pattern, replace.as_bytes()),
            substitute(haystack.as_bytes(), find.as_bytes(), replace.as_bytes())
        );
    }

    /// decode(encode(T)) == T for any tree.
    #[test]
    fn codec_round_trip(value in value_strategy()) {
        let bytes = encode(&value);
        let decoded = decode(&bytes).unwrap();
        prop_assert_eq!(decoded, value);
    }

    /// Decoding arbitrary bytes never panics.
    #[test]
    fn decode_arbitrary_bytes(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&data);
    }

    /// Key paths without empty segments display back to their input.
    #[test]
    fn key_path_display_round_trip(keys in proptest::collection::vec("[a-z -]{1,8}", 0..5)) {
        let text = keys.join("/");
        let path = KeyPath::parse(&text).unwrap();
        prop_assert_eq!(path.len(), keys.len());
        prop_assert_eq!(path.to_string(), text);
    }
}
