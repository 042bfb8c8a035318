//! Property-based tests for index name normalization
//!
//! These tests check the normalizer invariants on generated index names:
//! idempotence, pass-through of plain names, and the rollover suffix rule.

use esbootstrap::resource::naming::{decode, is_dynamic, normalize, path_segment};
use proptest::prelude::*;

/// A plain index name, no dynamic syntax
fn arb_plain_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_.]{0,20}(-[a-z][a-z0-9]{0,8}){0,3}"
}

/// A date-math token, possibly with a nested format block
fn arb_date_math() -> impl Strategy<Value = String> {
    (
        prop_oneof![
            Just("now"),
            Just("now/d"),
            Just("now/M"),
            Just("now-1d/d"),
            Just("now/w"),
        ],
        prop::option::of(prop_oneof![
            Just("yyyy.MM.dd"),
            Just("yyyy.MM"),
            Just("yyyy.MM.dd|+12:00"),
        ]),
    )
        .prop_map(|(math, format)| match format {
            Some(f) => format!("{{{}{{{}}}}}", math, f),
            None => format!("{{{}}}", math),
        })
}

/// A date-math expression such as `<logs-{now/d}-000001>`
fn arb_dynamic_name() -> impl Strategy<Value = String> {
    (arb_plain_name(), arb_date_math(), any::<bool>(), 0u32..1_000_000)
        .prop_map(|(prefix, math, rollover, counter)| {
            if rollover {
                format!("<{}-{}-{:06}>", prefix, math, counter)
            } else {
                format!("<{}-{}>", prefix, math)
            }
        })
}

/// Percent-encoding used for dynamic names stored as directory names
fn encode(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn plain_names_pass_through(name in arb_plain_name()) {
        prop_assert_eq!(normalize(&name), name.clone());
        prop_assert!(!is_dynamic(&name));
    }

    #[test]
    fn normalize_is_idempotent_on_dynamic_names(name in arb_dynamic_name()) {
        let once = normalize(&name);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_is_idempotent_on_any_input(input in "[a-z0-9<>{}/.|+:-]{0,30}") {
        let once = normalize(&input);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn dynamic_names_become_wildcards(name in arb_dynamic_name()) {
        let pattern = normalize(&name);
        prop_assert!(pattern.contains('*'));
        prop_assert!(
            !pattern.chars().any(|c| matches!(c, '<' | '>' | '{' | '}')),
            "markers left in {}",
            pattern
        );
        prop_assert!(is_dynamic(&name));
    }

    #[test]
    fn encoded_and_decoded_names_normalize_alike(name in arb_dynamic_name()) {
        prop_assert_eq!(normalize(&encode(&name)), normalize(&name));
    }

    #[test]
    fn double_encoded_names_normalize_alike(name in arb_dynamic_name()) {
        let twice = encode(&encode(&name));
        let pattern = normalize(&twice);
        prop_assert_eq!(pattern.clone(), normalize(&name));
        prop_assert_eq!(normalize(&pattern), pattern);
    }

    #[test]
    fn rollover_counter_is_replaced_only_at_the_end(
        name in arb_plain_name(),
        counter in 0u32..1_000_000,
    ) {
        let trailing = format!("{}-{:06}", name, counter);
        prop_assert_eq!(normalize(&trailing), format!("{}-*", name));

        let inner = format!("{}-{:06}-archive", name, counter);
        prop_assert_eq!(normalize(&inner), inner.clone());
    }

    #[test]
    fn path_segment_never_double_encodes(name in arb_dynamic_name()) {
        let encoded = path_segment(&name);
        prop_assert_eq!(path_segment(&encoded), encoded.clone());
        prop_assert_eq!(decode(&encoded), name.as_str());
        prop_assert!(!encoded.contains('/'));
    }
}
