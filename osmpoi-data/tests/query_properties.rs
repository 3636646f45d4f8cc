//! Property-based tests for the Overpass query builder.
//!
//! # Invariants tested
//!
//! - **Clause count:** three element-kind clauses per normalised tag pair.
//! - **Shared bbox:** every clause carries the same six-decimal bbox literal.
//! - **Determinism:** identical inputs render byte-identical queries.
//! - **Envelope override:** custom settings replace timeout and memory.

use std::time::Duration;

use osmpoi_core::{BoundingBox, TagFilter};
use osmpoi_data::overpass::{build_query, format_bbox};
use proptest::prelude::*;

fn bbox_strategy() -> impl Strategy<Value = BoundingBox> {
    (-89.0_f64..88.0, 0.001_f64..1.0, -179.0_f64..178.0, 0.001_f64..1.0).prop_map(
        |(south, height, west, width)| {
            BoundingBox::new(south + height, south, west + width, west)
                .expect("strategy yields ordered bounds")
        },
    )
}

#[derive(Debug, Clone)]
enum Constraint {
    Any,
    Values(Vec<String>),
}

fn filter_strategy() -> impl Strategy<Value = Vec<(String, Constraint)>> {
    let constraint = prop_oneof![
        Just(Constraint::Any),
        prop::collection::vec("[a-z_]{1,8}", 1..4).prop_map(Constraint::Values),
    ];
    prop::collection::vec(("[a-z:]{1,10}", constraint), 1..5)
}

fn build_filter(entries: &[(String, Constraint)]) -> TagFilter {
    entries.iter().fold(TagFilter::new(), |filter, (key, constraint)| {
        let extended = match constraint {
            Constraint::Any => filter.with_any(key.clone()),
            Constraint::Values(values) => filter.with_values(key.clone(), values.clone()),
        };
        extended.expect("strategy yields valid entries")
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn three_clauses_per_pair(bbox in bbox_strategy(), entries in filter_strategy()) {
        let filter = build_filter(&entries);
        let query = build_query(&bbox, &filter, Duration::from_secs(180), None, None);
        let pairs = filter.pairs().count();
        let bbox_literal = format_bbox(&bbox);

        prop_assert_eq!(query.matches("(node[").count(), pairs);
        prop_assert_eq!(query.matches("(way[").count(), pairs);
        prop_assert_eq!(query.matches("(relation[").count(), pairs);
        prop_assert_eq!(query.matches(bbox_literal.as_str()).count(), 3 * pairs);
    }

    #[test]
    fn rendering_is_deterministic(
        bbox in bbox_strategy(),
        entries in filter_strategy(),
        memory in proptest::option::of(1_u64..=u64::from(u32::MAX)),
    ) {
        let first = build_query(&bbox, &build_filter(&entries), Duration::from_secs(60), memory, None);
        let second = build_query(&bbox, &build_filter(&entries), Duration::from_secs(60), memory, None);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn custom_settings_replace_envelope(
        bbox in bbox_strategy(),
        entries in filter_strategy(),
        memory in proptest::option::of(1_u64..1_000_000),
    ) {
        let settings = "[out:json][timeout:5]";
        let query = build_query(
            &bbox,
            &build_filter(&entries),
            Duration::from_secs(999),
            memory,
            Some(settings),
        );

        let expected_prefix = format!("{settings};(");
        prop_assert!(query.starts_with(&expected_prefix));
        prop_assert!(!query.contains("timeout:999"));
        prop_assert!(!query.contains("maxsize"));
    }
}
