//! Run-range directive resolution

use jet_calib_core::{RunRangeRule, RunRangeTable};
use proptest::prelude::*;

// ============================================================================
// Resolution scenarios
// ============================================================================

#[test]
fn test_adjacent_ranges_split_at_boundary() {
    let table = RunRangeTable::parse(&["1:100:fileA", "100:-1:fileB"]);

    assert_eq!(table.resolve(50).unwrap().payload, "fileA");
    assert_eq!(table.resolve(150).unwrap().payload, "fileB");
    // min inclusive, max exclusive
    assert_eq!(table.resolve(100).unwrap().payload, "fileB");
    assert_eq!(table.resolve(99).unwrap().payload, "fileA");
    assert!(table.resolve(0).is_none());
}

#[test]
fn test_non_numeric_bounds_become_literal() {
    let table = RunRangeTable::parse(&["abc:def:file.txt"]);
    let matched = table.resolve(12345).unwrap();
    assert_eq!(matched.payload, "abc:def:file.txt");
    assert!(table.rules()[0].is_unbounded());
}

#[test]
fn test_overlapping_ranges_first_declared_wins() {
    let table = RunRangeTable::parse(&["1:1000:wide", "500:600:narrow", "/fallback.txt"]);
    assert_eq!(table.resolve(550).unwrap().payload, "wide");
    assert_eq!(table.resolve(550).unwrap().index, 0);
    assert_eq!(table.resolve(5000).unwrap().payload, "/fallback.txt");
}

#[test]
fn test_literal_first_shadows_everything() {
    let table = RunRangeTable::parse(&["/always.vmap", "1:10:/never.vmap"]);
    assert_eq!(table.resolve(5).unwrap().payload, "/always.vmap");
}

#[test]
fn test_open_lower_bound() {
    let table = RunRangeTable::parse(&["-1:200:early"]);
    assert_eq!(table.resolve(0).unwrap().payload, "early");
    assert_eq!(table.resolve(199).unwrap().payload, "early");
    assert!(table.resolve(200).is_none());
}

#[test]
fn test_whitespace_and_blank_entries() {
    let table = RunRangeTable::parse(&["", "  ", " 10 : 20 : padded.txt "]);
    assert_eq!(table.len(), 1);
    assert_eq!(table.resolve(15).unwrap().payload, "padded.txt");
}

#[test]
fn test_match_key_is_directive_text() {
    let table = RunRangeTable::parse(&["1:100:fileA", "100:-1:fileA"]);
    let a = table.resolve(50).unwrap();
    let b = table.resolve(150).unwrap();
    assert_eq!(a.payload, b.payload);
    assert_ne!(a.key, b.key);
}

#[test]
fn test_empty_table_matches_nothing() {
    let table = RunRangeTable::parse::<&str>(&[]);
    assert!(table.is_empty());
    assert!(table.resolve(1).is_none());
}

// ============================================================================
// Property: first declared containing rule wins
// ============================================================================

fn bound() -> impl Strategy<Value = i64> {
    prop_oneof![Just(-1i64), 0i64..400]
}

proptest! {
    #[test]
    fn prop_first_containing_rule_wins(
        ranges in prop::collection::vec((bound(), bound()), 0..8),
        run in 0u32..400,
    ) {
        let rules: Vec<RunRangeRule> = ranges
            .iter()
            .enumerate()
            .map(|(i, (min, max))| RunRangeRule {
                min_run: *min,
                max_run: *max,
                payload: format!("payload{}", i),
                source: format!("{}:{}:payload{}", min, max, i),
            })
            .collect();

        let expected = ranges.iter().position(|(min, max)| {
            let run = i64::from(run);
            (*min < 0 || run >= *min) && (*max < 0 || run < *max)
        });

        let table = RunRangeTable::from_rules(rules);
        prop_assert_eq!(table.resolve(run).map(|m| m.index), expected);
    }

    #[test]
    fn prop_parsed_directives_match_constructed(
        ranges in prop::collection::vec((bound(), bound()), 1..6),
        run in 0u32..400,
    ) {
        let entries: Vec<String> = ranges
            .iter()
            .enumerate()
            .map(|(i, (min, max))| format!("{}:{}:file{}.txt", min, max, i))
            .collect();
        let table = RunRangeTable::parse(&entries);

        let expected = ranges.iter().position(|(min, max)| {
            let run = i64::from(run);
            (*min < 0 || run >= *min) && (*max < 0 || run < *max)
        });
        prop_assert_eq!(
            table.resolve(run).map(|m| m.payload),
            expected.map(|i| format!("file{}.txt", i))
        );
    }
}
