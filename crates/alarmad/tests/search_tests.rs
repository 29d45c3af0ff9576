//! Tests for the search engine.

use alarma_common::fields::CanonicalField;
use alarma_common::record::{AlarmRecord, CatalogSnapshot};
use alarmad::config::SearchConfig;
use alarmad::search::{MatchKind, SearchEngine, SearchQuery};

fn snapshot() -> CatalogSnapshot {
    CatalogSnapshot::demo(vec![
        AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "1003"),
            (CanonicalField::ElementName, "AAA Huawei"),
            (CanonicalField::Severity, "CRITICA"),
        ]),
        AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "2047"),
            (CanonicalField::ElementName, "HLR Ericsson"),
            (CanonicalField::Severity, "ALTA"),
        ]),
        AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "3001"),
            (CanonicalField::ElementName, "AAA Huawei"),
            (CanonicalField::Severity, "MEDIA"),
        ]),
    ])
}

fn engine() -> SearchEngine {
    SearchEngine::new(SearchConfig {
        fuzzy_threshold: 0.4,
        fuzzy_candidates: 3,
    })
}

#[test]
fn test_exact_substring_match_on_both_keys() {
    let result = engine().search(&SearchQuery::new("1003", "aaa"), &snapshot());
    assert_eq!(result.match_kind, MatchKind::Exact);
    assert_eq!(result.records.len(), 1);
    assert_eq!(
        result.records[0].get(CanonicalField::ElementName),
        "AAA Huawei"
    );
}

#[test]
fn test_no_match_is_a_normal_outcome() {
    let result = engine().search(&SearchQuery::new("9999", "zzz"), &snapshot());
    assert_eq!(result.match_kind, MatchKind::None);
    assert!(result.records.is_empty());
    assert!(!result.found());
}

#[test]
fn test_and_semantics_require_both_keys_to_hold() {
    // Number matches record 1003, element matches record 2047: no single
    // record satisfies both.
    let result = engine().search(&SearchQuery::new("1003", "hlr"), &snapshot());
    assert_eq!(result.match_kind, MatchKind::None);
}

#[test]
fn test_number_only_query() {
    let result = engine().search(&SearchQuery::new("2047", ""), &snapshot());
    assert_eq!(result.match_kind, MatchKind::Exact);
    assert_eq!(result.records.len(), 1);
}

#[test]
fn test_catalog_order_is_preserved() {
    let result = engine().search(&SearchQuery::new("", "aaa"), &snapshot());
    let numbers: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.get(CanonicalField::AlarmNumber))
        .collect();
    assert_eq!(numbers, vec!["1003", "3001"]);
}

#[test]
fn test_fuzzy_fallback_resolves_misspelled_element() {
    let result = engine().search(&SearchQuery::new("", "aaa hwei"), &snapshot());
    assert_eq!(result.match_kind, MatchKind::Fuzzy);
    assert_eq!(result.resolved_element.as_deref(), Some("AAA Huawei"));
    assert_eq!(result.records.len(), 2);
}

#[test]
fn test_fuzzy_fallback_keeps_the_number_constraint() {
    let result = engine().search(&SearchQuery::new("1003", "aaa hwei"), &snapshot());
    assert_eq!(result.match_kind, MatchKind::Fuzzy);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].get(CanonicalField::AlarmNumber), "1003");
}

#[test]
fn test_wildly_dissimilar_element_yields_none() {
    let result = engine().search(&SearchQuery::new("", "zzz"), &snapshot());
    assert_eq!(result.match_kind, MatchKind::None);
}

#[test]
fn test_empty_query_matches_nothing() {
    let result = engine().search(&SearchQuery::new("  ", ""), &snapshot());
    assert_eq!(result.match_kind, MatchKind::None);
}

#[test]
fn test_lookup_view_for_the_transport_layer() {
    let lookup = engine().lookup("1003", "aaa", &snapshot());
    assert!(lookup.found);
    assert_eq!(lookup.match_kind, MatchKind::Exact);
    let record = lookup.record.unwrap();
    assert_eq!(record.alarm_number, "1003");
    assert_eq!(record.severity, "CRITICA");
}
