//! Exact and fuzzy lookup over a catalog snapshot.
//!
//! Exact mode is case- and accent-insensitive substring containment per
//! populated query field, combined with logical AND. The loosest behavior
//! observed across the historical sources is containment, not equality,
//! and compatibility requires keeping it. When the element name finds no
//! exact candidate, a bounded closest-string fallback resolves it against
//! the distinct element names in the snapshot.

use crate::config::SearchConfig;
use alarma_common::record::{AlarmRecord, AlarmRecordView, CatalogSnapshot};
use alarma_common::text::{normalize_for_match, similarity};
use alarma_common::CanonicalField;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// The two search keys. At least one must be populated for a query to
/// match anything.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub alarm_number: Option<String>,
    pub element_name: Option<String>,
}

impl SearchQuery {
    /// Build a query from raw operator input, dropping blank keys.
    pub fn new(alarm_number: &str, element_name: &str) -> Self {
        let clean = |s: &str| {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Self {
            alarm_number: clean(alarm_number),
            element_name: clean(element_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.alarm_number.is_none() && self.element_name.is_none()
    }
}

/// How the element name was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Fuzzy,
    None,
}

/// Matched records in original catalog order. The first record is "the"
/// answer for conversational responses; list-style consumers get all of
/// them. Zero records is a normal outcome, not an error.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub records: Vec<AlarmRecord>,
    pub match_kind: MatchKind,
    /// Element name the fuzzy fallback settled on, when it ran.
    pub resolved_element: Option<String>,
}

impl SearchResult {
    fn none() -> Self {
        Self {
            records: Vec::new(),
            match_kind: MatchKind::None,
            resolved_element: None,
        }
    }

    pub fn found(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Flat lookup answer for the transport layer.
#[derive(Debug, Clone, Serialize)]
pub struct Lookup {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<AlarmRecordView>,
    pub match_kind: MatchKind,
}

pub struct SearchEngine {
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn search(&self, query: &SearchQuery, snapshot: &CatalogSnapshot) -> SearchResult {
        if query.is_empty() {
            return SearchResult::none();
        }

        let exact = exact_pass(query, snapshot);
        if !exact.is_empty() {
            return SearchResult {
                records: exact,
                match_kind: MatchKind::Exact,
                resolved_element: None,
            };
        }

        if let Some(element) = &query.element_name {
            if let Some(resolved) = self.fuzzy_resolve(element, snapshot) {
                debug!("Fuzzy fallback resolved '{element}' -> '{resolved}'");
                let requery = SearchQuery {
                    alarm_number: query.alarm_number.clone(),
                    element_name: Some(resolved.clone()),
                };
                let records = exact_pass(&requery, snapshot);
                if !records.is_empty() {
                    return SearchResult {
                        records,
                        match_kind: MatchKind::Fuzzy,
                        resolved_element: Some(resolved),
                    };
                }
            }
        }

        SearchResult::none()
    }

    /// Canonical query interface consumed by the transport layer.
    pub fn lookup(
        &self,
        alarm_number: &str,
        element_name: &str,
        snapshot: &CatalogSnapshot,
    ) -> Lookup {
        let result = self.search(&SearchQuery::new(alarm_number, element_name), snapshot);
        Lookup {
            found: result.found(),
            record: result.records.first().map(AlarmRecord::view),
            match_kind: result.match_kind,
        }
    }

    /// Closest element name at or above the similarity threshold. Only the
    /// configured number of top candidates is considered; the best one is
    /// returned for a second exact pass.
    fn fuzzy_resolve(&self, element: &str, snapshot: &CatalogSnapshot) -> Option<String> {
        let mut scored: Vec<(f64, &str)> = snapshot
            .distinct_element_names()
            .into_iter()
            .map(|name| (similarity(element, name), name))
            .filter(|(score, _)| *score >= self.config.fuzzy_threshold)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(self.config.fuzzy_candidates);
        scored.first().map(|(_, name)| name.to_string())
    }
}

/// AND of case-insensitive substring containment over the populated query
/// fields, preserving catalog row order.
fn exact_pass(query: &SearchQuery, snapshot: &CatalogSnapshot) -> Vec<AlarmRecord> {
    snapshot
        .records()
        .iter()
        .filter(|record| {
            field_contains(record, CanonicalField::AlarmNumber, &query.alarm_number)
                && field_contains(record, CanonicalField::ElementName, &query.element_name)
        })
        .cloned()
        .collect()
}

fn field_contains(
    record: &AlarmRecord,
    field: CanonicalField,
    needle: &Option<String>,
) -> bool {
    match needle {
        None => true,
        Some(needle) => {
            normalize_for_match(record.get(field)).contains(&normalize_for_match(needle))
        }
    }
}
