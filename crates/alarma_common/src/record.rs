//! Normalized alarm records and the immutable catalog snapshot.

use crate::fields::{CanonicalField, SENTINEL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::SystemTime;

/// One row of the catalog after normalization.
///
/// Every canonical field is present (sentinel-filled when the source did
/// not carry it) and every value is a trimmed, never-null string. Records
/// are created in bulk by the loader and never mutated afterwards; the
/// next reload discards them wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecord {
    fields: BTreeMap<CanonicalField, String>,
    /// Raw columns that did not map to a canonical field, in source order.
    /// Kept for descriptive concatenation and diagnostics.
    #[serde(default)]
    extras: Vec<(String, String)>,
}

impl AlarmRecord {
    /// Build a record from canonical values, filling any absent required
    /// field with the sentinel.
    pub fn from_fields(fields: BTreeMap<CanonicalField, String>) -> Self {
        Self::with_extras(fields, Vec::new())
    }

    /// As [`from_fields`](Self::from_fields), retaining unmapped raw columns.
    pub fn with_extras(
        mut fields: BTreeMap<CanonicalField, String>,
        extras: Vec<(String, String)>,
    ) -> Self {
        for field in CanonicalField::ALL {
            fields
                .entry(field)
                .or_insert_with(|| SENTINEL.to_string());
        }
        for value in fields.values_mut() {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                *value = SENTINEL.to_string();
            } else if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
        Self { fields, extras }
    }

    /// Convenience constructor for fixtures and the demo dataset.
    pub fn from_pairs(pairs: &[(CanonicalField, &str)]) -> Self {
        let fields = pairs
            .iter()
            .map(|(f, v)| (*f, v.to_string()))
            .collect::<BTreeMap<_, _>>();
        Self::from_fields(fields)
    }

    /// Value of a canonical field. Never empty; the sentinel stands in for
    /// anything the source did not specify.
    pub fn get(&self, field: CanonicalField) -> &str {
        self.fields
            .get(&field)
            .map(String::as_str)
            .unwrap_or(SENTINEL)
    }

    /// True when the field carries real data rather than the sentinel.
    pub fn has(&self, field: CanonicalField) -> bool {
        self.get(field) != SENTINEL
    }

    /// Unmapped raw columns retained from the source row.
    pub fn extras(&self) -> &[(String, String)] {
        &self.extras
    }

    pub fn view(&self) -> AlarmRecordView {
        AlarmRecordView {
            alarm_number: self.get(CanonicalField::AlarmNumber).to_string(),
            element_name: self.get(CanonicalField::ElementName).to_string(),
            description: self.get(CanonicalField::Description).to_string(),
            severity: self.get(CanonicalField::Severity).to_string(),
            significance: self.get(CanonicalField::Significance).to_string(),
            recommended_actions: self.get(CanonicalField::RecommendedActions).to_string(),
            manufacturer: self.get(CanonicalField::Manufacturer).to_string(),
            instruction_title: self.get(CanonicalField::InstructionTitle).to_string(),
        }
    }
}

/// Flat, wire-facing projection of a record, consumed by the transport
/// layer and by the collaborator that resolves instruction documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmRecordView {
    pub alarm_number: String,
    pub element_name: String,
    pub description: String,
    pub severity: String,
    pub significance: String,
    pub recommended_actions: String,
    pub manufacturer: String,
    pub instruction_title: String,
}

/// Point-in-time view of the whole catalog.
///
/// Owned by the cache and replaced atomically on refresh; in-flight
/// readers always see a complete, consistent snapshot.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    records: Vec<AlarmRecord>,
    source_path: PathBuf,
    source_mtime: Option<SystemTime>,
    loaded_at: DateTime<Utc>,
    demo: bool,
}

impl CatalogSnapshot {
    pub fn new(
        records: Vec<AlarmRecord>,
        source_path: PathBuf,
        source_mtime: Option<SystemTime>,
    ) -> Self {
        Self {
            records,
            source_path,
            source_mtime,
            loaded_at: Utc::now(),
            demo: false,
        }
    }

    /// Snapshot backed by built-in demonstration data rather than a file.
    pub fn demo(records: Vec<AlarmRecord>) -> Self {
        Self {
            records,
            source_path: PathBuf::new(),
            source_mtime: None,
            loaded_at: Utc::now(),
            demo: true,
        }
    }

    /// Records in original catalog order.
    pub fn records(&self) -> &[AlarmRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source_path(&self) -> &std::path::Path {
        &self.source_path
    }

    /// Modification time of the source file at load time; `None` for the
    /// demo dataset.
    pub fn source_mtime(&self) -> Option<SystemTime> {
        self.source_mtime
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Distinct element names in first-seen order, the candidate set for
    /// the fuzzy fallback.
    pub fn distinct_element_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for record in &self.records {
            let name = record.get(CanonicalField::ElementName);
            if name != SENTINEL && !seen.contains(&name) {
                seen.push(name);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sentinel_fill() {
        let record = AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "1003"),
            (CanonicalField::ElementName, "AAA Huawei"),
        ]);
        assert_eq!(record.get(CanonicalField::AlarmNumber), "1003");
        assert_eq!(record.get(CanonicalField::Severity), SENTINEL);
        for field in CanonicalField::ALL {
            assert!(!record.get(field).is_empty());
        }
    }

    #[test]
    fn test_record_trims_and_replaces_blank() {
        let record = AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "  1003  "),
            (CanonicalField::Description, "   "),
        ]);
        assert_eq!(record.get(CanonicalField::AlarmNumber), "1003");
        assert_eq!(record.get(CanonicalField::Description), SENTINEL);
    }

    #[test]
    fn test_distinct_element_names_preserve_order() {
        let snapshot = CatalogSnapshot::demo(vec![
            AlarmRecord::from_pairs(&[(CanonicalField::ElementName, "HLR Ericsson")]),
            AlarmRecord::from_pairs(&[(CanonicalField::ElementName, "AAA Huawei")]),
            AlarmRecord::from_pairs(&[(CanonicalField::ElementName, "HLR Ericsson")]),
        ]);
        assert_eq!(
            snapshot.distinct_element_names(),
            vec!["HLR Ericsson", "AAA Huawei"]
        );
    }
}
