//! Canonical alarm catalog fields.
//!
//! The source exports spell the same attribute a dozen different ways;
//! the rest of the system only ever sees these identifiers.

use serde::{Deserialize, Serialize};

/// Placeholder stored when a source file does not carry a required column.
/// Guarantees that record values are never null.
pub const SENTINEL: &str = "NO_ESPECIFICADO";

/// One logical alarm attribute, independent of its spelling in any source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    AlarmNumber,
    ElementName,
    Description,
    Severity,
    Significance,
    RecommendedActions,
    Manufacturer,
    InstructionTitle,
}

impl CanonicalField {
    /// Every canonical field, in record display order.
    ///
    /// All of them are required: the loader sentinel-fills any that the
    /// source does not provide.
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::AlarmNumber,
        CanonicalField::ElementName,
        CanonicalField::Description,
        CanonicalField::Severity,
        CanonicalField::Significance,
        CanonicalField::RecommendedActions,
        CanonicalField::Manufacturer,
        CanonicalField::InstructionTitle,
    ];

    /// Spanish display label used when formatting a record for the operator.
    pub fn label(&self) -> &'static str {
        match self {
            CanonicalField::AlarmNumber => "Número de alarma",
            CanonicalField::ElementName => "Elemento",
            CanonicalField::Description => "Descripción",
            CanonicalField::Severity => "Severidad",
            CanonicalField::Significance => "Significado",
            CanonicalField::RecommendedActions => "Acciones recomendadas",
            CanonicalField::Manufacturer => "Fabricante",
            CanonicalField::InstructionTitle => "Instructivo",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanonicalField::AlarmNumber => write!(f, "alarm_number"),
            CanonicalField::ElementName => write!(f, "element_name"),
            CanonicalField::Description => write!(f, "description"),
            CanonicalField::Severity => write!(f, "severity"),
            CanonicalField::Significance => write!(f, "significance"),
            CanonicalField::RecommendedActions => write!(f, "recommended_actions"),
            CanonicalField::Manufacturer => write!(f, "manufacturer"),
            CanonicalField::InstructionTitle => write!(f, "instruction_title"),
        }
    }
}
