//! Declarative mapping from raw column names to canonical fields.
//!
//! Every source-file shape ever seen is handled by adding a variant to the
//! table below, not by adding another loader code path. Comparison is
//! case-, whitespace- and diacritic-insensitive (see [`crate::text`]).

use crate::fields::CanonicalField;
use crate::text::normalize_header;
use std::collections::HashMap;

/// Raw headers of the free-text alarm description columns, in the fixed
/// order they are concatenated into the combined description. Sources
/// carry anywhere from zero to all four.
pub const FREE_TEXT_COLUMNS: [&str; 4] = [
    "TEXTO 1 DE LA ALARMA",
    "TEXTO 2 DE LA ALARMA",
    "TEXTO 3 DE LA ALARMA",
    "TEXTO 4 DE LA ALARMA",
];

/// Accepted raw spellings per canonical field. First table entry to claim
/// a field wins; later raw columns that normalize to an already-claimed
/// field stay unmapped (their data is still retained by the loader).
const VARIANTS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::AlarmNumber,
        &[
            "NUMERO DE ALARMA",
            "NUMERO ALARMA",
            "NRO ALARMA",
            "NUM ALARMA",
            "ID ALARMA",
            "CODIGO DE ALARMA",
            "ALARMA",
            "ALARM NUMBER",
            "ALARM ID",
        ],
    ),
    (
        CanonicalField::ElementName,
        &[
            "ELEMENTO",
            "ELEMENTO QUE REPORTA",
            "ELEMENTO DE RED",
            "NOMBRE DEL ELEMENTO",
            "NOMBRE ELEMENTO",
            "SERVICIO",
            "PLATAFORMA",
            "NETWORK ELEMENT",
        ],
    ),
    (
        CanonicalField::Description,
        &[
            "TEXTO 1 DE LA ALARMA",
            "TEXTO DE LA ALARMA",
            "DESCRIPCION",
            "DESCRIPCION DE LA ALARMA",
            "DESCRIPTION",
        ],
    ),
    (
        CanonicalField::Severity,
        &["SEVERIDAD", "SEVERITY", "NIVEL", "NIVEL DE SEVERIDAD", "CRITICIDAD"],
    ),
    (
        CanonicalField::Significance,
        &[
            "SIGNIFICADO",
            "SIGNIFICADO DE LA ALARMA",
            "SIGNIFICANCIA",
            "MEANING",
        ],
    ),
    (
        CanonicalField::RecommendedActions,
        &[
            "ACCIONES RECOMENDADAS",
            "ACCION RECOMENDADA",
            "ACCIONES",
            "ACCIONES A SEGUIR",
            "RECOMMENDED ACTIONS",
        ],
    ),
    (
        CanonicalField::Manufacturer,
        &["FABRICANTE", "PROVEEDOR", "MANUFACTURER", "VENDOR", "MARCA"],
    ),
    (
        CanonicalField::InstructionTitle,
        &[
            "KM (TITULO DEL INSTRUCTIVO)",
            "TITULO DEL INSTRUCTIVO",
            "TITULO KM",
            "INSTRUCTIVO",
            "KM",
        ],
    ),
];

/// Immutable raw-name → canonical-field table, built once at startup and
/// reused by every load.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    by_normalized: HashMap<String, CanonicalField>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        let mut by_normalized = HashMap::new();
        for (field, variants) in VARIANTS {
            for variant in *variants {
                by_normalized.insert(normalize_header(variant), *field);
            }
        }
        Self { by_normalized }
    }

    /// Canonical field for a single raw header, if any variant matches.
    pub fn lookup(&self, raw: &str) -> Option<CanonicalField> {
        self.by_normalized.get(&normalize_header(raw)).copied()
    }

    /// Resolve a full header row. Returns one entry per input column, in
    /// input order. When two columns normalize to the same canonical field
    /// the first one (source column order) wins and the later one resolves
    /// to `None`; unknown columns also resolve to `None`. Neither case is
    /// an error.
    pub fn resolve(&self, raw_headers: &[String]) -> Vec<Option<CanonicalField>> {
        let mut claimed: Vec<CanonicalField> = Vec::new();
        raw_headers
            .iter()
            .map(|raw| match self.lookup(raw) {
                Some(field) if !claimed.contains(&field) => {
                    claimed.push(field);
                    Some(field)
                }
                _ => None,
            })
            .collect()
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::new()
    }
}
