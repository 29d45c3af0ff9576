//! Severity classification.
//!
//! The sources mix Spanish and English severity vocabularies; the rest of
//! the system only speaks the Spanish one.

use crate::fields::SENTINEL;
use crate::text::{normalize_header, strip_diacritics};

pub const CRITICA: &str = "CRITICA";
pub const ALTA: &str = "ALTA";
pub const MEDIA: &str = "MEDIA";
pub const BAJA: &str = "BAJA";
pub const INFORMATIVA: &str = "INFORMATIVA";

/// Deterministic classification of a raw severity/level value.
///
/// Known synonyms map onto the canonical vocabulary; anything unrecognized
/// passes through uppercased. The sentinel is preserved as-is.
pub fn classify(raw: &str) -> String {
    if raw.trim().is_empty() || raw.trim() == SENTINEL {
        return SENTINEL.to_string();
    }
    let normalized = strip_diacritics(raw.trim()).to_uppercase();
    match normalized.as_str() {
        "CRITICAL" | "CRITICA" => CRITICA.to_string(),
        "HIGH" | "ALTA" => ALTA.to_string(),
        "MEDIUM" | "MEDIA" => MEDIA.to_string(),
        "LOW" | "BAJA" => BAJA.to_string(),
        "INFO" | "INFORMATIVA" => INFORMATIVA.to_string(),
        _ => normalize_header(raw),
    }
}
