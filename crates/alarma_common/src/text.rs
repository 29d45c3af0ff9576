//! Text normalization shared by header resolution and searching.
//!
//! The catalog exports mix cases, stray whitespace, embedded quotes and
//! accented spellings of the same header. Every comparison in the system
//! goes through the same normalized form so that "Número  de alarma" and
//! `NUMERO DE ALARMA` are the same thing.

/// Replace accented Latin characters with their plain ASCII counterparts.
///
/// Only covers the accents that actually show up in the Spanish-language
/// exports; anything else passes through untouched.
pub fn strip_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'Á' | 'À' | 'Ä' | 'Â' => 'A',
            'É' | 'È' | 'Ë' | 'Ê' => 'E',
            'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
            'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
            'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Canonical form of a column header: quotes/tabs/newlines removed,
/// whitespace runs collapsed to one space, diacritics stripped, uppercased.
pub fn normalize_header(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '\n' | '\r' | '\t'))
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    strip_diacritics(&collapsed).to_uppercase()
}

/// Form used for matching record values against query substrings.
/// Same rules as headers; containment checks are done on this form.
pub fn normalize_for_match(raw: &str) -> String {
    normalize_header(raw)
}

/// Similarity between two strings on a 0.0–1.0 scale, computed over the
/// normalized forms so case and accents do not count as differences.
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&normalize_for_match(a), &normalize_for_match(b))
}
