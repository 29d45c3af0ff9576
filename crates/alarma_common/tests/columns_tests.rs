//! Tests for the column-name mapping.

use alarma_common::columns::ColumnMapping;
use alarma_common::fields::CanonicalField;

#[test]
fn test_variants_resolve_regardless_of_case_and_accents() {
    let mapping = ColumnMapping::new();
    for raw in [
        "NUMERO DE ALARMA",
        "Número de Alarma",
        "  numero  de alarma ",
        "\"NÚMERO DE ALARMA\"",
    ] {
        assert_eq!(
            mapping.lookup(raw),
            Some(CanonicalField::AlarmNumber),
            "variant {raw:?} should resolve to AlarmNumber"
        );
    }
}

#[test]
fn test_all_registered_variants_resolve() {
    let mapping = ColumnMapping::new();
    assert_eq!(mapping.lookup("Fabricante"), Some(CanonicalField::Manufacturer));
    assert_eq!(mapping.lookup("SEVERIDAD"), Some(CanonicalField::Severity));
    assert_eq!(
        mapping.lookup("KM (TITULO DEL INSTRUCTIVO)"),
        Some(CanonicalField::InstructionTitle)
    );
    assert_eq!(
        mapping.lookup("TEXTO 1 DE LA ALARMA"),
        Some(CanonicalField::Description)
    );
    assert_eq!(mapping.lookup("Elemento que reporta"), Some(CanonicalField::ElementName));
}

#[test]
fn test_unknown_header_is_unmapped() {
    let mapping = ColumnMapping::new();
    assert_eq!(mapping.lookup("COLUMNA MISTERIOSA"), None);
}

#[test]
fn test_resolve_first_column_wins_on_ambiguity() {
    let mapping = ColumnMapping::new();
    let headers = vec![
        "NUMERO DE ALARMA".to_string(),
        "NRO ALARMA".to_string(),
        "ELEMENTO".to_string(),
    ];
    let resolved = mapping.resolve(&headers);
    assert_eq!(resolved[0], Some(CanonicalField::AlarmNumber));
    // Second spelling of the same concept stays unmapped.
    assert_eq!(resolved[1], None);
    assert_eq!(resolved[2], Some(CanonicalField::ElementName));
}

#[test]
fn test_resolve_preserves_input_order() {
    let mapping = ColumnMapping::new();
    let headers = vec![
        "OTRA COSA".to_string(),
        "SEVERIDAD".to_string(),
        "FABRICANTE".to_string(),
    ];
    let resolved = mapping.resolve(&headers);
    assert_eq!(
        resolved,
        vec![
            None,
            Some(CanonicalField::Severity),
            Some(CanonicalField::Manufacturer)
        ]
    );
}
