//! Tests for severity classification.

use alarma_common::severity::{self, ALTA, BAJA, CRITICA, INFORMATIVA, MEDIA};
use alarma_common::SENTINEL;

#[test]
fn test_english_synonyms_map_to_spanish_vocabulary() {
    assert_eq!(severity::classify("CRITICAL"), CRITICA);
    assert_eq!(severity::classify("HIGH"), ALTA);
    assert_eq!(severity::classify("MEDIUM"), MEDIA);
    assert_eq!(severity::classify("LOW"), BAJA);
    assert_eq!(severity::classify("INFO"), INFORMATIVA);
}

#[test]
fn test_spanish_values_normalize() {
    assert_eq!(severity::classify("crítica"), CRITICA);
    assert_eq!(severity::classify("Alta"), ALTA);
    assert_eq!(severity::classify(" baja "), BAJA);
}

#[test]
fn test_unrecognized_value_passes_through_uppercased() {
    assert_eq!(severity::classify("Mayor degradación"), "MAYOR DEGRADACION");
}

#[test]
fn test_sentinel_and_blank_preserved() {
    assert_eq!(severity::classify(SENTINEL), SENTINEL);
    assert_eq!(severity::classify("   "), SENTINEL);
}
