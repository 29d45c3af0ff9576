//! Catalog ingestion.
//!
//! Reads a tabular source (delimited text with separator/encoding probing,
//! or a workbook sheet), applies the column mapping, sentinel-fills absent
//! required fields and produces an immutable [`CatalogSnapshot`]. Failures
//! are returned as [`CatalogError`] values; the cache decides what to do
//! with them.

use alarma_common::columns::{ColumnMapping, FREE_TEXT_COLUMNS};
use alarma_common::fields::{CanonicalField, SENTINEL};
use alarma_common::record::{AlarmRecord, CatalogSnapshot};
use alarma_common::severity;
use alarma_common::text::normalize_header;
use alarma_common::CatalogError;
use calamine::{open_workbook_auto, Data, Reader};
use encoding_rs::WINDOWS_1252;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Separator used when concatenating the free-text description columns.
const DESCRIPTION_SEPARATOR: &str = " • ";

/// Workbook extensions handled by calamine; everything else is treated as
/// delimited text.
const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "xlsb"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceEncoding {
    Utf8,
    Latin1,
}

impl SourceEncoding {
    fn name(&self) -> &'static str {
        match self {
            SourceEncoding::Utf8 => "utf-8",
            SourceEncoding::Latin1 => "latin-1",
        }
    }
}

/// Ordered (delimiter, encoding) combinations tried against delimited
/// sources. The first one that decodes cleanly wins.
const READ_ATTEMPTS: [(u8, SourceEncoding); 4] = [
    (b';', SourceEncoding::Utf8),
    (b',', SourceEncoding::Utf8),
    (b';', SourceEncoding::Latin1),
    (b',', SourceEncoding::Latin1),
];

/// Identifies a catalog source: a file path, fallback candidate paths, and
/// an optional worksheet selector for workbook sources.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub path: PathBuf,
    pub candidates: Vec<PathBuf>,
    pub sheet: Option<String>,
}

impl SourceDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            candidates: Vec::new(),
            sheet: None,
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    /// First existing path among the primary path and the candidates.
    pub fn resolve_path(&self) -> Result<PathBuf, CatalogError> {
        if self.path.exists() {
            return Ok(self.path.clone());
        }
        for candidate in &self.candidates {
            debug!("Probing catalog candidate {}", candidate.display());
            if candidate.exists() {
                info!("Catalog found at fallback path {}", candidate.display());
                return Ok(candidate.clone());
            }
        }
        Err(CatalogError::SourceNotFound(self.path.clone()))
    }

    /// Current modification time of the resolved source file, if readable.
    pub fn source_mtime(&self) -> Option<SystemTime> {
        let path = self.resolve_path().ok()?;
        fs::metadata(path).ok()?.modified().ok()
    }
}

/// Load the catalog described by `descriptor` into a fresh snapshot.
pub fn load(
    descriptor: &SourceDescriptor,
    mapping: &ColumnMapping,
) -> Result<CatalogSnapshot, CatalogError> {
    let path = descriptor.resolve_path()?;
    let mtime = fs::metadata(&path).ok().and_then(|m| m.modified().ok());

    let (headers, rows) = if is_workbook(&path) {
        parse_workbook(&path, descriptor.sheet.as_deref())?
    } else {
        parse_delimited(&path)?
    };

    let records = build_records(&headers, &rows, mapping);
    if records.is_empty() {
        return Err(CatalogError::Empty(path));
    }

    info!(
        "Catalog loaded: {} records from {}",
        records.len(),
        path.display()
    );
    Ok(CatalogSnapshot::new(records, path, mtime))
}

/// Two synthetic records served when no catalog file has ever loaded, so
/// the assistant stays responsive instead of dead-ending.
pub fn demo_records() -> Vec<AlarmRecord> {
    vec![
        AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "1003"),
            (CanonicalField::ElementName, "AAA Huawei"),
            (
                CanonicalField::Description,
                "Fallo de autenticación de suscriptores en el nodo AAA",
            ),
            (CanonicalField::Severity, "CRITICA"),
            (
                CanonicalField::Significance,
                "Los suscriptores no pueden autenticarse contra la plataforma",
            ),
            (
                CanonicalField::RecommendedActions,
                "Validar conectividad con el HLR y escalar al fabricante si persiste",
            ),
            (CanonicalField::Manufacturer, "Huawei"),
            (CanonicalField::InstructionTitle, "KM-AAA-1003"),
        ]),
        AlarmRecord::from_pairs(&[
            (CanonicalField::AlarmNumber, "2047"),
            (CanonicalField::ElementName, "HLR Ericsson"),
            (
                CanonicalField::Description,
                "Pérdida de sincronismo con la base de datos de suscriptores",
            ),
            (CanonicalField::Severity, "ALTA"),
            (
                CanonicalField::Significance,
                "Consultas de perfil degradadas en la plataforma HLR",
            ),
            (
                CanonicalField::RecommendedActions,
                "Revisar los enlaces de señalización y reiniciar la réplica afectada",
            ),
            (CanonicalField::Manufacturer, "Ericsson"),
            (CanonicalField::InstructionTitle, "KM-HLR-2047"),
        ]),
    ]
}

/// Snapshot wrapping [`demo_records`].
pub fn demo_snapshot() -> CatalogSnapshot {
    CatalogSnapshot::demo(demo_records())
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

type RawTable = (Vec<String>, Vec<Vec<String>>);

/// Probe the fixed (delimiter, encoding) combinations in order. A
/// combination is accepted once it decodes without error and yields a
/// header row; a parse that produced a single column is kept only as a
/// fallback in case no combination splits the file properly.
fn parse_delimited(path: &Path) -> Result<RawTable, CatalogError> {
    let bytes = fs::read(path)?;
    let mut fallback: Option<RawTable> = None;

    for (delimiter, encoding) in READ_ATTEMPTS {
        let decoded: Cow<'_, str> = match encoding {
            SourceEncoding::Utf8 => match std::str::from_utf8(&bytes) {
                Ok(text) => Cow::Borrowed(text),
                Err(e) => {
                    debug!(
                        "Decode failed with sep='{}' encoding='{}': {e}",
                        delimiter as char,
                        encoding.name()
                    );
                    continue;
                }
            },
            SourceEncoding::Latin1 => WINDOWS_1252.decode(&bytes).0,
        };

        let Some((headers, rows)) = parse_with_delimiter(&decoded, delimiter) else {
            continue;
        };
        debug!(
            "Parsed catalog with sep='{}' encoding='{}' -> {} rows, {} columns",
            delimiter as char,
            encoding.name(),
            rows.len(),
            headers.len()
        );
        if headers.len() > 1 {
            return Ok((headers, rows));
        }
        if fallback.is_none() {
            fallback = Some((headers, rows));
        }
    }

    fallback.ok_or_else(|| {
        CatalogError::SourceUnparsable(format!(
            "all delimiter/encoding attempts failed for {}",
            path.display()
        ))
    })
}

/// Parse decoded text with one delimiter. Malformed individual lines are
/// skipped, never fatal.
fn parse_with_delimiter(text: &str, delimiter: u8) -> Option<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(|h| h.trim().to_string()).collect(),
        Err(e) => {
            debug!("Header read failed: {e}");
            return None;
        }
    };
    if headers.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                let values: Vec<String> =
                    record.iter().map(|v| v.trim().to_string()).collect();
                if values.iter().all(|v| v.is_empty()) {
                    continue;
                }
                rows.push(values);
            }
            Err(e) => {
                warn!("Skipping malformed catalog line: {e}");
            }
        }
    }
    Some((headers, rows))
}

/// Read the selected worksheet: the named sheet when present, otherwise
/// the second sheet by position, otherwise the first.
fn parse_workbook(path: &Path, sheet: Option<&str>) -> Result<RawTable, CatalogError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CatalogError::SourceUnparsable(e.to_string()))?;
    let names = workbook.sheet_names().to_vec();
    if names.is_empty() {
        return Err(CatalogError::SourceUnparsable(format!(
            "workbook {} has no worksheets",
            path.display()
        )));
    }

    let target = sheet
        .and_then(|wanted| {
            names
                .iter()
                .find(|name| name.eq_ignore_ascii_case(wanted))
                .cloned()
        })
        .or_else(|| names.get(1).cloned())
        .unwrap_or_else(|| names[0].clone());
    if let Some(wanted) = sheet {
        if !target.eq_ignore_ascii_case(wanted) {
            warn!("Worksheet '{wanted}' not found, using '{target}'");
        }
    }

    let range = workbook
        .worksheet_range(&target)
        .map_err(|e| CatalogError::SourceUnparsable(e.to_string()))?;

    let mut rows_iter = range.rows();
    let Some(header_row) = rows_iter.next() else {
        return Ok((Vec::new(), Vec::new()));
    };
    let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

    let mut rows = Vec::new();
    for row in rows_iter {
        let values: Vec<String> = row.iter().map(cell_to_string).collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(values);
    }
    Ok((headers, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            // Alarm numbers come back as floats from spreadsheets; keep
            // "1003" instead of "1003.0".
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
    }
}

/// Turn the raw table into normalized records: canonical fields via the
/// column mapping, unmapped columns retained as extras, combined
/// description and classified severity derived per row.
fn build_records(
    headers: &[String],
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
) -> Vec<AlarmRecord> {
    let resolved = mapping.resolve(headers);

    // Free-text description columns, in their fixed concatenation order.
    let free_text_indices: Vec<usize> = FREE_TEXT_COLUMNS
        .iter()
        .filter_map(|variant| {
            let wanted = normalize_header(variant);
            headers.iter().position(|h| normalize_header(h) == wanted)
        })
        .collect();

    rows.iter()
        .map(|row| {
            let mut fields: BTreeMap<CanonicalField, String> = BTreeMap::new();
            let mut extras: Vec<(String, String)> = Vec::new();

            for (i, header) in headers.iter().enumerate() {
                let value = row.get(i).map(|v| v.trim()).unwrap_or("");
                match resolved[i] {
                    Some(field) => {
                        fields.insert(field, value.to_string());
                    }
                    None => {
                        if !header.trim().is_empty() {
                            extras.push((header.clone(), value.to_string()));
                        }
                    }
                }
            }

            let combined: Vec<&str> = free_text_indices
                .iter()
                .filter_map(|&i| row.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty() && *v != SENTINEL)
                .collect();
            if !combined.is_empty() {
                fields.insert(
                    CanonicalField::Description,
                    combined.join(DESCRIPTION_SEPARATOR),
                );
            }

            let raw_severity = fields
                .get(&CanonicalField::Severity)
                .cloned()
                .unwrap_or_default();
            fields.insert(CanonicalField::Severity, severity::classify(&raw_severity));

            AlarmRecord::with_extras(fields, extras)
        })
        .collect()
}
