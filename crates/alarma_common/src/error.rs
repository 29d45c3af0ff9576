//! Error types for the alarm catalog assistant.

use std::path::PathBuf;
use thiserror::Error;

/// Catalog-layer failures.
///
/// Missing required columns and ambiguous headers are recovered silently
/// (sentinel fill, first-wins) and never appear here. A query with no
/// match is a normal result, not an error.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("catalog source unparsable: {0}")]
    SourceUnparsable(String),

    #[error("catalog source has no parsable rows: {0}")]
    Empty(PathBuf),

    #[error("catalog not loaded yet")]
    CatalogNotReady,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
