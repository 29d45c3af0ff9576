//! Shared types for the alarm catalog assistant.
//!
//! Everything the ingestion and conversation crates agree on lives here:
//! the canonical field set, the column-name mapping, normalized records,
//! catalog snapshots, severity vocabulary and the error taxonomy.

pub mod columns;
pub mod error;
pub mod fields;
pub mod record;
pub mod severity;
pub mod text;

pub use columns::ColumnMapping;
pub use error::CatalogError;
pub use fields::{CanonicalField, SENTINEL};
pub use record::{AlarmRecord, AlarmRecordView, CatalogSnapshot};

/// Crate version, reported by the daemon at startup.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
