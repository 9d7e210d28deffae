//! Bulk serialization of collections and whole stores.
//!
//! Two codecs are provided:
//!
//! - [`JsonCodec`] - JSON arrays of `{id, data}` objects, keyed by collection name at store scope
//! - [`SqlCodec`] - a narrow, line-oriented `CREATE TABLE` / `INSERT INTO` text convention
//!
//! Both work on plain [`Collection`](crate::collection::Collection) values and never
//! touch a backend; the [`DocumentStore`](crate::store::DocumentStore) decides how
//! decoded data is applied.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::DocumentStoreError;

pub mod json;
pub mod sql;

pub use json::JsonCodec;
pub use sql::SqlCodec;

/// Filename used for store-scope exports, before the format extension.
pub const DATABASE_FILE_STEM: &str = "database";

/// Wire format of an export or import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Sql,
}

impl ExportFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Sql => "sql",
        }
    }

    /// Content type to advertise when the export is sent over the wire.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Sql => "text/plain",
        }
    }

    pub(crate) fn filename(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = DocumentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "sql" => Ok(ExportFormat::Sql),
            other => Err(DocumentStoreError::MalformedInput(format!("unknown export format: {}", other))),
        }
    }
}

/// An encoded export ready to be written to disk or sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested filename, e.g. `users.json` or `database.sql`.
    pub filename: String,
    /// Content type matching the format.
    pub content_type: &'static str,
    /// UTF-8 encoded body.
    pub data: Vec<u8>,
}

impl ExportFile {
    pub(crate) fn new(format: ExportFormat, stem: &str, data: Vec<u8>) -> Self {
        Self {
            filename: format.filename(stem),
            content_type: format.content_type(),
            data,
        }
    }
}

/// Counts reported by an import.
///
/// `skipped` is always zero for JSON imports. For SQL-text imports it counts the
/// statements that were dropped by the lenient parser (schema lines excluded),
/// including rows naming a collection that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}
