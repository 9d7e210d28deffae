//! SQL-text codec.
//!
//! This is a line-oriented text convention for round-tripping collections, not a
//! SQL parser. An export is a `CREATE TABLE` line per collection followed by one
//! `INSERT INTO` line per record:
//!
//! ```text
//! CREATE TABLE IF NOT EXISTS users (id TEXT PRIMARY KEY, data JSONB);
//! INSERT INTO users (id, data) VALUES ('a1', '{"x":1}');
//! ```
//!
//! Values are written without any quote escaping. Import splits the text on `;\n`
//! and searches each statement for the insert pattern; anything that does not
//! match, names another table, or carries a payload that is not a JSON object or
//! array is skipped. Statements without a match that open with `CREATE TABLE` are
//! dropped without being counted. Payloads containing `', '` or a literal `;\n` therefore do not
//! round-trip.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{
    codec::{DATABASE_FILE_STEM, ExportFile, ExportFormat, ImportSummary},
    collection::Collection,
    error::{DocumentStoreError, DocumentStoreResult},
    record::Record,
};

/// Terminates every statement in an export and separates statements on import.
pub const STATEMENT_SEPARATOR: &str = ";\n";

static INSERT_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"INSERT INTO ([A-Za-z0-9_]+) \(id, data\) VALUES \('(.+)', '(.+)'\)")
        .expect("insert statement pattern is valid")
});

/// A row decoded from an `INSERT INTO` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow {
    pub table: String,
    pub record: Record,
}

pub struct SqlCodec;

impl SqlCodec {
    /// Encodes a collection as `<name>.sql`.
    pub fn export_collection(collection: &Collection) -> DocumentStoreResult<ExportFile> {
        let mut out = String::new();
        write_collection(&mut out, collection)?;

        Ok(ExportFile::new(ExportFormat::Sql, collection.name(), out.into_bytes()))
    }

    /// Encodes every collection, one block after another, as `database.sql`.
    pub fn export_store<'a>(collections: impl IntoIterator<Item = &'a Collection>) -> DocumentStoreResult<ExportFile> {
        let mut out = String::new();
        for collection in collections {
            write_collection(&mut out, collection)?;
        }

        Ok(ExportFile::new(ExportFormat::Sql, DATABASE_FILE_STEM, out.into_bytes()))
    }

    /// Decodes statements into a fresh collection named `name`.
    ///
    /// Rows for any other table are skipped.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::MalformedInput`] if the bytes are not UTF-8. Statement
    /// level problems never fail the import.
    pub fn import_collection(name: &str, data: &[u8]) -> DocumentStoreResult<(Collection, ImportSummary)> {
        let (rows, mut summary) = Self::parse(data)?;
        let mut collection = Collection::new(name);

        for row in rows {
            if row.table == name {
                collection.add(row.record);
            } else {
                tracing::debug!(collection = %name, table = %row.table, "Skipping row for another table");
                summary.skipped += 1;
            }
        }
        summary.imported = collection.len();

        Ok((collection, summary))
    }

    /// Decodes every accepted row, whatever its table.
    ///
    /// The returned summary counts the statements dropped by the parser; whether a
    /// row's table exists is decided by whoever applies the rows.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::MalformedInput`] if the bytes are not UTF-8.
    pub fn parse(data: &[u8]) -> DocumentStoreResult<(Vec<SqlRow>, ImportSummary)> {
        let text = std::str::from_utf8(data)
            .map_err(|e| DocumentStoreError::MalformedInput(format!("SQL input is not UTF-8: {}", e)))?;

        let mut rows = Vec::new();
        let mut summary = ImportSummary::default();

        for statement in text.split(STATEMENT_SEPARATOR) {
            if statement.trim().is_empty() {
                continue;
            }

            match parse_insert(statement) {
                Some(row) => rows.push(row),
                None if is_schema_statement(statement) => {}
                None => {
                    tracing::debug!(statement = %statement, "Skipping unrecognised SQL statement");
                    summary.skipped += 1;
                }
            }
        }

        Ok((rows, summary))
    }
}

fn write_collection(out: &mut String, collection: &Collection) -> DocumentStoreResult<()> {
    let table = collection.name();

    out.push_str(&format!(
        "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, data JSONB){}",
        table, STATEMENT_SEPARATOR
    ));

    for record in collection.records() {
        out.push_str(&format!(
            "INSERT INTO {} (id, data) VALUES ('{}', '{}'){}",
            table,
            record.id(),
            serde_json::to_string(record.data())?,
            STATEMENT_SEPARATOR
        ));
    }

    Ok(())
}

fn is_schema_statement(statement: &str) -> bool {
    statement.trim_start().starts_with("CREATE TABLE")
}

fn parse_insert(statement: &str) -> Option<SqlRow> {
    let captures = INSERT_STATEMENT.captures(statement)?;
    let table = captures.get(1)?.as_str();
    let id = captures.get(2)?.as_str();

    let data = serde_json::from_str::<Value>(captures.get(3)?.as_str())
        .ok()
        .filter(|value| value.is_object() || value.is_array())?;

    Some(SqlRow {
        table: table.to_string(),
        record: Record::new(Some(id.to_string()), Some(data)),
    })
}
