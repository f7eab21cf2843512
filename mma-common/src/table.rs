//! Raw tabular input
//!
//! Uploaded CSV files are read into a [`RawTable`]: an ordered header list and
//! rows of string cells. Nothing is typed at this stage; the schema classifier
//! and the record converters in [`crate::models`] decide what the columns mean.
//!
//! Parsing is strict first. When a file has ragged or undecodable rows the
//! whole buffer is re-read in lenient mode, skipping every row that cannot be
//! aligned with the header instead of rejecting the upload.

use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, warn};

/// Parsed CSV contents keyed by header name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Source label (file name) used in log and error messages
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows dropped by the lenient re-parse
    pub skipped_rows: usize,
}

/// Borrowed view of one row with by-name cell access
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RowRef<'a> {
    /// Non-empty, trimmed cell value for `column`
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.cells
            .get(idx)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

impl RawTable {
    /// Build a table directly from headers and rows (used by tests and callers
    /// that already hold tabular data)
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
            skipped_rows: 0,
        }
    }

    /// Read a CSV file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &bytes)
    }

    /// Parse CSV bytes, strict first and lenient on failure
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();

        match parse_strict(bytes) {
            Ok((headers, rows)) => {
                debug!("{}: parsed {} rows (strict)", name, rows.len());
                Ok(Self::new(name, headers, rows))
            }
            Err(strict_err) => {
                warn!(
                    "{}: strict parse failed ({}), retrying in lenient mode",
                    name, strict_err
                );
                let (headers, rows, skipped) =
                    parse_lenient(bytes).map_err(|e| Error::parse(&name, e))?;
                if skipped > 0 {
                    warn!("{}: skipped {} malformed rows", name, skipped);
                }
                Ok(Self {
                    name,
                    headers,
                    rows,
                    skipped_rows: skipped,
                })
            }
        }
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Check whether a column is present
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Rename a column in place
    ///
    /// No-op when `from` is absent or when `to` already exists, so an
    /// explicit canonical column is never shadowed by an alias.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if self.has_column(to) {
            return;
        }
        if let Some(h) = self.headers.iter_mut().find(|h| h.as_str() == from) {
            *h = to.to_string();
        }
    }

    /// Iterate rows with by-name access
    pub fn iter(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(move |cells| RowRef {
            headers: &self.headers,
            cells,
        })
    }
}

fn reader(bytes: &[u8], flexible: bool) -> csv::Reader<&[u8]> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(flexible)
        .trim(Trim::Headers)
        .from_reader(bytes)
}

fn header_names(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

fn parse_strict(bytes: &[u8]) -> std::result::Result<(Vec<String>, Vec<Vec<String>>), csv::Error> {
    let mut rdr = reader(bytes, false);
    let headers = header_names(rdr.headers()?);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

fn parse_lenient(
    bytes: &[u8],
) -> std::result::Result<(Vec<String>, Vec<Vec<String>>, usize), csv::Error> {
    let mut rdr = reader(bytes, true);
    let headers = header_names(rdr.headers()?);
    let mut rows = Vec::new();
    let mut skipped = 0;

    for record in rdr.records() {
        match record {
            Ok(record) if record.len() == headers.len() => {
                rows.push(record.iter().map(str::to_string).collect());
            }
            Ok(_) | Err(_) => skipped += 1,
        }
    }

    Ok((headers, rows, skipped))
}
