//! Report writers for the record and patient pipelines.
//!
//! CSV output is `;`-delimited UTF-8 with a BOM so spreadsheet tools pick
//! the encoding up without an import dialog.

mod patients;
mod records;

pub use patients::*;
pub use records::*;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// CSV field delimiter of every report.
pub const REPORT_DELIMITER: u8 = b';';

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// BOM-prefixed `;` CSV writer over `inner`.
fn csv_writer<W: Write>(mut inner: W) -> ReportResult<csv::Writer<W>> {
    inner.write_all(UTF8_BOM)?;
    Ok(csv::WriterBuilder::new()
        .delimiter(REPORT_DELIMITER)
        .from_writer(inner))
}

fn create_file(path: &Path) -> ReportResult<BufWriter<File>> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}
