//! Per-record CSV output.

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::classify::{RecordClassification, CATEGORIZATION_COLUMN};

use super::{create_file, csv_writer, ReportResult};

/// Default output file name.
pub const DEFAULT_RECORD_REPORT: &str = "registros_clasificados_por_medicamento_final.csv";

/// Write classified rows with every source column plus the label column last.
///
/// A source column already named like the label column is replaced.
pub fn write_record_csv<W: Write>(
    inner: W,
    headers: &[String],
    output: &RecordClassification,
) -> ReportResult<()> {
    let kept: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.as_str() != CATEGORIZATION_COLUMN)
        .map(|(i, _)| i)
        .collect();

    let mut writer = csv_writer(inner)?;

    let mut header_row: Vec<&str> = kept.iter().map(|&i| headers[i].as_str()).collect();
    header_row.push(CATEGORIZATION_COLUMN);
    writer.write_record(&header_row)?;

    for classified in &output.records {
        let fields = &classified.record.fields;
        let mut row: Vec<&str> = kept
            .iter()
            .map(|&i| fields.get(i).and_then(|v| v.as_deref()).unwrap_or(""))
            .collect();
        row.push(&classified.label);
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the record report to `path`.
pub fn write_record_report(
    path: &Path,
    headers: &[String],
    output: &RecordClassification,
) -> ReportResult<()> {
    write_record_csv(create_file(path)?, headers, output)?;
    info!(
        path = %path.display(),
        rows = output.records.len(),
        "Wrote record report"
    );
    Ok(())
}
