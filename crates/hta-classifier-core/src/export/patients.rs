//! Patient report output: one CSV per section, a summary CSV and a JSON
//! document carrying everything plus source metadata.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{PatientAggregates, PatientReport, ReportSection};
use crate::io::SourceInfo;

use super::{create_file, csv_writer, ReportError, ReportResult};

/// Summary sheet file name.
pub const SUMMARY_FILE: &str = "Resumen_General.csv";

/// JSON document file name.
pub const PATIENT_JSON_FILE: &str = "reporte_pacientes.json";

/// Where a patient report came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// Input files and their fingerprints
    pub sources: Vec<SourceInfo>,
    /// Rows read
    pub total_rows: usize,
    /// Rows without a patient identifier
    pub skipped_rows: usize,
}

impl ReportMetadata {
    pub fn new(sources: &[SourceInfo], aggregates: &PatientAggregates) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            sources: sources.to_vec(),
            total_rows: aggregates.total_rows,
            skipped_rows: aggregates.skipped_rows,
        }
    }
}

/// Patient report with its metadata, as exported.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientReportExport {
    pub metadata: ReportMetadata,
    #[serde(flatten)]
    pub report: PatientReport,
}

impl PatientReportExport {
    pub fn new(report: PatientReport, metadata: ReportMetadata) -> Self {
        Self { metadata, report }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write every file into `dir`, creating it if needed.
    ///
    /// Empty sections produce no file; the summary and JSON always do.
    /// Returns the written paths in order.
    pub fn write_to_dir(&self, dir: &Path) -> ReportResult<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|source| ReportError::Create {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();

        for section in self.report.sections.iter().filter(|s| !s.is_empty()) {
            let path = dir.join(format!("{}.csv", section.name));
            write_section_csv(create_file(&path)?, section)?;
            debug!(path = %path.display(), rows = section.rows.len(), "Wrote section");
            written.push(path);
        }

        let summary_path = dir.join(SUMMARY_FILE);
        write_summary_csv(create_file(&summary_path)?, &self.report)?;
        written.push(summary_path);

        let json_path = dir.join(PATIENT_JSON_FILE);
        let mut json_file = create_file(&json_path)?;
        json_file.write_all(self.to_json()?.as_bytes())?;
        json_file.flush()?;
        written.push(json_path);

        info!(dir = %dir.display(), files = written.len(), "Wrote patient report");
        Ok(written)
    }
}

/// Write one section as CSV.
pub fn write_section_csv<W: Write>(inner: W, section: &ReportSection) -> ReportResult<()> {
    let mut writer = csv_writer(inner)?;
    writer.write_record([
        "Documento",
        "Nombres",
        "Apellidos",
        "Fecha_Nacimiento",
        "Sexo",
        section.kind.detail_column(),
    ])?;

    for row in &section.rows {
        writer.write_record([
            row.document.as_str(),
            row.given_names.as_str(),
            row.family_names.as_str(),
            row.birth_date.as_deref().unwrap_or(""),
            row.sex.as_deref().unwrap_or(""),
            row.detail.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the category/count table as CSV.
pub fn write_summary_csv<W: Write>(inner: W, report: &PatientReport) -> ReportResult<()> {
    let mut writer = csv_writer(inner)?;
    writer.write_record(["Categoría", "Cantidad"])?;
    for entry in &report.summary {
        writer.write_record([entry.category.as_str(), entry.count.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
