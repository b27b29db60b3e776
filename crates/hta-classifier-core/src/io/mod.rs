//! Tabular input loading.
//!
//! Sources are CSV files of unknown encoding (UTF-8 or Latin-1) and unknown
//! delimiter. Every loaded source is fingerprinted so reports can be traced
//! back to their inputs.

mod columns;

pub use columns::*;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::models::{Demographics, MedicationRecord};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Loader errors.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("None of the input files could be loaded")]
    NoSourcesLoaded,
}

pub type LoaderResult<T> = Result<T, LoaderError>;

/// Text encoding a source was decoded with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEncoding::Utf8 => f.write_str("utf-8"),
            TextEncoding::Latin1 => f.write_str("latin-1"),
        }
    }
}

/// How one input file was read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceInfo {
    /// Path as given
    pub path: String,
    /// SHA-256 of the raw bytes (hex)
    pub sha256: String,
    /// Encoding used to decode the file
    pub encoding: TextEncoding,
    /// Field delimiter
    pub delimiter: char,
    /// Data rows (header excluded)
    pub rows: usize,
}

type Row = Vec<Option<String>>;

/// Concatenation of every loaded source.
///
/// The header is the union of all source headers in first-seen order; rows
/// from sources lacking a column read it as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub sources: Vec<SourceInfo>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows read under `headers`.
    pub fn append(&mut self, headers: &[String], rows: Vec<Row>) {
        let mapping: Vec<usize> = headers.iter().map(|h| self.column_slot(h)).collect();

        for row in rows {
            let mut aligned = vec![None; self.headers.len()];
            for (value, &slot) in row.into_iter().zip(&mapping) {
                aligned[slot] = value;
            }
            self.rows.push(aligned);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell value; absent when the row predates the column or the cell is empty.
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|v| v.as_deref())
    }

    /// Build medication records using resolved columns.
    pub fn records(&self, columns: &ColumnMap) -> Vec<MedicationRecord> {
        (0..self.rows.len())
            .map(|i| {
                let get = |col: Option<usize>| col.and_then(|c| self.value(i, c));

                let demographics = Demographics {
                    given_names: Demographics::join_names(
                        columns.given_names.iter().map(|&c| get(Some(c))),
                    ),
                    family_names: Demographics::join_names(
                        columns.family_names.iter().map(|&c| get(Some(c))),
                    ),
                    birth_date: get(columns.birth_date).map(str::to_string),
                    sex: get(columns.sex).map(str::to_string),
                };

                let mut fields = self.rows[i].clone();
                fields.resize(self.headers.len(), None);

                MedicationRecord {
                    patient_id: get(Some(columns.document)).map(str::to_string),
                    medication: get(Some(columns.medication)).map(str::to_string),
                    demographics,
                    fields,
                }
            })
            .collect()
    }

    fn column_slot(&mut self, name: &str) -> usize {
        match self.column_index(name) {
            Some(slot) => slot,
            None => {
                self.headers.push(name.to_string());
                self.headers.len() - 1
            }
        }
    }
}

/// Load and concatenate every readable source.
///
/// Missing or unparseable files are skipped with a warning; it is an error
/// only when nothing could be loaded.
pub fn load_sources<P: AsRef<Path>>(paths: &[P], config: &LoaderConfig) -> LoaderResult<Dataset> {
    let mut dataset = Dataset::new();

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Input file not found");
            continue;
        }

        let Some((headers, rows, info)) = load_source(path, config)? else {
            warn!(
                path = %path.display(),
                "Could not load file with any encoding/delimiter combination"
            );
            continue;
        };

        info!(
            path = %path.display(),
            encoding = %info.encoding,
            delimiter = %info.delimiter,
            rows = info.rows,
            "Loaded input file"
        );
        dataset.append(&headers, rows);
        dataset.sources.push(info);
    }

    if dataset.sources.is_empty() {
        return Err(LoaderError::NoSourcesLoaded);
    }

    debug!(
        rows = dataset.len(),
        columns = dataset.headers.len(),
        "Combined input files"
    );
    Ok(dataset)
}

/// Read one file; `None` when no configured delimiter yields a table.
fn load_source(
    path: &Path,
    config: &LoaderConfig,
) -> LoaderResult<Option<(Vec<String>, Vec<Row>, SourceInfo)>> {
    let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let sha256 = hex::encode(Sha256::digest(&bytes));
    let (text, encoding) = decode(&bytes);

    for delimiter in config.delimiter_bytes() {
        match parse_table(&text, delimiter) {
            Ok(Some((headers, rows))) => {
                let info = SourceInfo {
                    path: path.display().to_string(),
                    sha256,
                    encoding,
                    delimiter: delimiter as char,
                    rows: rows.len(),
                };
                return Ok(Some((headers, rows, info)));
            }
            Ok(None) => {
                debug!(path = %path.display(), delimiter = %(delimiter as char), "Delimiter rejected");
            }
            Err(e) => {
                debug!(path = %path.display(), delimiter = %(delimiter as char), error = %e, "Parse failed");
            }
        }
    }

    Ok(None)
}

/// Decode as UTF-8 (dropping a BOM), falling back to Latin-1.
pub fn decode(bytes: &[u8]) -> (String, TextEncoding) {
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => (
            body.iter().map(|&b| char::from(b)).collect(),
            TextEncoding::Latin1,
        ),
    }
}

/// Parse a delimited table.
///
/// `Ok(None)` when the header has a single column or a row is wider than the
/// header. Short rows are padded as absent.
pub fn parse_table(
    text: &str,
    delimiter: u8,
) -> Result<Option<(Vec<String>, Vec<Row>)>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = dedup_headers(reader.headers()?.iter().map(|h| h.trim().to_string()));
    if headers.len() <= 1 {
        return Ok(None);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > headers.len() {
            return Ok(None);
        }
        rows.push(
            record
                .iter()
                .map(|v| Some(v.trim()).filter(|v| !v.is_empty()).map(str::to_string))
                .collect(),
        );
    }

    Ok(Some((headers, rows)))
}

/// Suffix repeated header names with `.1`, `.2`, ...
fn dedup_headers(headers: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h
            } else {
                format!("{}.{}", h, count)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_decode_utf8_with_bom() {
        let (text, encoding) = decode(b"\xEF\xBB\xBFDocumento;Medicamento");
        assert_eq!(text, "Documento;Medicamento");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_latin1_fallback() {
        // "Cápsula" in Latin-1
        let (text, encoding) = decode(b"C\xE1psula");
        assert_eq!(text, "Cápsula");
        assert_eq!(encoding, TextEncoding::Latin1);
    }

    #[test]
    fn test_decode_latin1_fallback_strips_bom() {
        let (text, encoding) = decode(b"\xEF\xBB\xBFNom1PAc;Medicamento\nJos\xE9;losartan\n");
        assert_eq!(encoding, TextEncoding::Latin1);
        assert_eq!(text, "Nom1PAc;Medicamento\nJosé;losartan\n");

        let (headers, _) = parse_table(&text, b';').unwrap().unwrap();
        assert_eq!(headers, vec!["Nom1PAc", "Medicamento"]);
    }

    #[test]
    fn test_parse_table_rejects_single_column() {
        let result = parse_table("a;b\n1;2\n", b',').unwrap();
        assert!(result.is_none());

        let (headers, rows) = parse_table("a;b\n1;2\n", b';').unwrap().unwrap();
        assert_eq!(headers, vec!["a", "b"]);
        assert_eq!(rows, vec![vec![Some("1".to_string()), Some("2".to_string())]]);
    }

    #[test]
    fn test_parse_table_empty_cells_are_absent() {
        let (_, rows) = parse_table("a,b,c\n1,,3\n4\n", b',').unwrap().unwrap();
        assert_eq!(rows[0], vec![Some("1".into()), None, Some("3".into())]);
        assert_eq!(rows[1], vec![Some("4".into())]);
    }

    #[test]
    fn test_parse_table_rejects_wide_rows() {
        assert!(parse_table("a,b\n1,2,3\n", b',').unwrap().is_none());
    }

    #[test]
    fn test_dedup_headers() {
        let headers = dedup_headers(["a", "b", "a", "a"].into_iter().map(String::from));
        assert_eq!(headers, vec!["a", "b", "a.1", "a.2"]);
    }

    #[test]
    fn test_dataset_union_of_headers() {
        let mut dataset = Dataset::new();
        dataset.append(
            &["Documento".to_string(), "Medicamento".to_string()],
            vec![vec![Some("1".into()), Some("losartan".into())]],
        );
        dataset.append(
            &["Medicamento".to_string(), "Sexo".to_string(), "Documento".to_string()],
            vec![vec![Some("enalapril".into()), Some("F".into()), Some("2".into())]],
        );

        assert_eq!(dataset.headers, vec!["Documento", "Medicamento", "Sexo"]);
        assert_eq!(dataset.value(0, 2), None);
        assert_eq!(dataset.value(1, 0), Some("2"));
        assert_eq!(dataset.value(1, 1), Some("enalapril"));
        assert_eq!(dataset.value(1, 2), Some("F"));
    }

    #[test]
    fn test_load_sources_mixed_formats() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(&dir, "a.csv", b"Documento;Medicamento\n1;losartan 50 mg\n");
        let second = write_file(
            &dir,
            "b.csv",
            b"Documento,Medicamento\n2,hidroclorotiazida 25 mg c\xE1psula\n",
        );
        let missing = dir.path().join("missing.csv");

        let dataset = load_sources(&[first, missing, second], &LoaderConfig::default()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.sources.len(), 2);
        assert_eq!(dataset.sources[0].delimiter, ';');
        assert_eq!(dataset.sources[0].encoding, TextEncoding::Utf8);
        assert_eq!(dataset.sources[1].delimiter, ',');
        assert_eq!(dataset.sources[1].encoding, TextEncoding::Latin1);
        assert_eq!(dataset.sources[0].sha256.len(), 64);
        assert_eq!(dataset.value(1, 1), Some("hidroclorotiazida 25 mg cápsula"));
    }

    #[test]
    fn test_load_sources_nothing_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let single_column = write_file(&dir, "single.csv", b"only\n1\n2\n");
        let missing = dir.path().join("missing.csv");

        let result = load_sources(&[single_column, missing], &LoaderConfig::default());
        assert!(matches!(result, Err(LoaderError::NoSourcesLoaded)));
    }

    #[test]
    fn test_records_from_dataset() {
        let mut dataset = Dataset::new();
        let headers: Vec<String> = ["Documento", "Nom1PAc", "Nom2Pac", "Apell1Pac", "Medicamento", "Sexo"]
            .into_iter()
            .map(String::from)
            .collect();
        dataset.append(
            &headers,
            vec![vec![
                Some("99".into()),
                Some("Ana".into()),
                None,
                Some("Perez".into()),
                Some("Losartan".into()),
                Some("F".into()),
            ]],
        );

        let columns = ColumnMap::resolve(&dataset.headers, &Default::default()).unwrap();
        let records = dataset.records(&columns);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.patient_id.as_deref(), Some("99"));
        assert_eq!(record.medication.as_deref(), Some("Losartan"));
        assert_eq!(record.demographics.given_names, "Ana");
        assert_eq!(record.demographics.family_names, "Perez");
        assert_eq!(record.demographics.sex.as_deref(), Some("F"));
        assert_eq!(record.demographics.birth_date, None);
        assert_eq!(record.fields.len(), 6);
    }
}
