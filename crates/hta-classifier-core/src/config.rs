//! JSON configuration.
//!
//! Every field has a default, so an empty object (or no file at all) yields
//! the stock column names, delimiters and drug taxonomy.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::matcher::{StopwordSet, TextMatcher};
use crate::models::{DrugEntry, DrugTaxonomy, TaxonomyResult};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub columns: ColumnConfig,
    pub loader: LoaderConfig,
    /// Replacement drug list; the built-in taxonomy when absent
    pub taxonomy: Option<Vec<DrugEntry>>,
    /// Words added to the stopword set
    pub extra_stopwords: Vec<String>,
}

impl Config {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Taxonomy in effect.
    pub fn build_taxonomy(&self) -> TaxonomyResult<DrugTaxonomy> {
        match &self.taxonomy {
            Some(entries) => DrugTaxonomy::from_entries(entries.clone()),
            None => Ok(DrugTaxonomy::new()),
        }
    }

    /// Matcher over the configured taxonomy and stopwords.
    pub fn build_matcher(&self) -> TaxonomyResult<TextMatcher> {
        let taxonomy = self.build_taxonomy()?;
        let stopwords = StopwordSet::new(&taxonomy).with_words(&self.extra_stopwords);
        TextMatcher::new(taxonomy, stopwords)
    }
}

/// Column names and detection hints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColumnConfig {
    /// Exact names tried first for the patient document
    pub document_candidates: Vec<String>,
    /// Lowercase substrings tried next
    pub document_hints: Vec<String>,
    pub medication_candidates: Vec<String>,
    pub medication_hints: Vec<String>,
    /// First and second given name
    pub given_names: Vec<String>,
    /// First and second family name
    pub family_names: Vec<String>,
    pub birth_date: String,
    pub sex: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            document_candidates: strings(&[
                "Documento",
                "documento",
                "DOCUMENTO",
                "NumeroDocumento",
                "NroDocumento",
            ]),
            document_hints: strings(&["doc", "id", "numero"]),
            medication_candidates: strings(&[
                "Medicamento",
                "medicamento",
                "MEDICAMENTO",
                "MedicamentoNombre",
                "NombreMedicamento",
            ]),
            medication_hints: strings(&["medic", "drug", "farma"]),
            given_names: strings(&["Nom1PAc", "Nom2Pac"]),
            family_names: strings(&["Apell1Pac", "Apell2Pac"]),
            birth_date: "Fechnac".to_string(),
            sex: "Sexo".to_string(),
        }
    }
}

/// Input parsing options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    /// Delimiters in the order they are tried
    pub delimiters: Vec<char>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiters: vec![';', ','],
        }
    }
}

impl LoaderConfig {
    /// Single-byte delimiters; others are ignored.
    pub fn delimiter_bytes(&self) -> Vec<u8> {
        self.delimiters
            .iter()
            .filter_map(|&c| match u8::try_from(c) {
                Ok(b) if c.is_ascii() => Some(b),
                _ => {
                    warn!(delimiter = %c, "Ignoring non-ASCII delimiter");
                    None
                }
            })
            .collect()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupId;

    #[test]
    fn test_empty_object_is_default() {
        let config = Config::from_json_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.loader.delimiter_bytes(), vec![b';', b',']);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_json_str(
            r#"{
                "columns": { "medication_candidates": ["Farmaco"] },
                "loader": { "delimiters": ["\t"] },
                "extra_stopwords": ["Pediátrico"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.columns.medication_candidates, vec!["Farmaco"]);
        assert_eq!(config.columns.sex, "Sexo");
        assert_eq!(config.loader.delimiter_bytes(), vec![b'\t']);

        let matcher = config.build_matcher().unwrap();
        assert!(matcher.stopwords().contains("pediatrico"));
    }

    #[test]
    fn test_taxonomy_override() {
        let config = Config::from_json_str(
            r#"{ "taxonomy": [
                { "name": "Bisoprolol", "group": "OTHER_BETA_BLOCKERS" },
                { "name": "losartan", "group": "ARA_II" }
            ] }"#,
        )
        .unwrap();

        let matcher = config.build_matcher().unwrap();
        assert_eq!(matcher.taxonomy().len(), 2);
        assert_eq!(
            matcher.find_groups("bisoprolol 5mg"),
            [GroupId::OtherBetaBlockers].into_iter().collect()
        );
        assert!(matcher.find_groups("enalapril").is_empty());
    }

    #[test]
    fn test_invalid_group_code() {
        let result = Config::from_json_str(r#"{ "taxonomy": [ { "name": "x", "group": "NOPE" } ] }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_json_file("/nonexistent/config.json");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_non_ascii_delimiter_ignored() {
        let loader = LoaderConfig {
            delimiters: vec!['¦', ','],
        };
        assert_eq!(loader.delimiter_bytes(), vec![b',']);
    }
}
