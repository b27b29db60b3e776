//! HTA Classifier Core Library
//!
//! Classifies free-text medication records from clinical exports by
//! antihypertensive drug class, per row and per patient.
//!
//! # Architecture
//!
//! ```text
//! CSV exports (UTF-8 / Latin-1, ';' or ',')
//!              │
//!        Column Resolution
//!              │
//!      Medication Records
//!              │
//!     ┌────────┴─────────┐
//!     ▼                  ▼
//! Text Matcher      Text Matcher (groups only)
//!     │                  │
//! Label Builder     Patient Aggregator
//!     │                  │
//! Record Report     Partitions → Patient Report
//!  (CSV)             (CSV sections + JSON)
//! ```
//!
//! # Modules
//!
//! - [`models`]: Drug taxonomy, records and patient aggregates
//! - [`matcher`]: Normalization, whole-word matching, extra-drug detection
//! - [`classify`]: Per-record labels
//! - [`aggregate`]: Per-patient group sets, partitions and the patient report
//! - [`io`]: Input loading and column resolution
//! - [`export`]: CSV/JSON report writers
//! - [`config`]: JSON configuration

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod export;
pub mod io;
pub mod matcher;
pub mod models;

use std::path::Path;

pub use aggregate::{PatientAggregates, PatientAggregator, PatientReport, SectionKind};
pub use classify::{RecordClassification, RecordClassifier};
pub use config::Config;
pub use io::{ColumnMap, Dataset, SourceInfo};
pub use matcher::{MatchResult, TextMatcher};
pub use models::{DrugTaxonomy, GroupId, MedicationRecord, PatientAggregate};

use tracing::info;

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error(transparent)]
    Taxonomy(#[from] models::TaxonomyError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Loader(#[from] io::LoaderError),

    #[error(transparent)]
    Columns(#[from] io::ColumnError),

    #[error(transparent)]
    Report(#[from] export::ReportError),
}

pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// Loaded inputs with their resolved columns and records.
#[derive(Debug, Clone)]
pub struct LoadedInput {
    pub dataset: Dataset,
    pub columns: ColumnMap,
    pub records: Vec<MedicationRecord>,
}

/// Entry point tying configuration, loading and both pipelines together.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: Config,
    matcher: TextMatcher,
}

impl Classifier {
    pub fn new(config: Config) -> ClassifierResult<Self> {
        let matcher = config.build_matcher()?;
        Ok(Self { config, matcher })
    }

    /// Classifier over the default configuration and taxonomy.
    pub fn with_defaults() -> ClassifierResult<Self> {
        Self::new(Config::default())
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        Self::new(Config::from_json_file(path)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn matcher(&self) -> &TextMatcher {
        &self.matcher
    }

    /// Groups and extra flag for one medication text.
    pub fn analyze(&self, text: &str) -> MatchResult {
        self.matcher.analyze(Some(text))
    }

    /// Categorization label for one medication text.
    pub fn label(&self, text: &str) -> String {
        classify::label_for(&self.analyze(text))
    }

    /// Load inputs and resolve their columns.
    pub fn load<P: AsRef<Path>>(&self, paths: &[P]) -> ClassifierResult<LoadedInput> {
        let dataset = io::load_sources(paths, &self.config.loader)?;
        let columns = ColumnMap::resolve(&dataset.headers, &self.config.columns)?;
        let records = dataset.records(&columns);
        info!(
            sources = dataset.sources.len(),
            records = records.len(),
            "Input ready"
        );
        Ok(LoadedInput {
            dataset,
            columns,
            records,
        })
    }

    /// Per-record pipeline.
    pub fn classify_records(&self, records: &[MedicationRecord]) -> RecordClassification {
        RecordClassifier::new(&self.matcher).classify_all(records)
    }

    /// Per-patient pipeline.
    pub fn aggregate_patients(&self, records: &[MedicationRecord]) -> PatientAggregates {
        aggregate::aggregate(&self.matcher, records)
    }
}
