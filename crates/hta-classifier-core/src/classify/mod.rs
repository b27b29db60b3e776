//! Per-record classification.
//!
//! Pipeline: Medication Text → Text Matcher → Label Builder → Classified Row
//!
//! Rows without any antihypertensive match are dropped from the output.

mod label;

pub use label::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::matcher::{MatchResult, TextMatcher};
use crate::models::MedicationRecord;

/// Name of the derived output column.
pub const CATEGORIZATION_COLUMN: &str = "Categorización";

/// A record that matched at least one group, with its label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifiedRecord {
    /// The source row
    pub record: MedicationRecord,
    /// Matched groups and extra-drug flag
    pub result: MatchResult,
    /// Categorization label
    pub label: String,
}

/// Number of rows carrying one label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

/// Output of the per-record pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordClassification {
    /// Rows read
    pub total_rows: usize,
    /// Rows that matched, in input order
    pub records: Vec<ClassifiedRecord>,
    /// Label counts, most frequent first
    pub summary: Vec<LabelCount>,
}

impl RecordClassification {
    /// Export the summary to JSON.
    pub fn summary_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.summary)
    }
}

/// Classifier for individual records.
pub struct RecordClassifier<'a> {
    matcher: &'a TextMatcher,
}

impl<'a> RecordClassifier<'a> {
    pub fn new(matcher: &'a TextMatcher) -> Self {
        Self { matcher }
    }

    /// Label for a raw medication field (`NO_APLICA` when nothing matched).
    pub fn label(&self, medication: Option<&str>) -> String {
        label_for(&self.matcher.analyze(medication))
    }

    /// Classify one record; `None` when it matches no group.
    pub fn classify(&self, record: &MedicationRecord) -> Option<ClassifiedRecord> {
        let result = self.matcher.analyze(record.medication.as_deref());
        if result.is_empty() {
            return None;
        }

        Some(ClassifiedRecord {
            label: label_for(&result),
            result,
            record: record.clone(),
        })
    }

    /// Classify every record, keeping only those of interest.
    pub fn classify_all(&self, records: &[MedicationRecord]) -> RecordClassification {
        info!(rows = records.len(), "Classifying records individually");

        let classified: Vec<ClassifiedRecord> =
            records.iter().filter_map(|r| self.classify(r)).collect();

        debug!(
            matched = classified.len(),
            dropped = records.len() - classified.len(),
            "Record classification finished"
        );
        info!(matched = classified.len(), "Records with medications of interest");

        let summary = summarize(&classified);
        for entry in &summary {
            info!(label = %entry.label, count = entry.count, "Label count");
        }

        RecordClassification {
            total_rows: records.len(),
            summary,
            records: classified,
        }
    }
}

/// Count labels, most frequent first; ties broken by label.
pub fn summarize(records: &[ClassifiedRecord]) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.label.as_str()).or_default() += 1;
    }

    let mut summary: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    summary.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    summary
}
