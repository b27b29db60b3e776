//! Per-patient aggregation.
//!
//! Pipeline: Records → Group Union per Patient → Partitions → Patient Report

mod partition;
mod report;

pub use partition::*;
pub use report::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::matcher::TextMatcher;
use crate::models::{MedicationRecord, PatientAggregate};

/// Finalized aggregation: every patient with at least one matched group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientAggregates {
    /// Patients in first-seen order
    pub patients: Vec<PatientAggregate>,
    /// Rows read
    pub total_rows: usize,
    /// Rows without a patient identifier
    pub skipped_rows: usize,
}

impl PatientAggregates {
    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn get(&self, patient_id: &str) -> Option<&PatientAggregate> {
        self.patients.iter().find(|p| p.patient_id == patient_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatientAggregate> {
        self.patients.iter()
    }
}

/// Incremental accumulator of group sets per patient.
pub struct PatientAggregator<'a> {
    matcher: &'a TextMatcher,
    patients: Vec<PatientAggregate>,
    index: HashMap<String, usize>,
    total_rows: usize,
    skipped_rows: usize,
}

impl<'a> PatientAggregator<'a> {
    pub fn new(matcher: &'a TextMatcher) -> Self {
        Self {
            matcher,
            patients: Vec::new(),
            index: HashMap::new(),
            total_rows: 0,
            skipped_rows: 0,
        }
    }

    /// Fold one record into its patient's group set.
    ///
    /// The first record of a patient fixes their demographics.
    pub fn add(&mut self, record: &MedicationRecord) {
        self.total_rows += 1;

        let Some(patient_id) = record.patient_key() else {
            self.skipped_rows += 1;
            return;
        };

        let slot = self.slot(patient_id, record);
        let groups = self
            .matcher
            .find_groups(record.medication.as_deref().unwrap_or_default());
        self.patients[slot].groups.extend(groups);
    }

    pub fn extend<'r>(&mut self, records: impl IntoIterator<Item = &'r MedicationRecord>) {
        for record in records {
            self.add(record);
        }
    }

    /// Merge a partial aggregation built over other records.
    ///
    /// Group sets are unioned; demographics already held here win.
    pub fn merge(&mut self, other: PatientAggregator<'_>) {
        self.total_rows += other.total_rows;
        self.skipped_rows += other.skipped_rows;

        for patient in other.patients {
            match self.index.get(&patient.patient_id) {
                Some(&slot) => self.patients[slot].groups.extend(patient.groups),
                None => {
                    self.index
                        .insert(patient.patient_id.clone(), self.patients.len());
                    self.patients.push(patient);
                }
            }
        }
    }

    /// Drop patients without any matched group and return the result.
    pub fn finish(self) -> PatientAggregates {
        if self.skipped_rows > 0 {
            warn!(
                rows = self.skipped_rows,
                "Skipped rows without a patient identifier"
            );
        }

        let seen = self.patients.len();
        let patients: Vec<PatientAggregate> = self
            .patients
            .into_iter()
            .filter(|p| !p.groups.is_empty())
            .collect();

        info!(
            rows = self.total_rows,
            seen,
            with_matches = patients.len(),
            "Aggregated patients"
        );

        PatientAggregates {
            patients,
            total_rows: self.total_rows,
            skipped_rows: self.skipped_rows,
        }
    }

    fn slot(&mut self, patient_id: &str, record: &MedicationRecord) -> usize {
        if let Some(&slot) = self.index.get(patient_id) {
            return slot;
        }

        let slot = self.patients.len();
        self.patients.push(PatientAggregate::new(
            patient_id.to_string(),
            record.demographics.clone(),
        ));
        self.index.insert(patient_id.to_string(), slot);
        slot
    }
}

/// Aggregate a full record set.
pub fn aggregate(matcher: &TextMatcher, records: &[MedicationRecord]) -> PatientAggregates {
    let mut aggregator = PatientAggregator::new(matcher);
    aggregator.extend(records);
    aggregator.finish()
}
