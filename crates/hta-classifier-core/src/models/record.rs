//! Medication record models.

use serde::{Deserialize, Serialize};

/// Demographic snapshot of a patient, as found on one input row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Demographics {
    /// Given name(s), space-joined
    pub given_names: String,
    /// Family name(s), space-joined
    pub family_names: String,
    /// Birth date as written in the source
    pub birth_date: Option<String>,
    /// Sex as written in the source
    pub sex: Option<String>,
}

impl Demographics {
    /// Join the non-empty parts of a multi-column name.
    pub fn join_names<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
        parts
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One input row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MedicationRecord {
    /// Patient identifier (document number)
    pub patient_id: Option<String>,
    /// Free-text medication field
    pub medication: Option<String>,
    /// Demographic fields found on this row
    pub demographics: Demographics,
    /// Every field of the row, aligned with the dataset header
    pub fields: Vec<Option<String>>,
}

impl MedicationRecord {
    /// Create a record with just the fields the classifier reads.
    pub fn new(patient_id: impl Into<String>, medication: impl Into<String>) -> Self {
        Self {
            patient_id: Some(patient_id.into()),
            medication: Some(medication.into()),
            ..Default::default()
        }
    }

    /// Attach a demographic snapshot.
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }

    /// Trimmed patient identifier, if present and non-empty.
    pub fn patient_key(&self) -> Option<&str> {
        self.patient_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
