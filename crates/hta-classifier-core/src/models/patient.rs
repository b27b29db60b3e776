//! Patient aggregate models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Demographics, GroupId};

/// Every drug class seen for one patient across all of their records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientAggregate {
    /// Patient identifier
    pub patient_id: String,
    /// Demographics from the first record of this patient
    pub demographics: Demographics,
    /// Union of matched groups, in hierarchy order
    pub groups: BTreeSet<GroupId>,
}

impl PatientAggregate {
    pub fn new(patient_id: String, demographics: Demographics) -> Self {
        Self {
            patient_id,
            demographics,
            groups: BTreeSet::new(),
        }
    }

    pub fn has_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }

    /// Whether any of `groups` was seen for this patient.
    pub fn has_any(&self, groups: &BTreeSet<GroupId>) -> bool {
        !self.groups.is_disjoint(groups)
    }

    /// Display names of the patient's groups, comma-separated.
    pub fn medication_summary(&self) -> String {
        self.groups
            .iter()
            .map(|g| g.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
