//! Exclusive vs. combined therapy partitions.
//!
//! Two definitions are kept on purpose:
//! - interest vs. excluded: exclusive means "some group of interest and none
//!   of the excluded groups"
//! - per group: exclusive means "exactly this one group"

use std::collections::BTreeSet;

use crate::models::{GroupId, PatientAggregate};

use super::PatientAggregates;

/// Patients split into exclusive and combined therapy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition<'a> {
    pub exclusive: Vec<&'a PatientAggregate>,
    pub combined: Vec<&'a PatientAggregate>,
}

impl<'a> Partition<'a> {
    pub fn exclusive_ids(&self) -> Vec<&'a str> {
        self.exclusive.iter().map(|p| p.patient_id.as_str()).collect()
    }

    pub fn combined_ids(&self) -> Vec<&'a str> {
        self.combined.iter().map(|p| p.patient_id.as_str()).collect()
    }
}

/// Split patients taking any group of `interest`: exclusive when they take
/// none of `excluded`, combined when they take some.
pub fn partition_exclusive_vs_combined<'a>(
    aggregates: &'a PatientAggregates,
    interest: &BTreeSet<GroupId>,
    excluded: &BTreeSet<GroupId>,
) -> Partition<'a> {
    let mut partition = Partition::default();

    for patient in aggregates.iter().filter(|p| p.has_any(interest)) {
        if patient.has_any(excluded) {
            partition.combined.push(patient);
        } else {
            partition.exclusive.push(patient);
        }
    }

    partition
}

/// Split patients taking `target`: exclusive when it is their only group.
pub fn partition_per_group(aggregates: &PatientAggregates, target: GroupId) -> Partition<'_> {
    let mut partition = Partition::default();

    for patient in aggregates.iter().filter(|p| p.has_group(target)) {
        if patient.groups.len() == 1 {
            partition.exclusive.push(patient);
        } else {
            partition.combined.push(patient);
        }
    }

    partition
}

/// Groups whose patients are reported as "of interest".
pub fn interest_groups() -> BTreeSet<GroupId> {
    GroupId::GE.into_iter().collect()
}

/// Every group outside the groups of interest.
pub fn non_interest_groups() -> BTreeSet<GroupId> {
    GroupId::HIERARCHY
        .into_iter()
        .filter(|g| !g.is_ge())
        .collect()
}
