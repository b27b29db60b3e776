//! Patient report: named sections of patients plus a summary count table.

use serde::{Deserialize, Serialize};

use crate::models::{GroupId, PatientAggregate};

use super::{
    interest_groups, non_interest_groups, partition_exclusive_vs_combined, partition_per_group,
    PatientAggregates,
};

/// Label for the groups of interest, as shown in reports.
pub const INTEREST_LABEL: &str = "Metoprolol/Propranolol/Hidroclorotiazida";

/// Maximum section name length (spreadsheet sheet name limit).
pub const MAX_SECTION_NAME_LEN: usize = 31;

/// What a report section holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "group", rename_all = "snake_case")]
pub enum SectionKind {
    ExclusiveOfInterest,
    CombinedOfInterest,
    GroupExclusive(GroupId),
    GroupCombined(GroupId),
}

impl SectionKind {
    /// Section name, truncated to the sheet name limit.
    pub fn section_name(self) -> String {
        let name = match self {
            SectionKind::ExclusiveOfInterest => "Exclusivos_Interes".to_string(),
            SectionKind::CombinedOfInterest => "Combinados_Interes".to_string(),
            SectionKind::GroupExclusive(g) => format!("Excl_{}", g.code()),
            SectionKind::GroupCombined(g) => format!("Comb_{}", g.code()),
        };
        name.chars().take(MAX_SECTION_NAME_LEN).collect()
    }

    /// Header of the trailing column: a fixed label or the medication set.
    pub fn detail_column(self) -> &'static str {
        match self {
            SectionKind::ExclusiveOfInterest | SectionKind::GroupExclusive(_) => "Grupo",
            SectionKind::CombinedOfInterest | SectionKind::GroupCombined(_) => "Medicamentos",
        }
    }

    /// Summary table category.
    pub fn summary_category(self) -> String {
        match self {
            SectionKind::ExclusiveOfInterest => format!("Pacientes {} EXCLUSIVO", INTEREST_LABEL),
            SectionKind::CombinedOfInterest => format!("Pacientes {} COMBINADO", INTEREST_LABEL),
            SectionKind::GroupExclusive(g) => format!("Pacientes {} EXCLUSIVO", g.code()),
            SectionKind::GroupCombined(g) => format!("Pacientes {} COMBINADO", g.code()),
        }
    }

    fn detail_for(self, patient: &PatientAggregate) -> String {
        match self {
            SectionKind::ExclusiveOfInterest => format!("{} EXCLUSIVO", INTEREST_LABEL),
            SectionKind::GroupExclusive(g) => format!("{} EXCLUSIVO", g.code()),
            SectionKind::CombinedOfInterest | SectionKind::GroupCombined(_) => {
                patient.medication_summary()
            }
        }
    }
}

/// One patient line in a section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRow {
    pub document: String,
    pub given_names: String,
    pub family_names: String,
    pub birth_date: Option<String>,
    pub sex: Option<String>,
    /// Exclusive label or medication set, per the section kind
    pub detail: String,
}

impl PatientRow {
    fn new(kind: SectionKind, patient: &PatientAggregate) -> Self {
        Self {
            document: patient.patient_id.clone(),
            given_names: patient.demographics.given_names.clone(),
            family_names: patient.demographics.family_names.clone(),
            birth_date: patient.demographics.birth_date.clone(),
            sex: patient.demographics.sex.clone(),
            detail: kind.detail_for(patient),
        }
    }
}

/// A named list of patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSection {
    pub name: String,
    pub kind: SectionKind,
    pub rows: Vec<PatientRow>,
}

impl ReportSection {
    fn new(kind: SectionKind, patients: &[&PatientAggregate]) -> Self {
        Self {
            name: kind.section_name(),
            kind,
            rows: patients.iter().map(|p| PatientRow::new(kind, p)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One line of the summary table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryEntry {
    pub category: String,
    pub count: usize,
}

/// Complete patient report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientReport {
    /// Sections in output order (empty ones included)
    pub sections: Vec<ReportSection>,
    /// Category → count table
    pub summary: Vec<SummaryEntry>,
}

impl PatientReport {
    /// Build every section and the summary from finalized aggregates.
    pub fn build(aggregates: &PatientAggregates) -> Self {
        let interest = partition_exclusive_vs_combined(
            aggregates,
            &interest_groups(),
            &non_interest_groups(),
        );

        let mut sections = vec![
            ReportSection::new(SectionKind::ExclusiveOfInterest, &interest.exclusive),
            ReportSection::new(SectionKind::CombinedOfInterest, &interest.combined),
        ];

        let per_group: Vec<_> = non_interest_groups()
            .into_iter()
            .map(|g| (g, partition_per_group(aggregates, g)))
            .collect();

        sections.extend(
            per_group
                .iter()
                .map(|(g, p)| ReportSection::new(SectionKind::GroupExclusive(*g), &p.exclusive)),
        );
        sections.extend(
            per_group
                .iter()
                .map(|(g, p)| ReportSection::new(SectionKind::GroupCombined(*g), &p.combined)),
        );

        let mut summary = vec![SummaryEntry {
            category: "Total pacientes únicos".to_string(),
            count: aggregates.len(),
        }];
        summary.extend(sections.iter().map(|s| SummaryEntry {
            category: s.kind.summary_category(),
            count: s.rows.len(),
        }));

        Self { sections, summary }
    }

    pub fn section(&self, kind: SectionKind) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// Count for a summary category.
    pub fn count(&self, category: &str) -> Option<usize> {
        self.summary
            .iter()
            .find(|e| e.category == category)
            .map(|e| e.count)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::matcher::TextMatcher;
    use crate::models::{Demographics, MedicationRecord};

    fn sample() -> PatientAggregates {
        let matcher = TextMatcher::with_defaults().unwrap();
        let ana = Demographics {
            given_names: "Ana Maria".into(),
            family_names: "Perez Gomez".into(),
            birth_date: Some("1950-02-01".into()),
            sex: Some("F".into()),
        };
        let records = vec![
            MedicationRecord::new("10", "metoprolol 50 mg").with_demographics(ana),
            MedicationRecord::new("20", "propranolol 40mg"),
            MedicationRecord::new("20", "losartan 50mg"),
            MedicationRecord::new("30", "losartan 100mg"),
            MedicationRecord::new("40", "enalapril 20mg"),
            MedicationRecord::new("40", "furosemida 40mg"),
            MedicationRecord::new("50", "paracetamol"),
        ];
        aggregate(&matcher, &records)
    }

    #[test]
    fn test_interest_sections() {
        let report = PatientReport::build(&sample());

        let exclusive = report.section(SectionKind::ExclusiveOfInterest).unwrap();
        assert_eq!(exclusive.name, "Exclusivos_Interes");
        assert_eq!(exclusive.rows.len(), 1);
        assert_eq!(exclusive.rows[0].document, "10");
        assert_eq!(exclusive.rows[0].given_names, "Ana Maria");
        assert_eq!(
            exclusive.rows[0].detail,
            "Metoprolol/Propranolol/Hidroclorotiazida EXCLUSIVO"
        );

        let combined = report.section(SectionKind::CombinedOfInterest).unwrap();
        assert_eq!(combined.rows.len(), 1);
        assert_eq!(combined.rows[0].document, "20");
        assert_eq!(combined.rows[0].detail, "GE metoprolol, ARA II");
    }

    #[test]
    fn test_group_sections() {
        let report = PatientReport::build(&sample());

        let ara_excl = report.section(SectionKind::GroupExclusive(GroupId::AraII)).unwrap();
        assert_eq!(ara_excl.name, "Excl_ARA_II");
        assert_eq!(ara_excl.rows[0].document, "30");
        assert_eq!(ara_excl.rows[0].detail, "ARA_II EXCLUSIVO");

        let ara_comb = report.section(SectionKind::GroupCombined(GroupId::AraII)).unwrap();
        assert_eq!(ara_comb.rows.len(), 1);
        assert_eq!(ara_comb.rows[0].document, "20");

        let ieca_comb = report.section(SectionKind::GroupCombined(GroupId::Ieca)).unwrap();
        assert_eq!(ieca_comb.rows[0].detail, "IECA, Otros diuréticos");

        // 2 interest sections + 6 exclusive + 6 combined
        assert_eq!(report.sections.len(), 14);
    }

    #[test]
    fn test_summary() {
        let report = PatientReport::build(&sample());

        assert_eq!(report.summary.len(), 15);
        assert_eq!(report.summary[0].category, "Total pacientes únicos");
        assert_eq!(report.count("Total pacientes únicos"), Some(4));
        assert_eq!(
            report.count("Pacientes Metoprolol/Propranolol/Hidroclorotiazida EXCLUSIVO"),
            Some(1)
        );
        assert_eq!(report.count("Pacientes ARA_II EXCLUSIVO"), Some(1));
        assert_eq!(report.count("Pacientes ARA_II COMBINADO"), Some(1));
        assert_eq!(report.count("Pacientes OTHER_DIURETICS COMBINADO"), Some(1));
        assert_eq!(report.count("Pacientes CALCIUM_ANTAGONISTS EXCLUSIVO"), Some(0));
    }

    #[test]
    fn test_section_names_fit_limit() {
        for group in GroupId::HIERARCHY {
            assert!(SectionKind::GroupCombined(group).section_name().chars().count() <= 31);
            assert!(SectionKind::GroupExclusive(group).section_name().chars().count() <= 31);
        }
    }

    #[test]
    fn test_empty_report() {
        let report = PatientReport::build(&PatientAggregates::default());
        assert!(report.sections.iter().all(|s| s.is_empty()));
        assert!(report.summary.iter().all(|e| e.count == 0));
    }

    #[test]
    fn test_report_json() {
        let report = PatientReport::build(&sample());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"kind\": \"group_exclusive\""));
        assert!(json.contains("ARA_II"));
    }
}
