//! Drug taxonomy models.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::{fold_accents, normalize_text};

/// Antihypertensive drug class.
///
/// Declaration order is the group hierarchy used to order composite labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupId {
    #[serde(rename = "GE_METOPROLOL")]
    GeMetoprolol,
    #[serde(rename = "GE_HYDROCHLOROTHIAZIDE")]
    GeHydrochlorothiazide,
    #[serde(rename = "ARA_II")]
    AraII,
    #[serde(rename = "IECA")]
    Ieca,
    #[serde(rename = "CALCIUM_ANTAGONISTS")]
    CalciumAntagonists,
    #[serde(rename = "OTHER_DIURETICS")]
    OtherDiuretics,
    #[serde(rename = "OTHER_BETA_BLOCKERS")]
    OtherBetaBlockers,
    #[serde(rename = "OTHER_ANTIHYPERTENSIVES")]
    OtherAntihypertensives,
}

impl GroupId {
    /// Every group, highest rank first.
    pub const HIERARCHY: [GroupId; 8] = [
        GroupId::GeMetoprolol,
        GroupId::GeHydrochlorothiazide,
        GroupId::AraII,
        GroupId::Ieca,
        GroupId::CalciumAntagonists,
        GroupId::OtherDiuretics,
        GroupId::OtherBetaBlockers,
        GroupId::OtherAntihypertensives,
    ];

    /// The two specially abbreviated groups.
    pub const GE: [GroupId; 2] = [GroupId::GeMetoprolol, GroupId::GeHydrochlorothiazide];

    /// Position in the hierarchy (0 = highest).
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Stable identifier used in report section names.
    pub fn code(self) -> &'static str {
        match self {
            GroupId::GeMetoprolol => "GE_METOPROLOL",
            GroupId::GeHydrochlorothiazide => "GE_HYDROCHLOROTHIAZIDE",
            GroupId::AraII => "ARA_II",
            GroupId::Ieca => "IECA",
            GroupId::CalciumAntagonists => "CALCIUM_ANTAGONISTS",
            GroupId::OtherDiuretics => "OTHER_DIURETICS",
            GroupId::OtherBetaBlockers => "OTHER_BETA_BLOCKERS",
            GroupId::OtherAntihypertensives => "OTHER_ANTIHYPERTENSIVES",
        }
    }

    /// Name used inside categorization labels.
    pub fn display_name(self) -> &'static str {
        match self {
            GroupId::GeMetoprolol => "GE metoprolol",
            GroupId::GeHydrochlorothiazide => "GE Hidroclorotiazida",
            GroupId::AraII => "ARA II",
            GroupId::Ieca => "IECA",
            GroupId::CalciumAntagonists => "Calcioantagonistas",
            GroupId::OtherDiuretics => "Otros diuréticos",
            GroupId::OtherBetaBlockers => "Otros Beta-Bloqueadores",
            GroupId::OtherAntihypertensives => "Otros Anti-Hipertensivos",
        }
    }

    /// Abbreviation used when a GE group shares a composite label.
    pub fn short_name(self) -> Option<&'static str> {
        match self {
            GroupId::GeMetoprolol => Some("GE Meto"),
            GroupId::GeHydrochlorothiazide => Some("GE Hidro"),
            _ => None,
        }
    }

    pub fn is_ge(self) -> bool {
        matches!(self, GroupId::GeMetoprolol | GroupId::GeHydrochlorothiazide)
    }

    /// Parse a group code (e.g. `"ARA_II"`), case-insensitively.
    pub fn from_code(code: &str) -> Option<GroupId> {
        let code = code.trim();
        Self::HIERARCHY
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Taxonomy construction errors.
#[derive(Error, Debug, PartialEq)]
pub enum TaxonomyError {
    #[error("Duplicate drug name: {0}")]
    DuplicateName(String),

    #[error("Empty drug name for group {0}")]
    EmptyName(GroupId),

    #[error("Invalid match pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// A canonical drug name and the class it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrugEntry {
    /// Canonical (generic) drug name
    pub name: String,
    /// Drug class
    pub group: GroupId,
}

impl DrugEntry {
    pub fn new(name: impl Into<String>, group: GroupId) -> Self {
        Self {
            name: name.into(),
            group,
        }
    }
}

/// Ordered, immutable drug name → class dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugTaxonomy {
    entries: Vec<DrugEntry>,
}

impl Default for DrugTaxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl DrugTaxonomy {
    /// Create the taxonomy with the default antihypertensive dictionary.
    pub fn new() -> Self {
        Self {
            entries: Self::default_entries(),
        }
    }

    /// Build a taxonomy from custom entries.
    ///
    /// Names are lower-cased, trimmed and accent-folded; they must be non-empty
    /// and unique after that normalization.
    pub fn from_entries(entries: Vec<DrugEntry>) -> TaxonomyResult<Self> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = fold_accents(&normalize_text(Some(&entry.name)));
            if name.is_empty() {
                return Err(TaxonomyError::EmptyName(entry.group));
            }
            if !seen.insert(name.clone()) {
                return Err(TaxonomyError::DuplicateName(name));
            }
            normalized.push(DrugEntry::new(name, entry.group));
        }

        Ok(Self {
            entries: normalized,
        })
    }

    pub fn entries(&self) -> &[DrugEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical names belonging to a group, in dictionary order.
    pub fn names_for(&self, group: GroupId) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.group == group)
            .map(|e| e.name.as_str())
    }

    /// Look up the group of a canonical name.
    pub fn group_of(&self, name: &str) -> Option<GroupId> {
        let key = fold_accents(&normalize_text(Some(name)));
        self.entries.iter().find(|e| e.name == key).map(|e| e.group)
    }

    /// Default antihypertensive dictionary.
    fn default_entries() -> Vec<DrugEntry> {
        use GroupId::*;

        let table: &[(&str, GroupId)] = &[
            // GE groups
            ("metoprolol", GeMetoprolol),
            ("propranolol", GeMetoprolol),
            ("propanolol", GeMetoprolol),
            ("hidroclorotiazida", GeHydrochlorothiazide),
            // ARA II
            ("irbesartan", AraII),
            ("valsartan", AraII),
            ("olmesartan", AraII),
            ("telmisartan", AraII),
            ("losartan", AraII),
            // IECA
            ("enalapril", Ieca),
            ("captopril", Ieca),
            ("perindopril", Ieca),
            // Calcium antagonists
            ("amlodipino", CalciumAntagonists),
            ("nifedipino", CalciumAntagonists),
            ("verapamilo", CalciumAntagonists),
            // Other diuretics
            ("espironolactona", OtherDiuretics),
            ("furosemida", OtherDiuretics),
            ("indapamida", OtherDiuretics),
            ("clortalidona", OtherDiuretics),
            // Other beta blockers
            ("bisoprolol", OtherBetaBlockers),
            ("carvedilol", OtherBetaBlockers),
            ("nebivolol", OtherBetaBlockers),
            // Other antihypertensives
            ("minoxidil", OtherAntihypertensives),
            ("prazosina", OtherAntihypertensives),
            ("clonidina", OtherAntihypertensives),
        ];

        table
            .iter()
            .map(|(name, group)| DrugEntry::new(*name, *group))
            .collect()
    }
}
