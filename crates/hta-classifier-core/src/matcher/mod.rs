//! Text matcher for medication fields.
//!
//! Pipeline: Normalization → Group Detection → Extra-Drug Detection

mod normalizer;
mod stopwords;

pub use normalizer::*;
pub use stopwords::*;

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{DrugTaxonomy, GroupId, TaxonomyResult};

/// Minimum length of a leftover token to count as a possible drug name.
const MIN_EXTRA_TOKEN_LEN: usize = 4;

/// `+`, `&`, the words "y"/"con", or `/` directly followed by a letter.
const CONNECTOR_PATTERN: &str = r"[+&]|\by\b|\bcon\b|/[a-z]";

/// Groups found in one medication text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    /// Matched groups, in hierarchy order
    pub groups: BTreeSet<GroupId>,
    /// Whether the text likely names a drug outside the taxonomy
    pub has_extra: bool,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Compiled whole-word pattern for one taxonomy entry.
#[derive(Debug, Clone)]
struct NamePattern {
    group: GroupId,
    regex: Regex,
}

/// Whole-word matcher over an immutable taxonomy and stopword set.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    taxonomy: DrugTaxonomy,
    stopwords: StopwordSet,
    names: Vec<NamePattern>,
    connector: Regex,
    token: Regex,
}

impl TextMatcher {
    /// Compile one pattern per taxonomy entry plus the connector and token patterns.
    pub fn new(taxonomy: DrugTaxonomy, stopwords: StopwordSet) -> TaxonomyResult<Self> {
        let names = taxonomy
            .entries()
            .iter()
            .map(|entry| -> TaxonomyResult<NamePattern> {
                Ok(NamePattern {
                    group: entry.group,
                    regex: word_pattern(&entry.name)?,
                })
            })
            .collect::<TaxonomyResult<Vec<_>>>()?;

        Ok(Self {
            taxonomy,
            stopwords,
            names,
            connector: Regex::new(CONNECTOR_PATTERN)?,
            token: Regex::new(&format!("[a-z]{{{},}}", MIN_EXTRA_TOKEN_LEN))?,
        })
    }

    /// Matcher over the default taxonomy and stopwords.
    pub fn with_defaults() -> TaxonomyResult<Self> {
        let taxonomy = DrugTaxonomy::new();
        let stopwords = StopwordSet::new(&taxonomy);
        Self::new(taxonomy, stopwords)
    }

    pub fn taxonomy(&self) -> &DrugTaxonomy {
        &self.taxonomy
    }

    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Analyze a raw medication field.
    ///
    /// The extra-drug flag is only evaluated when at least one group matched.
    pub fn analyze(&self, raw: Option<&str>) -> MatchResult {
        let text = prepare_text(raw);
        let groups = self.groups_in(&text);
        let has_extra = !groups.is_empty() && self.extra_in(&text, &groups);

        MatchResult { groups, has_extra }
    }

    /// Groups whose canonical names occur in `text` as whole words.
    pub fn find_groups(&self, text: &str) -> BTreeSet<GroupId> {
        self.groups_in(&prepare_text(Some(text)))
    }

    /// Whether `text` names something beyond the drugs of `matched`.
    pub fn has_extra_component(&self, text: &str, matched: &BTreeSet<GroupId>) -> bool {
        self.extra_in(&prepare_text(Some(text)), matched)
    }

    /// Whether the text joins several drugs: `+`, `&`, the words "y"/"con", or
    /// `/` directly followed by a letter.
    pub fn has_connector(&self, text: &str) -> bool {
        self.connector.is_match(&prepare_text(Some(text)))
    }

    fn groups_in(&self, text: &str) -> BTreeSet<GroupId> {
        self.names
            .iter()
            .filter(|pattern| pattern.regex.is_match(text))
            .map(|pattern| pattern.group)
            .collect()
    }

    fn extra_in(&self, text: &str, matched: &BTreeSet<GroupId>) -> bool {
        let mut remainder = text.to_string();
        for pattern in self.names.iter().filter(|p| matched.contains(&p.group)) {
            remainder = pattern.regex.replace_all(&remainder, " ").into_owned();
        }

        let leftover = self
            .token
            .find_iter(&remainder)
            .any(|token| !self.stopwords.contains(token.as_str()));

        leftover || self.connector.is_match(text)
    }
}
