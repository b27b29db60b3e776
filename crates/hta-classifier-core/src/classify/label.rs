//! Categorization label construction.
//!
//! Rules:
//! - No group: `NO_APLICA`
//! - One group: `"<name> univ"` / `"<name>-X univ"`
//! - Several groups: names in hierarchy order joined by `" && "`, with the GE
//!   groups collapsed into one leading segment, plus `" - X"` when extra

use std::collections::BTreeSet;

use crate::matcher::MatchResult;
use crate::models::GroupId;

/// Label for a record without any antihypertensive match.
pub const NOT_APPLICABLE: &str = "NO_APLICA";

/// Separator between segments of a composite label.
pub const SEGMENT_SEPARATOR: &str = " && ";

/// Segment used when both GE groups are present.
pub const GE_MERGED: &str = "GE Hidro-Meto";

/// Build the label for a match result.
pub fn label_for(result: &MatchResult) -> String {
    build_label(result.groups.iter().copied(), result.has_extra)
}

/// Build the label for a set of groups, in any order.
pub fn build_label(groups: impl IntoIterator<Item = GroupId>, has_extra: bool) -> String {
    let ordered: BTreeSet<GroupId> = groups.into_iter().collect();

    match ordered.len() {
        0 => NOT_APPLICABLE.to_string(),
        1 => {
            let name = ordered
                .iter()
                .next()
                .map(|g| g.display_name())
                .unwrap_or_default();
            if has_extra {
                format!("{}-X univ", name)
            } else {
                format!("{} univ", name)
            }
        }
        _ => {
            let base = composite_segments(&ordered).join(SEGMENT_SEPARATOR);
            if has_extra {
                format!("{} - X", base)
            } else {
                base
            }
        }
    }
}

/// Segments of a multi-group label, highest rank first.
pub fn composite_segments(groups: &BTreeSet<GroupId>) -> Vec<&'static str> {
    let ge_segment = match (
        groups.contains(&GroupId::GeMetoprolol),
        groups.contains(&GroupId::GeHydrochlorothiazide),
    ) {
        (true, true) => Some(GE_MERGED),
        (true, false) => GroupId::GeMetoprolol.short_name(),
        (false, true) => GroupId::GeHydrochlorothiazide.short_name(),
        (false, false) => None,
    };

    ge_segment
        .into_iter()
        .chain(
            groups
                .iter()
                .filter(|g| !g.is_ge())
                .map(|g| g.display_name()),
        )
        .collect()
}
