//! Map highlight membership.
//!
//! The selector only decides which ZIP codes belong to the emphasized set;
//! how emphasis is drawn belongs to the map renderer.

use indexmap::IndexSet;
use serde::Serialize;

use crate::data::ZipCode;
use crate::source::SimilarityIndex;

/// Visual treatment a renderer should apply to one feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FeatureStyle {
    Included,
    Excluded,
}

/// ZIP codes to emphasize: the selection first, then its similar ZIP codes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HighlightSet {
    members: IndexSet<ZipCode>,
}

impl HighlightSet {
    /// No selection.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, zip_code: &str) -> bool {
        self.members.contains(zip_code)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// The selected ZIP code, if any.
    pub fn selected(&self) -> Option<&str> {
        self.members.first().map(String::as_str)
    }

    /// Members in emphasis order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.members.iter().map(String::as_str)
    }

    /// Style for a feature. Without a selection nothing is suppressed.
    pub fn style_for(&self, zip_code: &str) -> FeatureStyle {
        if self.members.is_empty() || self.members.contains(zip_code) {
            FeatureStyle::Included
        } else {
            FeatureStyle::Excluded
        }
    }

    /// Members the renderer has no feature for.
    pub fn missing_from<'a, I>(&self, known: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let known: IndexSet<&str> = known.into_iter().collect();
        self.iter().filter(|zip| !known.contains(zip)).collect()
    }
}

/// Highlight set for a selected ZIP code.
///
/// A ZIP code without a similarity entry yields a singleton set containing
/// only the selection.
pub fn compute_highlight(selected_zip: &str, index: &SimilarityIndex) -> HighlightSet {
    let mut members = IndexSet::new();
    members.insert(selected_zip.to_string());
    for similar in index.similar_zip_codes(selected_zip) {
        members.insert(similar.to_string());
    }
    HighlightSet { members }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SimilarZip, SimilarityEntry};

    fn index() -> SimilarityIndex {
        SimilarityIndex::from_entries([SimilarityEntry {
            zip_code: "12180".into(),
            count: 4,
            similar_zips: vec![
                SimilarZip {
                    zip_code: "12207".into(),
                    population: Some(98000.0),
                    median_income: None,
                    similarity_score: 2.0,
                },
                SimilarZip {
                    zip_code: "12180".into(),
                    population: None,
                    median_income: None,
                    similarity_score: 1.0,
                },
            ],
        }])
    }

    #[test]
    fn selection_plus_similar_zips_deduplicated() {
        let set = compute_highlight("12180", &index());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["12180", "12207"]);
        assert_eq!(set.selected(), Some("12180"));
    }

    #[test]
    fn missing_entry_yields_selection_alone() {
        let set = compute_highlight("99999", &index());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["99999"]);
        let empty = compute_highlight("12180", &SimilarityIndex::empty());
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn styles_follow_membership() {
        let set = compute_highlight("12180", &index());
        assert_eq!(set.style_for("12207"), FeatureStyle::Included);
        assert_eq!(set.style_for("10001"), FeatureStyle::Excluded);
        assert_eq!(
            HighlightSet::empty().style_for("10001"),
            FeatureStyle::Included
        );
    }

    #[test]
    fn missing_from_reports_unknown_features() {
        let set = compute_highlight("12180", &index());
        assert_eq!(set.missing_from(["12180", "10001"]), vec!["12207"]);
    }
}
