//! Confidence scoring between two normalized bone names.
//!
//! Scores come from an ordered rule cascade; the first rule that applies
//! decides the score:
//!
//! | Rule | Condition | Score |
//! |------|-----------|-------|
//! | exact | original names byte-identical | 1.0 |
//! | case-insensitive | original names equal ignoring case | 0.95 |
//! | base name | base names equal, sides equal or one is center | 0.90 |
//! | alias | base names in one alias group, sides compatible | 0.88 |
//! | fuzzy | normalized Levenshtein similarity of base names | at most 0.85 |
//!
//! A fuzzy score is halved when the two sides are defined and opposite.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::NamingConventions;
use crate::normalize::{BoneDescriptor, Side};

/// Score for byte-identical names.
pub const EXACT_SCORE: f64 = 1.0;
/// Score for names equal ignoring case.
pub const CASE_INSENSITIVE_SCORE: f64 = 0.95;
/// Score for identical base names on compatible sides.
pub const BASE_NAME_SCORE: f64 = 0.90;
/// Score for alias-equivalent base names on compatible sides.
pub const ALIAS_SCORE: f64 = 0.88;
/// Upper bound for edit-distance scores.
pub const FUZZY_CAP: f64 = 0.85;
/// Multiplier applied to fuzzy scores of opposite-side pairs.
pub const SIDE_CONFLICT_FACTOR: f64 = 0.5;

/// The cascade rule that produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Byte-identical names.
    Exact,
    /// Equal ignoring case.
    CaseInsensitive,
    /// Equal base names.
    BaseName,
    /// Base names in the same alias group.
    Alias,
    /// Edit-distance similarity.
    Fuzzy,
}

impl MatchRule {
    /// Returns the rule name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRule::Exact => "exact",
            MatchRule::CaseInsensitive => "case_insensitive",
            MatchRule::BaseName => "base_name",
            MatchRule::Alias => "alias",
            MatchRule::Fuzzy => "fuzzy",
        }
    }
}

impl std::fmt::Display for MatchRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookup from folded base name to alias group.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    groups: HashMap<String, usize>,
}

impl AliasTable {
    /// Builds the table from alias groups. Names are folded the same way base
    /// names are (lowercase alphanumerics). A name listed in two groups keeps
    /// the first.
    pub fn new(groups: &[Vec<String>]) -> Self {
        let mut table = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for name in group {
                let folded: String = name
                    .to_lowercase()
                    .chars()
                    .filter(|c| c.is_alphanumeric())
                    .collect();
                if !folded.is_empty() {
                    table.entry(folded).or_insert(idx);
                }
            }
        }
        Self { groups: table }
    }

    /// Returns true if both base names belong to the same alias group.
    pub fn equivalent(&self, a: &str, b: &str) -> bool {
        match (self.groups.get(a), self.groups.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Scores pairs of bone descriptors.
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    aliases: AliasTable,
}

fn sides_compatible(a: Side, b: Side) -> bool {
    a == b || a == Side::Center || b == Side::Center
}

impl SimilarityScorer {
    /// Creates a scorer using the alias groups from the conventions.
    pub fn new(conventions: &NamingConventions) -> Self {
        Self {
            aliases: AliasTable::new(&conventions.aliases),
        }
    }

    /// Creates a scorer without alias groups.
    pub fn without_aliases() -> Self {
        Self::default()
    }

    /// Confidence in [0, 1] that `a` and `b` name the same bone.
    pub fn score(&self, a: &BoneDescriptor, b: &BoneDescriptor) -> f64 {
        self.explain(a, b).0
    }

    /// Returns the score together with the rule that produced it.
    pub fn explain(&self, a: &BoneDescriptor, b: &BoneDescriptor) -> (f64, MatchRule) {
        if a.original_name == b.original_name {
            return (EXACT_SCORE, MatchRule::Exact);
        }

        if a.original_name.to_lowercase() == b.original_name.to_lowercase() {
            return (CASE_INSENSITIVE_SCORE, MatchRule::CaseInsensitive);
        }

        let compatible = sides_compatible(a.side, b.side);
        if compatible && a.base_name == b.base_name {
            return (BASE_NAME_SCORE, MatchRule::BaseName);
        }

        if compatible && self.aliases.equivalent(&a.base_name, &b.base_name) {
            return (ALIAS_SCORE, MatchRule::Alias);
        }

        let mut similarity =
            strsim::normalized_levenshtein(&a.base_name, &b.base_name).clamp(0.0, 1.0);
        if a.side.conflicts_with(b.side) {
            similarity *= SIDE_CONFLICT_FACTOR;
        }
        (similarity.min(FUZZY_CAP), MatchRule::Fuzzy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn score(a: &str, b: &str) -> f64 {
        SimilarityScorer::new(&NamingConventions::default()).score(&normalize(a), &normalize(b))
    }

    fn rule(a: &str, b: &str) -> MatchRule {
        SimilarityScorer::new(&NamingConventions::default())
            .explain(&normalize(a), &normalize(b))
            .1
    }

    #[test]
    fn test_exact() {
        assert_eq!(score("mixamorig:Hips", "mixamorig:Hips"), 1.0);
        assert_eq!(rule("Hips", "Hips"), MatchRule::Exact);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("Hips", "hips"), 0.95);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(score("mixamorig:Spine", "DEF-spine"), 0.90);
        assert_eq!(score("hand_l", "mixamorig:LeftHand"), 0.90);
        // Center on one side still counts.
        assert_eq!(score("Head", "head.L"), 0.90);
    }

    #[test]
    fn test_alias() {
        assert_eq!(score("ns:Hips", "Root"), ALIAS_SCORE);
        assert_eq!(score("ns:LeftArm", "UpperArm.L"), ALIAS_SCORE);
        assert_eq!(rule("mixamorig:RightForeArm", "lowerarm_r"), MatchRule::Alias);
    }

    #[test]
    fn test_alias_requires_compatible_sides() {
        assert_eq!(rule("ns:LeftArm", "UpperArm.R"), MatchRule::Fuzzy);
        assert!(score("ns:LeftArm", "UpperArm.R") < 0.5);
    }

    #[test]
    fn test_side_conflict_penalty() {
        // Identical base, opposite sides: similarity 1.0 halved.
        assert_eq!(score("Arm.L", "Arm.R"), 0.5);
    }

    #[test]
    fn test_fuzzy_capped() {
        let s = score("Spine1", "Spine01");
        assert!(s <= FUZZY_CAP);
        assert!(s > 0.7, "got {}", s);
    }

    #[test]
    fn test_unrelated_names_score_low() {
        assert!(score("Hips", "Index_03_L") < 0.3);
    }

    #[test]
    fn test_without_aliases() {
        let scorer = SimilarityScorer::without_aliases();
        let s = scorer.score(&normalize("Hips"), &normalize("Root"));
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_alias_table_folding() {
        let table = AliasTable::new(&[vec!["Upper_Arm".to_string(), "arm".to_string()]]);
        assert!(table.equivalent("upperarm", "arm"));
        assert!(!table.equivalent("upperarm", "hand"));
    }
}
