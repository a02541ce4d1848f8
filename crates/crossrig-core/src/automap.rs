//! Auto-mapping between two bone name sets.
//!
//! The mapper keeps every manual entry of an existing mapping, scores all
//! remaining source/target pairs, and then commits pairs greedily from the
//! highest score down. A pair is committed only when neither bone has been
//! consumed yet, so the result is injective in both directions.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{check_threshold, AutoMapConfig};
use crate::error::Result;
use crate::mapping::{BoneMapping, MappingEntry, MappingOrigin};
use crate::normalize::{BoneDescriptor, NameNormalizer};
use crate::similarity::{MatchRule, SimilarityScorer};

/// Default number of suggestions returned by [`AutoMapper::suggest`].
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// A candidate target for one source bone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Candidate target bone.
    pub target_bone: String,
    /// Confidence score.
    pub score: f64,
    /// Rule that produced the score.
    pub rule: MatchRule,
}

#[derive(Debug)]
struct Candidate<'a> {
    source: &'a str,
    target: &'a str,
    score: f64,
}

/// Highest score first, then source name, then target name.
fn rank(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.source.cmp(b.source))
        .then_with(|| a.target.cmp(b.target))
}

/// Proposes mappings from name similarity.
#[derive(Debug, Clone)]
pub struct AutoMapper {
    threshold: f64,
    normalizer: NameNormalizer,
    scorer: SimilarityScorer,
}

impl AutoMapper {
    /// Creates a mapper, rejecting thresholds outside [0, 1].
    pub fn new(config: &AutoMapConfig) -> Result<Self> {
        Ok(Self {
            threshold: check_threshold(config.threshold)?,
            normalizer: NameNormalizer::new(&config.conventions),
            scorer: SimilarityScorer::new(&config.conventions),
        })
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Normalizes a bone name with this mapper's conventions.
    pub fn describe(&self, name: &str) -> BoneDescriptor {
        self.normalizer.normalize(name)
    }

    /// Scores two raw bone names.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.scorer.score(&self.describe(a), &self.describe(b))
    }

    /// Builds a new mapping from `existing`.
    ///
    /// Manual entries are carried over unchanged and their bones are withheld
    /// from matching. Automatic entries are discarded and recomputed.
    pub fn auto_map<I, J, S, T>(
        &self,
        source_names: I,
        target_names: J,
        existing: &BoneMapping,
    ) -> Result<BoneMapping>
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut mapping = existing.empty_like();
        let mut taken_sources = BTreeSet::new();
        let mut taken_targets = BTreeSet::new();

        for entry in existing.entries().iter().filter(|e| e.origin == MappingOrigin::Manual) {
            taken_sources.insert(entry.source_bone.clone());
            taken_targets.insert(entry.target_bone.clone());
            mapping.push_entry(entry.clone());
        }

        let sources: BTreeSet<String> = source_names
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| !taken_sources.contains(s))
            .collect();
        let targets: BTreeSet<String> = target_names
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .filter(|t| !taken_targets.contains(t))
            .collect();

        let source_desc: Vec<BoneDescriptor> = sources.iter().map(|s| self.describe(s)).collect();
        let target_desc: Vec<BoneDescriptor> = targets.iter().map(|t| self.describe(t)).collect();

        let mut candidates = Vec::new();
        for s in &source_desc {
            for t in &target_desc {
                let score = self.scorer.score(s, t);
                if score >= self.threshold {
                    candidates.push(Candidate {
                        source: &s.original_name,
                        target: &t.original_name,
                        score,
                    });
                }
            }
        }
        candidates.sort_by(rank);

        let mut used_sources = BTreeSet::new();
        let mut used_targets = BTreeSet::new();
        let mut committed = 0usize;
        for candidate in &candidates {
            if used_sources.contains(candidate.source) || used_targets.contains(candidate.target) {
                continue;
            }
            used_sources.insert(candidate.source);
            used_targets.insert(candidate.target);
            debug!(
                source = candidate.source,
                target = candidate.target,
                score = candidate.score,
                "auto-mapped bone"
            );
            mapping.push_entry(MappingEntry::auto(
                candidate.source,
                candidate.target,
                candidate.score,
            ));
            committed += 1;
        }

        info!(
            mapping = %mapping.name,
            manual = mapping.manual_count(),
            auto = committed,
            unmapped = sources.len() - committed,
            threshold = self.threshold,
            "auto-map complete"
        );
        Ok(mapping)
    }

    /// Best-scoring targets for one source bone, at or above the threshold.
    pub fn suggest<J, T>(&self, source_bone: &str, target_names: J, limit: usize) -> Vec<Suggestion>
    where
        J: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let source = self.describe(source_bone);
        let targets: BTreeSet<String> = target_names
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect();

        let mut suggestions: Vec<Suggestion> = targets
            .into_iter()
            .filter_map(|target| {
                let (score, rule) = self.scorer.explain(&source, &self.describe(&target));
                (score >= self.threshold).then_some(Suggestion {
                    target_bone: target,
                    score,
                    rule,
                })
            })
            .collect();

        suggestions.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.target_bone.cmp(&b.target_bone))
        });
        suggestions.truncate(limit);
        suggestions
    }
}

/// Runs the auto-mapper with default conventions and the given threshold.
pub fn auto_map<I, J, S, T>(
    source_names: I,
    target_names: J,
    existing: &BoneMapping,
    threshold: f64,
) -> Result<BoneMapping>
where
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    AutoMapper::new(&AutoMapConfig::with_threshold(threshold))?.auto_map(
        source_names,
        target_names,
        existing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MappingError;

    fn empty() -> BoneMapping {
        BoneMapping::new("test", "src", "dst")
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let err = AutoMapper::new(&AutoMapConfig::with_threshold(1.5)).unwrap_err();
        assert!(matches!(err, MappingError::InvalidThreshold(_)));
        assert!(auto_map(["a"], ["a"], &empty(), -0.01).is_err());
    }

    #[test]
    fn test_exact_match_full_confidence() {
        let m = auto_map(["Hips", "Spine"], ["Spine", "Hips"], &empty(), 0.7).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("Hips").map(|e| e.confidence), Some(1.0));
        assert_eq!(m.get("Spine").map(|e| e.target_bone.as_str()), Some("Spine"));
    }

    #[test]
    fn test_empty_pools() {
        let none: [&str; 0] = [];
        assert!(auto_map(none, ["Hips"], &empty(), 0.7).unwrap().is_empty());
        assert!(auto_map(["Hips"], none, &empty(), 0.7).unwrap().is_empty());
    }

    #[test]
    fn test_greedy_prefers_higher_score() {
        // "Hand.L" scores 0.90 against both targets; the exact pair is taken first.
        let m = auto_map(["Hand", "Hand.L"], ["Hand", "hand_l"], &empty(), 0.7).unwrap();
        assert_eq!(m.target_for("Hand"), Some("Hand"));
        assert_eq!(m.target_for("Hand.L"), Some("hand_l"));
    }

    #[test]
    fn test_tie_breaks_on_source_name() {
        // Both sources score 0.90 against the only target; "Hand.L" sorts first.
        let m = auto_map(["hand_l", "Hand.L"], ["HAND-L"], &empty(), 0.7).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.target_for("Hand.L"), Some("HAND-L"));
        assert!(m.get("hand_l").is_none());
    }

    #[test]
    fn test_manual_entries_survive() {
        let mut existing = empty();
        existing
            .add_or_replace(MappingEntry::manual("Hips", "Spine"))
            .unwrap();
        existing
            .add_or_replace(MappingEntry::auto("Head", "Neck", 0.75))
            .unwrap();

        let m = auto_map(["Hips", "Spine", "Head"], ["Hips", "Spine", "Head"], &existing, 0.7)
            .unwrap();
        assert_eq!(m.get("Hips"), Some(&MappingEntry::manual("Hips", "Spine")));
        // "Spine" is consumed as a target, so the source "Spine" cannot take it.
        assert_ne!(m.target_for("Spine"), Some("Spine"));
        assert_eq!(m.target_for("Head"), Some("Head"));
        assert!(m.check().is_empty());
    }

    #[test]
    fn test_keeps_existing_metadata() {
        let existing = empty().with_description("kept");
        let m = auto_map(["a"], ["a"], &existing, 0.7).unwrap();
        assert_eq!(m.name, "test");
        assert_eq!(m.description, "kept");
        assert_eq!(m.created_at, existing.created_at);
    }

    #[test]
    fn test_suggest_sorted_and_limited() {
        let mapper = AutoMapper::new(&AutoMapConfig::default()).unwrap();
        let targets = ["Hand.L", "Wrist.L", "Hand.R", "Foot.L", "hand_l"];
        let suggestions = mapper.suggest("mixamorig:LeftHand", targets, 2);

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].target_bone, "Hand.L");
        assert_eq!(suggestions[1].target_bone, "hand_l");
        assert!(suggestions.iter().all(|s| s.score >= 0.7));
    }

    #[test]
    fn test_suggest_excludes_below_threshold() {
        let mapper = AutoMapper::new(&AutoMapConfig::default()).unwrap();
        assert!(mapper.suggest("Arm.L", ["Arm.R"], 5).is_empty());
    }
}
