//! Pre-retarget validation.
//!
//! Coverage gaps are reported as data. The result is never an error: callers
//! look at `ok` and the issue list and decide whether to run the retargeter.

use std::collections::{BTreeSet, HashSet};

use crate::config::DEFAULT_LOW_CONFIDENCE;
use crate::error::{IssueCode, ValidationIssue};
use crate::mapping::BoneMapping;

/// Outcome of validating a mapping against an animation and a target skeleton.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Fraction of animation bones with a mapping entry.
    pub coverage: f64,
    /// Animation bones with no mapping entry.
    pub unmapped: BTreeSet<String>,
    /// Mapped target bones absent from the target skeleton.
    pub missing_targets: BTreeSet<String>,
    /// True when coverage is complete and no target bone is missing.
    pub ok: bool,
    /// Structural issues and per-bone advisories.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns true if any issue blocks retargeting.
    pub fn has_blocking(&self) -> bool {
        self.issues.iter().any(|i| i.is_blocking())
    }

    /// Issues that block retargeting.
    pub fn blocking(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_blocking())
    }

    /// Advisory issues.
    pub fn advisories(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| !i.is_blocking())
    }
}

/// Checks a mapping before retargeting.
#[derive(Debug, Clone)]
pub struct Validator {
    low_confidence: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            low_confidence: DEFAULT_LOW_CONFIDENCE,
        }
    }
}

impl Validator {
    /// Creates a validator that flags entries below `low_confidence`.
    pub fn new(low_confidence: f64) -> Self {
        Self { low_confidence }
    }

    /// Validates `mapping` for an animation touching `animation_bone_names`,
    /// played on a skeleton with `target_bone_names`.
    pub fn validate<I, J, S, T>(
        &self,
        mapping: &BoneMapping,
        animation_bone_names: I,
        target_bone_names: J,
    ) -> ValidationResult
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let animated: BTreeSet<String> = animation_bone_names
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let targets: HashSet<String> = target_bone_names
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect();

        let mut issues = mapping.check();
        let mut unmapped = BTreeSet::new();
        let mut missing_targets = BTreeSet::new();

        for bone in &animated {
            match mapping.get(bone) {
                None => {
                    issues.push(ValidationIssue::for_bone(
                        IssueCode::UnmappedBone,
                        format!("animated bone '{}' has no mapping", bone),
                        bone,
                    ));
                    unmapped.insert(bone.clone());
                }
                Some(entry) if !targets.contains(&entry.target_bone) => {
                    if missing_targets.insert(entry.target_bone.clone()) {
                        issues.push(ValidationIssue::for_bone(
                            IssueCode::MissingTargetBone,
                            format!(
                                "'{}' maps to '{}', which the target skeleton lacks",
                                bone, entry.target_bone
                            ),
                            &entry.target_bone,
                        ));
                    }
                }
                Some(_) => {}
            }
        }

        for entry in mapping.entries() {
            if entry.confidence < self.low_confidence {
                issues.push(ValidationIssue::for_bone(
                    IssueCode::LowConfidence,
                    format!(
                        "'{}' -> '{}' has confidence {:.2}",
                        entry.source_bone, entry.target_bone, entry.confidence
                    ),
                    &entry.source_bone,
                ));
            }
        }

        let coverage = mapping.coverage(&animated);
        let ok = coverage == 1.0 && missing_targets.is_empty();
        ValidationResult {
            coverage,
            unmapped,
            missing_targets,
            ok,
            issues,
        }
    }
}

/// Validates with the default low-confidence threshold.
pub fn validate<I, J, S, T>(
    mapping: &BoneMapping,
    animation_bone_names: I,
    target_bone_names: J,
) -> ValidationResult
where
    I: IntoIterator<Item = S>,
    J: IntoIterator<Item = T>,
    S: AsRef<str>,
    T: AsRef<str>,
{
    Validator::default().validate(mapping, animation_bone_names, target_bone_names)
}
