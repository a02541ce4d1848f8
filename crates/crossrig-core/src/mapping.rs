//! Bone mapping aggregate.
//!
//! A [`BoneMapping`] is an injective partial correspondence from source bone
//! names to target bone names. Each source bone appears in at most one entry
//! and each target bone is the destination of at most one entry. Every
//! mutation goes through methods that keep both directions injective.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{IssueCode, MappingError, Result, ValidationIssue};

/// Current mapping document version.
pub const MAPPING_VERSION: &str = "1.0";

/// How an entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingOrigin {
    /// Proposed by the auto-mapper.
    Auto,
    /// Assigned explicitly by a user.
    Manual,
}

impl MappingOrigin {
    /// Returns the origin as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingOrigin::Auto => "auto",
            MappingOrigin::Manual => "manual",
        }
    }
}

impl std::fmt::Display for MappingOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single source-to-target assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Bone name in the source skeleton.
    pub source_bone: String,
    /// Bone name in the target skeleton.
    pub target_bone: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Whether the entry was auto-mapped or assigned by hand.
    pub origin: MappingOrigin,
}

impl MappingEntry {
    /// Creates an auto-mapped entry.
    pub fn auto(source: impl Into<String>, target: impl Into<String>, confidence: f64) -> Self {
        Self {
            source_bone: source.into(),
            target_bone: target.into(),
            confidence,
            origin: MappingOrigin::Auto,
        }
    }

    /// Creates a manual entry with full confidence.
    pub fn manual(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source_bone: source.into(),
            target_bone: target.into(),
            confidence: 1.0,
            origin: MappingOrigin::Manual,
        }
    }

    /// Sets the confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Returns true for manual entries.
    pub fn is_manual(&self) -> bool {
        self.origin == MappingOrigin::Manual
    }
}

/// A named mapping between two skeletons.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneMapping {
    /// Mapping name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Identifier of the source skeleton.
    pub source_skeleton_id: String,
    /// Identifier of the target skeleton.
    pub target_skeleton_id: String,
    /// Document version tag.
    pub version: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    entries: Vec<MappingEntry>,
}

impl BoneMapping {
    /// Creates an empty mapping between two skeletons.
    pub fn new(
        name: impl Into<String>,
        source_skeleton_id: impl Into<String>,
        target_skeleton_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            source_skeleton_id: source_skeleton_id.into(),
            target_skeleton_id: target_skeleton_id.into(),
            version: MAPPING_VERSION.to_string(),
            created_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Returns a copy of the metadata with no entries.
    pub fn empty_like(&self) -> Self {
        Self {
            entries: Vec::new(),
            ..self.clone()
        }
    }

    /// Inserts an entry, replacing any entry for the same source bone and
    /// evicting any other entry that uses the same target bone.
    ///
    /// Returns the entries that were replaced or evicted. A manual entry always
    /// succeeds; an automatic entry fails with [`MappingError::ProtectedEntry`]
    /// if it would displace a manual one.
    pub fn add_or_replace(&mut self, entry: MappingEntry) -> Result<Vec<MappingEntry>> {
        if !(0.0..=1.0).contains(&entry.confidence) {
            return Err(MappingError::InvalidConfidence {
                source_bone: entry.source_bone,
                confidence: entry.confidence,
            });
        }

        if !entry.is_manual() {
            let blocked = self.entries.iter().find(|e| {
                e.is_manual() && (e.source_bone == entry.source_bone || e.target_bone == entry.target_bone)
            });
            if let Some(manual) = blocked {
                return Err(MappingError::ProtectedEntry {
                    source_bone: manual.source_bone.clone(),
                });
            }
        }

        let mut displaced = Vec::new();
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.target_bone == entry.target_bone && e.source_bone != entry.source_bone)
        {
            displaced.push(self.entries.remove(pos));
        }

        match self.entries.iter().position(|e| e.source_bone == entry.source_bone) {
            Some(pos) => displaced.push(std::mem::replace(&mut self.entries[pos], entry)),
            None => self.entries.push(entry),
        }
        Ok(displaced)
    }

    /// Removes the entry for a source bone.
    pub fn remove(&mut self, source_bone: &str) -> Option<MappingEntry> {
        let pos = self.entries.iter().position(|e| e.source_bone == source_bone)?;
        Some(self.entries.remove(pos))
    }

    /// Removes all entries, or only those of one origin. Returns how many were removed.
    pub fn clear(&mut self, origin: Option<MappingOrigin>) -> usize {
        let before = self.entries.len();
        match origin {
            Some(origin) => self.entries.retain(|e| e.origin != origin),
            None => self.entries.clear(),
        }
        before - self.entries.len()
    }

    /// Returns the entry for a source bone.
    pub fn get(&self, source_bone: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.source_bone == source_bone)
    }

    /// Returns the entry whose target is the given bone.
    pub fn find_by_target(&self, target_bone: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.target_bone == target_bone)
    }

    /// Returns the target bone for a source bone.
    pub fn target_for(&self, source_bone: &str) -> Option<&str> {
        self.get(source_bone).map(|e| e.target_bone.as_str())
    }

    /// Fraction of the given (distinct) source names that have an entry.
    /// An empty set is fully covered.
    pub fn coverage<I, S>(&self, source_names: I) -> f64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: HashSet<String> = source_names
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        if names.is_empty() {
            return 1.0;
        }
        let mapped = names.iter().filter(|n| self.get(n).is_some()).count();
        mapped as f64 / names.len() as f64
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of auto-mapped entries.
    pub fn auto_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_manual()).count()
    }

    /// Number of manual entries.
    pub fn manual_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_manual()).count()
    }

    /// Source names without an entry, in input order.
    pub fn unmapped_sources<'a, I>(&self, source_names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        source_names
            .into_iter()
            .filter(|n| self.get(n).is_none())
            .collect()
    }

    /// Target names no entry points at, in input order.
    pub fn unmapped_targets<'a, I>(&self, target_names: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        target_names
            .into_iter()
            .filter(|n| self.find_by_target(n).is_none())
            .collect()
    }

    /// Compares the entry sets of two mappings, ignoring order.
    pub fn same_entries(&self, other: &BoneMapping) -> bool {
        if self.entries.len() != other.entries.len() {
            return false;
        }
        self.entries
            .iter()
            .all(|e| other.get(&e.source_bone) == Some(e))
    }

    /// Order-independent BLAKE3 digest of the entry set (hex).
    pub fn fingerprint(&self) -> String {
        let mut sorted: Vec<&MappingEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.source_bone.cmp(&b.source_bone));

        let mut hasher = blake3::Hasher::new();
        for entry in sorted {
            hasher.update(entry.source_bone.as_bytes());
            hasher.update(&[0]);
            hasher.update(entry.target_bone.as_bytes());
            hasher.update(&[0]);
            hasher.update(&entry.confidence.to_bits().to_le_bytes());
            hasher.update(entry.origin.as_str().as_bytes());
            hasher.update(&[0xff]);
        }
        hasher.finalize().to_hex().to_string()
    }

    /// Structural checks: names, skeleton ids, confidences, injectivity.
    pub fn check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::new(IssueCode::EmptyName, "mapping name is empty"));
        }
        if self.source_skeleton_id.trim().is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::EmptySkeletonId,
                "source skeleton id is empty",
            ));
        }
        if self.target_skeleton_id.trim().is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::EmptySkeletonId,
                "target skeleton id is empty",
            ));
        }

        let mut sources = HashSet::new();
        let mut targets = HashSet::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.source_bone.trim().is_empty() || entry.target_bone.trim().is_empty() {
                issues.push(ValidationIssue::new(
                    IssueCode::EmptyName,
                    format!("entries[{}] has an empty bone name", i),
                ));
            }
            if !(0.0..=1.0).contains(&entry.confidence) {
                issues.push(ValidationIssue::for_bone(
                    IssueCode::ConfidenceOutOfRange,
                    format!(
                        "confidence {} for '{}' is outside [0, 1]",
                        entry.confidence, entry.source_bone
                    ),
                    &entry.source_bone,
                ));
            }
            if !sources.insert(entry.source_bone.as_str()) {
                issues.push(ValidationIssue::for_bone(
                    IssueCode::DuplicateSource,
                    format!("source bone '{}' is mapped more than once", entry.source_bone),
                    &entry.source_bone,
                ));
            }
            if !targets.insert(entry.target_bone.as_str()) {
                issues.push(ValidationIssue::for_bone(
                    IssueCode::DuplicateTarget,
                    format!("target bone '{}' is used more than once", entry.target_bone),
                    &entry.target_bone,
                ));
            }
        }

        issues
    }

    /// Human-readable multi-line summary.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Mapping: {}", self.name),
            format!("Source: {}", self.source_skeleton_id),
            format!("Target: {}", self.target_skeleton_id),
            format!("Mappings: {}", self.len()),
        ];
        if self.auto_count() > 0 {
            lines.push(format!("Auto-mapped: {}", self.auto_count()));
        }
        if self.manual_count() > 0 {
            lines.push(format!("Manual: {}", self.manual_count()));
        }
        if !self.description.is_empty() {
            lines.push(format!("Description: {}", self.description));
        }
        lines.join("\n")
    }

    /// Appends an entry without the replacement rules. Callers check invariants first.
    pub(crate) fn push_entry(&mut self, entry: MappingEntry) {
        self.entries.push(entry);
    }
}
