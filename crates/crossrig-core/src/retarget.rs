//! Animation retargeting.
//!
//! Retargeting is a renaming transform: every channel whose source bone maps to
//! a bone present in the target skeleton is copied with its bone name
//! rewritten. Keyframes pass through unchanged, including data this crate does
//! not model such as bezier handles. Channels that cannot be placed are dropped
//! and listed in the [`TransferReport`].

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::animation::Animation;
use crate::error::Result;
use crate::mapping::BoneMapping;

/// Why a channel was not transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The source bone has no mapping entry.
    Unmapped,
    /// The mapped target bone is not in the target skeleton.
    TargetBoneMissing,
}

impl DropReason {
    /// Returns the reason as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Unmapped => "unmapped",
            DropReason::TargetBoneMissing => "target_bone_missing",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A channel left out of the retargeted animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedChannel {
    /// Source bone of the channel.
    pub source_bone: String,
    /// Property path of the channel.
    pub property_path: String,
    /// Mapped target bone, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_bone: Option<String>,
    /// Why it was dropped.
    pub reason: DropReason,
}

/// Outcome of a retarget run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    /// Channels written to the output.
    pub mapped_channel_count: usize,
    /// Channels dropped, in source order.
    pub dropped_channels: Vec<DroppedChannel>,
}

impl TransferReport {
    /// Number of dropped channels.
    pub fn dropped_count(&self) -> usize {
        self.dropped_channels.len()
    }

    /// Returns true if nothing was dropped.
    pub fn is_complete(&self) -> bool {
        self.dropped_channels.is_empty()
    }

    /// Dropped source bones with their reason, one entry per bone.
    pub fn dropped_bones(&self) -> BTreeMap<&str, DropReason> {
        self.dropped_channels
            .iter()
            .map(|d| (d.source_bone.as_str(), d.reason))
            .collect()
    }

    /// Dropped source bones for one reason.
    pub fn bones_with_reason(&self, reason: DropReason) -> Vec<&str> {
        let mut bones: Vec<&str> = self
            .dropped_channels
            .iter()
            .filter(|d| d.reason == reason)
            .map(|d| d.source_bone.as_str())
            .collect();
        bones.dedup();
        bones
    }
}

/// Applies a bone mapping to animations.
#[derive(Debug, Clone, Default)]
pub struct Retargeter {
    output_name: Option<String>,
}

impl Retargeter {
    /// Creates a retargeter that names output `{animation}_{mapping}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a retargeter with a fixed output name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            output_name: Some(name.into()),
        }
    }

    /// Retargets `animation` through `mapping` onto a skeleton with the given bones.
    ///
    /// The input is never modified. Fails only if the animation has two
    /// channels for the same bone and property.
    pub fn apply<I, S>(
        &self,
        animation: &Animation,
        mapping: &BoneMapping,
        target_bone_names: I,
    ) -> Result<(Animation, TransferReport)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        animation.check_unique_channels()?;

        let targets: HashSet<String> = target_bone_names
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();

        let name = self
            .output_name
            .clone()
            .unwrap_or_else(|| format!("{}_{}", animation.name, mapping.name));
        let mut output = Animation {
            name,
            description: animation.description.clone(),
            source_armature: animation.source_armature.clone(),
            source_action: animation.source_action.clone(),
            frame_range: animation.frame_range,
            channels: Vec::with_capacity(animation.channels.len()),
        };
        let mut report = TransferReport::default();

        for channel in &animation.channels {
            let dropped = match mapping.target_for(&channel.bone_name) {
                None => Some((None, DropReason::Unmapped)),
                Some(target) if !targets.contains(target) => {
                    Some((Some(target.to_string()), DropReason::TargetBoneMissing))
                }
                Some(target) => {
                    output.channels.push(channel.renamed(target));
                    None
                }
            };

            if let Some((target_bone, reason)) = dropped {
                debug!(
                    bone = %channel.bone_name,
                    property = %channel.property_path,
                    %reason,
                    "dropped channel"
                );
                report.dropped_channels.push(DroppedChannel {
                    source_bone: channel.bone_name.clone(),
                    property_path: channel.property_path.clone(),
                    target_bone,
                    reason,
                });
            }
        }

        report.mapped_channel_count = output.channels.len();
        info!(
            animation = %animation.name,
            output = %output.name,
            mapped = report.mapped_channel_count,
            dropped = report.dropped_count(),
            "retarget complete"
        );
        Ok((output, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationChannel, Keyframe};
    use crate::error::MappingError;
    use crate::mapping::MappingEntry;
    use pretty_assertions::assert_eq;

    fn channel(bone: &str, property: &str) -> AnimationChannel {
        AnimationChannel::new(bone, property, vec![Keyframe::new(1.0, [0.5, 0.25])])
    }

    fn mapping() -> BoneMapping {
        let mut m = BoneMapping::new("to_rig", "src", "rig");
        m.add_or_replace(MappingEntry::manual("A", "a")).unwrap();
        m.add_or_replace(MappingEntry::auto("B", "b", 0.9)).unwrap();
        m
    }

    #[test]
    fn test_full_transfer() {
        let anim = Animation::new("walk")
            .with_frame_range(1.0, 30.0)
            .with_channel(channel("A", "location"))
            .with_channel(channel("B", "rotation_quaternion"));

        let (out, report) = Retargeter::new().apply(&anim, &mapping(), ["a", "b"]).unwrap();
        assert_eq!(out.name, "walk_to_rig");
        assert_eq!(out.frame_range, anim.frame_range);
        assert_eq!(out.channels.len(), 2);
        assert_eq!(out.channels[0].bone_name, "a");
        assert_eq!(out.channels[1].keyframes, anim.channels[1].keyframes);
        assert!(report.is_complete());
        assert_eq!(report.mapped_channel_count, 2);
    }

    #[test]
    fn test_partial_transfer() {
        let anim = Animation::new("walk")
            .with_channel(channel("A", "location"))
            .with_channel(channel("B", "location"))
            .with_channel(channel("C", "location"));

        let (out, report) = Retargeter::new().apply(&anim, &mapping(), ["a"]).unwrap();
        assert_eq!(out.channels.len(), 1);
        assert_eq!(out.channels[0].bone_name, "a");

        let expected: BTreeMap<&str, DropReason> = [
            ("B", DropReason::TargetBoneMissing),
            ("C", DropReason::Unmapped),
        ]
        .into_iter()
        .collect();
        assert_eq!(report.dropped_bones(), expected);
        assert_eq!(report.dropped_channels[0].target_bone.as_deref(), Some("b"));
        assert_eq!(report.bones_with_reason(DropReason::Unmapped), vec!["C"]);
    }

    #[test]
    fn test_duplicate_channel_aborts() {
        let anim = Animation::new("walk")
            .with_channel(channel("A", "location"))
            .with_channel(channel("A", "location"));
        let err = Retargeter::new().apply(&anim, &mapping(), ["a"]).unwrap_err();
        assert!(matches!(err, MappingError::DuplicateChannel { .. }));
    }

    #[test]
    fn test_custom_name_and_input_untouched() {
        let anim = Animation::new("walk").with_channel(channel("A", "location"));
        let before = anim.clone();
        let (out, _) = Retargeter::with_name("walk_rig")
            .apply(&anim, &mapping(), ["a"])
            .unwrap();
        assert_eq!(out.name, "walk_rig");
        assert_eq!(anim, before);
    }

    #[test]
    fn test_bezier_handles_and_metadata_carried() {
        let anim = Animation::from_json(
            r#"{"name": "walk", "source_armature": "Armature", "source_action": "Walk_Action",
                "channels": [{"bone_name": "A", "property_path": "location",
                  "keyframes": [{"time": 1, "value": [0.5],
                                 "handle_left": [0.0, 0.4], "handle_right": [2.0, 0.6],
                                 "handle_left_type": "VECTOR", "handle_right_type": "FREE"}]}]}"#,
        )
        .unwrap();

        let (out, report) = Retargeter::new().apply(&anim, &mapping(), ["a"]).unwrap();
        assert!(report.is_complete());
        assert_eq!(out.channels[0].bone_name, "a");
        assert_eq!(out.channels[0].keyframes, anim.channels[0].keyframes);
        assert_eq!(out.source_armature, "Armature");
        assert_eq!(out.source_action, "Walk_Action");

        let written: serde_json::Value = serde_json::from_str(&out.to_json_pretty().unwrap()).unwrap();
        let key = &written["channels"][0]["keyframes"][0];
        assert_eq!(key["handle_left"], serde_json::json!([0.0, 0.4]));
        assert_eq!(key["handle_right"], serde_json::json!([2.0, 0.6]));
        assert_eq!(key["handle_left_type"], "VECTOR");
        assert_eq!(key["handle_right_type"], "FREE");
    }

    #[test]
    fn test_empty_animation() {
        let (out, report) = Retargeter::new()
            .apply(&Animation::new("empty"), &mapping(), Vec::<String>::new())
            .unwrap();
        assert!(out.channels.is_empty());
        assert_eq!(report, TransferReport::default());
    }
}
