//! Animation data model.
//!
//! An animation is a list of channels, each keyed by `(bone_name,
//! property_path)` and holding an ordered keyframe sequence. Values are opaque
//! tuples; nothing here interprets them as rotations or positions. Fields this
//! crate does not model (bezier handles, curve modifiers) are kept in `extra`
//! and written back unchanged.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{IssueCode, MappingError, Result, ValidationIssue};

/// Keyframe interpolation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Hold the value until the next key.
    Constant,
    /// Straight line to the next key.
    Linear,
    /// Curve to the next key.
    #[default]
    Bezier,
}

/// Behavior of a channel outside its keyed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Hold the first/last value.
    #[default]
    Constant,
    /// Continue the slope of the first/last segment.
    Linear,
}

fn is_default_extrapolation(e: &Extrapolation) -> bool {
    *e == Extrapolation::Constant
}

/// A single key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Key time (frame number).
    pub time: f64,
    /// Value tuple.
    pub value: Vec<f64>,
    /// Interpolation toward the next key.
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Unmodeled fields such as `handle_left` / `handle_right`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyframe {
    /// Creates a bezier keyframe.
    pub fn new(time: f64, value: impl Into<Vec<f64>>) -> Self {
        Self {
            time,
            value: value.into(),
            interpolation: Interpolation::default(),
            extra: Map::new(),
        }
    }

    /// Sets the interpolation.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }
}

/// Keyframes for one property of one bone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationChannel {
    /// Animated bone.
    pub bone_name: String,
    /// Animated property (e.g. `rotation_quaternion`).
    pub property_path: String,
    /// Keys in time order.
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    /// Extrapolation outside the keyed range.
    #[serde(default, skip_serializing_if = "is_default_extrapolation")]
    pub extrapolation: Extrapolation,
    /// Unmodeled fields such as curve modifiers.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnimationChannel {
    /// Creates a channel.
    pub fn new(
        bone_name: impl Into<String>,
        property_path: impl Into<String>,
        keyframes: Vec<Keyframe>,
    ) -> Self {
        Self {
            bone_name: bone_name.into(),
            property_path: property_path.into(),
            keyframes,
            extrapolation: Extrapolation::default(),
            extra: Map::new(),
        }
    }

    /// Sets the extrapolation.
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Copy of this channel bound to another bone. Keys and extra data are kept as-is.
    pub fn renamed(&self, bone_name: impl Into<String>) -> Self {
        Self {
            bone_name: bone_name.into(),
            ..self.clone()
        }
    }
}

/// Inclusive frame range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRange {
    /// First frame.
    pub start: f64,
    /// Last frame.
    pub end: f64,
}

impl FrameRange {
    /// A range is usable when it ends after it starts.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}

/// A named animation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Animation (action) name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Skeleton the animation was captured from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_armature: String,
    /// Action the animation was captured from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_action: String,
    /// Playback range, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_range: Option<FrameRange>,
    /// Channels in order.
    #[serde(default)]
    pub channels: Vec<AnimationChannel>,
}

impl Animation {
    /// Creates an empty animation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            source_armature: String::new(),
            source_action: String::new(),
            frame_range: None,
            channels: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Records where the animation was captured from.
    pub fn with_source(mut self, armature: impl Into<String>, action: impl Into<String>) -> Self {
        self.source_armature = armature.into();
        self.source_action = action.into();
        self
    }

    /// Sets the frame range.
    pub fn with_frame_range(mut self, start: f64, end: f64) -> Self {
        self.frame_range = Some(FrameRange { start, end });
        self
    }

    /// Appends a channel.
    pub fn with_channel(mut self, channel: AnimationChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Distinct animated bone names in order of first appearance.
    pub fn bone_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.channels
            .iter()
            .map(|c| c.bone_name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Number of keyframes across all channels.
    pub fn keyframe_count(&self) -> usize {
        self.channels.iter().map(|c| c.keyframes.len()).sum()
    }

    /// Fails on the first `(bone_name, property_path)` pair that appears twice.
    pub fn check_unique_channels(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for channel in &self.channels {
            if !seen.insert((channel.bone_name.as_str(), channel.property_path.as_str())) {
                return Err(MappingError::DuplicateChannel {
                    bone_name: channel.bone_name.clone(),
                    property_path: channel.property_path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Reports structural problems.
    ///
    /// An empty name, a frame range that does not end after it starts, and a
    /// repeated `(bone_name, property_path)` pair are blocking. An animation
    /// with no channels is only advisory; retargeting it yields an empty output.
    pub fn check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(ValidationIssue::new(IssueCode::EmptyName, "animation name is empty"));
        }
        if let Some(range) = self.frame_range.filter(|r| !r.is_valid()) {
            issues.push(ValidationIssue::new(
                IssueCode::InvalidFrameRange,
                format!(
                    "frame range {}..{} must end after it starts",
                    range.start, range.end
                ),
            ));
        }

        let mut seen = HashSet::new();
        for channel in &self.channels {
            if !seen.insert((channel.bone_name.as_str(), channel.property_path.as_str())) {
                issues.push(ValidationIssue::for_bone(
                    IssueCode::DuplicateChannel,
                    format!(
                        "'{}' animates '{}' more than once",
                        channel.bone_name, channel.property_path
                    ),
                    &channel.bone_name,
                ));
            }
        }

        if self.channels.is_empty() {
            issues.push(ValidationIssue::new(
                IssueCode::EmptyAnimation,
                format!("animation '{}' has no channels", self.name),
            ));
        }
        issues
    }

    /// Parses an animation from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the animation to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk() -> Animation {
        Animation::new("walk")
            .with_frame_range(1.0, 24.0)
            .with_channel(AnimationChannel::new(
                "Hips",
                "location",
                vec![Keyframe::new(1.0, [0.0, 0.0, 1.0]), Keyframe::new(24.0, [0.0, 1.0, 1.0])],
            ))
            .with_channel(AnimationChannel::new(
                "Spine",
                "rotation_quaternion",
                vec![Keyframe::new(1.0, [1.0, 0.0, 0.0, 0.0])],
            ))
            .with_channel(AnimationChannel::new("Hips", "rotation_quaternion", vec![]))
    }

    #[test]
    fn test_bone_names_first_appearance() {
        assert_eq!(walk().bone_names(), vec!["Hips", "Spine"]);
        assert_eq!(walk().keyframe_count(), 3);
    }

    #[test]
    fn test_duplicate_channel() {
        assert!(walk().check_unique_channels().is_ok());
        let dup = walk().with_channel(AnimationChannel::new("Spine", "rotation_quaternion", vec![]));
        let err = dup.check_unique_channels().unwrap_err();
        assert!(matches!(
            err,
            MappingError::DuplicateChannel { ref bone_name, .. } if bone_name == "Spine"
        ));
    }

    #[test]
    fn test_parse_defaults() {
        let json = r#"{
            "name": "idle",
            "channels": [
                {"bone_name": "Head", "property_path": "rotation_euler",
                 "keyframes": [{"time": 0, "value": [0.1, 0.2, 0.3]},
                               {"time": 10, "value": [0.0, 0.0, 0.0], "interpolation": "linear"}]}
            ],
            "source_armature": "Armature",
            "source_action": "Idle_Action"
        }"#;
        let anim = Animation::from_json(json).unwrap();
        let channel = &anim.channels[0];
        assert_eq!(channel.extrapolation, Extrapolation::Constant);
        assert_eq!(channel.keyframes[0].interpolation, Interpolation::Bezier);
        assert_eq!(channel.keyframes[1].interpolation, Interpolation::Linear);
        assert!(channel.keyframes[0].extra.is_empty());
        assert!(anim.frame_range.is_none());
        assert_eq!(anim.source_armature, "Armature");
        assert_eq!(anim.source_action, "Idle_Action");
        assert_eq!(anim.description, "");
    }

    #[test]
    fn test_unmodeled_fields_survive_round_trip() {
        let json = r#"{
            "name": "jump",
            "channels": [
                {"bone_name": "Hips", "property_path": "location", "modifiers": [{"type": "NOISE"}],
                 "keyframes": [{"time": 1, "value": [0.5], "handle_left": [0.0, 0.4],
                                "handle_right": [2.0, 0.6], "handle_left_type": "AUTO_CLAMPED"}]}
            ]
        }"#;
        let anim = Animation::from_json(json).unwrap();
        let key = &anim.channels[0].keyframes[0];
        assert_eq!(key.extra["handle_left"], serde_json::json!([0.0, 0.4]));
        assert_eq!(key.extra["handle_left_type"], "AUTO_CLAMPED");
        assert_eq!(anim.channels[0].extra["modifiers"][0]["type"], "NOISE");

        let written: Value = serde_json::from_str(&anim.to_json_pretty().unwrap()).unwrap();
        let key = &written["channels"][0]["keyframes"][0];
        assert_eq!(key["handle_right"], serde_json::json!([2.0, 0.6]));
        assert_eq!(key["time"], 1.0);
        assert_eq!(written["channels"][0]["modifiers"][0]["type"], "NOISE");
        assert!(written.get("description").is_none());
    }

    #[test]
    fn test_check() {
        assert!(walk().check().is_empty());

        let bad = Animation::new(" ")
            .with_frame_range(24.0, 24.0)
            .with_channel(AnimationChannel::new("Hips", "location", vec![]))
            .with_channel(AnimationChannel::new("Hips", "location", vec![]));
        let codes: Vec<_> = bad.check().into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![IssueCode::EmptyName, IssueCode::InvalidFrameRange, IssueCode::DuplicateChannel]
        );
        assert!(bad.check().iter().all(|i| i.is_blocking()));

        let empty = Animation::new("idle").check();
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].code, IssueCode::EmptyAnimation);
        assert!(!empty[0].is_blocking());
    }

    #[test]
    fn test_renamed_keeps_keys() {
        let channel = AnimationChannel::new("Hips", "location", vec![Keyframe::new(1.0, [2.0])])
            .with_extrapolation(Extrapolation::Linear);
        let renamed = channel.renamed("Root");
        assert_eq!(renamed.bone_name, "Root");
        assert_eq!(renamed.keyframes, channel.keyframes);
        assert_eq!(renamed.extrapolation, Extrapolation::Linear);
    }

    #[test]
    fn test_metadata_builders() {
        let anim = Animation::new("walk")
            .with_description("loop")
            .with_source("Armature", "Walk_Action");
        assert_eq!(anim.description, "loop");
        assert_eq!(anim.source_armature, "Armature");
        assert_eq!(anim.source_action, "Walk_Action");
    }
}
