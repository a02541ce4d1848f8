//! Error types and validation issue codes.

use thiserror::Error;

/// Stable codes for issues reported by mapping checks and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    // Structural problems (E001-E007)
    /// E001: Empty mapping name or bone name
    EmptyName,
    /// E002: Entry confidence outside [0, 1]
    ConfidenceOutOfRange,
    /// E003: Source bone mapped more than once
    DuplicateSource,
    /// E004: Target bone used by more than one entry
    DuplicateTarget,
    /// E005: Empty source or target skeleton id
    EmptySkeletonId,
    /// E006: Animation frame range does not end after it starts
    InvalidFrameRange,
    /// E007: Animation has two channels for the same bone and property
    DuplicateChannel,

    // Coverage gaps (W001-W004)
    /// W001: Animation bone has no mapping entry
    UnmappedBone,
    /// W002: Mapped target bone is absent from the target skeleton
    MissingTargetBone,
    /// W003: Entry confidence below the low-confidence threshold
    LowConfidence,
    /// W004: Animation has no channels
    EmptyAnimation,
}

impl IssueCode {
    /// Returns the code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            IssueCode::EmptyName => "E001",
            IssueCode::ConfidenceOutOfRange => "E002",
            IssueCode::DuplicateSource => "E003",
            IssueCode::DuplicateTarget => "E004",
            IssueCode::EmptySkeletonId => "E005",
            IssueCode::InvalidFrameRange => "E006",
            IssueCode::DuplicateChannel => "E007",
            IssueCode::UnmappedBone => "W001",
            IssueCode::MissingTargetBone => "W002",
            IssueCode::LowConfidence => "W003",
            IssueCode::EmptyAnimation => "W004",
        }
    }

    /// Returns the severity implied by the code.
    pub fn severity(&self) -> Severity {
        match self {
            IssueCode::EmptyName
            | IssueCode::ConfidenceOutOfRange
            | IssueCode::DuplicateSource
            | IssueCode::DuplicateTarget
            | IssueCode::EmptySkeletonId
            | IssueCode::InvalidFrameRange
            | IssueCode::DuplicateChannel => Severity::Blocking,
            IssueCode::UnmappedBone
            | IssueCode::MissingTargetBone
            | IssueCode::LowConfidence
            | IssueCode::EmptyAnimation => Severity::Advisory,
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Whether an issue should stop a retarget run or only be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The mapping is structurally broken.
    Blocking,
    /// A coverage gap; the caller decides whether to proceed.
    Advisory,
}

/// A single issue found by [`BoneMapping::check`](crate::mapping::BoneMapping::check),
/// [`Animation::check`](crate::animation::Animation::check) or the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The issue code.
    pub code: IssueCode,
    /// Human-readable message.
    pub message: String,
    /// Bone the issue refers to, if any.
    pub bone: Option<String>,
}

impl ValidationIssue {
    /// Creates a new issue.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            bone: None,
        }
    }

    /// Creates a new issue attached to a bone name.
    pub fn for_bone(code: IssueCode, message: impl Into<String>, bone: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            bone: Some(bone.into()),
        }
    }

    /// Severity of this issue.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns true if this issue blocks retargeting.
    pub fn is_blocking(&self) -> bool {
        self.severity() == Severity::Blocking
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Top-level error type for mapping operations.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Auto-map threshold outside [0, 1] (or NaN).
    #[error("invalid threshold {0}: must be within [0, 1]")]
    InvalidThreshold(f64),

    /// Entry confidence outside [0, 1] (or NaN).
    #[error("invalid confidence {confidence} for bone '{source_bone}': must be within [0, 1]")]
    InvalidConfidence {
        /// Source bone of the rejected entry.
        source_bone: String,
        /// The rejected confidence.
        confidence: f64,
    },

    /// Persisted mapping document is unparseable, incomplete, or of an unknown version.
    #[error("malformed mapping document: {0}")]
    MalformedMapping(String),

    /// Animation contains two channels for the same bone and property.
    #[error("duplicate channel for bone '{bone_name}' property '{property_path}'")]
    DuplicateChannel {
        /// Bone the channels animate.
        bone_name: String,
        /// Property path shared by the channels.
        property_path: String,
    },

    /// Skeleton declares the same bone name twice.
    #[error("duplicate bone '{bone}' in skeleton '{skeleton}'")]
    DuplicateBone {
        /// Skeleton name.
        skeleton: String,
        /// Repeated bone name.
        bone: String,
    },

    /// An automatic entry would displace a manual one.
    #[error("bone '{source_bone}' is bound by a manual entry; clear it before auto-assigning")]
    ProtectedEntry {
        /// Source bone of the manual entry that blocked the change.
        source_bone: String,
    },

    /// A named mapping is not present in the library.
    #[error("mapping '{0}' not found")]
    MappingNotFound(String),

    /// A named animation is not present in the animation library.
    #[error("animation '{0}' not found")]
    AnimationNotFound(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for crate operations.
pub type Result<T> = std::result::Result<T, MappingError>;
