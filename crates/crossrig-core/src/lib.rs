//! Crossrig Core Library
//!
//! Bone-name matching between skeletons and animation retargeting through the
//! resulting mapping. Skeletons and animations are plain named data; no 3D math
//! happens here.
//!
//! # Overview
//!
//! - **Auto-mapping**: names are normalized (namespace prefixes and side
//!   markers stripped), scored pairwise, and assigned greedily into an
//!   injective mapping.
//! - **Mappings**: a [`BoneMapping`] holds `(source, target, confidence, origin)`
//!   entries. Manual entries survive re-running the auto-mapper.
//! - **Retargeting**: channels are renamed onto the target skeleton; anything
//!   that cannot be placed is reported, not raised.
//!
//! # Example
//!
//! ```
//! use crossrig_core::{auto_map, BoneMapping, Validator};
//!
//! let source = ["ns:Hips", "ns:LeftArm", "ns:RightArm"];
//! let target = ["Root", "UpperArm.L", "UpperArm.R"];
//!
//! let empty = BoneMapping::new("ns_to_rig", "ns", "rig");
//! let mapping = auto_map(source, target, &empty, 0.7).unwrap();
//! assert_eq!(mapping.target_for("ns:LeftArm"), Some("UpperArm.L"));
//!
//! let result = Validator::default().validate(&mapping, source, target);
//! assert!(result.ok);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error type and validation issue codes
//! - [`config`]: Naming conventions and matcher settings
//! - [`skeleton`]: Skeleton and bone types
//! - [`normalize`]: Bone name normalization
//! - [`similarity`]: Pairwise confidence scoring
//! - [`automap`]: Greedy auto-mapping and suggestions
//! - [`mapping`]: The bone mapping aggregate
//! - [`persist`]: Mapping documents, files, and the mapping and animation libraries
//! - [`animation`]: Animation data model
//! - [`retarget`]: Retargeting and transfer reports
//! - [`validation`]: Pre-retarget coverage checks

pub mod animation;
pub mod automap;
pub mod config;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod persist;
pub mod retarget;
pub mod similarity;
pub mod skeleton;
pub mod validation;

// Re-export commonly used types at the crate root
pub use animation::{
    Animation, AnimationChannel, Extrapolation, FrameRange, Interpolation, Keyframe,
};
pub use automap::{auto_map, AutoMapper, Suggestion, DEFAULT_SUGGESTION_LIMIT};
pub use config::{
    check_threshold, AutoMapConfig, CrossrigConfig, NamingConventions, DEFAULT_LOW_CONFIDENCE,
    DEFAULT_THRESHOLD,
};
pub use error::{IssueCode, MappingError, Result, Severity, ValidationIssue};
pub use mapping::{BoneMapping, MappingEntry, MappingOrigin, MAPPING_VERSION};
pub use normalize::{normalize, BoneDescriptor, NameNormalizer, Side};
pub use persist::{
    load, load_from_file, sanitize_filename, save, save_to_file, AnimationLibrary, LibraryEntry,
    MappingLibrary,
};
pub use retarget::{DropReason, DroppedChannel, Retargeter, TransferReport};
pub use similarity::{AliasTable, MatchRule, SimilarityScorer};
pub use skeleton::{Bone, Skeleton};
pub use validation::{validate, ValidationResult, Validator};
