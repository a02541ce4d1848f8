//! Input loading for skeletons, animations, and mappings.
//!
//! Skeletons dispatch by file extension: `.json` documents or `.txt` bone
//! lists. Animations are JSON, addressed by path or by name in the animation
//! library. Mappings are mapping documents, addressed either by path or by name
//! in the mapping library.

use std::path::{Path, PathBuf};

use crossrig_core::{
    persist, Animation, AnimationLibrary, Bone, BoneMapping, MappingError, MappingLibrary, Skeleton,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Recognized JSON extensions.
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Recognized bone-list extensions.
pub const TEXT_EXTENSIONS: &[&str] = &["txt"];

/// Identifies the source format of a skeleton file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON skeleton document.
    Json,
    /// Plain-text bone list.
    Text,
}

impl SourceKind {
    /// Returns the string representation for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Json => "json",
            SourceKind::Text => "text",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A skeleton together with where it came from.
#[derive(Debug)]
pub struct LoadedSkeleton {
    /// The parsed skeleton.
    pub skeleton: Skeleton,
    /// Source format.
    pub source_kind: SourceKind,
    /// BLAKE3 hash of the file content (hex string).
    pub source_hash: String,
}

/// Errors that can occur while loading inputs.
#[derive(Debug)]
pub enum InputError {
    /// File could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unknown file extension.
    UnknownExtension { extension: Option<String> },

    /// Content could not be parsed.
    Parse { path: PathBuf, message: String },

    /// Content parsed but violates a data-model rule (e.g. duplicate bones).
    Mapping(MappingError),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::FileRead { path, source } => {
                write!(f, "failed to read file '{}': {}", path.display(), source)
            }
            InputError::UnknownExtension { extension } => match extension {
                Some(ext) => write!(
                    f,
                    "unknown file extension '.{}' (expected .json or .txt)",
                    ext
                ),
                None => write!(f, "file has no extension (expected .json or .txt)"),
            },
            InputError::Parse { path, message } => {
                write!(f, "failed to parse '{}': {}", path.display(), message)
            }
            InputError::Mapping(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::FileRead { source, .. } => Some(source),
            InputError::Mapping(e) => Some(e),
            _ => None,
        }
    }
}

fn read(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|e| InputError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Sorts a core error into parse failures and data-model failures.
fn classify(path: &Path, err: MappingError) -> InputError {
    match err {
        MappingError::Json(e) => InputError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        MappingError::MalformedMapping(message) => InputError::Parse {
            path: path.to_path_buf(),
            message,
        },
        MappingError::Io(e) => InputError::FileRead {
            path: path.to_path_buf(),
            source: e,
        },
        other => InputError::Mapping(other),
    }
}

/// Load a skeleton from a file path, dispatching by extension.
pub fn load_skeleton(path: &Path) -> Result<LoadedSkeleton, InputError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());

    let source_kind = match extension.as_deref() {
        Some(ext) if JSON_EXTENSIONS.contains(&ext) => SourceKind::Json,
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => SourceKind::Text,
        _ => return Err(InputError::UnknownExtension { extension }),
    };

    let content = read(path)?;
    let source_hash = blake3::hash(content.as_bytes()).to_hex().to_string();

    let skeleton = match source_kind {
        SourceKind::Json => Skeleton::from_json(&content).map_err(|e| classify(path, e))?,
        SourceKind::Text => {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("skeleton");
            parse_bone_list(name, &content).map_err(|e| classify(path, e))?
        }
    };
    debug!(
        path = %path.display(),
        kind = %source_kind,
        bones = skeleton.len(),
        hash = &source_hash[..16],
        "loaded skeleton"
    );

    Ok(LoadedSkeleton {
        skeleton,
        source_kind,
        source_hash,
    })
}

/// Parses a plain-text bone list.
///
/// One bone per line, optionally followed by a tab and the parent name.
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_bone_list(name: &str, content: &str) -> crossrig_core::Result<Skeleton> {
    let mut skeleton = Skeleton::new(name);
    for line in content.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let mut fields = line.splitn(2, '\t');
        let bone = fields.next().unwrap_or_default().trim();
        let parent = fields.next().map(str::trim).filter(|p| !p.is_empty());
        let bone = match parent {
            Some(parent) => Bone::with_parent(bone, parent),
            None => Bone::new(bone),
        };
        skeleton.add_bone(bone)?;
    }
    Ok(skeleton)
}

/// Load an animation from a JSON file.
pub fn load_animation(path: &Path) -> Result<Animation, InputError> {
    let content = read(path)?;
    Animation::from_json(&content).map_err(|e| classify(path, e))
}

/// An animation together with the file it was read from.
#[derive(Debug)]
pub struct LoadedAnimation {
    /// The parsed animation.
    pub animation: Animation,
    /// File the animation was read from.
    pub path: PathBuf,
}

/// Resolves an `--animation` argument: an existing file wins, anything else is
/// looked up by name in the animation library.
pub fn resolve_animation(arg: &str, library: &AnimationLibrary) -> Result<LoadedAnimation, InputError> {
    let path = Path::new(arg);
    if path.is_file() {
        return Ok(LoadedAnimation {
            animation: load_animation(path)?,
            path: path.to_path_buf(),
        });
    }

    let path = library.path_for(arg);
    if !path.is_file() {
        return Err(InputError::Mapping(MappingError::AnimationNotFound(arg.to_string())));
    }
    let animation = load_animation(&path)?;
    debug!(name = arg, path = %path.display(), "resolved animation from library");
    Ok(LoadedAnimation { animation, path })
}

/// Where a mapping argument points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingLocation {
    /// An explicit file path.
    File(PathBuf),
    /// A name in the mapping library, stored at the given path.
    Library { name: String, path: PathBuf },
}

impl MappingLocation {
    /// Resolves a `--mapping` argument: an existing file wins, anything else is a library name.
    pub fn resolve(arg: &str, library: &MappingLibrary) -> Self {
        let path = Path::new(arg);
        if path.is_file() {
            MappingLocation::File(path.to_path_buf())
        } else {
            MappingLocation::Library {
                name: arg.to_string(),
                path: library.path_for(arg),
            }
        }
    }

    /// File path of the mapping.
    pub fn path(&self) -> &Path {
        match self {
            MappingLocation::File(path) => path,
            MappingLocation::Library { path, .. } => path,
        }
    }
}

/// Load a mapping from a resolved location.
pub fn load_mapping(location: &MappingLocation) -> Result<BoneMapping, InputError> {
    let path = location.path();
    if let MappingLocation::Library { name, .. } = location {
        if !path.is_file() {
            return Err(InputError::Mapping(MappingError::MappingNotFound(name.clone())));
        }
    }
    persist::load_from_file(path).map_err(|e| classify(path, e))
}
