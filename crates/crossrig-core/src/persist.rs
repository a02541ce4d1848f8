//! Mapping persistence and the on-disk libraries of saved mappings and animations.
//!
//! Mappings are stored as pretty-printed JSON documents. The reader ignores
//! unknown fields and also accepts the older preset layout, where the skeleton
//! ids were called `source_armature_name`/`target_armature_name`, entries lived
//! under `mappings`, entries had no `origin`, and the creation date sat in a
//! nested `metadata` object.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::Animation;
use crate::error::{MappingError, Result};
use crate::mapping::{BoneMapping, MappingEntry, MappingOrigin, MAPPING_VERSION};

/// Document versions the reader understands.
pub const SUPPORTED_VERSIONS: &[&str] = &[MAPPING_VERSION];

/// Extension of files in a [`MappingLibrary`] or [`AnimationLibrary`].
pub const MAPPING_EXTENSION: &str = "json";

const MAX_FILENAME_LEN: usize = 100;

/// Characters not allowed in library file names.
const UNSAFE_FILENAME_PATTERN: &str = r#"[<>:"/\\|?*]"#;

static UNSAFE_FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn unsafe_filename_regex() -> &'static Regex {
    UNSAFE_FILENAME_REGEX
        .get_or_init(|| Regex::new(UNSAFE_FILENAME_PATTERN).expect("invalid regex pattern"))
}

#[derive(Serialize)]
struct Stats {
    entries: usize,
    auto: usize,
    manual: usize,
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    version: &'a str,
    name: &'a str,
    description: &'a str,
    source_skeleton_id: &'a str,
    target_skeleton_id: &'a str,
    created_at: &'a DateTime<Utc>,
    entries: &'a [MappingEntry],
    stats: Stats,
}

#[derive(Deserialize)]
struct DocumentIn {
    version: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(alias = "source_armature_name")]
    source_skeleton_id: String,
    #[serde(alias = "target_armature_name")]
    target_skeleton_id: String,
    #[serde(default, alias = "created_date")]
    created_at: Option<String>,
    #[serde(alias = "mappings")]
    entries: Vec<EntryIn>,
    #[serde(default)]
    metadata: Option<LegacyMetadata>,
}

/// The `metadata` block of older preset documents. Only the creation date is kept;
/// the counters are recomputed from the entries.
#[derive(Deserialize)]
struct LegacyMetadata {
    #[serde(default)]
    created_date: Option<String>,
}

#[derive(Deserialize)]
struct EntryIn {
    source_bone: String,
    target_bone: String,
    #[serde(default = "full_confidence")]
    confidence: f64,
    #[serde(default)]
    origin: Option<MappingOrigin>,
}

fn full_confidence() -> f64 {
    1.0
}

fn malformed(msg: impl Into<String>) -> MappingError {
    MappingError::MalformedMapping(msg.into())
}

/// Accepts RFC 3339 timestamps and the naive ISO form older documents used.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| malformed(format!("invalid created_at '{}': {}", raw, e)))
}

/// Serializes a mapping to a JSON document.
pub fn save(mapping: &BoneMapping) -> Result<Vec<u8>> {
    let doc = DocumentOut {
        version: &mapping.version,
        name: &mapping.name,
        description: &mapping.description,
        source_skeleton_id: &mapping.source_skeleton_id,
        target_skeleton_id: &mapping.target_skeleton_id,
        created_at: &mapping.created_at,
        entries: mapping.entries(),
        stats: Stats {
            entries: mapping.len(),
            auto: mapping.auto_count(),
            manual: mapping.manual_count(),
        },
    };
    Ok(serde_json::to_vec_pretty(&doc)?)
}

/// Parses a mapping document.
///
/// Fails with [`MappingError::MalformedMapping`] when the bytes are not a
/// mapping document, a required field is missing, the version is unknown, or
/// the entries break the confidence range or injectivity.
pub fn load(bytes: &[u8]) -> Result<BoneMapping> {
    let doc: DocumentIn = serde_json::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;

    if !SUPPORTED_VERSIONS.contains(&doc.version.as_str()) {
        return Err(malformed(format!("unsupported version '{}'", doc.version)));
    }

    let raw_created = doc
        .created_at
        .filter(|raw| !raw.is_empty())
        .or_else(|| doc.metadata.and_then(|m| m.created_date))
        .filter(|raw| !raw.is_empty());
    let created_at = match raw_created.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => DateTime::<Utc>::default(),
    };

    let mut mapping = BoneMapping::new(doc.name, doc.source_skeleton_id, doc.target_skeleton_id)
        .with_description(doc.description)
        .with_created_at(created_at);
    mapping.version = doc.version;

    for raw in doc.entries {
        if !(0.0..=1.0).contains(&raw.confidence) {
            return Err(malformed(format!(
                "confidence {} for '{}' is outside [0, 1]",
                raw.confidence, raw.source_bone
            )));
        }
        if mapping.get(&raw.source_bone).is_some() {
            return Err(malformed(format!("source bone '{}' appears twice", raw.source_bone)));
        }
        if mapping.find_by_target(&raw.target_bone).is_some() {
            return Err(malformed(format!("target bone '{}' appears twice", raw.target_bone)));
        }
        let origin = raw.origin.unwrap_or(if raw.confidence >= 1.0 {
            MappingOrigin::Manual
        } else {
            MappingOrigin::Auto
        });
        mapping.push_entry(MappingEntry {
            source_bone: raw.source_bone,
            target_bone: raw.target_bone,
            confidence: raw.confidence,
            origin,
        });
    }

    Ok(mapping)
}

/// Writes a mapping to a file, replacing any existing file.
pub fn save_to_file(mapping: &BoneMapping, path: &Path) -> Result<()> {
    std::fs::write(path, save(mapping)?)?;
    debug!(path = %path.display(), entries = mapping.len(), "saved mapping");
    Ok(())
}

/// Reads a mapping from a file.
pub fn load_from_file(path: &Path) -> Result<BoneMapping> {
    let bytes = std::fs::read(path)?;
    load(&bytes)
}

/// Turns a mapping name into a safe file stem.
pub fn sanitize_filename(name: &str) -> String {
    file_stem_for(name, "mapping")
}

fn file_stem_for(name: &str, fallback: &str) -> String {
    let replaced = unsafe_filename_regex().replace_all(name, "_");
    let trimmed: String = replaced
        .trim_matches(|c| c == '.' || c == ' ')
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed
    }
}

/// A saved mapping or animation found in a library directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    /// Stored name (the file stem when the file cannot be read).
    pub name: String,
    /// File path.
    pub path: PathBuf,
    /// Whether the file parsed.
    pub readable: bool,
}

/// Lists `*.json` files in `dir` sorted by name, naming each through `read_name`.
fn list_dir(dir: &Path, read_name: impl Fn(&Path) -> Result<String>) -> Result<Vec<LibraryEntry>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for dir_entry in std::fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(MAPPING_EXTENSION) {
            continue;
        }
        let entry = match read_name(&path) {
            Ok(name) => LibraryEntry {
                name,
                path,
                readable: true,
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable library file");
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                LibraryEntry {
                    name: stem,
                    path,
                    readable: false,
                }
            }
        };
        entries.push(entry);
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
    Ok(entries)
}

/// A directory of saved mappings.
///
/// Every call goes to the file system; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct MappingLibrary {
    dir: PathBuf,
}

impl MappingLibrary {
    /// Creates a library rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Library directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a mapping with this name is stored at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", sanitize_filename(name), MAPPING_EXTENSION))
    }

    /// Saves a mapping under its name, overwriting any previous version.
    pub fn save(&self, mapping: &BoneMapping) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&mapping.name);
        save_to_file(mapping, &path)?;
        Ok(path)
    }

    /// Loads a mapping by name.
    pub fn load(&self, name: &str) -> Result<BoneMapping> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(MappingError::MappingNotFound(name.to_string()));
        }
        load_from_file(&path)
    }

    /// Deletes a mapping by name.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(MappingError::MappingNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        debug!(path = %path.display(), "deleted mapping");
        Ok(())
    }

    /// Lists saved mappings sorted by name. A missing directory is an empty library.
    pub fn list(&self) -> Result<Vec<LibraryEntry>> {
        list_dir(&self.dir, |path| load_from_file(path).map(|m| m.name))
    }
}

/// A directory of saved animations, laid out like a [`MappingLibrary`].
#[derive(Debug, Clone)]
pub struct AnimationLibrary {
    dir: PathBuf,
}

impl AnimationLibrary {
    /// Creates a library rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Library directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an animation with this name is stored at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", file_stem_for(name, "animation"), MAPPING_EXTENSION))
    }

    /// Saves an animation under its name, overwriting any previous version.
    pub fn save(&self, animation: &Animation) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&animation.name);
        std::fs::write(&path, animation.to_json_pretty()?)?;
        debug!(path = %path.display(), channels = animation.channels.len(), "saved animation");
        Ok(path)
    }

    /// Loads an animation by name.
    pub fn load(&self, name: &str) -> Result<Animation> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(MappingError::AnimationNotFound(name.to_string()));
        }
        Animation::from_json(&std::fs::read_to_string(&path)?)
    }

    /// Deletes an animation by name.
    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(MappingError::AnimationNotFound(name.to_string()));
        }
        std::fs::remove_file(&path)?;
        debug!(path = %path.display(), "deleted animation");
        Ok(())
    }

    /// Lists saved animations sorted by name. A missing directory is an empty library.
    pub fn list(&self) -> Result<Vec<LibraryEntry>> {
        list_dir(&self.dir, |path| {
            Animation::from_json(&std::fs::read_to_string(path)?).map(|a| a.name)
        })
    }
}
