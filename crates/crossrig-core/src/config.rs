//! Naming conventions and matching configuration.
//!
//! Everything the matcher knows about bone naming lives here as data: namespace
//! prefixes, side markers, directional hints, and alias groups. New conventions
//! are added by extending these lists (or a config file), not by changing the
//! matching code.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// Default auto-map threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Default confidence below which validation flags an entry.
pub const DEFAULT_LOW_CONFIDENCE: f64 = 0.7;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Recognized bone naming conventions. All matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConventions {
    /// Namespace-style prefixes removed before matching (longest match wins).
    pub prefixes: Vec<String>,
    /// Strip everything up to the last `:` after prefix removal.
    pub strip_namespaces: bool,
    /// Suffixes marking a left-side bone (e.g. `.L`, `_left`).
    pub left_suffixes: Vec<String>,
    /// Suffixes marking a right-side bone.
    pub right_suffixes: Vec<String>,
    /// Standalone tokens marking a left-side bone (e.g. the `L` in `Bip01 L Hand`).
    pub left_tokens: Vec<String>,
    /// Standalone tokens marking a right-side bone.
    pub right_tokens: Vec<String>,
    /// Prefixes marking a left-side bone (e.g. `L_`).
    pub left_prefixes: Vec<String>,
    /// Prefixes marking a right-side bone.
    pub right_prefixes: Vec<String>,
    /// Words marking a left-side bone anywhere in the name (e.g. `LeftArm`).
    pub left_words: Vec<String>,
    /// Words marking a right-side bone anywhere in the name.
    pub right_words: Vec<String>,
    /// Tokens that suggest a side without identifying it.
    pub directional_hints: Vec<String>,
    /// Groups of base names that denote the same bone.
    pub aliases: Vec<Vec<String>>,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            prefixes: strings(&[
                "mixamorig:",
                "def-",
                "mch-",
                "org-",
                "ctrl-",
                "ik-",
                "fk-",
                "root.",
                "rig.",
            ]),
            strip_namespaces: true,
            left_suffixes: strings(&[".l", "_l", "-l", " l", ".left", "_left", "-left", " left"]),
            right_suffixes: strings(&[
                ".r", "_r", "-r", " r", ".right", "_right", "-right", " right",
            ]),
            left_tokens: strings(&["l"]),
            right_tokens: strings(&["r"]),
            left_prefixes: strings(&["l_", "l.", "l-", "l ", "left_", "left.", "left-", "left "]),
            right_prefixes: strings(&[
                "r_", "r.", "r-", "r ", "right_", "right.", "right-", "right ",
            ]),
            left_words: strings(&["left"]),
            right_words: strings(&["right"]),
            directional_hints: strings(&["lf", "rt", "lft", "rgt", "side"]),
            aliases: vec![
                strings(&["hips", "pelvis", "root"]),
                strings(&["chest", "upperchest", "spine2"]),
                strings(&["shoulder", "clavicle", "collar"]),
                strings(&["upperarm", "arm"]),
                strings(&["lowerarm", "forearm", "elbow"]),
                strings(&["hand", "wrist"]),
                strings(&["upperleg", "upleg", "thigh"]),
                strings(&["lowerleg", "leg", "shin", "calf", "knee"]),
                strings(&["foot", "ankle"]),
                strings(&["toe", "toebase", "toes", "ball"]),
            ],
        }
    }
}

impl NamingConventions {
    /// Conventions with no patterns at all: names are only case-folded.
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
            strip_namespaces: false,
            left_suffixes: Vec::new(),
            right_suffixes: Vec::new(),
            left_tokens: Vec::new(),
            right_tokens: Vec::new(),
            left_prefixes: Vec::new(),
            right_prefixes: Vec::new(),
            left_words: Vec::new(),
            right_words: Vec::new(),
            directional_hints: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Adds a namespace prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Adds an alias group.
    pub fn with_alias_group<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.push(group.into_iter().map(Into::into).collect());
        self
    }
}

/// Auto-mapper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoMapConfig {
    /// Minimum score for a pair to be assigned. Must lie within [0, 1].
    pub threshold: f64,
    /// Naming conventions used for normalization and scoring.
    pub conventions: NamingConventions,
}

impl Default for AutoMapConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            conventions: NamingConventions::default(),
        }
    }
}

impl AutoMapConfig {
    /// Creates a config with the default conventions and the given threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

/// Validates that a threshold lies within [0, 1].
pub fn check_threshold(threshold: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(MappingError::InvalidThreshold(threshold))
    }
}

/// Full configuration as read from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossrigConfig {
    /// Auto-mapper settings.
    pub automap: AutoMapConfig,
    /// Confidence below which validation reports an advisory issue.
    pub low_confidence: f64,
    /// Directory of saved mappings; the CLI picks a per-user default when unset.
    pub library_dir: Option<PathBuf>,
    /// Directory of saved animations; the CLI picks a per-user default when unset.
    pub animation_dir: Option<PathBuf>,
}

impl Default for CrossrigConfig {
    fn default() -> Self {
        Self {
            automap: AutoMapConfig::default(),
            low_confidence: DEFAULT_LOW_CONFIDENCE,
            library_dir: None,
            animation_dir: None,
        }
    }
}

impl CrossrigConfig {
    /// Parses a config from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a config file, choosing the format by extension (`.yaml`/`.yml`, else JSON).
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&text)?,
            _ => Self::from_json(&text)?,
        };
        check_threshold(config.automap.threshold)?;
        Ok(config)
    }
}
