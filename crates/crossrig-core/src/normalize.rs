//! Bone name normalization.
//!
//! Turns a raw bone name such as `mixamorig:LeftForeArm` or `DEF-upper_arm.L`
//! into a [`BoneDescriptor`]: a case-folded base name with namespace and side
//! markers removed, plus the detected [`Side`].
//!
//! Processing order:
//!
//! 1. Strip the longest matching namespace prefix (`mixamorig:`, `DEF-`, ...).
//! 2. Strip any remaining `namespace:` qualifier up to the last colon.
//! 3. Detect the side from a suffix (`.L`, `_right`), a prefix (`L_`), a
//!    standalone token (`Bip01 L Hand`), or an embedded word (`LeftArm`), in
//!    that order, removing the marker once found.
//! 4. Fold what remains to lowercase alphanumerics.

use serde::{Deserialize, Serialize};

use crate::config::NamingConventions;

/// Which side of the body a bone belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Left side.
    Left,
    /// Right side.
    Right,
    /// No side marker and no directional hint.
    Center,
    /// A directional hint is present but no side could be resolved.
    Unknown,
}

impl Side {
    /// Returns the side as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
            Side::Center => "center",
            Side::Unknown => "unknown",
        }
    }

    /// Returns true for two defined, opposite sides.
    pub fn conflicts_with(&self, other: Side) -> bool {
        matches!(
            (self, other),
            (Side::Left, Side::Right) | (Side::Right, Side::Left)
        )
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized view of a bone name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoneDescriptor {
    /// The name exactly as given.
    pub original_name: String,
    /// Lowercase alphanumeric core of the name with prefixes and side markers removed.
    pub base_name: String,
    /// Detected side.
    pub side: Side,
}

/// Splits bone names into `(base_name, side)` according to a set of conventions.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    prefixes: Vec<String>,
    strip_namespaces: bool,
    suffixes: Vec<(String, Side)>,
    side_prefixes: Vec<(String, Side)>,
    tokens: Vec<(String, Side)>,
    left_words: Vec<String>,
    right_words: Vec<String>,
    hints: Vec<String>,
}

fn lowered(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn sided(left: &[String], right: &[String]) -> Vec<(String, Side)> {
    let mut out: Vec<(String, Side)> = lowered(left)
        .into_iter()
        .map(|s| (s, Side::Left))
        .chain(lowered(right).into_iter().map(|s| (s, Side::Right)))
        .collect();
    // Longest marker first.
    out.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    out
}

fn is_separator(c: char) -> bool {
    !c.is_alphanumeric()
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(&NamingConventions::default())
    }
}

impl NameNormalizer {
    /// Builds a normalizer from naming conventions.
    pub fn new(conventions: &NamingConventions) -> Self {
        let mut prefixes = lowered(&conventions.prefixes);
        prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        Self {
            prefixes,
            strip_namespaces: conventions.strip_namespaces,
            suffixes: sided(&conventions.left_suffixes, &conventions.right_suffixes),
            side_prefixes: sided(&conventions.left_prefixes, &conventions.right_prefixes),
            tokens: sided(&conventions.left_tokens, &conventions.right_tokens),
            left_words: lowered(&conventions.left_words),
            right_words: lowered(&conventions.right_words),
            hints: lowered(&conventions.directional_hints),
        }
    }

    /// Normalizes a bone name.
    pub fn normalize(&self, name: &str) -> BoneDescriptor {
        let lower = name.to_lowercase();
        let stripped = self.strip_prefixes(&lower);
        let (rest, side) = self.extract_side(stripped);

        let side = match side {
            Some(side) => side,
            None if self.has_directional_hint(&rest) => Side::Unknown,
            None => Side::Center,
        };

        BoneDescriptor {
            original_name: name.to_string(),
            base_name: rest.chars().filter(|c| c.is_alphanumeric()).collect(),
            side,
        }
    }

    fn strip_prefixes<'a>(&self, name: &'a str) -> &'a str {
        let mut rest = self
            .prefixes
            .iter()
            .find(|p| name.starts_with(p.as_str()))
            .map_or(name, |p| &name[p.len()..]);

        if self.strip_namespaces {
            if let Some(idx) = rest.rfind(':') {
                rest = &rest[idx + 1..];
            }
        }
        rest
    }

    /// Returns the name with the side marker removed and the side found, if any.
    fn extract_side(&self, name: &str) -> (String, Option<Side>) {
        if let Some((suffix, side)) = self
            .suffixes
            .iter()
            .find(|(s, _)| name.len() > s.len() && name.ends_with(s.as_str()))
        {
            return (name[..name.len() - suffix.len()].to_string(), Some(*side));
        }

        if let Some((prefix, side)) = self
            .side_prefixes
            .iter()
            .find(|(p, _)| name.len() > p.len() && name.starts_with(p.as_str()))
        {
            return (name[prefix.len()..].to_string(), Some(*side));
        }

        let tokens: Vec<&str> = name.split(is_separator).filter(|t| !t.is_empty()).collect();
        if tokens.len() > 1 {
            for (marker, side) in &self.tokens {
                if let Some(pos) = tokens.iter().position(|t| *t == marker.as_str()) {
                    let mut kept = tokens.clone();
                    kept.remove(pos);
                    return (kept.join("_"), Some(*side));
                }
            }
        }

        let left = self.left_words.iter().find(|w| name.contains(w.as_str()));
        let right = self.right_words.iter().find(|w| name.contains(w.as_str()));
        match (left, right) {
            (Some(word), None) => (name.replacen(word.as_str(), "", 1), Some(Side::Left)),
            (None, Some(word)) => (name.replacen(word.as_str(), "", 1), Some(Side::Right)),
            (Some(_), Some(_)) => (name.to_string(), Some(Side::Unknown)),
            (None, None) => (name.to_string(), None),
        }
    }

    fn has_directional_hint(&self, name: &str) -> bool {
        name.split(is_separator)
            .any(|token| self.hints.iter().any(|h| h == token))
    }
}

/// Normalizes a bone name with the default conventions.
pub fn normalize(name: &str) -> BoneDescriptor {
    NameNormalizer::default().normalize(name)
}
