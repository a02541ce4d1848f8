//! Skeleton types.
//!
//! A skeleton here is only a named, ordered set of bone names with optional
//! parent links. No geometry is attached.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// A single bone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name, unique within its skeleton.
    pub name: String,
    /// Parent bone name, if the bone is not a root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl Bone {
    /// Creates a root bone.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
        }
    }

    /// Creates a bone with a parent.
    pub fn with_parent(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent.into()),
        }
    }
}

/// An ordered set of uniquely named bones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skeleton {
    /// Skeleton identifier (armature name).
    pub name: String,
    /// Bones in declaration order.
    pub bones: Vec<Bone>,
}

#[derive(Deserialize)]
struct SkeletonDocument {
    name: String,
    #[serde(default)]
    bones: Vec<Bone>,
}

impl Skeleton {
    /// Creates an empty skeleton.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bones: Vec::new(),
        }
    }

    /// Creates a skeleton from a list of parentless bone names.
    pub fn from_names<I, S>(name: impl Into<String>, bones: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut skeleton = Self::new(name);
        for bone in bones {
            skeleton.add_bone(Bone::new(bone))?;
        }
        Ok(skeleton)
    }

    /// Appends a bone, rejecting duplicate names.
    pub fn add_bone(&mut self, bone: Bone) -> Result<()> {
        if self.contains(&bone.name) {
            return Err(MappingError::DuplicateBone {
                skeleton: self.name.clone(),
                bone: bone.name,
            });
        }
        self.bones.push(bone);
        Ok(())
    }

    /// Returns true if the skeleton has a bone with this name.
    pub fn contains(&self, bone: &str) -> bool {
        self.bones.iter().any(|b| b.name == bone)
    }

    /// Returns the parent of a bone, if the bone exists and has one.
    pub fn parent_of(&self, bone: &str) -> Option<&str> {
        self.bones
            .iter()
            .find(|b| b.name == bone)
            .and_then(|b| b.parent.as_deref())
    }

    /// Bone names in declaration order.
    pub fn bone_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.bones.iter().map(|b| b.name.as_str())
    }

    /// Bone names as an owned set, for membership queries.
    pub fn name_set(&self) -> HashSet<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }

    /// Number of bones.
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    /// Returns true if the skeleton has no bones.
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Parses a skeleton from JSON, enforcing unique bone names.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: SkeletonDocument = serde_json::from_str(json)?;
        let mut skeleton = Self::new(doc.name);
        for bone in doc.bones {
            skeleton.add_bone(bone)?;
        }
        Ok(skeleton)
    }

    /// Serializes the skeleton to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
