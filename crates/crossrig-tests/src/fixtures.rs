//! Skeletons, animations, and on-disk inputs used across the integration tests.

use std::path::{Path, PathBuf};

use crossrig_core::{Animation, AnimationChannel, BoneMapping, Keyframe, Skeleton};

/// A Mixamo-style source rig.
pub const MIXAMO_BONES: &[&str] = &[
    "mixamorig:Hips",
    "mixamorig:Spine",
    "mixamorig:LeftHand",
    "mixamorig:RightHand",
];

/// A lowercase target rig with dotted side suffixes.
pub const TARGET_BONES: &[&str] = &["pelvis", "spine", "Hand.L", "Hand.R"];

/// Builds a parentless skeleton.
pub fn skeleton(name: &str, bones: &[&str]) -> Skeleton {
    Skeleton::from_names(name, bones.iter().copied()).expect("fixture bones are unique")
}

/// An empty mapping between two skeleton ids.
pub fn empty_mapping(name: &str, source: &str, target: &str) -> BoneMapping {
    BoneMapping::new(name, source, target)
}

/// One location and one rotation channel per bone, with distinct keyframe values.
pub fn walk_animation(bones: &[&str]) -> Animation {
    let mut animation = Animation::new("walk").with_frame_range(1.0, 24.0);
    for (i, bone) in bones.iter().enumerate() {
        let offset = i as f64;
        animation = animation
            .with_channel(AnimationChannel::new(
                *bone,
                "location",
                vec![
                    Keyframe::new(1.0, [offset, 0.0, 0.0]),
                    Keyframe::new(24.0, [offset, 0.5, 0.25]),
                ],
            ))
            .with_channel(AnimationChannel::new(
                *bone,
                "rotation_quaternion",
                vec![Keyframe::new(1.0, [1.0, 0.0, offset * 0.1, 0.0])],
            ));
    }
    animation
}

/// Writes a text bone list (`<stem>.txt`) and returns its path.
pub fn write_bone_list(dir: &Path, stem: &str, bones: &[&str]) -> PathBuf {
    let path = dir.join(format!("{}.txt", stem));
    let mut content = String::from("# exported bone list\n");
    for bone in bones {
        content.push_str(bone);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("write bone list");
    path
}

/// Writes an animation as JSON (`<name>.json`) and returns its path.
pub fn write_animation(dir: &Path, animation: &Animation) -> PathBuf {
    let path = dir.join(format!("{}.json", animation.name));
    let json = animation.to_json_pretty().expect("serialize animation");
    std::fs::write(&path, json).expect("write animation");
    path
}

/// Path as `&str` for CLI-style arguments.
pub fn arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}
