//! Retarget command implementation
//!
//! Applies a mapping to an animation and writes the retargeted animation as
//! JSON next to the input (or to `--out`). The default output never replaces
//! the input file.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use crossrig_core::{sanitize_filename, DropReason, DroppedChannel, Retargeter};
use serde::Serialize;

use super::json_output::{issue_to_json_error, CommandOutput, JsonWarning};
use super::{reporting, StepError};
use crate::input::{load_mapping, load_skeleton, resolve_animation, MappingLocation};
use crate::settings::Settings;

/// Arguments of the retarget command.
#[derive(Debug, Clone, Default)]
pub struct RetargetOptions<'a> {
    /// Mapping path or library name.
    pub mapping: &'a str,
    /// Animation path or animation library name.
    pub animation: &'a str,
    /// Target skeleton file.
    pub target: &'a str,
    /// Output file; defaults to `<output name>.json` beside the animation.
    pub out: Option<&'a str>,
    /// Output animation name.
    pub name: Option<&'a str>,
    /// Also save the output to the animation library.
    pub save: bool,
}

/// Result details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RetargetResult {
    /// Output animation name
    pub animation: String,
    /// Where the output was written
    pub path: PathBuf,
    /// Animation library copy, with `--save`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
    /// Channels in the source animation
    pub source_channel_count: usize,
    /// Channels written
    pub mapped_channel_count: usize,
    /// Channels dropped
    pub dropped_channels: Vec<DroppedChannel>,
}

enum Outcome {
    Blocked(Vec<crossrig_core::ValidationIssue>),
    Written(RetargetResult),
}

/// `<dir of input>/<output name>.json`, with a `_retargeted` suffix when that is the input itself.
fn default_output_path(input: &Path, output_name: &str) -> PathBuf {
    let dir = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = sanitize_filename(output_name);
    let path = dir.join(format!("{}.json", stem));
    if same_file(&path, input) {
        dir.join(format!("{}_retargeted.json", stem))
    } else {
        path
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn execute(opts: &RetargetOptions<'_>, settings: &Settings) -> std::result::Result<Outcome, StepError> {
    let mapping = load_mapping(&MappingLocation::resolve(opts.mapping, &settings.library))
        .map_err(|e| StepError::input(opts.mapping, e))?;
    let loaded = resolve_animation(opts.animation, &settings.animations)
        .map_err(|e| StepError::input(opts.animation, e))?;
    let animation = loaded.animation;
    let skeleton = load_skeleton(Path::new(opts.target))
        .map_err(|e| StepError::input(opts.target, e))?
        .skeleton;

    let blocking: Vec<_> = mapping
        .check()
        .into_iter()
        .chain(animation.check())
        .filter(|i| i.is_blocking())
        .collect();
    if !blocking.is_empty() {
        return Ok(Outcome::Blocked(blocking));
    }

    let retargeter = match opts.name {
        Some(name) => Retargeter::with_name(name),
        None => Retargeter::new(),
    };
    let (output, report) = retargeter.apply(&animation, &mapping, skeleton.bone_names())?;

    let path = match opts.out {
        Some(out) => PathBuf::from(out),
        None => default_output_path(&loaded.path, &output.name),
    };
    let json = output.to_json_pretty()?;
    std::fs::write(&path, json).map_err(crossrig_core::MappingError::from)?;
    let saved_to = if opts.save {
        Some(settings.animations.save(&output)?)
    } else {
        None
    };

    Ok(Outcome::Written(RetargetResult {
        animation: output.name,
        path,
        saved_to,
        source_channel_count: animation.channels.len(),
        mapped_channel_count: report.mapped_channel_count,
        dropped_channels: report.dropped_channels,
    }))
}

/// Nothing transferred from an animation that had something to transfer.
fn transferred_nothing(result: &RetargetResult) -> bool {
    result.source_channel_count > 0 && result.mapped_channel_count == 0
}

/// Run the retarget command
///
/// # Returns
/// Exit code: 0 on success, 1 on error or when no channel could be transferred
pub fn run(opts: &RetargetOptions<'_>, settings: &Settings, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(opts, settings)
    } else {
        run_human(opts, settings)
    }
}

/// Run retarget with human-readable (colored) output
fn run_human(opts: &RetargetOptions<'_>, settings: &Settings) -> Result<ExitCode> {
    println!(
        "{} {} {} {}",
        "Retargeting:".cyan().bold(),
        opts.animation,
        "->".dimmed(),
        opts.target
    );

    let result = match execute(opts, settings)? {
        Outcome::Written(result) => result,
        Outcome::Blocked(issues) => {
            reporting::print_issues(&issues);
            println!(
                "\n{} Mapping or animation is structurally invalid",
                "FAILED".red().bold()
            );
            return Ok(ExitCode::from(1));
        }
    };

    if !result.dropped_channels.is_empty() {
        println!("\n{}", "Dropped channels:".yellow().bold());
        for dropped in &result.dropped_channels {
            let why = match (&dropped.reason, &dropped.target_bone) {
                (DropReason::TargetBoneMissing, Some(target)) => {
                    format!("target bone '{}' not in skeleton", target)
                }
                (reason, _) => reason.to_string(),
            };
            println!(
                "  {} {} {} ({})",
                "!".yellow(),
                dropped.source_bone,
                dropped.property_path.dimmed(),
                why
            );
        }
    }

    if transferred_nothing(&result) {
        println!(
            "\n{} No channel could be transferred; wrote {}",
            "FAILED".red().bold(),
            result.path.display()
        );
        return Ok(ExitCode::from(1));
    }

    println!(
        "\n{} Transferred {}/{} channel(s) to {}",
        "SUCCESS".green().bold(),
        result.mapped_channel_count,
        result.source_channel_count,
        result.path.display()
    );
    if let Some(saved) = &result.saved_to {
        println!("  {} {}", "Saved to library:".dimmed(), saved.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Run retarget with machine-readable JSON output
fn run_json(opts: &RetargetOptions<'_>, settings: &Settings) -> Result<ExitCode> {
    let result = match execute(opts, settings) {
        Ok(Outcome::Written(result)) => result,
        Ok(Outcome::Blocked(issues)) => {
            let errors = issues.iter().map(issue_to_json_error).collect();
            CommandOutput::<RetargetResult>::failure(errors, Vec::new(), None).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => {
            CommandOutput::<RetargetResult>::failure(vec![e.to_json()], Vec::new(), None).print()?;
            return Ok(ExitCode::from(1));
        }
    };

    let warnings: Vec<_> = result
        .dropped_channels
        .iter()
        .map(|d| {
            let code = match d.reason {
                DropReason::Unmapped => "W001",
                DropReason::TargetBoneMissing => "W002",
            };
            JsonWarning::new(
                code,
                format!("dropped {} '{}' ({})", d.source_bone, d.property_path, d.reason),
            )
            .with_bone(&d.source_bone)
        })
        .collect();

    if transferred_nothing(&result) {
        CommandOutput::failure(Vec::new(), warnings, Some(result)).print()?;
        return Ok(ExitCode::from(1));
    }
    CommandOutput::success(result, warnings).print()?;
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossrig_core::{persist, Animation, BoneMapping, MappingEntry};

    fn fixture(dir: &Path) -> (String, String, String) {
        let mut mapping = BoneMapping::new("to_rig", "src", "dst");
        mapping
            .add_or_replace(MappingEntry::manual("Hips", "Root"))
            .unwrap();
        mapping
            .add_or_replace(MappingEntry::auto("Spine", "spine_01", 0.8))
            .unwrap();
        let mapping_path = dir.join("m.json");
        persist::save_to_file(&mapping, &mapping_path).unwrap();

        let anim_path = dir.join("walk.json");
        std::fs::write(
            &anim_path,
            r#"{"name": "walk", "frame_range": {"start": 1, "end": 24}, "channels": [
                {"bone_name": "Hips", "property_path": "location",
                 "keyframes": [{"time": 1, "value": [0.0, 0.0, 1.0]}]},
                {"bone_name": "Spine", "property_path": "rotation_quaternion", "keyframes": []},
                {"bone_name": "Head", "property_path": "rotation_quaternion", "keyframes": []}
            ]}"#,
        )
        .unwrap();

        let rig_path = dir.join("rig.txt");
        std::fs::write(&rig_path, "Root\nhead\n").unwrap();

        let s = |p: PathBuf| p.to_str().unwrap().to_string();
        (s(mapping_path), s(anim_path), s(rig_path))
    }

    #[test]
    fn test_retarget_writes_partial_output() {
        let tmp = tempfile::tempdir().unwrap();
        let (m, a, t) = fixture(tmp.path());
        let opts = RetargetOptions {
            mapping: &m,
            animation: &a,
            target: &t,
            ..Default::default()
        };

        let result = match execute(&opts, &Settings::load(None).unwrap()).unwrap() {
            Outcome::Written(result) => result,
            Outcome::Blocked(_) => panic!("mapping should be valid"),
        };
        assert_eq!(result.animation, "walk_to_rig");
        assert_eq!(result.path, tmp.path().join("walk_to_rig.json"));
        assert_eq!(result.mapped_channel_count, 1);
        assert_eq!(result.dropped_channels.len(), 2);

        let written = Animation::from_json(&std::fs::read_to_string(&result.path).unwrap()).unwrap();
        assert_eq!(written.channels.len(), 1);
        assert_eq!(written.channels[0].bone_name, "Root");
        assert!(written.frame_range.is_some());
    }

    #[test]
    fn test_retarget_nothing_transferred_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let (m, a, _) = fixture(tmp.path());
        let empty_rig = tmp.path().join("empty.txt");
        std::fs::write(&empty_rig, "# no bones\n").unwrap();
        let out = tmp.path().join("out.json");

        let opts = RetargetOptions {
            mapping: &m,
            animation: &a,
            target: empty_rig.to_str().unwrap(),
            out: out.to_str(),
            name: Some("walk_empty"),
            save: false,
        };
        let code = run(&opts, &Settings::load(None).unwrap(), true).unwrap();
        assert_eq!(code, ExitCode::from(1));
        assert!(out.is_file());
    }

    #[test]
    fn test_retarget_blocked_by_invalid_mapping() {
        let tmp = tempfile::tempdir().unwrap();
        let (_, a, t) = fixture(tmp.path());
        let bad = tmp.path().join("bad.json");
        persist::save_to_file(&BoneMapping::new("bad", "", "dst"), &bad).unwrap();

        let opts = RetargetOptions {
            mapping: bad.to_str().unwrap(),
            animation: &a,
            target: &t,
            ..Default::default()
        };
        assert!(matches!(
            execute(&opts, &Settings::load(None).unwrap()),
            Ok(Outcome::Blocked(_))
        ));
    }

    #[test]
    fn test_retarget_blocked_by_inverted_frame_range() {
        let tmp = tempfile::tempdir().unwrap();
        let (m, _, t) = fixture(tmp.path());
        let anim = tmp.path().join("inverted.json");
        std::fs::write(
            &anim,
            r#"{"name": "walk", "frame_range": {"start": 24, "end": 1}, "channels": [
                {"bone_name": "Hips", "property_path": "location", "keyframes": []}
            ]}"#,
        )
        .unwrap();

        let opts = RetargetOptions {
            mapping: &m,
            animation: anim.to_str().unwrap(),
            target: &t,
            ..Default::default()
        };
        match execute(&opts, &Settings::load(None).unwrap()).unwrap() {
            Outcome::Blocked(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].code, crossrig_core::IssueCode::InvalidFrameRange);
            }
            Outcome::Written(_) => panic!("inverted frame range should block"),
        }
        assert!(!tmp.path().join("walk_to_rig.json").exists());
    }

    #[test]
    fn test_default_output_never_replaces_input() {
        let tmp = tempfile::tempdir().unwrap();
        let (m, a, t) = fixture(tmp.path());
        // The input file is named exactly like the default output `walk_to_rig.json`.
        let input = tmp.path().join("walk_to_rig.json");
        std::fs::rename(&a, &input).unwrap();
        let original = std::fs::read_to_string(&input).unwrap();

        let opts = RetargetOptions {
            mapping: &m,
            animation: input.to_str().unwrap(),
            target: &t,
            ..Default::default()
        };
        let result = match execute(&opts, &Settings::load(None).unwrap()).unwrap() {
            Outcome::Written(result) => result,
            Outcome::Blocked(_) => panic!("mapping should be valid"),
        };
        assert_eq!(result.path, tmp.path().join("walk_to_rig_retargeted.json"));
        assert_eq!(std::fs::read_to_string(&input).unwrap(), original);
        assert_eq!(
            default_output_path(&tmp.path().join("walk.json"), "walk_to_rig"),
            tmp.path().join("walk_to_rig.json")
        );
    }

    #[test]
    fn test_retarget_from_library_and_save() {
        let tmp = tempfile::tempdir().unwrap();
        let (m, a, t) = fixture(tmp.path());
        let settings = Settings::load(None)
            .unwrap()
            .with_animation_dir(tmp.path().join("anims"));
        let walk = Animation::from_json(&std::fs::read_to_string(&a).unwrap()).unwrap();
        settings.animations.save(&walk).unwrap();
        let out = tmp.path().join("out.json");

        let opts = RetargetOptions {
            mapping: &m,
            animation: "walk",
            target: &t,
            out: out.to_str(),
            name: None,
            save: true,
        };
        let result = match execute(&opts, &settings).unwrap() {
            Outcome::Written(result) => result,
            Outcome::Blocked(_) => panic!("mapping should be valid"),
        };
        assert_eq!(result.path, out);
        assert_eq!(
            result.saved_to.as_deref(),
            Some(settings.animations.path_for("walk_to_rig").as_path())
        );
        let saved = settings.animations.load("walk_to_rig").unwrap();
        assert_eq!(saved.channels[0].bone_name, "Root");
    }
}
