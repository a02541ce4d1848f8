//! Automap command implementation
//!
//! Builds a mapping between two skeletons by name similarity and saves it to a
//! file or the mapping library.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use crossrig_core::{persist, AutoMapper, BoneMapping, MappingEntry};
use serde::Serialize;

use super::json_output::{CommandOutput, JsonWarning};
use super::{reporting, StepError};
use crate::input::{load_mapping, load_skeleton, MappingLocation};
use crate::settings::Settings;

/// Arguments of the automap command.
#[derive(Debug, Clone, Default)]
pub struct AutomapOptions<'a> {
    /// Source skeleton file.
    pub source: &'a str,
    /// Target skeleton file.
    pub target: &'a str,
    /// Existing mapping whose manual entries are kept.
    pub mapping: Option<&'a str>,
    /// Threshold override.
    pub threshold: Option<f64>,
    /// Mapping name override.
    pub name: Option<&'a str>,
    /// Description override.
    pub description: Option<&'a str>,
    /// Output file; the library is used when absent.
    pub out: Option<&'a str>,
}

/// Result details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct AutomapResult {
    /// Mapping name
    pub name: String,
    /// Where the mapping was written
    pub path: PathBuf,
    /// Threshold used
    pub threshold: f64,
    /// All entries
    pub entries: Vec<MappingEntry>,
    /// Number of auto entries
    pub auto_count: usize,
    /// Number of manual entries
    pub manual_count: usize,
    /// Source bones left unmapped
    pub unmapped_sources: Vec<String>,
    /// Target bones no entry points at
    pub unmapped_targets: Vec<String>,
    /// Entry-set fingerprint
    pub fingerprint: String,
}

struct Outcome {
    mapping: BoneMapping,
    result: AutomapResult,
}

fn execute(opts: &AutomapOptions<'_>, settings: &Settings) -> std::result::Result<Outcome, StepError> {
    let source = load_skeleton(Path::new(opts.source))
        .map_err(|e| StepError::input(opts.source, e))?
        .skeleton;
    let target = load_skeleton(Path::new(opts.target))
        .map_err(|e| StepError::input(opts.target, e))?
        .skeleton;

    let mut existing = match opts.mapping {
        Some(arg) => load_mapping(&MappingLocation::resolve(arg, &settings.library))
            .map_err(|e| StepError::input(arg, e))?,
        None => BoneMapping::new(
            format!("{}_to_{}", source.name, target.name),
            &source.name,
            &target.name,
        ),
    };
    if let Some(name) = opts.name {
        existing.name = name.to_string();
    }
    if let Some(description) = opts.description {
        existing.description = description.to_string();
    }

    let mut config = settings.config.automap.clone();
    if let Some(threshold) = opts.threshold {
        config.threshold = threshold;
    }
    let mapper = AutoMapper::new(&config)?;
    let mapping = mapper.auto_map(source.bone_names(), target.bone_names(), &existing)?;

    let path = match opts.out {
        Some(out) => {
            let path = PathBuf::from(out);
            persist::save_to_file(&mapping, &path)?;
            path
        }
        None => settings.library.save(&mapping)?,
    };

    let result = AutomapResult {
        name: mapping.name.clone(),
        path,
        threshold: mapper.threshold(),
        entries: mapping.entries().to_vec(),
        auto_count: mapping.auto_count(),
        manual_count: mapping.manual_count(),
        unmapped_sources: owned(mapping.unmapped_sources(source.bone_names())),
        unmapped_targets: owned(mapping.unmapped_targets(target.bone_names())),
        fingerprint: mapping.fingerprint(),
    };
    Ok(Outcome { mapping, result })
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

/// Run the automap command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(opts: &AutomapOptions<'_>, settings: &Settings, json_output: bool) -> Result<ExitCode> {
    if json_output {
        run_json(opts, settings)
    } else {
        run_human(opts, settings)
    }
}

/// Run automap with human-readable (colored) output
fn run_human(opts: &AutomapOptions<'_>, settings: &Settings) -> Result<ExitCode> {
    println!(
        "{} {} {} {}",
        "Auto-mapping:".cyan().bold(),
        opts.source,
        "->".dimmed(),
        opts.target
    );

    let Outcome { mapping, result } = execute(opts, settings)?;
    println!("{} {:.2}", "Threshold:".dimmed(), result.threshold);
    println!();
    reporting::print_entries(&mapping, settings.config.low_confidence);

    reporting::print_bone_list("Unmapped source bones", &result.unmapped_sources);
    reporting::print_bone_list("Unused target bones", &result.unmapped_targets);

    println!(
        "\n{} Mapped {} bone(s) ({} auto, {} manual); saved to {}",
        "SUCCESS".green().bold(),
        mapping.len(),
        result.auto_count,
        result.manual_count,
        result.path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Run automap with machine-readable JSON output
fn run_json(opts: &AutomapOptions<'_>, settings: &Settings) -> Result<ExitCode> {
    match execute(opts, settings) {
        Ok(Outcome { result, .. }) => {
            let warnings = result
                .unmapped_sources
                .iter()
                .map(|bone| {
                    JsonWarning::new("W001", format!("source bone '{}' is unmapped", bone))
                        .with_bone(bone)
                })
                .collect();
            CommandOutput::success(result, warnings).print()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            CommandOutput::<AutomapResult>::failure(vec![e.to_json()], Vec::new(), None).print()?;
            Ok(ExitCode::from(1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossrig_core::{MappingLibrary, MappingOrigin};

    fn write(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn settings(dir: &Path) -> Settings {
        Settings::load(None).unwrap().with_library_dir(dir.join("lib"))
    }

    #[test]
    fn test_automap_to_library() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write(tmp.path(), "ns.txt", "ns:Hips\nns:LeftArm\nns:RightArm\n");
        let target = write(tmp.path(), "rig.txt", "Root\nUpperArm.L\nUpperArm.R\n");
        let settings = settings(tmp.path());

        let opts = AutomapOptions {
            source: &source,
            target: &target,
            ..Default::default()
        };
        let Outcome { mapping, result } = execute(&opts, &settings).unwrap();

        assert_eq!(mapping.name, "ns_to_rig");
        assert_eq!(mapping.len(), 3);
        assert!(result.unmapped_sources.is_empty());
        assert_eq!(result.path, settings.library.path_for("ns_to_rig"));
        assert!(result.path.is_file());
    }

    #[test]
    fn test_automap_keeps_manual_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write(tmp.path(), "src.txt", "Hips\nSpine\n");
        let target = write(tmp.path(), "dst.txt", "Hips\nSpine\n");
        let out = tmp.path().join("m.json");

        let mut existing = BoneMapping::new("m", "src", "dst");
        existing
            .add_or_replace(MappingEntry::manual("Hips", "Spine"))
            .unwrap();
        persist::save_to_file(&existing, &out).unwrap();
        let out = out.to_str().unwrap().to_string();

        let opts = AutomapOptions {
            source: &source,
            target: &target,
            mapping: Some(&out),
            out: Some(&out),
            ..Default::default()
        };
        let Outcome { mapping, .. } = execute(&opts, &settings(tmp.path())).unwrap();
        assert_eq!(mapping.get("Hips").map(|e| e.origin), Some(MappingOrigin::Manual));
        assert_eq!(mapping.target_for("Hips"), Some("Spine"));

        let reloaded = persist::load_from_file(Path::new(&out)).unwrap();
        assert!(reloaded.same_entries(&mapping));
    }

    #[test]
    fn test_automap_rejects_threshold() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write(tmp.path(), "src.txt", "Hips\n");
        let opts = AutomapOptions {
            source: &source,
            target: &source,
            threshold: Some(1.5),
            ..Default::default()
        };
        let err = execute(&opts, &settings(tmp.path())).err().unwrap();
        assert_eq!(err.to_json().code, "CLI_004");
        assert!(MappingLibrary::new(tmp.path().join("lib")).list().unwrap().is_empty());
    }

    #[test]
    fn test_automap_missing_skeleton() {
        let tmp = tempfile::tempdir().unwrap();
        let opts = AutomapOptions {
            source: "/nonexistent/src.txt",
            target: "/nonexistent/dst.txt",
            ..Default::default()
        };
        let err = execute(&opts, &settings(tmp.path())).err().unwrap();
        let json = err.to_json();
        assert_eq!(json.code, "CLI_001");
        assert_eq!(json.file.as_deref(), Some("/nonexistent/src.txt"));
    }
}
