//! Validate command implementation
//!
//! Checks a mapping against an animation and a target skeleton before
//! retargeting. Structural problems of the animation itself are reported
//! alongside the coverage issues.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use crossrig_core::{ValidationResult, Validator};
use serde::Serialize;

use super::json_output::{issue_to_json_error, issue_to_json_warning, CommandOutput};
use super::{reporting, StepError};
use crate::input::{load_mapping, load_skeleton, resolve_animation, MappingLocation};
use crate::settings::Settings;

/// Result details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    /// Mapping name
    pub mapping: String,
    /// Fraction of animated bones with an entry
    pub coverage: f64,
    /// Animated bones without an entry
    pub unmapped: Vec<String>,
    /// Mapped target bones missing from the target skeleton
    pub missing_targets: Vec<String>,
    /// Coverage verdict
    pub ok: bool,
}

/// Loads the three inputs and validates.
fn execute(
    mapping_arg: &str,
    animation: &str,
    target: &str,
    settings: &Settings,
) -> std::result::Result<(String, ValidationResult), StepError> {
    let mapping = load_mapping(&MappingLocation::resolve(mapping_arg, &settings.library))
        .map_err(|e| StepError::input(mapping_arg, e))?;
    let anim = resolve_animation(animation, &settings.animations)
        .map_err(|e| StepError::input(animation, e))?
        .animation;
    let skeleton = load_skeleton(Path::new(target))
        .map_err(|e| StepError::input(target, e))?
        .skeleton;

    let mut result = Validator::new(settings.config.low_confidence).validate(
        &mapping,
        anim.bone_names(),
        skeleton.bone_names(),
    );
    let mut issues = anim.check();
    issues.append(&mut result.issues);
    result.issues = issues;
    Ok((mapping.name, result))
}

/// Whether a validation result lets the command succeed.
fn passes(result: &ValidationResult) -> bool {
    result.ok && !result.has_blocking()
}

/// Run the validate command
///
/// # Returns
/// Exit code: 0 if valid, 1 if invalid
pub fn run(
    mapping_arg: &str,
    animation: &str,
    target: &str,
    settings: &Settings,
    json_output: bool,
) -> Result<ExitCode> {
    if json_output {
        run_json(mapping_arg, animation, target, settings)
    } else {
        run_human(mapping_arg, animation, target, settings)
    }
}

/// Run validate with human-readable (colored) output
fn run_human(mapping_arg: &str, animation: &str, target: &str, settings: &Settings) -> Result<ExitCode> {
    println!("{} {}", "Validating:".cyan().bold(), mapping_arg);
    println!("{} {}", "Animation:".dimmed(), animation);
    println!("{} {}", "Target:".dimmed(), target);

    let (_, result) = execute(mapping_arg, animation, target, settings)?;

    println!(
        "\n{} {:.1}% ({} unmapped, {} missing target bone(s))",
        "Coverage:".bold(),
        result.coverage * 100.0,
        result.unmapped.len(),
        result.missing_targets.len()
    );
    reporting::print_issues(&result.issues);

    if passes(&result) {
        println!("\n{} Mapping covers the animation", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "\n{} Mapping does not fully cover the animation",
            "FAILED".red().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Run validate with machine-readable JSON output
fn run_json(mapping_arg: &str, animation: &str, target: &str, settings: &Settings) -> Result<ExitCode> {
    let (name, result) = match execute(mapping_arg, animation, target, settings) {
        Ok(outcome) => outcome,
        Err(e) => {
            CommandOutput::<ValidateReport>::failure(vec![e.to_json()], Vec::new(), None).print()?;
            return Ok(ExitCode::from(1));
        }
    };

    let errors: Vec<_> = result.blocking().map(issue_to_json_error).collect();
    let warnings: Vec<_> = result.advisories().map(issue_to_json_warning).collect();
    let passed = passes(&result);
    let report = ValidateReport {
        mapping: name,
        coverage: result.coverage,
        unmapped: result.unmapped.into_iter().collect(),
        missing_targets: result.missing_targets.into_iter().collect(),
        ok: result.ok,
    };

    let output = if passed {
        CommandOutput::success(report, warnings)
    } else {
        CommandOutput::failure(errors, warnings, Some(report))
    };
    output.print()?;

    if passed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
