//! Manual mapping edits: `map`, `unmap`, and `clear`.
//!
//! Each command loads the mapping, applies one edit, and writes it back to
//! where it was loaded from.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use crossrig_core::{persist, BoneMapping, MappingEntry, MappingOrigin};
use serde::Serialize;

use super::json_output::{error_codes, print_error, CommandOutput, JsonError};
use super::{reporting, StepError};
use crate::input::{load_mapping, MappingLocation};
use crate::settings::Settings;

/// Result details for `map`.
#[derive(Debug, Clone, Serialize)]
pub struct MapResult {
    /// Mapping name
    pub mapping: String,
    /// The entry written
    pub entry: MappingEntry,
    /// Entries replaced or evicted by the edit
    pub displaced: Vec<MappingEntry>,
}

/// Result details for `unmap`.
#[derive(Debug, Clone, Serialize)]
pub struct UnmapResult {
    /// Mapping name
    pub mapping: String,
    /// The removed entry
    pub removed: MappingEntry,
}

/// Result details for `clear`.
#[derive(Debug, Clone, Serialize)]
pub struct ClearResult {
    /// Mapping name
    pub mapping: String,
    /// Number of entries removed
    pub removed: usize,
    /// Number of entries left
    pub remaining: usize,
}

fn open(arg: &str, settings: &Settings) -> std::result::Result<(MappingLocation, BoneMapping), StepError> {
    let location = MappingLocation::resolve(arg, &settings.library);
    let mapping = load_mapping(&location).map_err(|e| StepError::input(arg, e))?;
    Ok((location, mapping))
}

fn store(location: &MappingLocation, mapping: &BoneMapping) -> std::result::Result<(), StepError> {
    persist::save_to_file(mapping, location.path())?;
    Ok(())
}

fn fail(json_output: bool, error: StepError) -> Result<ExitCode> {
    if json_output {
        print_error(error.to_json())?;
        Ok(ExitCode::from(1))
    } else {
        Err(error.into())
    }
}

/// Run the map command: assign `source_bone -> target_bone` as a manual entry.
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run_map(
    mapping_arg: &str,
    source_bone: &str,
    target_bone: &str,
    confidence: Option<f64>,
    settings: &Settings,
    json_output: bool,
) -> Result<ExitCode> {
    let execute = || -> std::result::Result<MapResult, StepError> {
        let (location, mut mapping) = open(mapping_arg, settings)?;
        let mut entry = MappingEntry::manual(source_bone, target_bone);
        if let Some(confidence) = confidence {
            entry = entry.with_confidence(confidence);
        }
        let displaced = mapping.add_or_replace(entry.clone())?;
        store(&location, &mapping)?;
        Ok(MapResult {
            mapping: mapping.name,
            entry,
            displaced,
        })
    };

    let result = match execute() {
        Ok(result) => result,
        Err(e) => return fail(json_output, e),
    };

    if json_output {
        CommandOutput::success(result, Vec::new()).print()?;
    } else {
        println!("{} {}", "Mapping:".cyan().bold(), result.mapping);
        reporting::print_entry(&result.entry, settings.config.low_confidence);
        for old in &result.displaced {
            println!(
                "  {} replaced {} -> {}",
                "~".yellow(),
                old.source_bone,
                old.target_bone
            );
        }
        println!("\n{} Entry saved", "SUCCESS".green().bold());
    }
    Ok(ExitCode::SUCCESS)
}

/// Run the unmap command: remove the entry for `source_bone`.
///
/// # Returns
/// Exit code: 0 if an entry was removed, 1 if there was none
pub fn run_unmap(
    mapping_arg: &str,
    source_bone: &str,
    settings: &Settings,
    json_output: bool,
) -> Result<ExitCode> {
    let execute = || -> std::result::Result<(String, Option<MappingEntry>), StepError> {
        let (location, mut mapping) = open(mapping_arg, settings)?;
        let removed = mapping.remove(source_bone);
        if removed.is_some() {
            store(&location, &mapping)?;
        }
        Ok((mapping.name, removed))
    };

    let (name, removed) = match execute() {
        Ok(outcome) => outcome,
        Err(e) => return fail(json_output, e),
    };

    match (removed, json_output) {
        (Some(removed), true) => {
            CommandOutput::success(UnmapResult { mapping: name, removed }, Vec::new()).print()?;
            Ok(ExitCode::SUCCESS)
        }
        (Some(removed), false) => {
            println!(
                "{} Removed {} -> {} from {}",
                "SUCCESS".green().bold(),
                removed.source_bone,
                removed.target_bone,
                name
            );
            Ok(ExitCode::SUCCESS)
        }
        (None, true) => {
            print_error(
                JsonError::new(
                    error_codes::MAPPING_ERROR,
                    format!("no entry for source bone '{}'", source_bone),
                )
                .with_bone(source_bone),
            )?;
            Ok(ExitCode::from(1))
        }
        (None, false) => {
            println!(
                "{} No entry for source bone '{}' in {}",
                "FAILED".red().bold(),
                source_bone,
                name
            );
            Ok(ExitCode::from(1))
        }
    }
}

/// Run the clear command: remove all entries, or only automatic ones.
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run_clear(
    mapping_arg: &str,
    auto_only: bool,
    settings: &Settings,
    json_output: bool,
) -> Result<ExitCode> {
    let execute = || -> std::result::Result<ClearResult, StepError> {
        let (location, mut mapping) = open(mapping_arg, settings)?;
        let removed = mapping.clear(auto_only.then_some(MappingOrigin::Auto));
        store(&location, &mapping)?;
        Ok(ClearResult {
            remaining: mapping.len(),
            mapping: mapping.name,
            removed,
        })
    };

    let result = match execute() {
        Ok(result) => result,
        Err(e) => return fail(json_output, e),
    };

    if json_output {
        CommandOutput::success(result, Vec::new()).print()?;
    } else {
        let what = if auto_only { "auto entries" } else { "entries" };
        println!(
            "{} Removed {} {} from {} ({} left)",
            "SUCCESS".green().bold(),
            result.removed,
            what,
            result.mapping,
            result.remaining
        );
    }
    Ok(ExitCode::SUCCESS)
}
