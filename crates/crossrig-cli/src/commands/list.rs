//! List command implementation
//!
//! Lists the mapping library, or the animation library with `--animations`.

use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use crossrig_core::{AnimationLibrary, LibraryEntry, MappingLibrary};
use serde::Serialize;

use super::json_output::{mapping_error_to_json, CommandOutput};
use crate::settings::Settings;

/// Result details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ListResult {
    /// Library directory
    pub dir: String,
    /// `mappings` or `animations`
    pub kind: &'static str,
    /// Saved items sorted by name
    pub entries: Vec<LibraryEntry>,
}

/// Run the list command
///
/// # Arguments
/// * `dir` - Library directory override
/// * `animations` - List the animation library instead of the mapping library
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(dir: Option<&str>, animations: bool, settings: &Settings, json_output: bool) -> Result<ExitCode> {
    let (kind, library_dir, listed) = if animations {
        let library = match dir {
            Some(dir) => AnimationLibrary::new(dir),
            None => settings.animations.clone(),
        };
        ("animations", library.dir().to_path_buf(), library.list())
    } else {
        let library = match dir {
            Some(dir) => MappingLibrary::new(dir),
            None => settings.library.clone(),
        };
        ("mappings", library.dir().to_path_buf(), library.list())
    };

    if json_output {
        match listed {
            Ok(entries) => {
                let result = ListResult {
                    dir: library_dir.display().to_string(),
                    kind,
                    entries,
                };
                CommandOutput::success(result, Vec::new()).print()?;
                return Ok(ExitCode::SUCCESS);
            }
            Err(e) => {
                CommandOutput::<ListResult>::failure(vec![mapping_error_to_json(&e)], Vec::new(), None)
                    .print()?;
                return Ok(ExitCode::from(1));
            }
        }
    }

    let entries = listed
        .with_context(|| format!("Failed to list {} in {}", kind, library_dir.display()))?;
    println!("{} {}", "Library:".cyan().bold(), library_dir.display());
    if entries.is_empty() {
        println!("  {}", format!("(no saved {})", kind).dimmed());
    }
    for entry in &entries {
        if entry.readable {
            println!("  {} {}", entry.name, entry.path.display().to_string().dimmed());
        } else {
            println!(
                "  {} {} {}",
                entry.name.red(),
                "(unreadable)".red(),
                entry.path.display().to_string().dimmed()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
