//! Show command implementation

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use crossrig_core::{BoneMapping, MappingEntry};
use serde::Serialize;

use super::json_output::{issue_to_json_warning, CommandOutput};
use super::{reporting, StepError};
use crate::input::{load_mapping, MappingLocation};
use crate::settings::Settings;

/// Result details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ShowResult {
    /// Mapping name
    pub name: String,
    /// Description
    pub description: String,
    /// Source skeleton id
    pub source_skeleton_id: String,
    /// Target skeleton id
    pub target_skeleton_id: String,
    /// Document version
    pub version: String,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Entries in order
    pub entries: Vec<MappingEntry>,
    /// Entry-set fingerprint
    pub fingerprint: String,
}

impl From<&BoneMapping> for ShowResult {
    fn from(mapping: &BoneMapping) -> Self {
        Self {
            name: mapping.name.clone(),
            description: mapping.description.clone(),
            source_skeleton_id: mapping.source_skeleton_id.clone(),
            target_skeleton_id: mapping.target_skeleton_id.clone(),
            version: mapping.version.clone(),
            created_at: mapping.created_at.to_rfc3339(),
            entries: mapping.entries().to_vec(),
            fingerprint: mapping.fingerprint(),
        }
    }
}

/// Run the show command
///
/// # Returns
/// Exit code: 0 on success, 1 on error
pub fn run(mapping_arg: &str, settings: &Settings, json_output: bool) -> Result<ExitCode> {
    let location = MappingLocation::resolve(mapping_arg, &settings.library);
    let mapping = match load_mapping(&location) {
        Ok(mapping) => mapping,
        Err(e) => {
            let e = StepError::input(mapping_arg, e);
            if json_output {
                CommandOutput::<ShowResult>::failure(vec![e.to_json()], Vec::new(), None)
                    .print()?;
                return Ok(ExitCode::from(1));
            }
            return Err(e.into());
        }
    };
    let issues = mapping.check();

    if json_output {
        let warnings = issues.iter().map(issue_to_json_warning).collect();
        CommandOutput::success(ShowResult::from(&mapping), warnings).print()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", mapping.summary().bold());
    println!("{} {}", "File:".dimmed(), location.path().display());
    println!("{} {}", "Fingerprint:".dimmed(), &mapping.fingerprint()[..16]);
    println!();
    reporting::print_entries(&mapping, settings.config.low_confidence);
    reporting::print_issues(&issues);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossrig_core::persist;

    #[test]
    fn test_show_result_from_mapping() {
        let mut mapping = BoneMapping::new("m", "src", "dst").with_description("d");
        mapping
            .add_or_replace(MappingEntry::manual("Hips", "Root"))
            .unwrap();

        let result = ShowResult::from(&mapping);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.fingerprint, mapping.fingerprint());
        assert_eq!(result.version, "1.0");
    }

    #[test]
    fn test_show_runs_on_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("m.json");
        persist::save_to_file(&BoneMapping::new("m", "src", "dst"), &path).unwrap();
        let settings = Settings::load(None).unwrap();

        let code = run(path.to_str().unwrap(), &settings, true).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        let code = run("/nonexistent/m.json", &settings, true).unwrap();
        assert_eq!(code, ExitCode::from(1));
    }
}
