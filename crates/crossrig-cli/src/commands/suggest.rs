//! Suggest command implementation
//!
//! Lists the best target candidates for one source bone.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use crossrig_core::{AutoMapConfig, AutoMapper, Suggestion};
use serde::Serialize;

use super::json_output::CommandOutput;
use super::{reporting, StepError};
use crate::input::load_skeleton;
use crate::settings::Settings;

/// Result details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestResult {
    /// Source bone the suggestions are for
    pub source_bone: String,
    /// Threshold used
    pub threshold: f64,
    /// Candidates, best first
    pub suggestions: Vec<Suggestion>,
}

fn execute(
    source_bone: &str,
    target: &str,
    limit: usize,
    threshold: Option<f64>,
    settings: &Settings,
) -> std::result::Result<SuggestResult, StepError> {
    let skeleton = load_skeleton(Path::new(target))
        .map_err(|e| StepError::input(target, e))?
        .skeleton;

    let config = AutoMapConfig {
        threshold: threshold.unwrap_or(settings.config.automap.threshold),
        ..settings.config.automap.clone()
    };
    let mapper = AutoMapper::new(&config)?;
    Ok(SuggestResult {
        source_bone: source_bone.to_string(),
        threshold: mapper.threshold(),
        suggestions: mapper.suggest(source_bone, skeleton.bone_names(), limit),
    })
}

/// Run the suggest command
///
/// # Returns
/// Exit code: 0 on success (even with no candidates), 1 on error
pub fn run(
    source_bone: &str,
    target: &str,
    limit: usize,
    threshold: Option<f64>,
    settings: &Settings,
    json_output: bool,
) -> Result<ExitCode> {
    let result = match execute(source_bone, target, limit, threshold, settings) {
        Ok(result) => result,
        Err(e) if json_output => {
            CommandOutput::<SuggestResult>::failure(vec![e.to_json()], Vec::new(), None).print()?;
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e.into()),
    };

    if json_output {
        CommandOutput::success(result, Vec::new()).print()?;
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Suggestions for:".cyan().bold(), result.source_bone);
    if result.suggestions.is_empty() {
        println!(
            "  {} no target scores at least {:.2}",
            "!".yellow(),
            result.threshold
        );
    }
    for (rank, s) in result.suggestions.iter().enumerate() {
        println!(
            "  {}. {} ({}, {})",
            rank + 1,
            s.target_bone,
            reporting::confidence(s.score, settings.config.low_confidence),
            s.rule.to_string().dimmed()
        );
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossrig_core::MatchRule;

    #[test]
    fn test_suggest_from_text_skeleton() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("rig.txt");
        std::fs::write(&target, "Hand.L\nHand.R\nWrist.L\nFoot.L\n").unwrap();
        let settings = Settings::load(None).unwrap();

        let result = execute(
            "mixamorig:LeftHand",
            target.to_str().unwrap(),
            5,
            None,
            &settings,
        )
        .unwrap();
        let names: Vec<_> = result.suggestions.iter().map(|s| s.target_bone.as_str()).collect();
        assert_eq!(names, vec!["Hand.L", "Wrist.L"]);
        assert_eq!(result.suggestions[1].rule, MatchRule::Alias);
    }

    #[test]
    fn test_suggest_threshold_override() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("rig.txt");
        std::fs::write(&target, "Arm.R\n").unwrap();
        let settings = Settings::load(None).unwrap();

        let result = execute("Arm.L", target.to_str().unwrap(), 5, Some(0.4), &settings).unwrap();
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].score, 0.5);

        assert!(execute("Arm.L", target.to_str().unwrap(), 5, Some(-1.0), &settings).is_err());
    }
}
