//! Crossrig CLI - bone mapping and animation retargeting between skeletons
//!
//! This binary provides commands for building, editing, inspecting, and
//! applying bone mappings.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crossrig_cli::commands;
use crossrig_cli::commands::automap::AutomapOptions;
use crossrig_cli::commands::retarget::RetargetOptions;
use crossrig_cli::settings::{init_logging, Settings};
use crossrig_core::DEFAULT_SUGGESTION_LIMIT;

/// Crossrig - Bone mapping and animation retargeting
#[derive(Parser)]
#[command(name = "crossrig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log matcher decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a mapping between two skeletons by bone-name similarity
    Automap {
        /// Source skeleton file (JSON or text bone list)
        #[arg(short, long)]
        source: String,

        /// Target skeleton file (JSON or text bone list)
        #[arg(short, long)]
        target: String,

        /// Existing mapping (path or library name) whose manual entries are kept
        #[arg(short, long)]
        mapping: Option<String>,

        /// Minimum confidence for an automatic entry (0.0 - 1.0)
        #[arg(long)]
        threshold: Option<f64>,

        /// Mapping name (default: `<source>_to_<target>`)
        #[arg(short, long)]
        name: Option<String>,

        /// Mapping description
        #[arg(short, long)]
        description: Option<String>,

        /// Output file (default: save to the mapping library)
        #[arg(short, long)]
        out: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Assign a source bone to a target bone by hand
    Map {
        /// Mapping path or library name
        #[arg(short, long)]
        mapping: String,

        /// Source bone
        #[arg(long)]
        source_bone: String,

        /// Target bone
        #[arg(long)]
        target_bone: String,

        /// Confidence recorded on the entry (default 1.0)
        #[arg(long)]
        confidence: Option<f64>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Remove the entry for a source bone
    Unmap {
        /// Mapping path or library name
        #[arg(short, long)]
        mapping: String,

        /// Source bone
        #[arg(long)]
        source_bone: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Remove entries from a mapping
    Clear {
        /// Mapping path or library name
        #[arg(short, long)]
        mapping: String,

        /// Only remove automatic entries
        #[arg(long)]
        auto_only: bool,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List the best target candidates for one source bone
    Suggest {
        /// Source bone name
        #[arg(long)]
        source_bone: String,

        /// Target skeleton file (JSON or text bone list)
        #[arg(short, long)]
        target: String,

        /// Maximum number of candidates
        #[arg(short, long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,

        /// Minimum score (default: configured auto-map threshold)
        #[arg(long)]
        threshold: Option<f64>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print a mapping
    Show {
        /// Mapping path or library name
        #[arg(short, long)]
        mapping: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List mappings (or animations) saved in the library
    List {
        /// Library directory (default: configured library)
        #[arg(long)]
        dir: Option<String>,

        /// List the animation library instead of the mapping library
        #[arg(long)]
        animations: bool,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Check that a mapping covers an animation on a target skeleton
    Validate {
        /// Mapping path or library name
        #[arg(short, long)]
        mapping: String,

        /// Animation file (JSON) or animation library name
        #[arg(short, long)]
        animation: String,

        /// Target skeleton file (JSON or text bone list)
        #[arg(short, long)]
        target: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Retarget an animation onto a target skeleton
    Retarget {
        /// Mapping path or library name
        #[arg(short, long)]
        mapping: String,

        /// Animation file (JSON) or animation library name
        #[arg(short, long)]
        animation: String,

        /// Target skeleton file (JSON or text bone list)
        #[arg(short, long)]
        target: String,

        /// Output file (default: `<name>.json` next to the animation)
        #[arg(short, long)]
        out: Option<String>,

        /// Output animation name (default: `<animation>_<mapping>`)
        #[arg(short, long)]
        name: Option<String>,

        /// Also save the output to the animation library
        #[arg(long)]
        save: bool,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn dispatch(command: Commands, settings: &Settings) -> anyhow::Result<ExitCode> {
    match command {
        Commands::Automap {
            source,
            target,
            mapping,
            threshold,
            name,
            description,
            out,
            json,
        } => {
            let opts = AutomapOptions {
                source: &source,
                target: &target,
                mapping: mapping.as_deref(),
                threshold,
                name: name.as_deref(),
                description: description.as_deref(),
                out: out.as_deref(),
            };
            commands::automap::run(&opts, settings, json)
        }
        Commands::Map {
            mapping,
            source_bone,
            target_bone,
            confidence,
            json,
        } => commands::map::run_map(&mapping, &source_bone, &target_bone, confidence, settings, json),
        Commands::Unmap {
            mapping,
            source_bone,
            json,
        } => commands::map::run_unmap(&mapping, &source_bone, settings, json),
        Commands::Clear {
            mapping,
            auto_only,
            json,
        } => commands::map::run_clear(&mapping, auto_only, settings, json),
        Commands::Suggest {
            source_bone,
            target,
            limit,
            threshold,
            json,
        } => commands::suggest::run(&source_bone, &target, limit, threshold, settings, json),
        Commands::Show { mapping, json } => commands::show::run(&mapping, settings, json),
        Commands::List {
            dir,
            animations,
            json,
        } => commands::list::run(dir.as_deref(), animations, settings, json),
        Commands::Validate {
            mapping,
            animation,
            target,
            json,
        } => commands::validate::run(&mapping, &animation, &target, settings, json),
        Commands::Retarget {
            mapping,
            animation,
            target,
            out,
            name,
            save,
            json,
        } => {
            let opts = RetargetOptions {
                mapping: &mapping,
                animation: &animation,
                target: &target,
                out: out.as_deref(),
                name: name.as_deref(),
                save,
            };
            commands::retarget::run(&opts, settings, json)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result =
        Settings::load(cli.config.as_deref()).and_then(|settings| dispatch(cli.command, &settings));

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_automap() {
        let cli = Cli::try_parse_from([
            "crossrig",
            "automap",
            "--source",
            "mixamo.json",
            "--target",
            "rig.txt",
            "--threshold",
            "0.8",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Automap {
                source,
                target,
                threshold,
                mapping,
                json,
                ..
            } => {
                assert_eq!(source, "mixamo.json");
                assert_eq!(target, "rig.txt");
                assert_eq!(threshold, Some(0.8));
                assert!(mapping.is_none());
                assert!(json);
            }
            _ => panic!("expected automap command"),
        }
    }

    #[test]
    fn test_cli_parses_map() {
        let cli = Cli::try_parse_from([
            "crossrig",
            "map",
            "--mapping",
            "mixamo_to_rig",
            "--source-bone",
            "mixamorig:Hips",
            "--target-bone",
            "Root",
        ])
        .unwrap();
        match cli.command {
            Commands::Map {
                mapping,
                source_bone,
                target_bone,
                confidence,
                json,
            } => {
                assert_eq!(mapping, "mixamo_to_rig");
                assert_eq!(source_bone, "mixamorig:Hips");
                assert_eq!(target_bone, "Root");
                assert!(confidence.is_none());
                assert!(!json);
            }
            _ => panic!("expected map command"),
        }
    }

    #[test]
    fn test_cli_suggest_default_limit() {
        let cli = Cli::try_parse_from([
            "crossrig",
            "suggest",
            "--source-bone",
            "LeftHand",
            "--target",
            "rig.txt",
        ])
        .unwrap();
        match cli.command {
            Commands::Suggest { limit, threshold, .. } => {
                assert_eq!(limit, DEFAULT_SUGGESTION_LIMIT);
                assert!(threshold.is_none());
            }
            _ => panic!("expected suggest command"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "crossrig",
            "show",
            "--mapping",
            "mixamo_to_rig",
            "--verbose",
            "--config",
            "crossrig.yaml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("crossrig.yaml"));
        assert!(matches!(cli.command, Commands::Show { .. }));
    }

    #[test]
    fn test_cli_clear_auto_only() {
        let cli = Cli::try_parse_from(["crossrig", "clear", "-m", "m.json", "--auto-only"]).unwrap();
        match cli.command {
            Commands::Clear { auto_only, .. } => assert!(auto_only),
            _ => panic!("expected clear command"),
        }
    }

    #[test]
    fn test_cli_requires_target_for_retarget() {
        let err = Cli::try_parse_from(["crossrig", "retarget", "-m", "m", "-a", "walk.json"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_retarget_save_and_list_animations() {
        let cli = Cli::try_parse_from([
            "crossrig", "retarget", "-m", "m", "-a", "walk", "-t", "rig.txt", "--save",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Retarget { save: true, .. }));

        let cli = Cli::try_parse_from(["crossrig", "list", "--animations"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                animations: true,
                dir: None,
                ..
            }
        ));
    }
}
