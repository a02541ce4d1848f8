//! Configuration and logging setup shared by all commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossrig_core::{AnimationLibrary, CrossrigConfig, MappingLibrary};
use tracing_subscriber::EnvFilter;

/// Library directory under the home directory.
pub const DEFAULT_LIBRARY_SUBDIR: &str = ".crossrig/mappings";

/// Animation library directory under the home directory.
pub const DEFAULT_ANIMATION_SUBDIR: &str = ".crossrig/animations";

/// Settings resolved from global flags and the config file.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Parsed configuration (defaults when no file was given).
    pub config: CrossrigConfig,
    /// Mapping library used for name lookups and saves.
    pub library: MappingLibrary,
    /// Animation library used for `--animation` name lookups and `retarget --save`.
    pub animations: AnimationLibrary,
}

impl Settings {
    /// Loads the config file, if any, and picks the library directory.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(path) => CrossrigConfig::load(Path::new(path))
                .with_context(|| format!("Failed to load config file: {}", path))?,
            None => CrossrigConfig::default(),
        };
        let dir = config
            .library_dir
            .clone()
            .unwrap_or_else(default_library_dir);
        let animation_dir = config
            .animation_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(DEFAULT_ANIMATION_SUBDIR));
        Ok(Self {
            library: MappingLibrary::new(dir),
            animations: AnimationLibrary::new(animation_dir),
            config,
        })
    }

    /// Uses `dir` as the library instead of the configured one.
    pub fn with_library_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.library = MappingLibrary::new(dir);
        self
    }

    /// Uses `dir` as the animation library instead of the configured one.
    pub fn with_animation_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.animations = AnimationLibrary::new(dir);
        self
    }
}

/// `~/.crossrig/mappings`, or a relative `.crossrig/mappings` without a home directory.
pub fn default_library_dir() -> PathBuf {
    home_dir().join(DEFAULT_LIBRARY_SUBDIR)
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
