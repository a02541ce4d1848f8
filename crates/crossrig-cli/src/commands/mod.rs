//! CLI command implementations

pub mod automap;
pub mod json_output;
pub mod list;
pub mod map;
pub mod retarget;
pub mod show;
pub mod suggest;
pub mod validate;

mod reporting;

use crossrig_core::MappingError;

use crate::input::InputError;
use json_output::{input_error_to_json, mapping_error_to_json, JsonError};

/// A failed command step, kept structured so `--json` output can report a code.
#[derive(Debug)]
pub enum StepError {
    /// Loading an input file failed.
    Input {
        /// The path argument as given.
        file: String,
        /// What went wrong.
        error: InputError,
    },
    /// A core operation failed.
    Mapping(MappingError),
}

impl StepError {
    /// Wraps an input error with the file argument it came from.
    pub fn input(file: impl Into<String>, error: InputError) -> Self {
        StepError::Input {
            file: file.into(),
            error,
        }
    }

    /// Converts to a JSON error.
    pub fn to_json(&self) -> JsonError {
        match self {
            StepError::Input { file, error } => input_error_to_json(error, Some(file)),
            StepError::Mapping(e) => mapping_error_to_json(e),
        }
    }
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepError::Input { error, .. } => write!(f, "{}", error),
            StepError::Mapping(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StepError::Input { error, .. } => Some(error),
            StepError::Mapping(e) => Some(e),
        }
    }
}

impl From<MappingError> for StepError {
    fn from(e: MappingError) -> Self {
        StepError::Mapping(e)
    }
}
