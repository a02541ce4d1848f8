//! JSON output types for machine-readable CLI output.
//!
//! Every command that accepts `--json` prints one [`CommandOutput`] envelope:
//! a success flag, structured errors and warnings, and a command-specific
//! result on success.

use anyhow::Result;
use crossrig_core::{MappingError, ValidationIssue};
use serde::{Deserialize, Serialize};

use crate::input::InputError;

/// Error codes for CLI operations.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: CLI_XXX for CLI-level errors; validation issues pass through their
/// own codes (E001, W001, ...).
pub mod error_codes {
    /// File could not be read
    pub const FILE_READ: &str = "CLI_001";
    /// Unknown file extension
    pub const UNKNOWN_EXTENSION: &str = "CLI_002";
    /// Parse error
    pub const PARSE: &str = "CLI_003";
    /// Mapping operation failed
    pub const MAPPING_ERROR: &str = "CLI_004";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_001", "E001")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Bone the error refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
            bone: None,
        }
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Sets the bone for this error.
    pub fn with_bone(mut self, bone: impl Into<String>) -> Self {
        self.bone = Some(bone.into());
        self
    }
}

/// A structured warning in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonWarning {
    /// Stable warning code (e.g., "W001")
    pub code: String,
    /// Human-readable warning message
    pub message: String,
    /// Bone the warning refers to (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone: Option<String>,
}

impl JsonWarning {
    /// Creates a new warning with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            bone: None,
        }
    }

    /// Sets the bone for this warning.
    pub fn with_bone(mut self, bone: impl Into<String>) -> Self {
        self.bone = Some(bone.into());
        self
    }
}

/// Envelope printed by every `--json` command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput<T: Serialize> {
    /// Whether the command succeeded
    pub success: bool,
    /// Errors (empty on success)
    pub errors: Vec<JsonError>,
    /// Advisory warnings
    pub warnings: Vec<JsonWarning>,
    /// Command-specific result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    /// Creates a successful output.
    pub fn success(result: T, warnings: Vec<JsonWarning>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings,
            result: Some(result),
        }
    }

    /// Creates a failed output, optionally still carrying a result.
    pub fn failure(errors: Vec<JsonError>, warnings: Vec<JsonWarning>, result: Option<T>) -> Self {
        Self {
            success: false,
            errors,
            warnings,
            result,
        }
    }

    /// Prints the output as pretty JSON on stdout.
    pub fn print(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }
}

/// Prints a failure envelope with a single error.
pub fn print_error(error: JsonError) -> Result<()> {
    CommandOutput::<()>::failure(vec![error], Vec::new(), None).print()
}

/// Converts an input error to a JSON error.
pub fn input_error_to_json(err: &InputError, file: Option<&str>) -> JsonError {
    let code = match err {
        InputError::FileRead { .. } => error_codes::FILE_READ,
        InputError::UnknownExtension { .. } => error_codes::UNKNOWN_EXTENSION,
        InputError::Parse { .. } => error_codes::PARSE,
        InputError::Mapping(_) => error_codes::MAPPING_ERROR,
    };
    let error = JsonError::new(code, err.to_string());
    match file {
        Some(file) => error.with_file(file),
        None => error,
    }
}

/// Converts a core error to a JSON error.
pub fn mapping_error_to_json(err: &MappingError) -> JsonError {
    let error = JsonError::new(error_codes::MAPPING_ERROR, err.to_string());
    match err {
        MappingError::ProtectedEntry { source_bone }
        | MappingError::InvalidConfidence { source_bone, .. } => error.with_bone(source_bone),
        _ => error,
    }
}

/// Converts a blocking validation issue to a JSON error.
pub fn issue_to_json_error(issue: &ValidationIssue) -> JsonError {
    let error = JsonError::new(issue.code.code(), &issue.message);
    match &issue.bone {
        Some(bone) => error.with_bone(bone),
        None => error,
    }
}

/// Converts an advisory validation issue to a JSON warning.
pub fn issue_to_json_warning(issue: &ValidationIssue) -> JsonWarning {
    JsonWarning {
        code: issue.code.code().to_string(),
        message: issue.message.clone(),
        bone: issue.bone.clone(),
    }
}
