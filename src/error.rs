//! Error types for tasktracker
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad block config, folder or note not found)
//! - 4: Operation failed (unreadable note, io, watcher)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the tasktracker CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tasktracker operations
#[derive(Error, Debug)]
pub enum Error {
    // Config errors (exit code 2)
    #[error("{}", missing_field_message(.0))]
    MissingField(&'static str),

    #[error("Invalid tracker block: {0}")]
    InvalidBlock(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Lookup errors (exit code 2)
    #[error("Invalid path: folder '{0}' not found")]
    FolderNotFound(String),

    #[error("File not found: {file_name}.md in '{folder}'")]
    DocumentNotFound { folder: String, file_name: String },

    // Operation failures (exit code 4)
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Path outside vault: {0}")]
    OutsideVault(PathBuf),
}

fn missing_field_message(field: &str) -> String {
    match field {
        "path" => "Invalid path".to_string(),
        "fileName" => "File name is not provided".to_string(),
        other => format!("Missing required field: {other}"),
    }
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MissingField(_)
            | Error::InvalidBlock(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::FolderNotFound(_)
            | Error::DocumentNotFound { .. }
            | Error::OutsideVault(_) => exit_codes::USER_ERROR,

            Error::Read { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::Watch(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured fields for errors that carry more than a message.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::MissingField(field) => Some(serde_json::json!({ "field": field })),
            Error::FolderNotFound(folder) => Some(serde_json::json!({ "folder": folder })),
            Error::DocumentNotFound { folder, file_name } => Some(serde_json::json!({
                "folder": folder,
                "file_name": file_name,
            })),
            Error::Read { path, .. } => Some(serde_json::json!({ "path": path })),
            Error::InvalidBlock(message) | Error::InvalidConfig(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            _ => None,
        }
    }

    /// True for the build-time failures that must leave no subscription behind.
    pub fn is_build_failure(&self) -> bool {
        matches!(
            self,
            Error::MissingField(_)
                | Error::InvalidBlock(_)
                | Error::FolderNotFound(_)
                | Error::DocumentNotFound { .. }
        )
    }
}

/// Result type alias for tasktracker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
