use std::time::Duration;

use thiserror::Error;

/// Result type alias using AnalyzerError
pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Target could not be reached and the run cannot continue
    #[error("The URL cannot be reached: {target}")]
    Unreachable { target: String },

    /// External command exited unsuccessfully
    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("`{program}` did not finish within {timeout:?}")]
    CommandTimedOut { program: String, timeout: Duration },

    #[error("Superuser privileges are required to {action}")]
    InsufficientPrivilege { action: String },

    #[error("Update checks are not supported on {os}")]
    UnsupportedPlatform { os: String },

    /// Output of an external tool could not be interpreted
    #[error("Unexpected output from {source_name}: {message}")]
    InvalidOutput {
        source_name: String,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AnalyzerError {
    pub fn unreachable(target: impl Into<String>) -> Self {
        Self::Unreachable {
            target: target.into(),
        }
    }

    pub fn invalid_output(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOutput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn insufficient_privilege(action: impl Into<String>) -> Self {
        Self::InsufficientPrivilege {
            action: action.into(),
        }
    }
}
