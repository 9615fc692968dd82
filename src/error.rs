//! Error types for wslocate
//!
//! Every failure that can happen while talking to WSL or the host shell

use thiserror::Error;

/// Main error type for wslocate operations
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output of '{0}' is not valid UTF-8")]
    Decode(String),

    #[error("'{program}' exited with {}: {stderr}", .code.map_or_else(|| "no exit code".to_string(), |c| format!("code {}", c)))]
    ToolFailed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("WSL: {0}")]
    Bridge(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Please enter a search term")]
    EmptyTerm,

    #[error("Could not translate '{0}' to a Windows path")]
    PathTranslation(String),

    #[error("Failed to open Explorer: {0}")]
    Explorer(std::io::Error),

    #[error("Background worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("GUI error: {0}")]
    Gui(String),
}

/// Result type alias for wslocate operations
pub type Result<T> = std::result::Result<T, LocateError>;

impl LocateError {
    /// True when the error comes from what the user typed rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(self, LocateError::EmptyTerm)
    }
}
