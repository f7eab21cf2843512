//! Common error types for MMA

use thiserror::Error;

/// Common result type for MMA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared by the pipeline and its front ends
///
/// A missing optional column is deliberately absent from this list: scenarios
/// that need one return `None` instead of failing the computation.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed CSV that could not be read even in lenient mode
    #[error("Parse error in {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    /// No usable table after classification and merging
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// A filter or selection left nothing to compute on
    #[error("Empty selection: {0}")]
    EmptySelection(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error tagged with the file it came from
    pub fn parse(source_name: impl Into<String>, message: impl ToString) -> Self {
        Error::Parse {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// True for informational states that should be shown rather than aborting
    pub fn is_informational(&self) -> bool {
        matches!(self, Error::EmptySelection(_))
    }
}
