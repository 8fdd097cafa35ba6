//! Error types shared by the belts and factory solvers

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while solving a belts or factory instance.
///
/// Every variant is ultimately surfaced to the caller as
/// `{"status": "error", "message": <string>}`, but the taxonomy is kept
/// distinct internally so logs and tests can tell a malformed request apart
/// from a genuine solver failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed JSON, wrong root shape, missing/unknown fields, or
    /// semantically invalid values (negative bounds, `hi < lo`,
    /// `time_s <= 0`, dangling node references, reserved node-name
    /// collisions, empty recipe set).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Max-flow or LP solver raised an unrecoverable internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Solver exceeded its time limit.
    #[error("timeout after {seconds} seconds")]
    Timeout {
        /// Seconds elapsed before timeout
        seconds: f64,
    },
}

impl Error {
    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(seconds: f64) -> Self {
        Self::Timeout { seconds }
    }

    /// The message reported under `"status": "error"`.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Process exit code for this error (§6.1, §7): input-shape and
    /// input-semantics problems are a normal result object at exit 0 (only
    /// malformed JSON, handled before an `Error` value exists, and a genuine
    /// internal solver failure exit 1).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::Timeout { .. } => 0,
            Error::Internal(_) => 1,
        }
    }
}
