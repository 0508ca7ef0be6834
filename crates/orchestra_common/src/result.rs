//! Common result and error types for the Orchestra engine.

/// The result type for operations that can only fail because of a bug.
///
/// User mistakes (bad descriptions, unconnected interfaces) are reported
/// through `orchestra_diagnostics::Report` or the crate-level error enums.
/// `Err` here means a derived structure was inconsistent with its source.
pub type OrchestraResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Orchestra, not a user input problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
