//! A single human-readable report entry.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One error or warning produced by a check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// How serious the problem is.
    pub severity: Severity,
    /// The message text, without the `ERR:`/`WARN:` prefix.
    pub text: String,
}

impl Message {
    /// Creates an error message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }

    /// Creates a warning message.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    /// Returns `true` if this message is an error.
    pub fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity.tag(), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_tag() {
        assert_eq!(
            Message::error("No wire defined.").to_string(),
            "ERR: No wire defined."
        );
        assert_eq!(
            Message::warning("globals interface 'export' not used.").to_string(),
            "WARN: globals interface 'export' not used."
        );
    }
}
