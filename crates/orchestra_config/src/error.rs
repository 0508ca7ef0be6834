//! Error types for description loading, validation and saving.

/// Errors that can occur when loading or saving a component or project description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing a description file.
    #[error("failed to access description: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse description: {0}")]
    ParseError(String),

    /// The description could not be turned back into TOML.
    #[error("failed to serialize description: {0}")]
    SerializeError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// Two records of one section share a key.
    #[error("duplicate {section} entry '{key}'")]
    DuplicateEntry {
        /// The section holding the duplicate.
        section: &'static str,
        /// The repeated key.
        key: String,
    },

    /// A description value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("project.name".to_string());
        assert_eq!(format!("{err}"), "missing required field: project.name");
    }

    #[test]
    fn display_duplicate_entry() {
        let err = ConfigError::DuplicateEntry {
            section: "wires",
            key: "main".to_string(),
        };
        assert_eq!(format!("{err}"), "duplicate wires entry 'main'");
    }

    #[test]
    fn display_parse_error() {
        let err = ConfigError::ParseError("expected '=' at line 3".to_string());
        assert_eq!(
            format!("{err}"),
            "failed to parse description: expected '=' at line 3"
        );
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to access description:"));
    }
}
