//! Entity parsing errors.

use std::path::PathBuf;

/// Errors raised while extracting an entity declaration.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source holds no `entity <name> is` header.
    #[error("no valid entity declaration found")]
    NoEntity,

    /// The entity header is malformed.
    #[error("line {line}: {message}")]
    Syntax {
        /// 1-based line of the offending token.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// A generic or port name is declared twice.
    #[error("entity '{entity}' declares '{name}' more than once")]
    Duplicate {
        /// The entity being parsed.
        entity: String,
        /// The repeated name.
        name: String,
    },

    /// The source file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ParseError::NoEntity.to_string(),
            "no valid entity declaration found"
        );
        let err = ParseError::Syntax {
            line: 4,
            message: "expected ';'".into(),
        };
        assert_eq!(err.to_string(), "line 4: expected ';'");
        let err = ParseError::Duplicate {
            entity: "uart".into(),
            name: "clk".into(),
        };
        assert_eq!(err.to_string(), "entity 'uart' declares 'clk' more than once");
    }
}
