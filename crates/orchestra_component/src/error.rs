//! Component management errors.

use orchestra_config::ConfigError;
use orchestra_vhdl::ParseError;
use orchestra_wishbone::{ClassifyError, InterfaceKind};
use std::path::PathBuf;

/// Errors raised by component operations.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    /// A bundle or file system operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The description could not be loaded or rendered.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The named HDL file is not part of the component.
    #[error("File '{0}' doesn't exist in component")]
    UnknownFile(String),

    /// An HDL file of that name is already part of the component.
    #[error("File '{0}' already exists in component")]
    DuplicateFile(String),

    /// The file to add does not exist on disk.
    #[error("File '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    /// The top file holds no usable entity.
    #[error("top file '{file}': {source}")]
    Parse {
        /// The top file name.
        file: String,
        /// The parser error.
        source: ParseError,
    },

    /// A top entity port could not be classified.
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// One interface name is used by ports of different kinds.
    #[error("Duplicate interface name '{name}' used by {first} and {second} signals")]
    InterfaceKindConflict {
        /// The interface name.
        name: String,
        /// The kind seen first.
        first: InterfaceKind,
        /// The conflicting kind.
        second: InterfaceKind,
    },

    /// The top entity declares the same name twice.
    #[error("Duplicate {what} '{name}' in top entity")]
    DuplicateDeclaration {
        /// Generic, port or interface.
        what: &'static str,
        /// The repeated name.
        name: String,
    },

    /// No component of that base name exists in the library.
    #[error("Component '{base}' don't exist")]
    NotFound {
        /// The requested base name.
        base: String,
        /// Where it was looked for.
        path: PathBuf,
    },
}

impl ComponentError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ComponentError::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ComponentError::UnknownFile("a.vhd".into()).to_string(),
            "File 'a.vhd' doesn't exist in component"
        );
        let err = ComponentError::InterfaceKindConflict {
            name: "bus".into(),
            first: InterfaceKind::Master,
            second: InterfaceKind::Slave,
        };
        assert_eq!(
            err.to_string(),
            "Duplicate interface name 'bus' used by WBM and WBS signals"
        );
        let err = ComponentError::NotFound {
            base: "uart".into(),
            path: PathBuf::from("lib/uart"),
        };
        assert_eq!(err.to_string(), "Component 'uart' don't exist");
    }
}
