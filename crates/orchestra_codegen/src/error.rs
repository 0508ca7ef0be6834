//! Code generation errors.

use orchestra_common::InternalError;
use orchestra_component::ComponentError;
use orchestra_project::ProjectError;
use std::path::PathBuf;

/// Errors raised while generating or writing the output files.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// An output file or directory could not be written.
    #[error("Can't create '{}': {source}", path.display())]
    Io {
        /// The file or directory.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The project has not passed its last check.
    #[error("project '{0}' is not valid; run check first")]
    InvalidProject(String),

    /// A wire has several masters, which needs an arbiter in front of the
    /// interconnect.
    #[error("Wire '{wire}' has {masters} masters; only single-master wires can be generated")]
    MultiMaster {
        /// The wire name.
        wire: String,
        /// The number of masters.
        masters: usize,
    },

    /// A bus interface uses one bidirectional data port for both directions.
    #[error("Interface '{interface}' uses the bidirectional data port '{port}'")]
    Bidirectional {
        /// The interface, as `instance.interface`.
        interface: String,
        /// The port name.
        port: String,
    },

    /// An arbiter was requested for an unsupported number of masters.
    #[error("an arbiter needs between 2 and 64 masters, got {0}")]
    ArbiterSize(usize),

    /// A port width could not be evaluated.
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Component HDL files could not be extracted.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The linkage is inconsistent with itself.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl GenerationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerationError::Io {
            path: path.into(),
            source,
        }
    }
}
