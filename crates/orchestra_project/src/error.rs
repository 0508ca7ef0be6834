//! Project management errors.

use orchestra_config::ConfigError;
use orchestra_vhdl::EvalError;

/// Errors raised by project mutations and width evaluation.
///
/// Structural problems found by [`crate::Project::check`] are not errors of
/// this type; they go into the check report.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    /// The project file could not be loaded or saved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The project has never been saved, so it has no file to save to.
    #[error("project has no file name yet")]
    NoPath,

    /// A name is not usable as a VHDL identifier.
    #[error("'{0}' is not a valid name")]
    InvalidName(String),

    /// A wire of that name already exists.
    #[error("Wire called '{0}' already exists in current project")]
    DuplicateWire(String),

    /// No wire of that name exists.
    #[error("No wire called '{0}' exists in current project")]
    UnknownWire(String),

    /// A clock domain of that name already exists.
    #[error("Clock domain called '{0}' already exists in current project")]
    DuplicateClock(String),

    /// The name is taken by the top-level reset or its testbench timing.
    #[error("Clock domain name '{0}' is reserved")]
    ReservedClock(String),

    /// No clock domain of that name exists.
    #[error("No clock domain called '{0}' exists in current project")]
    UnknownClock(String),

    /// The clock domain is still linked by an instance.
    #[error("Clock '{clock}' used by instance '{instance}'")]
    ClockInUse {
        /// The clock domain.
        clock: String,
        /// The first instance linking it.
        instance: String,
    },

    /// An instance of that name already exists.
    #[error("Component called '{0}' already exists in current project")]
    DuplicateInstance(String),

    /// No instance of that name exists.
    #[error("No component called '{0}' exists in current project")]
    UnknownInstance(String),

    /// The instance declares no interface of that name.
    #[error("Component '{instance}' has no interface '{interface}'")]
    UnknownInterface {
        /// The instance name.
        instance: String,
        /// The interface name.
        interface: String,
    },

    /// The instance's component has no port of that name.
    #[error("Component '{instance}' has no port '{port}'")]
    UnknownPort {
        /// The instance name.
        instance: String,
        /// The port name.
        port: String,
    },

    /// A port width could not be evaluated.
    #[error("Component '{instance}', port '{port}': cannot evaluate width: {source}")]
    Width {
        /// The instance name.
        instance: String,
        /// The port name.
        port: String,
        /// Why evaluation failed.
        source: EvalError,
    },

    /// A generic value could not be turned into an integer.
    #[error("Component '{instance}', generic '{generic}': {message}")]
    Generic {
        /// The instance name.
        instance: String,
        /// The generic name.
        generic: String,
        /// What went wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            ProjectError::DuplicateWire("main".into()).to_string(),
            "Wire called 'main' already exists in current project"
        );
        let err = ProjectError::ClockInUse {
            clock: "sys".into(),
            instance: "cpu0".into(),
        };
        assert_eq!(err.to_string(), "Clock 'sys' used by instance 'cpu0'");
        let err = ProjectError::Width {
            instance: "ram0".into(),
            port: "adr".into(),
            source: EvalError::UnknownName("n".into()),
        };
        assert_eq!(
            err.to_string(),
            "Component 'ram0', port 'adr': cannot evaluate width: unknown name 'n' in expression"
        );
    }
}
