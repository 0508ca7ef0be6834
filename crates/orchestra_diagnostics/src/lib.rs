//! Categorised error and warning reports for component and project checks.
//!
//! Structural problems found while checking a component or linking a project
//! are not Rust errors: they are accumulated as [`Message`]s under a named
//! category in a [`Report`], and rendered as `ERR:`/`WARN:` lines by a
//! [`ReportRenderer`].

#![warn(missing_docs)]

pub mod message;
pub mod renderer;
pub mod report;
pub mod severity;

pub use message::Message;
pub use renderer::{JsonRenderer, ReportRenderer, TerminalRenderer};
pub use report::{Category, Report};
pub use severity::Severity;
