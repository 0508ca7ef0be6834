//! Projects: component instances linked by wires and clock domains.
//!
//! A [`Project`] owns its `project.toml` description and offers the set
//! operations used to edit it. [`Project::check`] resolves every instance
//! against a [`orchestra_component::ComponentLibrary`], evaluates port widths
//! under the instance generics, lays out the slave address windows of each
//! wire and records every structural problem in a categorised report. When
//! the report is free of errors the resulting [`Linkage`] is what code
//! generation consumes.

#![warn(missing_docs)]

pub mod address;
pub mod error;
pub mod instance;
pub mod linkage;
pub mod project;

pub use address::{AddressMap, BusGeometry, Decode, SlaveWindow};
pub use error::ProjectError;
pub use instance::Instance;
pub use linkage::{ClockLink, InterfaceRef, Linkage, WireLink, RESERVED_CLOCK_NAMES, RESET_INPUT};
pub use project::Project;
