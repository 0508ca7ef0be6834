//! Parsing, validation and saving of component and project descriptions.
//!
//! A component is described by a `component.toml` living next to its HDL
//! files; a project by a `project.toml`. Both deserialize into strongly typed
//! records held in [`Section`]s, which keep insertion order and support
//! case-insensitive lookup and removal by key.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod section;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    component_to_string, is_vhdl_identifier, load_component, load_component_from_str, load_project, load_project_from_str,
    save_component, save_project, COMPONENT_FILE,
};
pub use section::{Keyed, Section};
pub use types::*;
