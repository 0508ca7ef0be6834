//! The component model: bundles, top-entity analysis and the component library.
//!
//! A [`Component`] wraps the VHDL top entity of an IP block. Designating a
//! top file parses its entity, classifies every port by name and groups the
//! ports into Wishbone [`Interface`]s. [`Component::check`] re-derives all of
//! this and compares it with the stored description. Components are loaded
//! from a directory tree by a [`ComponentLibrary`].

#![warn(missing_docs)]

pub mod bundle;
pub mod component;
pub mod error;
pub mod interface;
pub mod library;

pub use bundle::{Bundle, DirBundle, MemoryBundle};
pub use component::Component;
pub use error::ComponentError;
pub use interface::{direction_of, group_ports, Interface, InterfacePort};
pub use library::ComponentLibrary;
