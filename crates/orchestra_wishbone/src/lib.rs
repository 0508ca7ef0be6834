//! Wishbone signal roles, interface kinds and the port-name classifier.
//!
//! A component port is mapped onto the Wishbone bus by its name alone:
//! `wbs_ctrl_adr_i` is the `ADR` signal of the slave interface `ctrl`. The
//! alias and role tables are compile-time constants over the closed
//! [`Role`], [`InterfaceKind`] and [`Direction`] enums.

#![warn(missing_docs)]

pub mod classify;
pub mod kind;
pub mod role;
pub mod rules;

pub use classify::{classify, classify_strict, clock_interface_name, ClassifyError, Classification};
pub use kind::{Direction, InterfaceKind, RoleSpec};
pub use role::{lookup_alias, ParseRoleError, Role, SIGNAL_ALIASES};
pub use rules::{check_signals, RoleViolation, SignalUse};
