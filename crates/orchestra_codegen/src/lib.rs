//! VHDL generation for checked projects.
//!
//! [`compile`] turns the [`orchestra_project::Linkage`] of a project that
//! passed its check into an output directory holding:
//!
//! - the HDL files of every component, extracted from their bundles;
//! - `syscon.vhd`, the per-domain reset synchronizer;
//! - `intercon_<wire>.vhd`, one combinational interconnect per wire;
//! - `<project>.vhd`, the top level;
//! - `<project>_tb.vhd` and `<project>.do`, a testbench skeleton and the
//!   script compiling everything in dependency order.
//!
//! Generated units are assembled from the typed model in [`vhdl`] and only
//! rendered to text when written. The round-robin [`arbiter`] is generated
//! standalone, since interconnects serve single-master wires only.

#![warn(missing_docs)]

pub mod arbiter;
pub mod compile;
pub mod error;
pub mod intercon;
pub mod net;
pub mod syscon;
pub mod testbench;
pub mod top;
pub mod vhdl;

pub use arbiter::{arbiter_source, RoundRobin};
pub use compile::{compile, compile_linkage, CompileOptions};
pub use error::GenerationError;
pub use intercon::{make_intercon, Intercon};
pub use top::make_top;
pub use vhdl::{Expr, Module, Statement};
