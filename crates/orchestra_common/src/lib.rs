//! Shared foundational types used across the Orchestra SoC builder.
//!
//! This crate provides clock [`Frequency`] values with unit parsing and the
//! [`InternalError`] type used to flag broken invariants inside the engine.

#![warn(missing_docs)]

pub mod frequency;
pub mod result;

pub use frequency::{Frequency, ParseFrequencyError};
pub use result::{InternalError, OrchestraResult};
