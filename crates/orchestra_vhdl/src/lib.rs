//! Hand-rolled parser for VHDL entity headers.
//!
//! Only the entity interface of a design file is of interest: its name, its
//! generics and its ports, with range constraints kept as evaluable
//! expressions. The main entry points are [`parse_entity`] and
//! [`parse_entity_file`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): Converts source text to tokens, handling case-insensitive
//!   keywords, based literals, and block comments. Never fails.
//! - **Parser** ([`parser`]): Recursive descent over the first entity header found.
//! - **Model** ([`entity`], [`expr`]): The entity interface, renderable back to
//!   VHDL as an entity or component declaration.

#![warn(missing_docs)]

pub mod entity;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod parser;
pub mod token;

pub use entity::{Constraint, Entity, Generic, Port, PortMode, SubtypeIndication};
pub use error::ParseError;
pub use expr::{parse_vhdl_integer, BinOp, EvalError, Expr, Range, RangeDirection};
pub use parser::{parse_entity, parse_entity_file, parse_expression};
pub use token::{Token, VhdlToken};
