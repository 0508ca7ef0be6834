//! The entity interface model and its VHDL rendering.

use crate::expr::{EvalError, Range};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// The interface of a VHDL entity: its name, generics and ports.
///
/// All names and type marks are lowercase. Generic and port names share one
/// namespace within an entity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// The entity name.
    pub name: String,
    /// Generics in declaration order.
    pub generics: Vec<Generic>,
    /// Ports in declaration order.
    pub ports: Vec<Port>,
}

/// A generic declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generic {
    /// The generic name.
    pub name: String,
    /// The declared type.
    pub ty: SubtypeIndication,
    /// The default value expression, as normalized source text.
    pub default: Option<String>,
}

/// A port declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// The port name.
    pub name: String,
    /// The port mode.
    pub mode: PortMode,
    /// The declared type.
    pub ty: SubtypeIndication,
    /// The default value expression, as normalized source text.
    pub default: Option<String>,
}

/// The mode of a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortMode {
    /// `in`
    In,
    /// `out`
    Out,
    /// `inout`
    Inout,
    /// `buffer`
    Buffer,
    /// `linkage`
    Linkage,
}

impl fmt::Display for PortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortMode::In => "in",
            PortMode::Out => "out",
            PortMode::Inout => "inout",
            PortMode::Buffer => "buffer",
            PortMode::Linkage => "linkage",
        })
    }
}

/// A type mark with an optional constraint, such as `std_logic_vector(7 downto 0)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtypeIndication {
    /// The lowercase type name.
    pub type_mark: String,
    /// The constraint, if any.
    pub constraint: Option<Constraint>,
}

/// A constraint on a type mark.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    /// An index constraint: `std_logic_vector(7 downto 0)`.
    Index(Range),
    /// A range constraint: `integer range 0 to 7`.
    Range(Range),
}

impl SubtypeIndication {
    /// `std_logic`.
    pub fn logic() -> Self {
        SubtypeIndication {
            type_mark: "std_logic".into(),
            constraint: None,
        }
    }

    /// `std_logic_vector(width - 1 downto 0)`.
    pub fn vector(width: u64) -> Self {
        Self::vector_range(Range::downto_zero(width))
    }

    /// `std_logic_vector(<range>)`.
    pub fn vector_range(range: Range) -> Self {
        SubtypeIndication {
            type_mark: "std_logic_vector".into(),
            constraint: Some(Constraint::Index(range)),
        }
    }

    /// The index range, if this is an array subtype.
    pub fn index_range(&self) -> Option<&Range> {
        match &self.constraint {
            Some(Constraint::Index(r)) => Some(r),
            _ => None,
        }
    }

    /// Number of bits carried by a value of this subtype.
    ///
    /// Scalars count as one bit; array subtypes count their index range.
    pub fn width(&self, lookup: &dyn Fn(&str) -> Option<i64>) -> Result<u64, EvalError> {
        match self.index_range() {
            Some(range) => range.width(lookup),
            None => Ok(1),
        }
    }
}

impl fmt::Display for SubtypeIndication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            None => write!(f, "{}", self.type_mark),
            Some(Constraint::Index(r)) => write!(f, "{}({r})", self.type_mark),
            Some(Constraint::Range(r)) => write!(f, "{} range {r}", self.type_mark),
        }
    }
}

impl Port {
    /// Creates a port without a default value.
    pub fn new(name: &str, mode: PortMode, ty: SubtypeIndication) -> Self {
        Port {
            name: name.to_ascii_lowercase(),
            mode,
            ty,
            default: None,
        }
    }

    /// Number of bits carried by the port.
    pub fn width(&self, lookup: &dyn Fn(&str) -> Option<i64>) -> Result<u64, EvalError> {
        self.ty.width(lookup)
    }

    /// `true` if the port is declared with an index constraint.
    pub fn is_vector(&self) -> bool {
        self.ty.index_range().is_some()
    }
}

impl Entity {
    /// Creates an entity with no generics or ports.
    pub fn new(name: &str) -> Self {
        Entity {
            name: name.to_ascii_lowercase(),
            generics: Vec::new(),
            ports: Vec::new(),
        }
    }

    /// Looks up a generic by name, case-insensitively.
    pub fn generic(&self, name: &str) -> Option<&Generic> {
        self.generics
            .iter()
            .find(|g| g.name.eq_ignore_ascii_case(name))
    }

    /// Looks up a port by name, case-insensitively.
    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Renders the entity as a complete `entity ... end entity` declaration.
    pub fn to_declaration(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "entity {} is", self.name);
        self.write_clauses(&mut out, "    ");
        let _ = writeln!(out, "end entity {};", self.name);
        out
    }

    /// Renders the entity as a component declaration indented by `indent`.
    pub fn to_component(&self, indent: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{indent}component {} is", self.name);
        self.write_clauses(&mut out, &format!("{indent}    "));
        let _ = writeln!(out, "{indent}end component;");
        out
    }

    fn write_clauses(&self, out: &mut String, indent: &str) {
        if !self.generics.is_empty() {
            let lines: Vec<String> = self
                .generics
                .iter()
                .map(|g| with_default(format!("{} : {}", g.name, g.ty), &g.default))
                .collect();
            write_clause(out, indent, "generic", &lines);
        }
        if !self.ports.is_empty() {
            let lines: Vec<String> = self
                .ports
                .iter()
                .map(|p| with_default(format!("{} : {} {}", p.name, p.mode, p.ty), &p.default))
                .collect();
            write_clause(out, indent, "port", &lines);
        }
    }
}

fn with_default(mut line: String, default: &Option<String>) -> String {
    if let Some(value) = default {
        line.push_str(" := ");
        line.push_str(value);
    }
    line
}

fn write_clause(out: &mut String, indent: &str, keyword: &str, lines: &[String]) {
    let _ = writeln!(out, "{indent}{keyword} (");
    for (i, line) in lines.iter().enumerate() {
        let sep = if i + 1 < lines.len() { ";" } else { "" };
        let _ = writeln!(out, "{indent}    {line}{sep}");
    }
    let _ = writeln!(out, "{indent});");
}
