//! A small typed model of generated VHDL.
//!
//! Generators assemble [`Module`]s out of [`Expr`]s and [`Statement`]s and
//! only turn them into text through [`Module::render`]. Behavioural bodies
//! that never vary (the reset synchronizer, the arbiter) are kept as text
//! templates instead.

use orchestra_vhdl::{Constraint, Entity, Range, SubtypeIndication};
use std::fmt::{self, Write};

/// A VHDL expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// `'0'` or `'1'`.
    Bit(bool),
    /// A bit-string literal, MSB first.
    Bits(String),
    /// `(others => '0')`.
    Zeros,
    /// A signal or port.
    Name(String),
    /// `name(index)`.
    Index(String, u64),
    /// `name(high downto low)`.
    Slice(String, u64, u64),
    /// `not(expr)`.
    Not(Box<Expr>),
    /// Operands joined by `and`.
    And(Vec<Expr>),
    /// Operands joined by `or`.
    Or(Vec<Expr>),
    /// Operands joined by `&`, MSB first.
    Concat(Vec<Expr>),
    /// `lhs = rhs`.
    Eq(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// A named signal.
    pub fn name(name: impl Into<String>) -> Self {
        Expr::Name(name.into())
    }

    /// `self = '1'`.
    pub fn is_high(self) -> Self {
        Expr::Eq(Box::new(self), Box::new(Expr::Bit(true)))
    }

    /// `not(self)`.
    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// The all-zero value for a signal of the given subtype.
    pub fn zero_of(ty: &SubtypeIndication) -> Self {
        if ty.index_range().is_some() {
            Expr::Zeros
        } else {
            Expr::Bit(false)
        }
    }

    fn needs_parens(&self) -> bool {
        matches!(self, Expr::And(v) | Expr::Or(v) | Expr::Concat(v) if v.len() > 1)
            || matches!(self, Expr::Eq(..))
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.needs_parens() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }

    fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expr], sep: &str) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            item.write_operand(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bit(b) => write!(f, "'{}'", u8::from(*b)),
            Expr::Bits(bits) => write!(f, "\"{bits}\""),
            Expr::Zeros => f.write_str("(others => '0')"),
            Expr::Name(n) => f.write_str(n),
            Expr::Index(n, i) => write!(f, "{n}({i})"),
            Expr::Slice(n, hi, lo) => write!(f, "{n}({hi} downto {lo})"),
            Expr::Not(e) => write!(f, "not({e})"),
            Expr::And(v) if v.is_empty() => f.write_str("'1'"),
            Expr::Or(v) if v.is_empty() => f.write_str("'0'"),
            Expr::And(v) => Self::write_joined(f, v, " and "),
            Expr::Or(v) => Self::write_joined(f, v, " or "),
            Expr::Concat(v) => Self::write_joined(f, v, " & "),
            Expr::Eq(l, r) => {
                l.write_operand(f)?;
                f.write_str(" = ")?;
                r.write_operand(f)
            }
        }
    }
}

/// A concurrent statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// `target <= value;`
    Assign {
        /// The driven signal.
        target: Expr,
        /// The driving value.
        value: Expr,
    },
    /// `target <= v0 when c0 else v1 when c1 else default;`
    Conditional {
        /// The driven signal.
        target: Expr,
        /// `(value, condition)` pairs in priority order.
        branches: Vec<(Expr, Expr)>,
        /// The value when no condition holds.
        default: Expr,
    },
    /// `target <= v0, v1 after t1, ...;` for testbench stimuli.
    Waveform {
        /// The driven signal.
        target: Expr,
        /// `(value, delay)` pairs; the delay is a time expression.
        elements: Vec<(Expr, Option<String>)>,
    },
}

impl Statement {
    /// `target <= value;`
    pub fn assign(target: Expr, value: Expr) -> Self {
        Statement::Assign { target, value }
    }

    /// `target <= value when cond else default;`
    pub fn gated(target: Expr, value: Expr, cond: Expr, default: Expr) -> Self {
        Statement::Conditional {
            target,
            branches: vec![(value, cond)],
            default,
        }
    }

    fn render(&self, out: &mut String, indent: &str) {
        match self {
            Statement::Assign { target, value } => {
                let _ = writeln!(out, "{indent}{target} <= {value};");
            }
            Statement::Conditional {
                target,
                branches,
                default,
            } => {
                let head = format!("{indent}{target} <= ");
                let pad = " ".repeat(head.len());
                out.push_str(&head);
                for (i, (value, cond)) in branches.iter().enumerate() {
                    if i > 0 {
                        let _ = write!(out, "\n{pad}else ");
                    }
                    let _ = write!(out, "{value} when ({cond})");
                }
                if branches.is_empty() {
                    let _ = writeln!(out, "{default};");
                } else {
                    let _ = writeln!(out, "\n{pad}else {default};");
                }
            }
            Statement::Waveform { target, elements } => {
                let parts: Vec<String> = elements
                    .iter()
                    .map(|(value, delay)| match delay {
                        Some(t) => format!("{value} after {t}"),
                        None => value.to_string(),
                    })
                    .collect();
                let _ = writeln!(out, "{indent}{target} <= {};", parts.join(", "));
            }
        }
    }
}

/// A signal declaration inside an architecture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signal {
    /// The signal name.
    pub name: String,
    /// Its subtype.
    pub ty: SubtypeIndication,
    /// An optional initial value.
    pub init: Option<Expr>,
}

impl Signal {
    /// A signal without initial value.
    pub fn new(name: impl Into<String>, ty: SubtypeIndication) -> Self {
        Self {
            name: name.into(),
            ty,
            init: None,
        }
    }
}

/// A constant declaration, with its value as VHDL text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constant {
    /// The constant name.
    pub name: String,
    /// The type mark.
    pub ty: String,
    /// The value expression.
    pub value: String,
}

/// A component instantiation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instantiation {
    /// The instance label.
    pub label: String,
    /// The instantiated component.
    pub component: String,
    /// `(generic, value)` associations.
    pub generics: Vec<(String, String)>,
    /// `(formal port, actual)` associations; `None` leaves the port open.
    pub ports: Vec<(String, Option<Expr>)>,
}

impl Instantiation {
    fn render(&self, out: &mut String, indent: &str) {
        let _ = writeln!(out, "{indent}{} : {}", self.label, self.component);
        let inner = format!("{indent}    ");
        if !self.generics.is_empty() {
            let lines: Vec<String> = self
                .generics
                .iter()
                .map(|(g, v)| format!("{g} => {v}"))
                .collect();
            write_map(out, &inner, "generic map", &lines, false);
        }
        let lines: Vec<String> = self
            .ports
            .iter()
            .map(|(p, actual)| match actual {
                Some(a) => format!("{p} => {a}"),
                None => format!("{p} => open"),
            })
            .collect();
        write_map(out, &inner, "port map", &lines, true);
    }
}

fn write_map(out: &mut String, indent: &str, keyword: &str, lines: &[String], last: bool) {
    let _ = writeln!(out, "{indent}{keyword} (");
    for (i, line) in lines.iter().enumerate() {
        let sep = if i + 1 < lines.len() { "," } else { "" };
        let _ = writeln!(out, "{indent}    {line}{sep}");
    }
    let _ = writeln!(out, "{indent}){}", if last { ";" } else { "" });
}

/// A body item, kept in the order generators add them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// A `-- text` banner.
    Comment(String),
    /// A concurrent statement.
    Statement(Statement),
    /// A component instantiation.
    Instance(Instantiation),
}

/// A design unit: an entity and its architecture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    /// A one-line description written in the file header.
    pub title: String,
    /// The entity.
    pub entity: Entity,
    /// Architecture constants.
    pub constants: Vec<Constant>,
    /// Architecture signals.
    pub signals: Vec<Signal>,
    /// Component declarations.
    pub components: Vec<Entity>,
    /// Architecture body.
    pub body: Vec<Item>,
}

impl Module {
    /// An empty module for `entity`.
    pub fn new(title: &str, entity: Entity) -> Self {
        Self {
            title: title.to_string(),
            entity,
            constants: Vec::new(),
            signals: Vec::new(),
            components: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Declares a signal.
    pub fn signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    /// Appends a banner comment to the body.
    pub fn comment(&mut self, text: &str) {
        self.body.push(Item::Comment(text.to_string()));
    }

    /// Appends a statement to the body.
    pub fn push(&mut self, statement: Statement) {
        self.body.push(Item::Statement(statement));
    }

    /// Appends an instantiation to the body.
    pub fn instantiate(&mut self, instance: Instantiation) {
        self.body.push(Item::Instance(instance));
    }

    /// Statements of the body, in order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.body.iter().filter_map(|item| match item {
            Item::Statement(s) => Some(s),
            _ => None,
        })
    }

    /// Instantiations of the body, in order.
    pub fn instances(&self) -> impl Iterator<Item = &Instantiation> {
        self.body.iter().filter_map(|item| match item {
            Item::Instance(i) => Some(i),
            _ => None,
        })
    }

    /// Renders the complete design file.
    pub fn render(&self) -> String {
        let name = &self.entity.name;
        let mut out = header(&self.title, name);
        out.push_str(LIBRARIES);
        out.push('\n');
        out.push_str(&self.entity.to_declaration());
        let _ = writeln!(out, "\narchitecture rtl of {name} is");

        if !self.constants.is_empty() {
            banner(&mut out, "Constants");
            for c in &self.constants {
                let _ = writeln!(out, "    constant {} : {} := {};", c.name, c.ty, c.value);
            }
        }
        if !self.signals.is_empty() {
            banner(&mut out, "Signals");
            for s in &self.signals {
                match &s.init {
                    Some(init) => {
                        let _ = writeln!(out, "    signal {} : {} := {init};", s.name, s.ty);
                    }
                    None => {
                        let _ = writeln!(out, "    signal {} : {};", s.name, s.ty);
                    }
                }
            }
        }
        if !self.components.is_empty() {
            banner(&mut out, "Components");
            for (i, c) in self.components.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                out.push_str(&c.to_component("    "));
            }
        }

        out.push_str("\nbegin\n");
        for item in &self.body {
            match item {
                Item::Comment(text) => banner(&mut out, text),
                Item::Statement(s) => s.render(&mut out, "    "),
                Item::Instance(i) => {
                    out.push('\n');
                    i.render(&mut out, "    ");
                }
            }
        }
        let _ = writeln!(out, "\nend architecture rtl;");
        out
    }
}

/// Library clauses shared by every generated unit.
pub const LIBRARIES: &str = "library ieee;\nuse ieee.std_logic_1164.all;\nuse ieee.numeric_std.all;\n";

/// The comment block opening every generated file.
pub fn header(title: &str, unit: &str) -> String {
    let rule = "-".repeat(78);
    format!("{rule}\n-- {title}\n-- Unit: {unit}\n-- Generated by orchestra; edits are overwritten.\n{rule}\n\n")
}

fn banner(out: &mut String, text: &str) {
    let _ = writeln!(out, "\n    -- {text}");
}

/// `std_logic_vector(width - 1 downto 0)`, or `std_logic` for one bit when
/// `scalar` is set.
pub fn logic_type(width: u64, scalar: bool) -> SubtypeIndication {
    if scalar && width == 1 {
        SubtypeIndication::logic()
    } else {
        SubtypeIndication::vector(width)
    }
}

/// The subtype `ty` with its index constraint replaced by a literal
/// `width - 1 downto 0` range. Scalars are returned unchanged.
pub fn normalized(ty: &SubtypeIndication, width: u64) -> SubtypeIndication {
    match ty.constraint {
        Some(Constraint::Index(_)) => SubtypeIndication {
            type_mark: ty.type_mark.clone(),
            constraint: Some(Constraint::Index(Range::downto_zero(width))),
        },
        _ => ty.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestra_vhdl::{parse_entity, Port, PortMode};

    #[test]
    fn expressions() {
        let sel = Expr::name("slave_sel").is_high();
        assert_eq!(sel.to_string(), "slave_sel = '1'");
        let e = Expr::And(vec![
            Expr::Index("m".into(), 1),
            Expr::Index("adr".into(), 0).negate(),
        ]);
        assert_eq!(e.to_string(), "m(1) and not(adr(0))");
        let both = Expr::And(vec![sel, Expr::Index("s".into(), 2).is_high()]);
        assert_eq!(both.to_string(), "(slave_sel = '1') and (s(2) = '1')");
        let cat = Expr::Concat(vec![Expr::name("d"), Expr::name("d")]);
        assert_eq!(cat.to_string(), "d & d");
        assert_eq!(Expr::Bits("0101".into()).to_string(), "\"0101\"");
        assert_eq!(Expr::Slice("a".into(), 7, 4).to_string(), "a(7 downto 4)");
    }

    #[test]
    fn conditional_statement() {
        let s = Statement::Conditional {
            target: Expr::name("ack"),
            branches: vec![
                (Expr::name("a"), Expr::name("s0").is_high()),
                (Expr::Bit(true), Expr::name("s1").is_high()),
            ],
            default: Expr::Bit(false),
        };
        let mut out = String::new();
        s.render(&mut out, "");
        assert_eq!(
            out,
            "ack <= a when (s0 = '1')\n       else '1' when (s1 = '1')\n       else '0';\n"
        );
    }

    #[test]
    fn waveform_statement() {
        let s = Statement::Waveform {
            target: Expr::name("reset"),
            elements: vec![
                (Expr::Bit(false), None),
                (Expr::Bit(true), Some("RESET_ON".into())),
            ],
        };
        let mut out = String::new();
        s.render(&mut out, "  ");
        assert_eq!(out, "  reset <= '0', '1' after RESET_ON;\n");
    }

    #[test]
    fn rendered_module_reparses() {
        let mut entity = Entity::new("glue");
        entity
            .ports
            .push(Port::new("a", PortMode::In, SubtypeIndication::vector(4)));
        entity
            .ports
            .push(Port::new("y", PortMode::Out, SubtypeIndication::logic()));
        let mut m = Module::new("Test unit", entity.clone());
        m.signal(Signal::new("t", logic_type(1, true)));
        m.comment("Logic");
        m.push(Statement::assign(Expr::name("t"), Expr::Index("a".into(), 0)));
        m.push(Statement::assign(Expr::name("y"), Expr::name("t")));
        let text = m.render();
        assert!(text.contains("signal t : std_logic;"));
        assert!(text.contains("    t <= a(0);\n"));
        assert!(text.trim_end().ends_with("end architecture rtl;"));
        assert_eq!(parse_entity(&text).unwrap(), entity);
    }

    #[test]
    fn instantiation_text() {
        let inst = Instantiation {
            label: "u0_i".into(),
            component: "uart".into(),
            generics: vec![("width".into(), "8".into())],
            ports: vec![
                ("clk".into(), Some(Expr::name("sys"))),
                ("irq".into(), None),
            ],
        };
        let mut out = String::new();
        inst.render(&mut out, "");
        assert_eq!(
            out,
            "u0_i : uart\n    generic map (\n        width => 8\n    )\n    port map (\n        clk => sys,\n        irq => open\n    );\n"
        );
    }

    #[test]
    fn normalized_types() {
        let ty = SubtypeIndication::vector_range(Range::downto_zero(3));
        assert_eq!(normalized(&ty, 12).to_string(), "std_logic_vector(11 downto 0)");
        assert_eq!(normalized(&SubtypeIndication::logic(), 1).to_string(), "std_logic");
        assert_eq!(Expr::zero_of(&SubtypeIndication::logic()), Expr::Bit(false));
    }
}
