//! Static integer expressions used in range constraints.
//!
//! Port widths in an entity header are written as ranges such as
//! `(width - 1 downto 0)`. The expressions on either side are kept as a small
//! tree so they can be re-emitted verbatim and evaluated later, once generic
//! values are known.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// An integer literal.
    Int(i64),
    /// A reference to a generic or constant, lowercased.
    Name(String),
    /// Unary negation.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A parenthesized sub-expression, kept for faithful re-emission.
    Paren(Box<Expr>),
}

/// Binary arithmetic operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `**`
    Pow,
}

impl BinOp {
    /// Returns the VHDL operator symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
        }
    }
}

/// Errors raised while evaluating an [`Expr`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// A name has no known value.
    #[error("unknown name '{0}' in expression")]
    UnknownName(String),
    /// Integer division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// The result does not fit in 64 bits.
    #[error("integer overflow")]
    Overflow,
    /// `**` with a negative exponent.
    #[error("negative exponent")]
    NegativeExponent,
}

impl Expr {
    /// Convenience constructor for a name reference.
    pub fn name(name: &str) -> Self {
        Expr::Name(name.to_ascii_lowercase())
    }

    /// Convenience constructor for a binary operation.
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluates the expression, resolving names through `lookup`.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Option<i64>) -> Result<i64, EvalError> {
        match self {
            Expr::Int(v) => Ok(*v),
            Expr::Name(n) => lookup(n).ok_or_else(|| EvalError::UnknownName(n.clone())),
            Expr::Neg(e) => e.eval(lookup)?.checked_neg().ok_or(EvalError::Overflow),
            Expr::Paren(e) => e.eval(lookup),
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(lookup)?;
                let r = rhs.eval(lookup)?;
                match op {
                    BinOp::Add => l.checked_add(r).ok_or(EvalError::Overflow),
                    BinOp::Sub => l.checked_sub(r).ok_or(EvalError::Overflow),
                    BinOp::Mul => l.checked_mul(r).ok_or(EvalError::Overflow),
                    BinOp::Div => {
                        if r == 0 {
                            Err(EvalError::DivisionByZero)
                        } else {
                            l.checked_div(r).ok_or(EvalError::Overflow)
                        }
                    }
                    BinOp::Pow => {
                        if r < 0 {
                            return Err(EvalError::NegativeExponent);
                        }
                        let exp = u32::try_from(r).map_err(|_| EvalError::Overflow)?;
                        l.checked_pow(exp).ok_or(EvalError::Overflow)
                    }
                }
            }
        }
    }

    /// Returns every name referenced by the expression.
    pub fn names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Int(_) => {}
            Expr::Name(n) => out.push(n),
            Expr::Neg(e) | Expr::Paren(e) => e.collect_names(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_names(out);
                rhs.collect_names(out);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Int(v) => write!(f, "{v}"),
            Expr::Name(n) => write!(f, "{n}"),
            Expr::Neg(e) => write!(f, "-{e}"),
            Expr::Paren(e) => write!(f, "({e})"),
            Expr::Binary { op, lhs, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
        }
    }
}

/// Direction of a discrete range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeDirection {
    /// Ascending, `to`.
    To,
    /// Descending, `downto`.
    Downto,
}

impl fmt::Display for RangeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RangeDirection::To => "to",
            RangeDirection::Downto => "downto",
        })
    }
}

/// A discrete range such as `7 downto 0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Left bound.
    pub left: Expr,
    /// Direction.
    pub direction: RangeDirection,
    /// Right bound.
    pub right: Expr,
}

impl Range {
    /// `(width - 1 downto 0)` for a literal width.
    pub fn downto_zero(width: u64) -> Self {
        Range {
            left: Expr::Int(width.saturating_sub(1) as i64),
            direction: RangeDirection::Downto,
            right: Expr::Int(0),
        }
    }

    /// Number of elements in the range. A null range has width 0.
    pub fn width(&self, lookup: &dyn Fn(&str) -> Option<i64>) -> Result<u64, EvalError> {
        let left = self.left.eval(lookup)?;
        let right = self.right.eval(lookup)?;
        let (hi, lo) = match self.direction {
            RangeDirection::Downto => (left, right),
            RangeDirection::To => (right, left),
        };
        if hi < lo {
            return Ok(0);
        }
        let span = hi.checked_sub(lo).ok_or(EvalError::Overflow)?;
        u64::try_from(span)
            .ok()
            .and_then(|s| s.checked_add(1))
            .ok_or(EvalError::Overflow)
    }

    /// The lower index of the range, whatever its direction.
    pub fn low(&self, lookup: &dyn Fn(&str) -> Option<i64>) -> Result<i64, EvalError> {
        let left = self.left.eval(lookup)?;
        let right = self.right.eval(lookup)?;
        Ok(left.min(right))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.direction, self.right)
    }
}

/// Parses the text of a VHDL integer literal.
///
/// Accepts underscores, based literals (`16#FF#`) and non-negative exponents
/// (`1e3`). Returns `None` for real literals and values that overflow.
pub fn parse_vhdl_integer(text: &str) -> Option<i64> {
    let clean: String = text.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();

    if let Some(hash) = lower.find('#') {
        let base: u32 = lower[..hash].parse().ok()?;
        if !(2..=16).contains(&base) {
            return None;
        }
        let rest = &lower[hash + 1..];
        let close = rest.find('#')?;
        let digits = &rest[..close];
        if digits.is_empty() || digits.contains('.') {
            return None;
        }
        let mantissa = i64::from_str_radix(digits, base).ok()?;
        let exp = parse_exponent(&rest[close + 1..])?;
        return mantissa.checked_mul((base as i64).checked_pow(exp)?);
    }

    let (digits, exp) = match lower.find('e') {
        Some(idx) => (&lower[..idx], parse_exponent(&lower[idx..])?),
        None => (lower.as_str(), 0),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mantissa: i64 = digits.parse().ok()?;
    mantissa.checked_mul(10i64.checked_pow(exp)?)
}

fn parse_exponent(text: &str) -> Option<u32> {
    if text.is_empty() {
        return Some(0);
    }
    let body = text.strip_prefix('e')?;
    let body = body.strip_prefix('+').unwrap_or(body);
    body.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn eval_arithmetic() {
        let values = env(&[("width", 8)]);
        let lookup = |n: &str| values.get(n).copied();
        let e = Expr::binary(BinOp::Sub, Expr::name("WIDTH"), Expr::Int(1));
        assert_eq!(e.eval(&lookup), Ok(7));
        let p = Expr::binary(BinOp::Pow, Expr::Int(2), Expr::name("width"));
        assert_eq!(p.eval(&lookup), Ok(256));
        let d = Expr::binary(BinOp::Div, Expr::name("width"), Expr::Int(3));
        assert_eq!(d.eval(&lookup), Ok(2));
    }

    #[test]
    fn eval_errors() {
        let lookup = |_: &str| None;
        assert_eq!(
            Expr::name("n").eval(&lookup),
            Err(EvalError::UnknownName("n".into()))
        );
        let div = Expr::binary(BinOp::Div, Expr::Int(1), Expr::Int(0));
        assert_eq!(div.eval(&lookup), Err(EvalError::DivisionByZero));
        let big = Expr::binary(BinOp::Pow, Expr::Int(2), Expr::Int(80));
        assert_eq!(big.eval(&lookup), Err(EvalError::Overflow));
        let neg = Expr::binary(BinOp::Pow, Expr::Int(2), Expr::Neg(Box::new(Expr::Int(1))));
        assert_eq!(neg.eval(&lookup), Err(EvalError::NegativeExponent));
    }

    #[test]
    fn display_expressions() {
        let e = Expr::binary(
            BinOp::Mul,
            Expr::Paren(Box::new(Expr::binary(
                BinOp::Add,
                Expr::name("a"),
                Expr::Int(1),
            ))),
            Expr::Int(2),
        );
        assert_eq!(e.to_string(), "(a + 1) * 2");
        assert_eq!(Expr::Neg(Box::new(Expr::Int(3))).to_string(), "-3");
    }

    #[test]
    fn range_width() {
        let lookup = |_: &str| None;
        assert_eq!(Range::downto_zero(32).width(&lookup), Ok(32));
        let up = Range {
            left: Expr::Int(0),
            direction: RangeDirection::To,
            right: Expr::Int(3),
        };
        assert_eq!(up.width(&lookup), Ok(4));
        assert_eq!(up.to_string(), "0 to 3");
        let null = Range {
            left: Expr::Int(0),
            direction: RangeDirection::Downto,
            right: Expr::Int(3),
        };
        assert_eq!(null.width(&lookup), Ok(0));
    }

    #[test]
    fn range_low_index() {
        let lookup = |_: &str| None;
        let r = Range {
            left: Expr::Int(31),
            direction: RangeDirection::Downto,
            right: Expr::Int(2),
        };
        assert_eq!(r.low(&lookup), Ok(2));
    }

    #[test]
    fn integer_literals() {
        assert_eq!(parse_vhdl_integer("42"), Some(42));
        assert_eq!(parse_vhdl_integer("1_000"), Some(1000));
        assert_eq!(parse_vhdl_integer("16#FF#"), Some(255));
        assert_eq!(parse_vhdl_integer("2#1010_1010#"), Some(0xAA));
        assert_eq!(parse_vhdl_integer("1e3"), Some(1000));
        assert_eq!(parse_vhdl_integer("16#1#e2"), Some(256));
        assert_eq!(parse_vhdl_integer("3.14"), None);
        assert_eq!(parse_vhdl_integer("99999999999999999999"), None);
    }

    #[test]
    fn names_are_collected() {
        let e = Expr::binary(BinOp::Add, Expr::name("a"), Expr::name("b"));
        assert_eq!(e.names(), vec!["a", "b"]);
    }
}
