//! Token types for the entity-header lexer.
//!
//! Only the reserved words that matter for an entity header get their own
//! [`VhdlToken`] variant; every other word is an [`VhdlToken::Identifier`].

use serde::{Deserialize, Serialize};

/// A token kind.
///
/// Keywords are case-insensitive in VHDL; the lexer lowercases words before
/// matching. Literal values are not stored in the token; they are retrieved
/// from the source text using the token's byte range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum VhdlToken {
    // === Keywords ===
    /// `entity`
    Entity,
    /// `is`
    Is,
    /// `generic`
    Generic,
    /// `port`
    Port,
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
    /// `end`
    End,
    /// `to`
    To,
    /// `downto`
    Downto,
    /// `range`
    Range,
    /// `signal`
    Signal,
    /// `constant`
    Constant,
    /// `bus`
    Bus,

    // === Literals and names ===
    /// A basic identifier.
    Identifier,
    /// An integer literal, possibly based (`16#FF#`).
    IntLiteral,
    /// A real literal.
    RealLiteral,
    /// A string literal.
    StringLiteral,
    /// A character literal (`'0'`).
    CharLiteral,
    /// A bit string literal (`X"FF"`).
    BitStringLiteral,

    // === Punctuation and operators ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `:`
    Colon,
    /// `:=`
    ColonEquals,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `&`
    Ampersand,
    /// `'`
    Tick,
    /// `.`
    Dot,
    /// `=>`
    Arrow,
    /// Any other operator character sequence (`<=`, `=`, `|`, …).
    Operator,

    // === Special ===
    /// A malformed token (unterminated string, stray byte).
    Error,
    /// End of input.
    Eof,
}

impl VhdlToken {
    /// Returns `true` if this token is a reserved word.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            VhdlToken::Entity
                | VhdlToken::Is
                | VhdlToken::Generic
                | VhdlToken::Port
                | VhdlToken::In
                | VhdlToken::Out
                | VhdlToken::Inout
                | VhdlToken::Buffer
                | VhdlToken::Linkage
                | VhdlToken::End
                | VhdlToken::To
                | VhdlToken::Downto
                | VhdlToken::Range
                | VhdlToken::Signal
                | VhdlToken::Constant
                | VhdlToken::Bus
        )
    }
}

/// A lexed token with its kind and byte range in the source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    /// The kind of this token.
    pub kind: VhdlToken,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Looks up a keyword from a lowercase identifier string.
pub fn lookup_keyword(s: &str) -> Option<VhdlToken> {
    match s {
        "entity" => Some(VhdlToken::Entity),
        "is" => Some(VhdlToken::Is),
        "generic" => Some(VhdlToken::Generic),
        "port" => Some(VhdlToken::Port),
        "in" => Some(VhdlToken::In),
        "out" => Some(VhdlToken::Out),
        "inout" => Some(VhdlToken::Inout),
        "buffer" => Some(VhdlToken::Buffer),
        "linkage" => Some(VhdlToken::Linkage),
        "end" => Some(VhdlToken::End),
        "to" => Some(VhdlToken::To),
        "downto" => Some(VhdlToken::Downto),
        "range" => Some(VhdlToken::Range),
        "signal" => Some(VhdlToken::Signal),
        "constant" => Some(VhdlToken::Constant),
        "bus" => Some(VhdlToken::Bus),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_keywords() {
        assert_eq!(lookup_keyword("entity"), Some(VhdlToken::Entity));
        assert_eq!(lookup_keyword("downto"), Some(VhdlToken::Downto));
        assert_eq!(lookup_keyword("linkage"), Some(VhdlToken::Linkage));
    }

    #[test]
    fn lookup_is_exact_lowercase() {
        assert_eq!(lookup_keyword("ENTITY"), None);
        assert_eq!(lookup_keyword("architecture"), None);
    }

    #[test]
    fn keyword_classification() {
        assert!(VhdlToken::Port.is_keyword());
        assert!(!VhdlToken::Identifier.is_keyword());
        assert!(!VhdlToken::Semicolon.is_keyword());
    }
}
