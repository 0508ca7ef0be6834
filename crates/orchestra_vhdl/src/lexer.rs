//! Lexical analyzer for VHDL source text.
//!
//! Converts source text into a sequence of [`Token`]s, handling case-insensitive
//! keywords, based literals, string/character/bit-string literals, and block and
//! line comments. The lexer never fails: malformed input produces
//! [`VhdlToken::Error`] tokens, which only matter if the parser reaches them.

use crate::token::{lookup_keyword, Token, VhdlToken};

/// Lexes the given source text into a vector of tokens.
///
/// Whitespace and comments are skipped. The returned vector always ends with
/// a [`VhdlToken::Eof`] token.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: VhdlToken::Eof,
                    start: self.pos,
                    end: self.pos,
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn token(&self, kind: VhdlToken, start: usize) -> Token {
        Token {
            kind,
            start,
            end: self.pos,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos >= self.source.len() {
                return;
            }
            // Line comment: --
            if self.peek() == b'-' && self.peek_at(1) == b'-' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            // Block comment: /* ... */ (VHDL-2008)
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                self.pos += 2;
                while self.pos < self.source.len()
                    && !(self.source[self.pos] == b'*' && self.peek_at(1) == b'/')
                {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(self.source.len());
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        // Character literal: exactly '<char>'. A tick followed by anything
        // else is an attribute tick.
        if b == b'\'' && self.peek_at(2) == b'\'' && self.peek_at(1) != 0 {
            self.pos += 3;
            return self.token(VhdlToken::CharLiteral, start);
        }

        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }

        if b.is_ascii_digit() {
            return self.lex_number(start);
        }

        if b == b'"' {
            return self.lex_string(start);
        }

        self.lex_operator(start)
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }

        let text = &self.source[start..self.pos];

        // Bit string literal prefix: B"...", O"...", X"..."
        if self.peek() == b'"' && text.len() <= 2 {
            let lower = text.to_ascii_lowercase();
            let is_bit_prefix = matches!(
                lower.as_slice(),
                b"b" | b"o" | b"x" | b"ub" | b"uo" | b"ux" | b"sb" | b"so" | b"sx" | b"d"
            );
            if is_bit_prefix {
                let string = self.lex_string(self.pos);
                let kind = if string.kind == VhdlToken::Error {
                    VhdlToken::Error
                } else {
                    VhdlToken::BitStringLiteral
                };
                return self.token(kind, start);
            }
        }

        let lower = String::from_utf8_lossy(text).to_ascii_lowercase();
        let kind = lookup_keyword(&lower).unwrap_or(VhdlToken::Identifier);
        self.token(kind, start)
    }

    fn lex_number(&mut self, start: usize) -> Token {
        self.eat_digits();

        // Based literal: base#digits#
        if self.peek() == b'#' {
            self.pos += 1;
            while self.pos < self.source.len() {
                let ch = self.source[self.pos];
                if ch.is_ascii_hexdigit() || ch == b'_' || ch == b'.' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() != b'#' {
                return self.token(VhdlToken::Error, start);
            }
            self.pos += 1;
            self.eat_exponent();
            let kind = if self.source[start..self.pos].contains(&b'.') {
                VhdlToken::RealLiteral
            } else {
                VhdlToken::IntLiteral
            };
            return self.token(kind, start);
        }

        // Real literal: digits.digits
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            self.pos += 1;
            self.eat_digits();
            self.eat_exponent();
            return self.token(VhdlToken::RealLiteral, start);
        }

        self.eat_exponent();
        self.token(VhdlToken::IntLiteral, start)
    }

    fn eat_digits(&mut self) {
        while self.pos < self.source.len() {
            let ch = self.source[self.pos];
            if ch.is_ascii_digit() || ch == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn eat_exponent(&mut self) {
        let b = self.peek();
        if b == b'e' || b == b'E' {
            let sign = matches!(self.peek_at(1), b'+' | b'-');
            let digit_at = if sign { 2 } else { 1 };
            if self.peek_at(digit_at).is_ascii_digit() {
                self.pos += digit_at;
                self.eat_digits();
            }
        }
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1; // skip opening "
        loop {
            if self.pos >= self.source.len() || self.source[self.pos] == b'\n' {
                return self.token(VhdlToken::Error, start);
            }
            if self.source[self.pos] == b'"' {
                // Escaped quote: ""
                if self.peek_at(1) == b'"' {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return self.token(VhdlToken::StringLiteral, start);
            }
            self.pos += 1;
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        let b = self.source[self.pos];
        self.pos += 1;
        let kind = match b {
            b'(' => VhdlToken::LeftParen,
            b')' => VhdlToken::RightParen,
            b',' => VhdlToken::Comma,
            b';' => VhdlToken::Semicolon,
            b':' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    VhdlToken::ColonEquals
                } else {
                    VhdlToken::Colon
                }
            }
            b'=' => {
                if self.peek() == b'>' {
                    self.pos += 1;
                    VhdlToken::Arrow
                } else {
                    VhdlToken::Operator
                }
            }
            b'*' => {
                if self.peek() == b'*' {
                    self.pos += 1;
                    VhdlToken::DoubleStar
                } else {
                    VhdlToken::Star
                }
            }
            b'/' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    VhdlToken::Operator
                } else {
                    VhdlToken::Slash
                }
            }
            b'<' | b'>' => {
                if matches!(self.peek(), b'=' | b'>' | b'<') {
                    self.pos += 1;
                }
                VhdlToken::Operator
            }
            b'+' => VhdlToken::Plus,
            b'-' => VhdlToken::Minus,
            b'&' => VhdlToken::Ampersand,
            b'\'' => VhdlToken::Tick,
            b'.' => VhdlToken::Dot,
            b'|' | b'?' | b'@' | b'^' | b'[' | b']' => VhdlToken::Operator,
            _ => {
                // Skip the rest of a multi-byte UTF-8 sequence so offsets
                // stay on character boundaries.
                while self.pos < self.source.len() && (self.source[self.pos] & 0xC0) == 0x80 {
                    self.pos += 1;
                }
                VhdlToken::Error
            }
        };
        self.token(kind, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
