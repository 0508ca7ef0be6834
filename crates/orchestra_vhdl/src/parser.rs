//! Recursive descent parser for entity headers.
//!
//! [`EntityParser`] locates the first `entity <name> is` in a token stream and
//! parses its generic and port clauses. Everything outside the entity
//! declaration (context clauses, architectures, packages) is skipped without
//! being inspected.

use crate::entity::{Constraint, Entity, Generic, Port, PortMode, SubtypeIndication};
use crate::error::ParseError;
use crate::expr::{parse_vhdl_integer, BinOp, Expr, Range, RangeDirection};
use crate::lexer::lex;
use crate::token::{Token, VhdlToken};
use std::collections::HashSet;
use std::path::Path;

/// Parses the first entity declaration found in `source`.
pub fn parse_entity(source: &str) -> Result<Entity, ParseError> {
    let mut parser = EntityParser::new(lex(source), source);
    parser.parse()
}

/// Reads `path` and parses the first entity declaration found in it.
pub fn parse_entity_file(path: &Path) -> Result<Entity, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_entity(&source)
}

/// Parses a standalone static integer expression, such as a generic value.
pub fn parse_expression(text: &str) -> Result<Expr, ParseError> {
    let mut parser = EntityParser::new(lex(text), text);
    let expr = parser.parse_expr()?;
    if !parser.at(VhdlToken::Eof) {
        return Err(parser.expected("end of expression"));
    }
    Ok(expr)
}

/// Which interface list is being parsed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Generic,
    Port,
}

/// A parser over a lexed token stream.
pub struct EntityParser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
}

impl<'src> EntityParser<'src> {
    /// Creates a new parser from a token stream ending in [`VhdlToken::Eof`].
    pub fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    fn token_at(&self, pos: usize) -> Token {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens.get(pos.min(last)).copied().unwrap_or(Token {
            kind: VhdlToken::Eof,
            start: self.source.len(),
            end: self.source.len(),
        })
    }

    fn current(&self) -> VhdlToken {
        self.token_at(self.pos).kind
    }

    fn peek(&self, offset: usize) -> VhdlToken {
        self.token_at(self.pos + offset).kind
    }

    fn text_of(&self, token: Token) -> &'src str {
        &self.source[token.start..token.end]
    }

    fn current_text(&self) -> &'src str {
        self.text_of(self.token_at(self.pos))
    }

    fn at(&self, kind: VhdlToken) -> bool {
        self.current() == kind
    }

    fn advance(&mut self) {
        if !self.at(VhdlToken::Eof) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: VhdlToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: VhdlToken, what: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.expected(what))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        if self.at(VhdlToken::Identifier) {
            let name = self.current_text().to_ascii_lowercase();
            self.advance();
            Ok(name)
        } else {
            Err(self.expected("identifier"))
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let start = self.token_at(self.pos).start.min(self.source.len());
        let line = self.source.as_bytes()[..start]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1;
        ParseError::Syntax {
            line,
            message: message.into(),
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        if self.at(VhdlToken::Eof) {
            self.error(format!("expected {what}, found end of file"))
        } else {
            self.error(format!("expected {what}, found '{}'", self.current_text()))
        }
    }

    // ========================================================================
    // Entity declaration
    // ========================================================================

    /// Parses the first entity declaration in the token stream.
    pub fn parse(&mut self) -> Result<Entity, ParseError> {
        self.seek_entity()?;
        self.advance(); // entity
        let name = self.expect_ident()?;
        self.expect(VhdlToken::Is, "'is'")?;

        let mut entity = Entity::new(&name);
        if self.eat(VhdlToken::Generic) {
            entity.generics = self
                .parse_clause(ListKind::Generic)?
                .into_iter()
                .map(|d| Generic {
                    name: d.name,
                    ty: d.ty,
                    default: d.default,
                })
                .collect();
        }
        if self.eat(VhdlToken::Port) {
            entity.ports = self
                .parse_clause(ListKind::Port)?
                .into_iter()
                .map(|d| Port {
                    name: d.name,
                    mode: d.mode,
                    ty: d.ty,
                    default: d.default,
                })
                .collect();
        }
        self.parse_entity_end(&name)?;
        check_unique(&entity)?;
        Ok(entity)
    }

    /// Moves to the first `entity <ident> is` sequence.
    fn seek_entity(&mut self) -> Result<(), ParseError> {
        while !self.at(VhdlToken::Eof) {
            if self.at(VhdlToken::Entity)
                && self.peek(1) == VhdlToken::Identifier
                && self.peek(2) == VhdlToken::Is
            {
                return Ok(());
            }
            self.advance();
        }
        Err(ParseError::NoEntity)
    }

    /// Consumes the rest of the declaration through `end [entity] [name];`.
    ///
    /// Entity declarative items and passive statements are skipped.
    fn parse_entity_end(&mut self, name: &str) -> Result<(), ParseError> {
        loop {
            if self.at(VhdlToken::Eof) {
                return Err(self.error(format!("missing 'end' for entity '{name}'")));
            }
            if self.at(VhdlToken::End) {
                match self.peek(1) {
                    VhdlToken::Entity | VhdlToken::Semicolon => break,
                    VhdlToken::Identifier
                        if self
                            .text_of(self.token_at(self.pos + 1))
                            .eq_ignore_ascii_case(name) =>
                    {
                        break
                    }
                    _ => {}
                }
            }
            self.advance();
        }
        self.advance(); // end
        self.eat(VhdlToken::Entity);
        if self.at(VhdlToken::Identifier) {
            let label = self.current_text().to_ascii_lowercase();
            if label != name {
                return Err(self.error(format!(
                    "end label '{label}' does not match entity '{name}'"
                )));
            }
            self.advance();
        }
        self.expect(VhdlToken::Semicolon, "';'")
    }

    // ========================================================================
    // Interface lists
    // ========================================================================

    fn parse_clause(&mut self, kind: ListKind) -> Result<Vec<InterfaceDecl>, ParseError> {
        self.expect(VhdlToken::LeftParen, "'('")?;
        let mut decls = Vec::new();
        loop {
            decls.extend(self.parse_interface_decl(kind)?);
            if self.eat(VhdlToken::Semicolon) {
                continue;
            }
            break;
        }
        self.expect(VhdlToken::RightParen, "')'")?;
        self.expect(VhdlToken::Semicolon, "';'")?;
        Ok(decls)
    }

    fn parse_interface_decl(&mut self, kind: ListKind) -> Result<Vec<InterfaceDecl>, ParseError> {
        match kind {
            ListKind::Generic => {
                self.eat(VhdlToken::Constant);
            }
            ListKind::Port => {
                self.eat(VhdlToken::Signal);
            }
        }

        let mut names = vec![self.expect_ident()?];
        while self.eat(VhdlToken::Comma) {
            names.push(self.expect_ident()?);
        }
        self.expect(VhdlToken::Colon, "':'")?;

        let mode = match kind {
            ListKind::Generic => {
                self.eat(VhdlToken::In);
                PortMode::In
            }
            ListKind::Port => self.parse_mode(),
        };
        let ty = self.parse_subtype_indication()?;
        self.eat(VhdlToken::Bus);
        let default = if self.eat(VhdlToken::ColonEquals) {
            Some(self.parse_default()?)
        } else {
            None
        };

        Ok(names
            .into_iter()
            .map(|name| InterfaceDecl {
                name,
                mode,
                ty: ty.clone(),
                default: default.clone(),
            })
            .collect())
    }

    fn parse_mode(&mut self) -> PortMode {
        let mode = match self.current() {
            VhdlToken::In => PortMode::In,
            VhdlToken::Out => PortMode::Out,
            VhdlToken::Inout => PortMode::Inout,
            VhdlToken::Buffer => PortMode::Buffer,
            VhdlToken::Linkage => PortMode::Linkage,
            _ => return PortMode::In,
        };
        self.advance();
        mode
    }

    fn parse_subtype_indication(&mut self) -> Result<SubtypeIndication, ParseError> {
        let mut type_mark = self.expect_ident()?;
        while self.at(VhdlToken::Dot) && self.peek(1) == VhdlToken::Identifier {
            self.advance();
            type_mark.push('.');
            type_mark.push_str(&self.expect_ident()?);
        }

        let constraint = if self.eat(VhdlToken::LeftParen) {
            let range = self.parse_range()?;
            self.expect(VhdlToken::RightParen, "')'")?;
            Some(Constraint::Index(range))
        } else if self.eat(VhdlToken::Range) {
            Some(Constraint::Range(self.parse_range()?))
        } else {
            None
        };
        Ok(SubtypeIndication {
            type_mark,
            constraint,
        })
    }

    /// Captures a default value up to the `;` or `)` ending the declaration.
    fn parse_default(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.current() {
                VhdlToken::Eof => return Err(self.expected("';' or ')'")),
                VhdlToken::LeftParen => depth += 1,
                VhdlToken::RightParen if depth == 0 => break,
                VhdlToken::RightParen => depth -= 1,
                VhdlToken::Semicolon if depth == 0 => break,
                _ => {}
            }
            self.advance();
        }
        if self.pos == start {
            return Err(self.expected("default value"));
        }
        Ok(join_tokens(self.source, &self.tokens[start..self.pos]))
    }

    // ========================================================================
    // Ranges and expressions
    // ========================================================================

    fn parse_range(&mut self) -> Result<Range, ParseError> {
        let left = self.parse_expr()?;
        let direction = if self.eat(VhdlToken::Downto) {
            RangeDirection::Downto
        } else if self.eat(VhdlToken::To) {
            RangeDirection::To
        } else {
            return Err(self.expected("'to' or 'downto'"));
        };
        let right = self.parse_expr()?;
        Ok(Range {
            left,
            direction,
            right,
        })
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = if self.eat(VhdlToken::Minus) {
            Expr::Neg(Box::new(self.parse_term()?))
        } else {
            self.eat(VhdlToken::Plus);
            self.parse_term()?
        };
        loop {
            let op = match self.current() {
                VhdlToken::Plus => BinOp::Add,
                VhdlToken::Minus => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.current() {
                VhdlToken::Star => BinOp::Mul,
                VhdlToken::Slash => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_factor()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if self.eat(VhdlToken::DoubleStar) {
            let exp = self.parse_primary()?;
            return Ok(Expr::binary(BinOp::Pow, base, exp));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current() {
            VhdlToken::IntLiteral => {
                let text = self.current_text();
                let value = parse_vhdl_integer(text)
                    .ok_or_else(|| self.error(format!("integer literal '{text}' out of range")))?;
                self.advance();
                Ok(Expr::Int(value))
            }
            VhdlToken::Identifier => {
                let name = self.current_text().to_ascii_lowercase();
                match self.peek(1) {
                    VhdlToken::LeftParen => {
                        return Err(self.error(format!(
                            "function call '{name}' is not supported in a range"
                        )))
                    }
                    VhdlToken::Tick => {
                        return Err(self.error(format!(
                            "attribute of '{name}' is not supported in a range"
                        )))
                    }
                    _ => {}
                }
                self.advance();
                Ok(Expr::Name(name))
            }
            VhdlToken::LeftParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(VhdlToken::RightParen, "')'")?;
                Ok(Expr::Paren(Box::new(inner)))
            }
            _ => Err(self.expected("expression")),
        }
    }
}

/// A declaration from either interface list, before it becomes a generic or port.
struct InterfaceDecl {
    name: String,
    mode: PortMode,
    ty: SubtypeIndication,
    default: Option<String>,
}

fn check_unique(entity: &Entity) -> Result<(), ParseError> {
    let mut seen = HashSet::new();
    let names = entity
        .generics
        .iter()
        .map(|g| &g.name)
        .chain(entity.ports.iter().map(|p| &p.name));
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ParseError::Duplicate {
                entity: entity.name.clone(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

/// Joins token texts with single spaces, tightening parentheses, commas,
/// selections, attribute ticks and unary signs.
fn join_tokens(source: &str, tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<VhdlToken> = None;
    let mut prev_unary = false;
    for token in tokens {
        let kind = token.kind;
        if let Some(p) = prev {
            let tight = matches!(p, VhdlToken::LeftParen | VhdlToken::Tick | VhdlToken::Dot)
                || matches!(
                    kind,
                    VhdlToken::RightParen | VhdlToken::Comma | VhdlToken::Tick | VhdlToken::Dot
                )
                || (kind == VhdlToken::LeftParen && p == VhdlToken::Identifier)
                || prev_unary;
            if !tight {
                out.push(' ');
            }
        }
        prev_unary = matches!(kind, VhdlToken::Minus | VhdlToken::Plus)
            && prev.map_or(true, |p| {
                matches!(
                    p,
                    VhdlToken::LeftParen
                        | VhdlToken::Comma
                        | VhdlToken::Plus
                        | VhdlToken::Minus
                        | VhdlToken::Star
                        | VhdlToken::Slash
                        | VhdlToken::DoubleStar
                        | VhdlToken::Ampersand
                        | VhdlToken::Arrow
                        | VhdlToken::Operator
                )
            });
        out.push_str(&source[token.start..token.end]);
        prev = Some(kind);
    }
    out
}
