//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the infrastructure shared by
//! the three parsers: error type, token lookahead, balanced skipping and
//! generic-region capture.
//!
//! # Parser Architecture
//!
//! The Parser is a single-pass recursive descent over the lazy token stream:
//! - `declarations`: file scope (namespaces, types, free functions/variables)
//! - `structs`: struct/class/union bodies and their members
//! - `enums`: enum bodies
//!
//! Parser methods are split across those files using `impl Parser` blocks,
//! allowing each module to extend the Parser while sharing the scanner and
//! the collected [`ParseOutput`].
//!
//! # Failure policy
//!
//! Inside a recognized body every mismatch is a [`ParseError`]. At file scope
//! an unrecognized construct is skipped to the next statement or block
//! boundary and reported on the diagnostic channel instead.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Scanner, Token, TokenKind};
use std::collections::VecDeque;
use thiserror::Error;

/// Parser error type
#[derive(Debug, Clone, Error)]
#[error("Parse error at line {line}, column {column}: {message}", line = .location.line, column = .location.column)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Output policy for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reflect every type body and record it for the aggregate.
    Header,
    /// Skip type bodies, forward-declare free functions and variables.
    Source,
}

/// Everything collected from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    /// Reflected types in the order their bodies closed
    pub types: Vec<TypeDef>,
    /// Every struct/enum body entered in header mode
    pub forward_decls: Vec<ForwardDecl>,
    /// Declarations to re-emit as `extern` (source mode only)
    pub externs: Vec<String>,
    /// One line per unparsed top-level span
    pub diagnostics: Vec<String>,
}

/// Recursive descent parser over one file
pub struct Parser<'src> {
    pub(crate) scanner: Scanner<'src>,
    pub(crate) lookahead: VecDeque<Token<'src>>,
    pub(crate) mode: Mode,
    pub(crate) output: ParseOutput,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, mode: Mode) -> Self {
        Self {
            scanner: Scanner::new(source),
            lookahead: VecDeque::new(),
            mode,
            output: ParseOutput::default(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    // ===== Token helpers =====

    pub(crate) fn source(&self) -> &'src str {
        self.scanner.source()
    }

    /// Next token; end of input is fatal.
    pub(crate) fn next(&mut self) -> Result<Token<'src>, ParseError> {
        let token = self.next_or_end()?;
        if token.is(TokenKind::End) {
            return Err(self.error_at(&token, "Unexpected end of file"));
        }
        Ok(token)
    }

    pub(crate) fn next_or_end(&mut self) -> Result<Token<'src>, ParseError> {
        match self.lookahead.pop_front() {
            Some(token) => Ok(token),
            None => Ok(self.scanner.next_or_end()?),
        }
    }

    pub(crate) fn peek(&mut self) -> Result<Token<'src>, ParseError> {
        self.peek_nth(0)
    }

    /// Token `n` positions ahead without consuming anything.
    pub(crate) fn peek_nth(&mut self, n: usize) -> Result<Token<'src>, ParseError> {
        while self.lookahead.len() <= n {
            let token = self.scanner.next_or_end()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[n])
    }

    /// Put a consumed token back in front of the stream.
    pub(crate) fn push_back(&mut self, token: Token<'src>) {
        self.lookahead.push_front(token);
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, ctx: &str) -> Result<Token<'src>, ParseError> {
        let token = self.next()?;
        if token.is(kind) {
            Ok(token)
        } else {
            Err(self.error_at(&token, &format!("Expected {ctx}, found {token}")))
        }
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<Token<'src>, ParseError> {
        self.expect(TokenKind::Ident, ctx)
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<Token<'src>, ParseError> {
        self.expect(TokenKind::Semicolon, &format!("';' {ctx}"))
    }

    pub(crate) fn error_at(&self, token: &Token<'_>, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            location: SourceLocation::from_offset(self.source(), token.offset),
        }
    }

    // ===== Skipping =====

    /// Consume up to and including the `}` matching `open`.
    pub(crate) fn skip_block(&mut self, open: Token<'src>) -> Result<Token<'src>, ParseError> {
        loop {
            let token = self.next()?;
            if token.is(TokenKind::RBrace) && token.depth == open.depth {
                return Ok(token);
            }
        }
    }

    /// Consume up to and including the `)` matching `open`.
    pub(crate) fn skip_parens(&mut self, open: Token<'src>) -> Result<Token<'src>, ParseError> {
        if open.is(TokenKind::EmptyParens) {
            return Ok(open);
        }
        let mut depth = 1usize;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(token);
                    }
                }
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                }
                _ => {}
            }
        }
    }

    /// Consume up to and including the `]` matching `open`.
    pub(crate) fn skip_brackets(&mut self, open: Token<'src>) -> Result<Token<'src>, ParseError> {
        if open.is(TokenKind::EmptyBrackets) {
            return Ok(open);
        }
        let mut depth = 1usize;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(token);
                    }
                }
                _ => {}
            }
        }
    }

    /// Consume up to and including the next `;` at this level, skipping any
    /// nested blocks.
    pub(crate) fn skip_statement(&mut self) -> Result<Token<'src>, ParseError> {
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Semicolon => return Ok(token),
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                }
                TokenKind::RBrace => return Err(self.error_at(&token, "Expected ';' before '}'")),
                _ => {}
            }
        }
    }

    /// Consume a declaration that ends either in `;` or in a block.
    pub(crate) fn skip_declaration(&mut self) -> Result<Token<'src>, ParseError> {
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Semicolon => return Ok(token),
                TokenKind::LBrace => return self.skip_block(token),
                TokenKind::LParen => {
                    self.skip_parens(token)?;
                }
                TokenKind::RBrace => return Err(self.error_at(&token, "Expected ';' before '}'")),
                _ => {}
            }
        }
    }

    // ===== Generic regions =====

    /// Capture a `<...>` region opened by `open`, returning the text between
    /// the brackets and the offset just past the closing `>`.
    ///
    /// `>>` closes two levels at once. A `>>` that would close more levels
    /// than are open, and any `<<` inside the region, are fatal.
    pub(crate) fn capture_generic(&mut self, open: Token<'src>) -> Result<(&'src str, usize), ParseError> {
        let mut depth: i64 = 1;
        loop {
            let token = self.next()?;
            let close_at = match token.kind {
                TokenKind::Lt => {
                    depth += 1;
                    continue;
                }
                TokenKind::Gt => {
                    depth -= 1;
                    token.offset
                }
                TokenKind::GtGt => {
                    depth -= 2;
                    token.offset + 1
                }
                TokenKind::LtLt => {
                    return Err(self.error_at(&token, "'<<' inside generic argument list"));
                }
                TokenKind::Semicolon => {
                    return Err(self.error_at(&token, "Unterminated generic argument list"));
                }
                TokenKind::LParen => {
                    self.skip_parens(token)?;
                    continue;
                }
                _ => continue,
            };
            if depth < 0 {
                return Err(self.error_at(&token, "'>>' closes more generic argument lists than are open"));
            }
            if depth == 0 {
                return Ok((&self.source()[open.end()..close_at], close_at + 1));
            }
        }
    }

    // ===== Output =====

    /// Source text between two offsets with whitespace runs collapsed.
    pub(crate) fn span_text(&self, start: usize, end: usize) -> String {
        collapse_whitespace(&self.source()[start..end])
    }

    /// Report an unparsed span on the diagnostic channel.
    pub(crate) fn diagnostic(&mut self, start: usize, end: usize) {
        let text = format!("// reflgen: unparsed: {}", self.span_text(start, end));
        let location = SourceLocation::from_offset(self.source(), start);
        tracing::debug!(line = location.line, "{}", text);
        self.output.diagnostics.push(text);
    }

    /// Report a type whose body was parsed but which gets no generated code.
    pub(crate) fn not_reflected(&mut self, qualified_name: &str, reason: &str) {
        let text = format!("// reflgen: not reflected: {qualified_name} ({reason})");
        tracing::debug!("{}", text);
        self.output.diagnostics.push(text);
    }
}

/// Join the words of `text` with single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Argument list naming each parameter of a generic parameter list:
/// `typename K, int N = 4, typename... Ts` gives `K, N, Ts...`.
pub fn generic_arguments(generic: &str) -> String {
    split_top_level(generic)
        .into_iter()
        .filter_map(|param| {
            let param = param.split('=').next().unwrap_or("").trim();
            let name_start = param
                .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .map_or(0, |i| i + 1);
            let name = &param[name_start..];
            if name.is_empty() {
                return None;
            }
            Some(if param.contains("...") {
                format!("{name}...")
            } else {
                name.to_string()
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split on commas that are not nested in `<>`, `()`, `[]` or `{}`.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if !text[start..].trim().is_empty() {
        parts.push(&text[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(source: &str) -> Result<String, ParseError> {
        let mut parser = Parser::new(source, Mode::Header);
        let open = parser.expect(TokenKind::Lt, "'<'")?;
        let (text, _) = parser.capture_generic(open)?;
        Ok(text.to_string())
    }

    #[test]
    fn test_capture_simple_generic() {
        assert_eq!(capture("<typename T> struct").unwrap(), "typename T");
    }

    #[test]
    fn test_capture_nested_generic_closed_by_shift() {
        assert_eq!(
            capture("<typename T = std::vector<int>> struct").unwrap(),
            "typename T = std::vector<int>"
        );
        assert_eq!(capture("<Map<K, Vec<V>>> x").unwrap(), "Map<K, Vec<V>>");
    }

    #[test]
    fn test_shift_right_closing_too_much_is_fatal() {
        let err = capture("<int>> x").unwrap_err();
        assert!(err.message.contains("'>>'"));
    }

    #[test]
    fn test_shift_left_inside_generic_is_fatal() {
        let err = capture("<int N = 1 << 2> x").unwrap_err();
        assert!(err.message.contains("'<<'"));
    }

    #[test]
    fn test_lookahead_and_push_back() {
        let mut parser = Parser::new("a b c", Mode::Header);
        assert_eq!(parser.peek_nth(1).unwrap().text, "b");
        let a = parser.next().unwrap();
        assert_eq!(a.text, "a");
        parser.push_back(a);
        assert_eq!(parser.next().unwrap().text, "a");
        assert_eq!(parser.next().unwrap().text, "b");
        assert_eq!(parser.next().unwrap().text, "c");
        assert!(parser.next().is_err());
    }

    #[test]
    fn test_skip_block_stops_at_matching_brace() {
        let mut parser = Parser::new("{ { } x } y", Mode::Header);
        let open = parser.next().unwrap();
        parser.skip_block(open).unwrap();
        assert_eq!(parser.next().unwrap().text, "y");
    }

    #[test]
    fn test_generic_arguments() {
        assert_eq!(generic_arguments("typename T"), "T");
        assert_eq!(generic_arguments("typename K, int N = 4"), "K, N");
        assert_eq!(generic_arguments("typename... Ts"), "Ts...");
        assert_eq!(
            generic_arguments("typename T = std::pair<int, int>, class U"),
            "T, U"
        );
        assert_eq!(generic_arguments(""), "");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("int\n   foo (\tint a)"), "int foo ( int a)");
    }
}
