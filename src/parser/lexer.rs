//! Scanner (tokenizer) for C++-like header and implementation files
//!
//! Produces [`Token`]s lazily, one per call, straight out of the source
//! buffer. Comments, whitespace and preprocessor lines (including their
//! backslash continuations) are skipped between tokens. The scanner also owns
//! the brace-depth counter and the stack of enclosing scope names, because
//! both change exactly when a brace token is produced.
//!
//! The delimiter searches (identifier runs, literal terminators, comment and
//! line ends) go through [`window`], which scans 32-byte windows, testing
//! single-byte delimiters a word at a time. Token boundaries are identical to
//! a plain byte-by-byte loop.

use super::ast::SourceLocation;
use std::fmt;
use thiserror::Error;

/// Closed set of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier, possibly qualified (`a::b::c` is one token)
    Ident,
    Number,
    Str,
    /// `""`
    EmptyStr,
    Char,

    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    Question,  // ?
    Tilde,     // ~

    Plus,    // +
    Minus,   // -
    Star,    // *
    Slash,   // /
    Percent, // %
    Caret,   // ^
    Amp,     // &
    Pipe,    // |
    Bang,    // !
    Eq,      // =
    Lt,      // <
    Gt,      // >
    Colon,   // :

    PlusPlus,   // ++
    MinusMinus, // --
    AmpAmp,     // &&
    PipePipe,   // ||
    EqEq,       // ==
    LtLt,       // <<
    GtGt,       // >>
    ColonColon, // ::

    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    CaretEq,   // ^=
    AmpEq,     // &=
    PipeEq,    // |=
    BangEq,    // !=
    LtEq,      // <=
    GtEq,      // >=
    ColonEq,   // :=

    LBrace,        // {
    RBrace,        // }
    LParen,        // (
    RParen,        // )
    LBracket,      // [
    RBracket,      // ]
    EmptyParens,   // ()
    EmptyBrackets, // []

    End,
}

impl TokenKind {
    /// Kind produced when `ch` is immediately repeated.
    fn doubled(ch: u8) -> Option<TokenKind> {
        Some(match ch {
            b'-' => TokenKind::MinusMinus,
            b':' => TokenKind::ColonColon,
            b'&' => TokenKind::AmpAmp,
            b'|' => TokenKind::PipePipe,
            b'+' => TokenKind::PlusPlus,
            b'=' => TokenKind::EqEq,
            b'<' => TokenKind::LtLt,
            b'>' => TokenKind::GtGt,
            _ => return None,
        })
    }

    /// Kind produced when `ch` is immediately followed by `=`.
    fn with_eq(ch: u8) -> Option<TokenKind> {
        Some(match ch {
            b'%' => TokenKind::PercentEq,
            b'^' => TokenKind::CaretEq,
            b'*' => TokenKind::StarEq,
            b'/' => TokenKind::SlashEq,
            b'!' => TokenKind::BangEq,
            b'-' => TokenKind::MinusEq,
            b':' => TokenKind::ColonEq,
            b'&' => TokenKind::AmpEq,
            b'|' => TokenKind::PipeEq,
            b'+' => TokenKind::PlusEq,
            b'<' => TokenKind::LtEq,
            b'>' => TokenKind::GtEq,
            _ => return None,
        })
    }

    fn single(ch: u8) -> Option<TokenKind> {
        Some(match ch {
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b'?' => TokenKind::Question,
            b'~' => TokenKind::Tilde,
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'%' => TokenKind::Percent,
            b'^' => TokenKind::Caret,
            b'&' => TokenKind::Amp,
            b'|' => TokenKind::Pipe,
            b'!' => TokenKind::Bang,
            b'=' => TokenKind::Eq,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            b':' => TokenKind::Colon,
            b')' => TokenKind::RParen,
            b']' => TokenKind::RBracket,
            _ => return None,
        })
    }
}

/// One classified slice of source text.
///
/// `depth` is the brace depth the token was produced at. An opening brace
/// and its matching closing brace carry the same depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub offset: usize,
    pub depth: u32,
}

impl<'src> Token<'src> {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == text
    }

    /// Byte offset one past the end of the token.
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::Str | TokenKind::EmptyStr => write!(f, "string literal {}", self.text),
            TokenKind::Char => write!(f, "char literal {}", self.text),
            TokenKind::End => write!(f, "end of file"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Scanner error. Always fatal for the file being scanned.
#[derive(Debug, Clone, Error)]
#[error("Lexer error at line {line}, column {column}: {message}", line = .location.line, column = .location.column)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// A scope opened by a namespace or type body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Name as it appears in a qualified name, generic arguments included
    /// (`Vec<T>`).
    pub segment: String,
    /// Brace depth of the `{` that opened the scope.
    pub depth: u32,
}

/// Lazy scanner over one source buffer.
pub struct Scanner<'src> {
    source: &'src str,
    position: usize,
    depth: u32,
    scopes: Vec<Scope>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            position: 0,
            depth: 0,
            scopes: Vec::new(),
        }
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Open a scope whose body started with the brace at `depth`. It is
    /// popped automatically when the matching `}` is scanned.
    pub fn push_scope(&mut self, segment: impl Into<String>, depth: u32) {
        self.scopes.push(Scope {
            segment: segment.into(),
            depth,
        });
    }

    /// Fully-qualified prefix of the innermost open scope.
    pub fn qualified_name(&self) -> String {
        self.scopes
            .iter()
            .map(|s| s.segment.as_str())
            .collect::<Vec<_>>()
            .join("::")
    }

    /// Next token; running out of input is an error.
    pub fn next(&mut self) -> Result<Token<'src>, LexError> {
        let token = self.next_or_end()?;
        if token.is(TokenKind::End) {
            return Err(self.error("Unexpected end of file", token.offset));
        }
        Ok(token)
    }

    /// Next token, or an [`TokenKind::End`] marker once input is exhausted.
    pub fn next_or_end(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_trivia()?;

        let bytes = self.source.as_bytes();
        let start = self.position;
        let Some(&ch) = bytes.get(start) else {
            return Ok(self.token(TokenKind::End, start, start));
        };
        let next = bytes.get(start + 1).copied();

        match ch {
            b'{' => {
                let token = self.token(TokenKind::LBrace, start, start + 1);
                self.depth += 1;
                self.position = start + 1;
                Ok(token)
            }
            b'}' => {
                if self.depth == 0 {
                    return Err(self.error("Unbalanced '}'", start));
                }
                self.depth -= 1;
                let depth = self.depth;
                while self.scopes.last().is_some_and(|s| s.depth == depth) {
                    self.scopes.pop();
                }
                self.position = start + 1;
                Ok(self.token(TokenKind::RBrace, start, start + 1))
            }
            b'(' if next == Some(b')') => Ok(self.emit(TokenKind::EmptyParens, start, 2)),
            b'(' => Ok(self.emit(TokenKind::LParen, start, 1)),
            b'[' if next == Some(b']') => Ok(self.emit(TokenKind::EmptyBrackets, start, 2)),
            b'[' => Ok(self.emit(TokenKind::LBracket, start, 1)),
            b'"' if next == Some(b'"') => Ok(self.emit(TokenKind::EmptyStr, start, 2)),
            b'"' => self.string_literal(start),
            b'\'' => self.char_literal(start),
            b'0'..=b'9' => Ok(self.number_literal(start)),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => Ok(self.identifier(start)),
            _ => {
                if next == Some(ch) {
                    if let Some(kind) = TokenKind::doubled(ch) {
                        return Ok(self.emit(kind, start, 2));
                    }
                }
                if next == Some(b'=') {
                    if let Some(kind) = TokenKind::with_eq(ch) {
                        return Ok(self.emit(kind, start, 2));
                    }
                }
                match TokenKind::single(ch) {
                    Some(kind) => Ok(self.emit(kind, start, 1)),
                    None => {
                        let shown = self.source[start..].chars().next().unwrap_or('?');
                        Err(self.error(&format!("Unexpected character: '{}'", shown), start))
                    }
                }
            }
        }
    }

    fn string_literal(&mut self, start: usize) -> Result<Token<'src>, LexError> {
        let end = window::find_unescaped(self.source.as_bytes(), start + 1, b'"')
            .ok_or_else(|| self.error("Unterminated string literal", start))?;
        Ok(self.emit(TokenKind::Str, start, end + 1 - start))
    }

    fn char_literal(&mut self, start: usize) -> Result<Token<'src>, LexError> {
        let end = window::find_unescaped(self.source.as_bytes(), start + 1, b'\'')
            .ok_or_else(|| self.error("Unterminated character literal", start))?;
        Ok(self.emit(TokenKind::Char, start, end + 1 - start))
    }

    fn number_literal(&mut self, start: usize) -> Token<'src> {
        let len = self.source.as_bytes()[start..]
            .iter()
            .position(|b| !(b.is_ascii_digit() || *b == b'.'))
            .unwrap_or(self.source.len() - start);
        self.emit(TokenKind::Number, start, len)
    }

    fn identifier(&mut self, start: usize) -> Token<'src> {
        let end = window::identifier_end(self.source.as_bytes(), start);
        self.emit(TokenKind::Ident, start, end - start)
    }

    /// Skip whitespace, comments and preprocessor lines.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        let bytes = self.source.as_bytes();
        loop {
            match bytes.get(self.position) {
                Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0b | 0x0c) => self.position += 1,
                Some(b'/') if bytes.get(self.position + 1) == Some(&b'/') => {
                    self.position = window::line_end(bytes, self.position + 2);
                }
                Some(b'/') if bytes.get(self.position + 1) == Some(&b'*') => {
                    let end = window::block_comment_end(bytes, self.position + 2)
                        .ok_or_else(|| self.error("Unterminated block comment", self.position))?;
                    self.position = end;
                }
                Some(b'#') => self.position = window::line_end(bytes, self.position + 1),
                _ => return Ok(()),
            }
        }
    }

    fn emit(&mut self, kind: TokenKind, start: usize, len: usize) -> Token<'src> {
        self.position = start + len;
        self.token(kind, start, start + len)
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token<'src> {
        Token {
            kind,
            text: &self.source[start..end],
            offset: start,
            depth: self.depth,
        }
    }

    fn error(&self, message: &str, offset: usize) -> LexError {
        LexError {
            message: message.to_string(),
            location: SourceLocation::from_offset(self.source, offset),
        }
    }
}

/// Windowed delimiter searches.
///
/// Single-byte searches (quotes, newlines, `*`) compare a 32-byte window as
/// four 64-bit words at once, so each step tests eight bytes with a handful of
/// integer operations. Identifier runs have no single delimiter byte; their
/// window mask is built from a per-byte class test. Either way the lowest hit
/// in the window wins, and the tail of the buffer is copied into a
/// zero-padded window and masked to its real length.
pub(crate) mod window {
    const WIDTH: usize = 32;
    const LANE: usize = 8;
    const ONES: u64 = 0x0101_0101_0101_0101;
    const LOW7: u64 = 0x7f7f_7f7f_7f7f_7f7f;

    fn is_ident_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'_'
    }

    fn is_ident_start(b: u8) -> bool {
        b.is_ascii_alphabetic() || b == b'_'
    }

    /// High bit set in exactly the bytes of `word` equal to `needle`.
    fn equal_bytes(word: u64, needle: u8) -> u64 {
        let x = word ^ (ONES * u64::from(needle));
        !(((x & LOW7) + LOW7) | x | LOW7)
    }

    /// Index of the first `needle` in a full window.
    fn first_in_window(window: &[u8], needle: u8) -> Option<usize> {
        for (lane, chunk) in window.chunks_exact(LANE).enumerate() {
            let mut word = [0u8; LANE];
            word.copy_from_slice(chunk);
            let hits = equal_bytes(u64::from_le_bytes(word), needle);
            if hits != 0 {
                return Some(lane * LANE + hits.trailing_zeros() as usize / LANE);
            }
        }
        None
    }

    /// First index `>= from` holding `needle`, which must not be zero.
    fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
        let hay = bytes.get(from..)?;
        let mut chunks = hay.chunks_exact(WIDTH);
        let mut base = from;
        for chunk in &mut chunks {
            if let Some(i) = first_in_window(chunk, needle) {
                return Some(base + i);
            }
            base += WIDTH;
        }

        let rest = chunks.remainder();
        let mut padded = [0u8; WIDTH];
        padded[..rest.len()].copy_from_slice(rest);
        first_in_window(&padded, needle)
            .filter(|&i| i < rest.len())
            .map(|i| base + i)
    }

    /// First index `>= from` whose byte satisfies `pred`.
    fn find(bytes: &[u8], from: usize, pred: impl Fn(u8) -> bool) -> Option<usize> {
        let hay = bytes.get(from..)?;
        let mut chunks = hay.chunks_exact(WIDTH);
        let mut base = from;
        for chunk in &mut chunks {
            let mut mask = 0u32;
            for (i, &b) in chunk.iter().enumerate() {
                mask |= (pred(b) as u32) << i;
            }
            if mask != 0 {
                return Some(base + mask.trailing_zeros() as usize);
            }
            base += WIDTH;
        }

        let rest = chunks.remainder();
        let mut padded = [0u8; WIDTH];
        padded[..rest.len()].copy_from_slice(rest);
        let mut mask = 0u32;
        for (i, &b) in padded.iter().enumerate() {
            mask |= (pred(b) as u32) << i;
        }
        mask &= (1u32 << rest.len()).wrapping_sub(1);
        (mask != 0).then(|| base + mask.trailing_zeros() as usize)
    }

    /// Number of consecutive backslashes ending right before `at`.
    fn backslashes_before(bytes: &[u8], at: usize) -> usize {
        bytes[..at].iter().rev().take_while(|&&b| b == b'\\').count()
    }

    /// Whether the newline at `at` is escaped (`\\\n` or `\\\r\n`).
    fn newline_escaped(bytes: &[u8], at: usize) -> bool {
        let at = if at > 0 && bytes[at - 1] == b'\r' { at - 1 } else { at };
        backslashes_before(bytes, at) % 2 == 1
    }

    /// Index of the first `quote` at or after `from` not escaped by an odd
    /// run of backslashes.
    pub fn find_unescaped(bytes: &[u8], from: usize, quote: u8) -> Option<usize> {
        let mut at = from;
        loop {
            let hit = find_byte(bytes, at, quote)?;
            if backslashes_before(bytes, hit) % 2 == 0 {
                return Some(hit);
            }
            at = hit + 1;
        }
    }

    /// Offset just past the newline ending the logical line that contains
    /// `from`. A newline preceded by an odd run of backslashes continues the
    /// line.
    pub fn line_end(bytes: &[u8], from: usize) -> usize {
        let mut at = from;
        loop {
            match find_byte(bytes, at, b'\n') {
                None => return bytes.len(),
                Some(hit) if newline_escaped(bytes, hit) => at = hit + 1,
                Some(hit) => return hit + 1,
            }
        }
    }

    /// Offset just past the `*/` closing a block comment whose body starts
    /// at `from`.
    pub fn block_comment_end(bytes: &[u8], from: usize) -> Option<usize> {
        let mut at = from;
        loop {
            let hit = find_byte(bytes, at, b'*')?;
            if bytes.get(hit + 1) == Some(&b'/') {
                return Some(hit + 2);
            }
            at = hit + 1;
        }
    }

    /// End of an identifier run starting at `from`, swallowing `::` when it
    /// is followed by another identifier.
    pub fn identifier_end(bytes: &[u8], from: usize) -> usize {
        let mut at = from;
        loop {
            let end = find(bytes, at, |b| !is_ident_byte(b)).unwrap_or(bytes.len());
            let joins = bytes.get(end) == Some(&b':')
                && bytes.get(end + 1) == Some(&b':')
                && bytes.get(end + 2).is_some_and(|&b| is_ident_start(b));
            if !joins {
                return end;
            }
            at = end + 2;
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = scanner.next_or_end().unwrap();
            kinds.push(token.kind);
            if token.is(TokenKind::End) {
                return kinds;
            }
        }
    }

    fn texts(source: &str) -> Vec<&str> {
        let mut scanner = Scanner::new(source);
        let mut texts = Vec::new();
        loop {
            let token = scanner.next_or_end().unwrap();
            if token.is(TokenKind::End) {
                return texts;
            }
            texts.push(token.text);
        }
    }

    #[test]
    fn test_simple_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("struct Foo { int x; };"),
            vec![Ident, Ident, LBrace, Ident, Ident, Semicolon, RBrace, Semicolon, End]
        );
    }

    #[test]
    fn test_qualified_identifier_is_one_token() {
        assert_eq!(texts("a::b::c x"), vec!["a::b::c", "x"]);
        assert_eq!(texts("Foo::~Foo()"), vec!["Foo", "::", "~", "Foo", "()"]);
        assert_eq!(texts("::std::size_t"), vec!["::", "std::size_t"]);
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("++ -- && || == << >> :: += -= != <= >= %= ^= := -> ="),
            vec![
                PlusPlus, MinusMinus, AmpAmp, PipePipe, EqEq, LtLt, GtGt, ColonColon, PlusEq,
                MinusEq, BangEq, LtEq, GtEq, PercentEq, CaretEq, ColonEq, Minus, Gt, Eq, End
            ]
        );
    }

    #[test]
    fn test_empty_shortcuts() {
        use TokenKind::*;
        assert_eq!(
            kinds("f() a[] \"\" ( ) [ ]"),
            vec![Ident, EmptyParens, Ident, EmptyBrackets, EmptyStr, LParen, RParen, LBracket, RBracket, End]
        );
    }

    #[test]
    fn test_comments_and_preprocessor() {
        let source = "#define X \\\n  continued\nint x; // comment\n/* block\ncomment */ int y;";
        assert_eq!(texts(source), vec!["int", "x", ";", "int", "y", ";"]);
    }

    #[test]
    fn test_line_comment_continuation() {
        assert_eq!(texts("// a \\\n still comment\nz"), vec!["z"]);
        assert_eq!(texts("// a \\\\\nz"), vec!["z"]);
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(texts(r#"x = "a\"b" ;"#), vec!["x", "=", r#""a\"b""#, ";"]);
        assert_eq!(texts(r#""a\\" b"#), vec![r#""a\\""#, "b"]);
        assert_eq!(texts(r"'\'' c"), vec![r"'\''", "c"]);
    }

    #[test]
    fn test_numbers_are_digits_and_dots() {
        assert_eq!(texts("3.14f 42"), vec!["3.14", "f", "42"]);
    }

    #[test]
    fn test_unterminated_string_is_fatal() {
        let mut scanner = Scanner::new("\"abc");
        let err = scanner.next().unwrap_err();
        assert!(err.message.contains("Unterminated string"));
    }

    #[test]
    fn test_unexpected_character_is_fatal() {
        let mut scanner = Scanner::new("int @x;");
        scanner.next().unwrap();
        let err = scanner.next().unwrap_err();
        assert!(err.message.contains("Unexpected character"));
        assert_eq!(err.location.column, 5);
    }

    #[test]
    fn test_next_fails_at_end() {
        let mut scanner = Scanner::new("  // nothing");
        assert!(scanner.next().is_err());
        let mut scanner = Scanner::new("  // nothing");
        assert!(scanner.next_or_end().unwrap().is(TokenKind::End));
    }

    #[test]
    fn test_brace_depth_and_scopes() {
        let mut scanner = Scanner::new("{ { } }");
        let open = scanner.next().unwrap();
        assert_eq!(open.depth, 0);
        scanner.push_scope("N", open.depth);
        let inner = scanner.next().unwrap();
        assert_eq!(inner.depth, 1);
        scanner.push_scope("Foo", inner.depth);
        assert_eq!(scanner.qualified_name(), "N::Foo");
        let close = scanner.next().unwrap();
        assert_eq!(close.depth, 1);
        assert_eq!(scanner.qualified_name(), "N");
        let close = scanner.next().unwrap();
        assert_eq!(close.depth, 0);
        assert!(scanner.scopes().is_empty());
        assert_eq!(scanner.depth(), 0);
    }

    #[test]
    fn test_unbalanced_close_brace() {
        let mut scanner = Scanner::new("}");
        assert!(scanner.next().is_err());
    }

    #[test]
    fn test_window_search_across_lane_boundaries() {
        // 0xa2 differs from '"' only in the high bit
        for filler in [b'a', 0xa2] {
            for len in [1usize, 7, 8, 31, 32, 33, 64, 70] {
                let plain = vec![filler; len];
                assert_eq!(window::find_unescaped(&plain, 0, b'"'), None);
                for at in 0..len {
                    let mut bytes = plain.clone();
                    bytes[at] = b'"';
                    assert_eq!(window::find_unescaped(&bytes, 0, b'"'), Some(at));
                    assert_eq!(window::find_unescaped(&bytes, at + 1, b'"'), None);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_window_matches_scalar(text in "[a-z_:\\\\\"'*/\n \r]{0,100}", from in 0usize..8) {
            let bytes = text.as_bytes();
            let from = from.min(bytes.len());
            prop_assert_eq!(
                window::find_unescaped(bytes, from, b'"'),
                window::scalar::find_unescaped(bytes, from, b'"')
            );
            prop_assert_eq!(window::line_end(bytes, from), window::scalar::line_end(bytes, from));
            prop_assert_eq!(
                window::block_comment_end(bytes, from),
                window::scalar::block_comment_end(bytes, from)
            );
            prop_assert_eq!(
                window::identifier_end(bytes, from),
                window::scalar::identifier_end(bytes, from)
            );
        }

        #[test]
        fn prop_depth_never_negative(text in "[{}a ;]{0,64}") {
            let mut scanner = Scanner::new(&text);
            let mut open = 0i64;
            loop {
                match scanner.next_or_end() {
                    Ok(token) if token.is(TokenKind::End) => {
                        prop_assert_eq!(scanner.depth() as i64, open);
                        break;
                    }
                    Ok(token) => {
                        match token.kind {
                            TokenKind::LBrace => open += 1,
                            TokenKind::RBrace => open -= 1,
                            _ => {}
                        }
                        prop_assert!(open >= 0);
                        prop_assert_eq!(scanner.depth() as i64, open);
                    }
                    Err(_) => {
                        prop_assert_eq!(open, 0);
                        break;
                    }
                }
            }
        }
    }
}
