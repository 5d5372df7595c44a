//! Enum parsing
//!
//! Handles everything after the `enum` keyword:
//!
//! ```text
//! enum_decl ::= "enum" ["class" | "struct"] [name] [":" type] ( "{" enumerators "}" | ";" )
//! enumerators ::= name ["=" expr] ("," name ["=" expr])* [","]
//! ```
//!
//! Initializer expressions are skipped, never evaluated; only the names are
//! kept. The terminator after the closing brace belongs to the caller.

use crate::parser::ast::*;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{Mode, ParseError, Parser};
use crate::parser::structs::DEPENDENT_REASON;

/// What followed an `enum` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnumShape<'src> {
    /// `enum class E : u8;` with its `;` consumed
    Opaque,
    /// `enum { ... }`, body consumed
    Anonymous,
    /// `enum E { ... }`, body consumed
    Named(Token<'src>),
    /// `enum E` used as a type, e.g. `enum E value;`
    Elaborated(Token<'src>),
}

impl<'src> Parser<'src> {
    /// Parse an enum declaration after its keyword. In header mode a named
    /// body is reflected.
    pub(crate) fn enum_declaration(&mut self, dependent: bool) -> Result<EnumShape<'src>, ParseError> {
        let mut token = self.next()?;
        if token.is_ident("class") || token.is_ident("struct") {
            token = self.next()?;
        }

        let name = if token.is(TokenKind::Ident) {
            let name = token;
            token = self.next()?;
            Some(name)
        } else {
            None
        };
        if token.is(TokenKind::Colon) {
            // underlying type
            loop {
                token = self.next()?;
                if matches!(token.kind, TokenKind::LBrace | TokenKind::Semicolon) {
                    break;
                }
            }
        }

        let Some(name) = name else {
            if token.is(TokenKind::LBrace) {
                self.skip_block(token)?;
                return Ok(EnumShape::Anonymous);
            }
            return Err(self.error_at(&token, &format!("Expected enum name, found {token}")));
        };

        match token.kind {
            TokenKind::Semicolon => Ok(EnumShape::Opaque),
            TokenKind::LBrace if self.mode == Mode::Source => {
                self.skip_block(token)?;
                Ok(EnumShape::Named(name))
            }
            TokenKind::LBrace => {
                self.scanner.push_scope(name.text, token.depth);
                let qualified_name = self.scanner.qualified_name();
                self.output.forward_decls.push(ForwardDecl {
                    tag: TypeTag::Enum,
                    qualified_name: qualified_name.clone(),
                });

                let enumerators = self.enum_body(token)?;
                if dependent {
                    self.not_reflected(&qualified_name, DEPENDENT_REASON);
                    return Ok(EnumShape::Named(name));
                }
                tracing::debug!(
                    name = %qualified_name,
                    count = enumerators.len(),
                    "reflected enum"
                );
                self.output.types.push(TypeDef::Enum(EnumDef {
                    qualified_name,
                    enumerators,
                }));
                Ok(EnumShape::Named(name))
            }
            _ => {
                self.push_back(token);
                Ok(EnumShape::Elaborated(name))
            }
        }
    }

    /// Parse enumerators up to the `}` matching `open`.
    pub(crate) fn enum_body(&mut self, open: Token<'src>) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        loop {
            let token = self.next()?;
            if token.is(TokenKind::RBrace) && token.depth == open.depth {
                return Ok(names);
            }
            if !token.is(TokenKind::Ident) {
                return Err(self.error_at(&token, &format!("Expected enumerator name, found {token}")));
            }
            names.push(token.text.to_string());

            let next = self.next()?;
            match next.kind {
                TokenKind::Comma => {}
                TokenKind::RBrace if next.depth == open.depth => return Ok(names),
                TokenKind::Eq => {
                    if self.skip_enumerator_value(open)? {
                        return Ok(names);
                    }
                }
                _ => {
                    return Err(self.error_at(
                        &next,
                        &format!("Expected ',', '=' or '}}' after enumerator, found {next}"),
                    ));
                }
            }
        }
    }

    /// Skip an initializer expression. Returns `true` when it ended the body.
    fn skip_enumerator_value(&mut self, open: Token<'src>) -> Result<bool, ParseError> {
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Comma => return Ok(false),
                TokenKind::RBrace if token.depth == open.depth => return Ok(true),
                TokenKind::LParen => {
                    self.skip_parens(token)?;
                }
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                }
                _ => {}
            }
        }
    }
}
