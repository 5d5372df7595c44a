//! Struct/class/union body parsing
//!
//! A body is a loop over member declarations until the brace depth returns to
//! the depth of the opening brace. Each iteration is one of:
//!
//! - access specifier (`public:`), flipping the visibility flag
//! - nested `struct`/`class`/`union`/`enum`, recursing with the enclosing
//!   generic parameter list carried through
//! - constructor, destructor or method, whose body is skipped
//! - `using`, `typedef`, `friend`, `static_assert`, member templates and
//!   macro-like annotations, consumed without output
//! - data member, accepted when visible and non-static
//!
//! Data members are disambiguated by scanning the declared type (with any
//! generic argument suffix), the pointer/reference run, and the name, then
//! looking at what follows:
//!
//! ```text
//! member ::= type ptr* name ( ":" width          -- bit-field, dropped
//!                           | "[" arity "]"      -- array
//!                           | "(" params ")" ... -- method, skipped
//!                           ) [ "=" init | "{" init "}" ] ( ";" | "," member )
//! ```

use crate::parser::ast::*;
use crate::parser::enums::EnumShape;
use crate::parser::keywords::Keyword;
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{generic_arguments, ParseError, Parser};

/// The type whose body is being parsed.
#[derive(Debug, Clone)]
pub(crate) struct BodyContext<'a> {
    /// Unqualified name, used to spot constructors
    pub type_name: &'a str,
    pub qualified_name: &'a str,
    pub generic: &'a str,
    pub dependent: bool,
}

impl BodyContext<'_> {
    /// Whether a type nested in this one is named through a dependent scope.
    fn nests_dependent(&self) -> bool {
        self.dependent || !self.generic.is_empty()
    }
}

/// Parenthesized specifiers allowed between a class-key and the name
const ATTRIBUTE_SPECIFIERS: &[&str] = &["alignas", "_Alignas", "__declspec", "__attribute__"];

/// Why a type nested in a generic type gets no generated code.
pub(crate) const DEPENDENT_REASON: &str = "nested in a generic type";

fn tag_of(keyword: Keyword) -> TypeTag {
    match keyword {
        Keyword::Class => TypeTag::Class,
        Keyword::Union => TypeTag::Union,
        _ => TypeTag::Struct,
    }
}

impl<'src> Parser<'src> {
    /// Reflect a named struct/class/union body opened by `open`.
    ///
    /// Records the type for the aggregate declarations, opens its scope,
    /// parses the body and keeps the result when at least one member was
    /// accepted. Returns the closing brace.
    pub(crate) fn type_body(
        &mut self,
        keyword: Keyword,
        name: Token<'src>,
        explicit_args: Option<&str>,
        open: Token<'src>,
        generic: &str,
        dependent: bool,
    ) -> Result<Token<'src>, ParseError> {
        let tag = tag_of(keyword);
        let segment = match explicit_args {
            Some(args) => format!("{}<{}>", name.text, args),
            None if !generic.is_empty() && !dependent => {
                format!("{}<{}>", name.text, generic_arguments(generic))
            }
            None => name.text.to_string(),
        };
        self.scanner.push_scope(segment, open.depth);
        let qualified_name = self.scanner.qualified_name();
        self.output.forward_decls.push(ForwardDecl {
            tag,
            qualified_name: qualified_name.clone(),
        });

        let ctx = BodyContext {
            type_name: name.text,
            qualified_name: &qualified_name,
            generic,
            dependent,
        };
        let mut members = Vec::new();
        let close = self.struct_body(open, &ctx, tag.default_public(), &mut members)?;

        if members.is_empty() {
            tracing::debug!(name = %qualified_name, "no visible data members");
        } else if dependent {
            // `Outer<T>::Inner` is a non-deduced context; nothing generated
            // for it could ever be called
            self.not_reflected(&qualified_name, DEPENDENT_REASON);
        } else {
            tracing::debug!(name = %qualified_name, count = members.len(), "reflected type");
            self.output.types.push(TypeDef::Struct(StructDef {
                tag,
                qualified_name,
                generic: generic.to_string(),
                members,
            }));
        }
        Ok(close)
    }

    /// Parse members up to the `}` matching `open`, appending accepted data
    /// members to `members`. Returns the closing brace; the terminator after
    /// it belongs to the caller.
    pub(crate) fn struct_body(
        &mut self,
        open: Token<'src>,
        ctx: &BodyContext<'_>,
        public: bool,
        members: &mut Vec<Member>,
    ) -> Result<Token<'src>, ParseError> {
        let mut public = public;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::RBrace if token.depth == open.depth => return Ok(token),
                TokenKind::Semicolon => {}
                TokenKind::Ident | TokenKind::ColonColon | TokenKind::Tilde => {
                    self.struct_member(token, ctx, &mut public, members)?;
                }
                TokenKind::LBracket => {
                    // [[attribute]]
                    self.skip_brackets(token)?;
                }
                _ => {
                    return Err(self.error_at(
                        &token,
                        &format!("Unexpected {token} in body of {}", ctx.qualified_name),
                    ));
                }
            }
        }
    }

    fn struct_member(
        &mut self,
        token: Token<'src>,
        ctx: &BodyContext<'_>,
        public: &mut bool,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        if let Some(visible) = Keyword::of(&token).and_then(Keyword::visibility) {
            self.expect(TokenKind::Colon, "':' after access specifier")?;
            *public = visible;
            return Ok(());
        }

        let mut token = token;
        let mut is_static = false;
        loop {
            match Keyword::of(&token) {
                Some(Keyword::Static) => is_static = true,
                Some(
                    Keyword::Virtual
                    | Keyword::Explicit
                    | Keyword::Inline
                    | Keyword::Constexpr
                    | Keyword::Mutable,
                ) => {}
                _ => break,
            }
            token = self.next()?;
        }
        let accept = *public && !is_static;

        if token.is(TokenKind::Tilde) {
            self.expect_identifier("destructor name")?;
            let params = self.next()?;
            return self.skip_method_rest(params);
        }

        let is_constructor = token.text == ctx.type_name && self.peek_is_params()?;
        match Keyword::of(&token) {
            Some(keyword @ (Keyword::Struct | Keyword::Class | Keyword::Union)) => {
                self.nested_type(keyword, token, ctx, *public, accept, members)
            }
            Some(Keyword::Enum) => self.nested_enum(token, ctx, accept, members),
            Some(Keyword::Using | Keyword::Typedef | Keyword::StaticAssert) => {
                self.skip_statement().map(drop)
            }
            Some(Keyword::Friend) => self.skip_declaration().map(drop),
            Some(Keyword::Template) => {
                let open = self.expect(TokenKind::Lt, "'<' after template")?;
                self.capture_generic(open)?;
                self.skip_declaration().map(drop)
            }
            _ if is_constructor => {
                let params = self.next()?;
                self.skip_method_rest(params)
            }
            _ => self.member_declaration(token, token, accept, ctx, members),
        }
    }

    fn peek_is_params(&mut self) -> Result<bool, ParseError> {
        Ok(matches!(
            self.peek()?.kind,
            TokenKind::LParen | TokenKind::EmptyParens
        ))
    }

    /// `struct`/`class`/`union` inside a body.
    fn nested_type(
        &mut self,
        keyword: Keyword,
        keyword_token: Token<'src>,
        ctx: &BodyContext<'_>,
        public: bool,
        accept: bool,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        self.skip_type_head_attributes()?;
        let first = self.peek()?;

        if first.is(TokenKind::LBrace) {
            // Anonymous: its members are addressed through the enclosing type
            let open = self.next()?;
            let mut inner = Vec::new();
            self.struct_body(open, ctx, public, &mut inner)?;
            let token = self.next()?;
            if token.is(TokenKind::Semicolon) {
                members.extend(inner);
            } else {
                let end = self.skip_statement()?;
                self.diagnostic(token.offset, end.end());
            }
            return Ok(());
        }

        if !first.is(TokenKind::Ident) {
            return Err(self.error_at(&first, &format!("Expected type name, found {first}")));
        }
        let after = self.peek_nth(1)?;
        if after.is(TokenKind::Semicolon) {
            self.next()?;
            self.next()?;
            return Ok(());
        }

        let name = self.next()?;
        if after.is(TokenKind::LBrace) || after.is(TokenKind::Colon) || after.is_ident("final") {
            let open = self.base_clause()?;
            self.type_body(keyword, name, None, open, ctx.generic, ctx.nests_dependent())?;
            let token = self.next()?;
            if token.is(TokenKind::Semicolon) {
                return Ok(());
            }
            self.push_back(token);
            return self.declarators(name.text, accept, ctx, members);
        }

        // Elaborated type specifier: `struct Foo* next;`
        self.member_declaration(keyword_token, name, accept, ctx, members)
    }

    /// `enum` inside a body.
    fn nested_enum(
        &mut self,
        keyword_token: Token<'src>,
        ctx: &BodyContext<'_>,
        accept: bool,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        match self.enum_declaration(ctx.nests_dependent())? {
            EnumShape::Opaque => Ok(()),
            EnumShape::Elaborated(name) => {
                self.member_declaration(keyword_token, name, accept, ctx, members)
            }
            shape => {
                let token = self.next()?;
                if token.is(TokenKind::Semicolon) {
                    return Ok(());
                }
                self.push_back(token);
                match shape {
                    EnumShape::Named(name) => {
                        self.declarators(name.text, accept, ctx, members)
                    }
                    _ => {
                        let end = self.skip_statement()?;
                        self.diagnostic(token.offset, end.end());
                        Ok(())
                    }
                }
            }
        }
    }

    /// Skip `final` and a base-class list up to the opening brace.
    pub(crate) fn base_clause(&mut self) -> Result<Token<'src>, ParseError> {
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::LBrace => return Ok(token),
                TokenKind::Lt => {
                    self.capture_generic(token)?;
                }
                TokenKind::Ident | TokenKind::Colon | TokenKind::ColonColon | TokenKind::Comma => {}
                _ => {
                    return Err(self.error_at(&token, &format!("Unexpected {token} in base clause")));
                }
            }
        }
    }

    /// A data member or method declaration starting at `start`; `first` is
    /// the first token not yet examined.
    fn member_declaration(
        &mut self,
        start: Token<'src>,
        first: Token<'src>,
        accept: bool,
        ctx: &BodyContext<'_>,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        let mut idents: Vec<Token<'src>> = Vec::new();
        let mut kind = MemberKind::Value;
        let mut indirection_at = None;
        let mut token = first;
        loop {
            match token.kind {
                TokenKind::Ident if Keyword::of(&token) == Some(Keyword::Operator) => {
                    return self.operator_member();
                }
                TokenKind::Ident => idents.push(token),
                TokenKind::ColonColon => {}
                TokenKind::Lt if !idents.is_empty() => {
                    self.capture_generic(token)?;
                }
                TokenKind::Star => {
                    kind = MemberKind::Pointer;
                    indirection_at.get_or_insert(token.offset);
                }
                TokenKind::Amp | TokenKind::AmpAmp => {
                    kind = MemberKind::Reference;
                    indirection_at.get_or_insert(token.offset);
                }
                _ => break,
            }
            token = self.next()?;
        }

        if matches!(token.kind, TokenKind::LParen | TokenKind::EmptyParens) {
            if idents.len() <= 1 {
                return self.skip_annotation(token);
            }
            return self.skip_method_rest(token);
        }

        let name = match idents.as_slice() {
            [_, .., name] => *name,
            _ => {
                return Err(self.error_at(
                    &token,
                    &format!("Expected member declaration in {}, found {token}", ctx.qualified_name),
                ));
            }
        };
        let base_end = indirection_at.map_or(name.offset, |at: usize| at.min(name.offset));
        let base = self.span_text(start.offset, base_end);
        let type_text = self.span_text(start.offset, name.offset);

        let end = self.declarator_tail(name, type_text, kind, token, accept, ctx, members)?;
        if end.is(TokenKind::Comma) {
            self.declarators(&base, accept, ctx, members)?;
        }
        Ok(())
    }

    /// Further declarators sharing one base type: `int a, *b, c[4];`.
    fn declarators(
        &mut self,
        base: &str,
        accept: bool,
        ctx: &BodyContext<'_>,
        members: &mut Vec<Member>,
    ) -> Result<(), ParseError> {
        loop {
            let mut token = self.next()?;
            let mut kind = MemberKind::Value;
            let mut pointers = String::new();
            while matches!(token.kind, TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp) {
                kind = if token.is(TokenKind::Star) {
                    MemberKind::Pointer
                } else {
                    MemberKind::Reference
                };
                pointers.push_str(token.text);
                token = self.next()?;
            }
            if !token.is(TokenKind::Ident) {
                return Err(self.error_at(&token, &format!("Expected declarator name, found {token}")));
            }
            let name = token;
            let next = self.next()?;
            let end = self.declarator_tail(name, format!("{base}{pointers}"), kind, next, accept, ctx, members)?;
            if end.is(TokenKind::Semicolon) {
                return Ok(());
            }
        }
    }

    /// Everything after a declarator name: array suffix or bit-field width,
    /// optional initializer, and the `;`/`,` terminator, which is returned.
    #[allow(clippy::too_many_arguments)]
    fn declarator_tail(
        &mut self,
        name: Token<'src>,
        type_text: String,
        kind: MemberKind,
        token: Token<'src>,
        accept: bool,
        ctx: &BodyContext<'_>,
        members: &mut Vec<Member>,
    ) -> Result<Token<'src>, ParseError> {
        let mut kind = kind;
        let mut accept = accept;
        let mut token = token;

        match token.kind {
            TokenKind::LBracket => {
                let close = self.skip_brackets(token)?;
                let arity = self.source()[token.end()..close.offset].trim().to_string();
                kind = MemberKind::Array(arity);
                token = self.next()?;
                // inner dimensions stay part of the element type
                while matches!(token.kind, TokenKind::LBracket | TokenKind::EmptyBrackets) {
                    self.skip_brackets(token)?;
                    token = self.next()?;
                }
            }
            TokenKind::EmptyBrackets => {
                self.diagnostic(name.offset, token.end());
                accept = false;
                token = self.next()?;
            }
            TokenKind::Colon => {
                // bit-field
                accept = false;
                loop {
                    token = self.next()?;
                    if matches!(
                        token.kind,
                        TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eq | TokenKind::LBrace
                    ) {
                        break;
                    }
                }
            }
            _ => {}
        }

        match token.kind {
            TokenKind::Eq => token = self.skip_initializer()?,
            TokenKind::LBrace => {
                self.skip_block(token)?;
                token = self.next()?;
            }
            _ => {}
        }

        if !matches!(token.kind, TokenKind::Semicolon | TokenKind::Comma) {
            return Err(self.error_at(
                &token,
                &format!("Expected ';' after member '{}', found {token}", name.text),
            ));
        }

        if accept {
            members.push(Member {
                name: name.text.to_string(),
                type_text,
                generic: ctx.generic.to_string(),
                kind,
            });
        }
        Ok(token)
    }

    /// Skip an initializer expression, returning the `;` or declarator `,`
    /// that ends it.
    pub(crate) fn skip_initializer(&mut self) -> Result<Token<'src>, ParseError> {
        let mut angle = 0usize;
        let mut after_ident = false;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Semicolon => return Ok(token),
                TokenKind::Comma if angle == 0 => return Ok(token),
                TokenKind::LParen => {
                    self.skip_parens(token)?;
                }
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                }
                TokenKind::LBracket => {
                    self.skip_brackets(token)?;
                }
                TokenKind::Lt if after_ident && self.closes_as_generic()? => angle += 1,
                TokenKind::Gt => angle = angle.saturating_sub(1),
                TokenKind::GtGt => angle = angle.saturating_sub(2),
                TokenKind::RBrace => {
                    return Err(self.error_at(&token, "Expected ';' before '}'"));
                }
                _ => {}
            }
            after_ident = token.is(TokenKind::Ident);
        }
    }

    /// Whether the `<` just consumed is closed by a `>` before the statement
    /// ends. `x < y, z;` is a comparison; `Foo<int, 2>{}` is not.
    fn closes_as_generic(&mut self) -> Result<bool, ParseError> {
        let mut depth = 1i64;
        let mut n = 0;
        loop {
            let token = self.peek_nth(n)?;
            match token.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::GtGt => depth -= 2,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace | TokenKind::End => {
                    return Ok(false);
                }
                _ => {}
            }
            if depth <= 0 {
                return Ok(true);
            }
            n += 1;
        }
    }

    /// Skip what may sit between a class-key and the type name: `[[...]]`,
    /// `alignas(...)` and friends, and an export macro as in
    /// `struct ENGINE_API Foo {`.
    pub(crate) fn skip_type_head_attributes(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.peek()?;
            match token.kind {
                TokenKind::LBracket => {
                    let open = self.next()?;
                    self.skip_brackets(open)?;
                }
                TokenKind::Ident
                    if ATTRIBUTE_SPECIFIERS.contains(&token.text)
                        && self.peek_nth(1)?.is(TokenKind::LParen) =>
                {
                    self.next()?;
                    let open = self.next()?;
                    self.skip_parens(open)?;
                }
                TokenKind::Ident if self.is_export_macro()? => {
                    self.next()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// The next identifier is an upper-case macro followed by the real type
    /// name, which is itself followed by a body, base clause, `final` or
    /// argument list.
    fn is_export_macro(&mut self) -> Result<bool, ParseError> {
        if self.peek()?.text.bytes().any(|b| b.is_ascii_lowercase()) {
            return Ok(false);
        }
        let name = self.peek_nth(1)?;
        if !name.is(TokenKind::Ident) || name.is_ident("final") {
            return Ok(false);
        }
        let after = self.peek_nth(2)?;
        Ok(matches!(after.kind, TokenKind::LBrace | TokenKind::Colon | TokenKind::Lt)
            || after.is_ident("final"))
    }

    /// `operator <symbol> ( params ) ...`
    fn operator_member(&mut self) -> Result<(), ParseError> {
        let symbol = self.next()?;
        if symbol.is(TokenKind::LParen) {
            self.expect(TokenKind::RParen, "')' in operator()")?;
        }
        let mut token = self.next()?;
        while !matches!(token.kind, TokenKind::LParen | TokenKind::EmptyParens) {
            if matches!(
                token.kind,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace
            ) {
                return Err(self.error_at(&token, "Expected parameter list after operator"));
            }
            token = self.next()?;
        }
        self.skip_method_rest(token)
    }

    /// `NAME(...)` with no declared type: a macro annotation, or a function
    /// pointer member `void (*fn)(int);`.
    fn skip_annotation(&mut self, params: Token<'src>) -> Result<(), ParseError> {
        self.skip_parens(params)?;
        match self.peek()?.kind {
            TokenKind::Semicolon => {
                self.next()?;
            }
            TokenKind::LParen | TokenKind::EmptyParens => {
                self.skip_statement()?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Skip a parameter list and whatever follows it up to the end of the
    /// declaration: qualifiers, trailing return type, `= 0`/`= default`,
    /// constructor initializers and the body.
    pub(crate) fn skip_method_rest(&mut self, params: Token<'src>) -> Result<(), ParseError> {
        if !matches!(params.kind, TokenKind::LParen | TokenKind::EmptyParens) {
            return Err(self.error_at(&params, &format!("Expected parameter list, found {params}")));
        }
        self.skip_parens(params)?;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Semicolon => return Ok(()),
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                    return Ok(());
                }
                TokenKind::Eq => {
                    self.skip_statement()?;
                    return Ok(());
                }
                TokenKind::Colon => return self.skip_initializer_list(),
                TokenKind::LParen | TokenKind::EmptyParens => {
                    self.skip_parens(token)?;
                }
                TokenKind::LBracket | TokenKind::EmptyBrackets => {
                    self.skip_brackets(token)?;
                }
                TokenKind::Lt => {
                    self.capture_generic(token)?;
                }
                TokenKind::Ident
                | TokenKind::ColonColon
                | TokenKind::Amp
                | TokenKind::AmpAmp
                | TokenKind::Star
                | TokenKind::Minus
                | TokenKind::Gt => {}
                _ => {
                    return Err(self.error_at(&token, &format!("Unexpected {token} after parameter list")));
                }
            }
        }
    }

    /// Constructor initializer list up to and including the body.
    pub(crate) fn skip_initializer_list(&mut self) -> Result<(), ParseError> {
        let mut expecting_init = false;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Ident | TokenKind::ColonColon => expecting_init = true,
                TokenKind::Lt => {
                    self.capture_generic(token)?;
                }
                TokenKind::LParen | TokenKind::EmptyParens if expecting_init => {
                    self.skip_parens(token)?;
                    expecting_init = false;
                }
                TokenKind::LBrace if expecting_init => {
                    self.skip_block(token)?;
                    expecting_init = false;
                }
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                    return Ok(());
                }
                TokenKind::Comma | TokenKind::Dot => {}
                _ => {
                    return Err(self.error_at(&token, &format!("Unexpected {token} in initializer list")));
                }
            }
        }
    }
}
