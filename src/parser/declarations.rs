//! File-scope declaration parsing
//!
//! This module drives a whole file. Each top-level construct is dispatched on
//! its leading keyword:
//!
//! - `namespace N { ... }`: opens a scope; anonymous namespaces are skipped
//! - `struct`/`class`/`union N { ... };`: reflected in header mode
//! - `enum [class] N [: T] { ... };`: reflected in header mode
//! - `template <...> struct N { ... };`: reflected with its parameter list
//! - `typedef`, `using`, `static_assert`: skipped
//! - `static`/`extern`/`inline`/`constexpr` definitions and out-of-line
//!   definitions of qualified names: skipped
//! - anything else is a candidate variable or function declaration, which
//!   is forward-declared as `extern` in source mode
//!
//! # Grammar
//!
//! ```text
//! declaration ::= type_words ptr* name [array] ( "=" init | "{" init "}" )? ";"
//!               | type_words ptr* name "(" params ")" trailer* ( ";" | "{" body "}" )
//! ```
//!
//! A construct matching none of these shapes is skipped to the next `;` or
//! block and reported as a diagnostic line.

use crate::parser::keywords::{is_method_qualifier, Keyword};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{Mode, ParseError, ParseOutput, Parser};
use crate::parser::enums::EnumShape;

impl<'src> Parser<'src> {
    /// Parse the whole file and return everything collected from it.
    pub fn parse_file(&mut self) -> Result<ParseOutput, ParseError> {
        loop {
            let token = self.next_or_end()?;
            match token.kind {
                TokenKind::End => {
                    if self.scanner.depth() != 0 {
                        return Err(self.error_at(&token, "Unterminated block at end of file"));
                    }
                    break;
                }
                // Closing brace of a namespace; the scanner has popped its scope
                TokenKind::Semicolon | TokenKind::RBrace => {}
                TokenKind::LBracket => {
                    self.skip_brackets(token)?;
                }
                TokenKind::Ident => self.top_level(token)?,
                _ => self.recover(token, token)?,
            }
        }
        Ok(std::mem::take(&mut self.output))
    }

    fn top_level(&mut self, token: Token<'src>) -> Result<(), ParseError> {
        match Keyword::of(&token) {
            Some(Keyword::Namespace) => self.namespace(),
            Some(Keyword::Typedef | Keyword::Using | Keyword::StaticAssert) => {
                self.skip_statement().map(drop)
            }
            Some(keyword @ (Keyword::Struct | Keyword::Class | Keyword::Union)) => {
                self.top_level_type(keyword, token, "")
            }
            Some(Keyword::Enum) => match self.enum_declaration(false)? {
                EnumShape::Opaque => Ok(()),
                EnumShape::Elaborated(_) => self.skip_statement().map(drop),
                EnumShape::Anonymous | EnumShape::Named(_) => {
                    self.expect_semicolon("after enum body").map(drop)
                }
            },
            Some(Keyword::Template) => self.template_declaration(),
            Some(Keyword::Inline) if self.peek()?.is_ident("namespace") => {
                self.next()?;
                self.namespace()
            }
            Some(Keyword::Static | Keyword::Extern | Keyword::Inline | Keyword::Constexpr) => {
                self.skip_definition()
            }
            _ if token.text.contains("::") => self.skip_definition(),
            _ => self.declaration(token, token),
        }
    }

    /// `namespace` has been consumed.
    fn namespace(&mut self) -> Result<(), ParseError> {
        let token = self.next()?;
        if token.is(TokenKind::LBrace) {
            self.skip_block(token)?;
            return Ok(());
        }
        if !token.is(TokenKind::Ident) {
            return Err(self.error_at(&token, &format!("Expected namespace name, found {token}")));
        }
        let name = token;
        let token = self.next()?;
        match token.kind {
            TokenKind::LBrace => {
                self.scanner.push_scope(name.text, token.depth);
                Ok(())
            }
            // namespace alias
            TokenKind::Eq => self.skip_statement().map(drop),
            _ => Err(self.error_at(&token, &format!("Expected '{{' after namespace {}, found {token}", name.text))),
        }
    }

    /// `template` has been consumed. Only class templates are reflected.
    fn template_declaration(&mut self) -> Result<(), ParseError> {
        if !self.peek()?.is(TokenKind::Lt) {
            // explicit instantiation: `template class Foo<int>;`
            return self.skip_declaration().map(drop);
        }
        let open = self.next()?;
        let (generic, _) = self.capture_generic(open)?;
        let token = self.next()?;
        match Keyword::of(&token) {
            Some(keyword @ (Keyword::Struct | Keyword::Class | Keyword::Union)) => {
                self.top_level_type(keyword, token, generic)
            }
            _ => {
                self.push_back(token);
                self.skip_declaration().map(drop)
            }
        }
    }

    /// `struct`/`class`/`union` at file scope: a definition, a forward
    /// declaration, or a type used in a function/variable declaration.
    fn top_level_type(
        &mut self,
        keyword: Keyword,
        keyword_token: Token<'src>,
        generic: &str,
    ) -> Result<(), ParseError> {
        self.skip_type_head_attributes()?;
        let name = self.next()?;
        if name.is(TokenKind::LBrace) {
            // struct { ... } instance;
            self.skip_block(name)?;
            let end = self.skip_statement()?;
            self.diagnostic(keyword_token.offset, end.end());
            return Ok(());
        }
        if !name.is(TokenKind::Ident) {
            return Err(self.error_at(&name, &format!("Expected type name, found {name}")));
        }

        let mut explicit_args = None;
        if self.peek()?.is(TokenKind::Lt) {
            let open = self.next()?;
            explicit_args = Some(self.capture_generic(open)?.0);
        }

        let mut in_bases = false;
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::LBrace if self.mode == Mode::Header => {
                    self.type_body(keyword, name, explicit_args, token, generic, false)?;
                    self.expect_semicolon("after type body")?;
                    return Ok(());
                }
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                    self.skip_statement()?;
                    return Ok(());
                }
                TokenKind::Semicolon => return Ok(()),
                TokenKind::Colon => in_bases = true,
                TokenKind::Lt if in_bases => {
                    self.capture_generic(token)?;
                }
                TokenKind::Comma | TokenKind::ColonColon if in_bases => {}
                TokenKind::Ident if in_bases || token.is_ident("final") => {}
                _ => {
                    self.push_back(token);
                    return self.declaration(keyword_token, name);
                }
            }
        }
    }

    /// Skip a definition that needs no forward declaration.
    fn skip_definition(&mut self) -> Result<(), ParseError> {
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Semicolon => return Ok(()),
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                    return Ok(());
                }
                TokenKind::LParen | TokenKind::EmptyParens => {
                    self.skip_parens(token)?;
                    if self.peek()?.is(TokenKind::Colon) {
                        self.next()?;
                        return self.skip_initializer_list();
                    }
                }
                TokenKind::RBrace => return Err(self.error_at(&token, "Expected ';' before '}'")),
                _ => {}
            }
        }
    }

    /// Candidate variable or function declaration starting at `start`;
    /// `first` is the first token not yet examined.
    fn declaration(&mut self, start: Token<'src>, first: Token<'src>) -> Result<(), ParseError> {
        let mut idents = 0usize;
        let mut name_at = start.offset;
        let mut indirection_at = None;
        let mut token = first;
        loop {
            match token.kind {
                TokenKind::Ident if Keyword::of(&token) == Some(Keyword::Operator) => {
                    return self.operator_declaration(start);
                }
                TokenKind::Ident if token.text.contains("::") => return self.skip_definition(),
                TokenKind::Ident => {
                    idents += 1;
                    name_at = token.offset;
                }
                // `Type::member` defined out of line
                TokenKind::ColonColon if idents > 0 => return self.skip_definition(),
                TokenKind::Lt if idents > 0 => {
                    self.capture_generic(token)?;
                }
                TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp => {
                    indirection_at.get_or_insert(token.offset);
                }
                TokenKind::ColonColon => {}
                TokenKind::LBracket | TokenKind::EmptyBrackets if idents >= 2 => {
                    self.skip_brackets(token)?;
                }
                TokenKind::Eq | TokenKind::LBrace | TokenKind::Comma | TokenKind::Semicolon
                    if idents >= 2 =>
                {
                    self.forward_declare(start.offset, token.offset);
                    let end = match token.kind {
                        TokenKind::Eq => self.skip_initializer()?,
                        TokenKind::LBrace => {
                            self.skip_block(token)?;
                            self.next_or_end()?
                        }
                        _ => token,
                    };
                    return match end.kind {
                        TokenKind::Semicolon => Ok(()),
                        TokenKind::Comma => {
                            let base_end = indirection_at.map_or(name_at, |at: usize| at.min(name_at));
                            let base = self.span_text(start.offset, base_end);
                            self.extern_declarators(start, &base)
                        }
                        _ => self.recover(start, end),
                    };
                }
                TokenKind::LParen | TokenKind::EmptyParens if idents >= 2 => {
                    return self.function_declaration(start, token);
                }
                _ => return self.recover(start, token),
            }
            token = self.next_or_end()?;
        }
    }

    /// Declarators after the first in `int a = 1, *b, c[4];`, each
    /// forward-declared with the shared `base` type.
    fn extern_declarators(&mut self, start: Token<'src>, base: &str) -> Result<(), ParseError> {
        loop {
            let mut token = self.next_or_end()?;
            let declarator_at = token.offset;
            while matches!(token.kind, TokenKind::Star | TokenKind::Amp | TokenKind::AmpAmp) {
                token = self.next_or_end()?;
            }
            if !token.is(TokenKind::Ident) {
                return self.recover(start, token);
            }
            let mut end = token.end();
            token = self.next_or_end()?;
            while matches!(token.kind, TokenKind::LBracket | TokenKind::EmptyBrackets) {
                end = self.skip_brackets(token)?.end();
                token = self.next_or_end()?;
            }
            let declarator = self.span_text(declarator_at, end);
            self.push_extern(format!("{base} {declarator}"));

            let token = match token.kind {
                TokenKind::Eq => self.skip_initializer()?,
                TokenKind::LBrace => {
                    self.skip_block(token)?;
                    self.next_or_end()?
                }
                _ => token,
            };
            match token.kind {
                TokenKind::Semicolon => return Ok(()),
                TokenKind::Comma => {}
                _ => return self.recover(start, token),
            }
        }
    }

    /// `operator` has been consumed as part of a free function name.
    fn operator_declaration(&mut self, start: Token<'src>) -> Result<(), ParseError> {
        let symbol = self.next()?;
        if symbol.is(TokenKind::LParen) {
            self.expect(TokenKind::RParen, "')' in operator()")?;
        }
        let mut token = self.next_or_end()?;
        while !matches!(token.kind, TokenKind::LParen | TokenKind::EmptyParens) {
            if matches!(
                token.kind,
                TokenKind::Semicolon | TokenKind::LBrace | TokenKind::RBrace | TokenKind::End
            ) {
                return self.recover(start, token);
            }
            token = self.next_or_end()?;
        }
        self.function_declaration(start, token)
    }

    /// Parameter list, trailing qualifiers and return type, then either `;`
    /// or a body. The signature is forward-declared; `= delete` is not.
    fn function_declaration(&mut self, start: Token<'src>, params: Token<'src>) -> Result<(), ParseError> {
        let mut end = self.skip_parens(params)?.end();
        loop {
            let token = self.next_or_end()?;
            match token.kind {
                TokenKind::Semicolon => {
                    self.forward_declare(start.offset, end);
                    return Ok(());
                }
                TokenKind::LBrace => {
                    self.forward_declare(start.offset, end);
                    self.skip_block(token)?;
                    return Ok(());
                }
                TokenKind::Eq => {
                    self.skip_statement()?;
                    return Ok(());
                }
                TokenKind::Ident if is_method_qualifier(token.text) => {
                    end = token.end();
                    if matches!(self.peek()?.kind, TokenKind::LParen | TokenKind::EmptyParens) {
                        let open = self.next()?;
                        end = self.skip_parens(open)?.end();
                    }
                }
                // trailing return type
                TokenKind::Minus if self.peek()?.is(TokenKind::Gt) => {
                    end = self.next()?.end();
                }
                TokenKind::Ident
                | TokenKind::ColonColon
                | TokenKind::Star
                | TokenKind::Amp
                | TokenKind::AmpAmp => end = token.end(),
                TokenKind::Lt => end = self.capture_generic(token)?.1,
                _ => return self.recover(start, token),
            }
        }
    }

    /// Record `source[start..end]` for an `extern` forward declaration.
    fn forward_declare(&mut self, start: usize, end: usize) {
        if self.mode == Mode::Source {
            let declaration = self.span_text(start, end);
            self.push_extern(declaration);
        }
    }

    fn push_extern(&mut self, declaration: String) {
        if self.mode != Mode::Source {
            return;
        }
        tracing::debug!(%declaration, "forward declaration");
        self.output.externs.push(declaration);
    }

    /// Skip an unrecognized construct starting at `start` up to the next
    /// statement or block boundary and report it. `token` is the current,
    /// already consumed token.
    fn recover(&mut self, start: Token<'src>, token: Token<'src>) -> Result<(), ParseError> {
        let mut token = token;
        let end = loop {
            match token.kind {
                TokenKind::Semicolon => break token.end(),
                TokenKind::LBrace => {
                    let close = self.skip_block(token)?;
                    if self.peek()?.is(TokenKind::Semicolon) {
                        break self.next()?.end();
                    }
                    break close.end();
                }
                TokenKind::RBrace | TokenKind::End => {
                    self.push_back(token);
                    break token.offset;
                }
                TokenKind::LParen | TokenKind::EmptyParens => {
                    let close = self.skip_parens(token)?;
                    if !matches!(self.peek()?.kind, TokenKind::Semicolon | TokenKind::LBrace) {
                        break close.end();
                    }
                }
                _ => {}
            }
            token = self.next_or_end()?;
        };
        self.diagnostic(start.offset, end.max(start.offset));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::*;

    fn parse(source: &str, mode: Mode) -> ParseOutput {
        let mut parser = Parser::new(source, mode);
        parser.parse_file().unwrap()
    }

    fn type_names(output: &ParseOutput) -> Vec<&str> {
        output
            .types
            .iter()
            .map(|t| match t {
                TypeDef::Struct(s) => s.qualified_name.as_str(),
                TypeDef::Enum(e) => e.qualified_name.as_str(),
            })
            .collect()
    }

    #[test]
    fn test_namespace_enum() {
        let output = parse("namespace N { enum E { A, B = 5, C }; }", Mode::Header);
        assert_eq!(
            output.forward_decls,
            vec![ForwardDecl {
                tag: TypeTag::Enum,
                qualified_name: "N::E".to_string()
            }]
        );
        match &output.types[0] {
            TypeDef::Enum(e) => assert_eq!(e.enumerators, vec!["A", "B", "C"]),
            other => panic!("Expected enum, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_namespaces_qualify_names() {
        let source = r#"
            namespace a {
                namespace b { struct S { int v; }; }
                struct T { int w; };
            }
            inline namespace v1 { struct U { int u; }; }
            namespace x::y { enum class K : int { One }; }
            struct Root { int r; };
        "#;
        let output = parse(source, Mode::Header);
        assert_eq!(type_names(&output), vec!["a::b::S", "a::T", "v1::U", "x::y::K", "Root"]);
    }

    #[test]
    fn test_anonymous_namespace_and_typedef_are_skipped() {
        let source = r#"
            namespace { struct Hidden { int x; }; }
            typedef struct { int y; } Alias;
            namespace fs = std::filesystem;
            using Id = unsigned;
            static_assert(sizeof(int) == 4, "int");
            struct Shown { int z; };
        "#;
        let output = parse(source, Mode::Header);
        assert_eq!(type_names(&output), vec!["Shown"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_forward_declarations_and_elaborated_uses() {
        let source = "struct Fwd; class Other; struct Fwd* make(); enum class Flags : unsigned;";
        let output = parse(source, Mode::Header);
        assert!(output.types.is_empty());
        assert!(output.forward_decls.is_empty());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_template_struct_keeps_parameter_list() {
        let source = r#"
            template <typename K, int N = 4>
            struct Table : Base<K> { K keys[N]; int count; };
            template <> struct Table<int, 1> { int only; };
            template <typename T> T largest(T a, T b) { return a > b ? a : b; }
        "#;
        let output = parse(source, Mode::Header);
        assert_eq!(type_names(&output), vec!["Table<K, N>", "Table<int, 1>"]);
        let TypeDef::Struct(table) = &output.types[0] else {
            panic!("Expected struct");
        };
        assert_eq!(table.generic, "typename K, int N = 4");
        assert_eq!(table.members[0].kind, MemberKind::Array("N".to_string()));
        let TypeDef::Struct(special) = &output.types[1] else {
            panic!("Expected struct");
        };
        assert_eq!(special.generic, "");
    }

    #[test]
    fn test_source_mode_forward_declares_free_symbols() {
        let source = r#"
            #include "thing.h"
            int counter = 0;
            float values[4];
            Vec<int> cache{};
            int add(int a, int b) { return a + b; }
            void shutdown() noexcept;
            auto answer() -> int { return 42; }
            static int hidden() { return 1; }
            extern "C" { void c_api(); }
            void Thing::update() { tick(); }
            Thing::Thing() : a(1), b{2} {}
            std::string name;
            void removed() = delete;
            bool operator==(const Thing& a, const Thing& b) { return true; }
        "#;
        let output = parse(source, Mode::Source);
        assert_eq!(
            output.externs,
            vec![
                "int counter",
                "float values[4]",
                "Vec<int> cache",
                "int add(int a, int b)",
                "void shutdown() noexcept",
                "auto answer() -> int",
                "bool operator==(const Thing& a, const Thing& b)",
            ]
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_source_mode_skips_type_bodies() {
        let source = "struct Local { int x; }; enum Color { Red }; class C : public B { int y; };";
        let output = parse(source, Mode::Source);
        assert!(output.types.is_empty());
        assert!(output.forward_decls.is_empty());
        assert!(output.externs.is_empty());
    }

    #[test]
    fn test_header_mode_does_not_forward_declare() {
        let output = parse("int helper(int x);\nextern int global;", Mode::Header);
        assert!(output.externs.is_empty());
    }

    #[test]
    fn test_macro_invocation_produces_one_diagnostic() {
        let source = "REGISTER_TYPE(Foo)\nstruct Bar { int x; };";
        let output = parse(source, Mode::Header);
        assert_eq!(output.diagnostics, vec!["// reflgen: unparsed: REGISTER_TYPE(Foo)"]);
        assert_eq!(type_names(&output), vec!["Bar"]);
    }

    #[test]
    fn test_unrecognized_spans_are_collapsed() {
        let source = "DECLARE_THING(\n  a,\n  b);\nweird ! stuff;\nstruct Ok { int x; };";
        let output = parse(source, Mode::Source);
        assert_eq!(
            output.diagnostics,
            vec![
                "// reflgen: unparsed: DECLARE_THING( a, b);",
                "// reflgen: unparsed: weird ! stuff;",
            ]
        );
    }

    #[test]
    fn test_every_declarator_is_forward_declared() {
        let source = r#"
            int a = 1, b = 2;
            float x, y;
            const char* names[] = {"a"}, *last;
            int c{3}, d;
            bool flag = x < y, other;
        "#;
        let output = parse(source, Mode::Source);
        assert_eq!(
            output.externs,
            vec![
                "int a",
                "int b",
                "float x",
                "float y",
                "const char* names[]",
                "const char *last",
                "int c",
                "int d",
                "bool flag",
                "bool other",
            ]
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_explicit_instantiation_is_skipped() {
        let source = "template class Foo<int>;\ntemplate struct Bar<float, 2>;\nint x;";
        let output = parse(source, Mode::Source);
        assert_eq!(output.externs, vec!["int x"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_anonymous_enum_with_underlying_type() {
        let output = parse("enum : int { A, B };\nstruct S { int s; };", Mode::Header);
        assert_eq!(type_names(&output), vec!["S"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_attributed_type_heads() {
        let source = r#"
            struct [[nodiscard]] Foo { int x; };
            struct alignas(16) Bar { float v[4]; };
            class ENGINE_API Baz final : public Foo { public: int z; };
            struct __attribute__((packed)) Packed { char c; };
            template <typename T> struct [[deprecated("old")]] Old { T t; };
            struct Foo foo;
        "#;
        let output = parse(source, Mode::Header);
        assert_eq!(type_names(&output), vec!["Foo", "Bar", "Baz", "Packed", "Old<T>"]);
        let declared: Vec<_> = output.forward_decls.iter().map(|d| d.qualified_name.as_str()).collect();
        assert_eq!(declared, vec!["Foo", "Bar", "Baz", "Packed", "Old<T>"]);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_input_is_fatal() {
        let mut parser = Parser::new("namespace N {", Mode::Header);
        let err = parser.parse_file().unwrap_err();
        assert!(err.message.contains("Unterminated"));

        let mut parser = Parser::new("struct S { int x; }", Mode::Header);
        assert!(parser.parse_file().is_err());

        let mut parser = Parser::new("const char* s = \"open;", Mode::Source);
        assert!(parser.parse_file().is_err());
    }

    #[test]
    fn test_scope_stack_is_empty_after_file() {
        let mut parser = Parser::new("namespace a { namespace b { struct S { int v; }; } }", Mode::Header);
        parser.parse_file().unwrap();
        assert!(parser.scanner.scopes().is_empty());
        assert_eq!(parser.scanner.depth(), 0);
    }
}
