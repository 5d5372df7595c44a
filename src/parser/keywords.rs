//! Reserved words the parsers dispatch on
//!
//! Identifier text is resolved to a [`Keyword`] once, through a static hash
//! table, and the parsers then match on the variant.

use super::lexer::{Token, TokenKind};
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Namespace,
    Struct,
    Class,
    Union,
    Enum,
    Typedef,
    Template,
    Using,
    StaticAssert,
    Static,
    Extern,
    Inline,
    Public,
    Protected,
    Private,
    Operator,
    Friend,
    Virtual,
    Explicit,
    Constexpr,
    Mutable,
}

static KEYWORDS: LazyLock<FxHashMap<&'static str, Keyword>> = LazyLock::new(|| {
    [
        ("namespace", Keyword::Namespace),
        ("struct", Keyword::Struct),
        ("class", Keyword::Class),
        ("union", Keyword::Union),
        ("enum", Keyword::Enum),
        ("typedef", Keyword::Typedef),
        ("template", Keyword::Template),
        ("using", Keyword::Using),
        ("static_assert", Keyword::StaticAssert),
        ("static", Keyword::Static),
        ("extern", Keyword::Extern),
        ("inline", Keyword::Inline),
        ("public", Keyword::Public),
        ("protected", Keyword::Protected),
        ("private", Keyword::Private),
        ("operator", Keyword::Operator),
        ("friend", Keyword::Friend),
        ("virtual", Keyword::Virtual),
        ("explicit", Keyword::Explicit),
        ("constexpr", Keyword::Constexpr),
        ("mutable", Keyword::Mutable),
    ]
    .into_iter()
    .collect()
});

impl Keyword {
    /// Keyword spelled by `token`, if it is an identifier naming one.
    pub fn of(token: &Token<'_>) -> Option<Keyword> {
        if token.kind != TokenKind::Ident {
            return None;
        }
        KEYWORDS.get(token.text).copied()
    }

    /// Access specifiers and the visibility they select.
    pub fn visibility(self) -> Option<bool> {
        match self {
            Keyword::Public => Some(true),
            Keyword::Protected | Keyword::Private => Some(false),
            _ => None,
        }
    }
}

/// Trailing method qualifiers skipped after a parameter list.
pub fn is_method_qualifier(text: &str) -> bool {
    matches!(
        text,
        "const" | "volatile" | "noexcept" | "override" | "final" | "throw"
    )
}
