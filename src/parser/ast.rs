// Parsed shapes consumed by the code generator

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// 1-based line and column of a byte offset into `source`.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |i| i + 1);
        Self::new(line, offset - line_start + 1)
    }
}

/// How a member is stored in its enclosing type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Value,
    Pointer,
    Reference,
    /// Fixed-size array; the arity expression is kept verbatim
    Array(String),
}

impl MemberKind {
    /// Element count expression used by the field table.
    pub fn arity(&self) -> &str {
        match self {
            MemberKind::Array(arity) => arity,
            _ => "1",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, MemberKind::Array(_))
    }
}

/// A data member accepted into a type's field table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    /// Declared type text, pointer/reference markers included
    pub type_text: String,
    /// Generic parameter list of the enclosing type (empty if none)
    pub generic: String,
    pub kind: MemberKind,
}

/// Keyword used to introduce a reflected aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Struct,
    Class,
    Union,
    Enum,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Struct => "struct",
            TypeTag::Class => "class",
            TypeTag::Union => "union",
            TypeTag::Enum => "enum",
        }
    }

    /// Visibility a body starts in.
    pub fn default_public(self) -> bool {
        !matches!(self, TypeTag::Class)
    }
}

/// A struct/class/union body that was fully parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub tag: TypeTag,
    /// Fully-qualified name, generic arguments included (`N::Vec<T>`)
    pub qualified_name: String,
    /// Generic parameter list text, without the angle brackets
    pub generic: String,
    pub members: Vec<Member>,
}

/// An enum body that was fully parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub qualified_name: String,
    pub enumerators: Vec<String>,
}

/// A reflected type, in the order its body closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct(StructDef),
    Enum(EnumDef),
}

/// A struct or enum seen in header mode, recorded for the aggregate
/// declarations artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardDecl {
    pub tag: TypeTag,
    pub qualified_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_offset() {
        let source = "ab\ncd\nef";
        assert_eq!(SourceLocation::from_offset(source, 0), SourceLocation::new(1, 1));
        assert_eq!(SourceLocation::from_offset(source, 4), SourceLocation::new(2, 2));
        assert_eq!(SourceLocation::from_offset(source, 6), SourceLocation::new(3, 1));
        assert_eq!(SourceLocation::from_offset(source, 100), SourceLocation::new(3, 3));
    }

    #[test]
    fn test_member_arity() {
        assert_eq!(MemberKind::Value.arity(), "1");
        assert_eq!(MemberKind::Pointer.arity(), "1");
        assert_eq!(MemberKind::Array("N * 2".into()).arity(), "N * 2");
    }
}
