//! Text emission for the generated artifacts
//!
//! Everything here is a pure function of the parsed shapes, so the output for
//! an unchanged input is byte-identical across runs.

use crate::config::Config;
use crate::parser::ast::{EnumDef, ForwardDecl, Member, MemberKind, StructDef, TypeDef};

/// Line-oriented text buffer
#[derive(Debug, Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// `template <...>` ahead of a function of a generic type.
    fn template_line(&mut self, generic: &str) {
        if !generic.is_empty() {
            self.line(format!("template <{generic}>"));
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn field_kind(kind: &MemberKind) -> &'static str {
    match kind {
        MemberKind::Value => "FieldKind::Value",
        MemberKind::Pointer => "FieldKind::Pointer",
        MemberKind::Reference => "FieldKind::Reference",
        MemberKind::Array(_) => "FieldKind::Array",
    }
}

/// Per-header generated-definitions file.
pub fn generated_header(path: &str, types: &[TypeDef], config: &Config) -> String {
    let mut e = Emitter::default();
    e.line("#pragma once");
    e.line(format!("#include \"{path}\""));
    e.line(format!("#include \"{}\"", config.support_header));
    e.blank();
    e.line(format!("namespace {} {{", config.namespace));
    for def in types {
        e.blank();
        match def {
            TypeDef::Struct(def) => struct_block(&mut e, def),
            TypeDef::Enum(def) => enum_block(&mut e, def),
        }
    }
    e.blank();
    e.line(format!("}} // namespace {}", config.namespace));
    e.finish()
}

/// Per-implementation-file forward-declarations file.
pub fn symbols_file(externs: &[String]) -> String {
    let mut e = Emitter::default();
    e.line("#pragma once");
    for declaration in externs {
        e.line(format!("extern {declaration};"));
    }
    e.finish()
}

/// One aggregate line for a type seen in header mode.
pub fn aggregate_type_line(path: &str, decl: &ForwardDecl) -> String {
    format!(
        "#include \"{path}\" // {} {}",
        decl.tag.as_str(),
        decl.qualified_name
    )
}

/// One aggregate line for an implementation file's symbols file.
pub fn aggregate_symbols_line(symbols_path: &str) -> String {
    format!("#include \"{symbols_path}\"")
}

fn struct_block(e: &mut Emitter, def: &StructDef) {
    let ty = &def.qualified_name;

    e.template_line(&def.generic);
    e.line(format!("inline const FieldTable& FieldsOf(const {ty}*) {{"));
    e.line(format!("    using Self = {ty};"));
    e.line("    static const FieldDesc rows[] = {");
    for member in &def.members {
        field_row(e, member);
    }
    e.line("    };");
    e.line(format!(
        "    static const FieldTable table{{ rows, {} }};",
        def.members.len()
    ));
    e.line("    return table;");
    e.line("}");
    e.blank();

    e.template_line(&def.generic);
    e.line(format!("inline std::string ToString(const {ty}& value) {{"));
    e.line("    std::string out;");
    e.line(format!(
        "    const FieldTable& table = FieldsOf(static_cast<const {ty}*>(nullptr));"
    ));
    e.line("    for (size_t i = 0; i < table.count; ++i) {");
    e.line("        table.rows[i].to_string(&value, out);");
    e.line("    }");
    e.line("    return out;");
    e.line("}");
    e.blank();

    e.template_line(&def.generic);
    e.line(format!("inline void ToUI({ty}& value, UI& ui) {{"));
    e.line(format!(
        "    const FieldTable& table = FieldsOf(static_cast<const {ty}*>(nullptr));"
    ));
    e.line("    for (size_t i = 0; i < table.count; ++i) {");
    e.line("        table.rows[i].to_ui(&value, ui);");
    e.line("    }");
    e.line("}");
}

/// One field-table row. Its serializers are captureless lambdas naming the
/// field through `Self`, so no per-member function needs a global name.
fn field_row(e: &mut Emitter, member: &Member) {
    let name = &member.name;
    let size = match member.kind {
        // the reference's own storage, not the referenced object
        MemberKind::Reference => "sizeof(void*)".to_string(),
        _ => format!("sizeof(Self::{name})"),
    };
    e.line(format!(
        "        {{ \"{name}\", offsetof(Self, {name}), {size}, ({}), {},",
        member.kind.arity(),
        field_kind(&member.kind),
    ));

    e.line("          [](const void* base, std::string& out) {");
    e.line(format!(
        "              const auto& field = static_cast<const Self*>(base)->{name};"
    ));
    match &member.kind {
        MemberKind::Array(arity) => {
            e.line(format!("              for (size_t i = 0; i < ({arity}); ++i) {{"));
            e.line("                  AppendText(out, field[i]);");
            e.line("              }");
        }
        MemberKind::Pointer => {
            e.line("              AppendText(out, static_cast<const void*>(field));")
        }
        MemberKind::Value | MemberKind::Reference => {
            e.line("              AppendText(out, field);")
        }
    }
    e.line("          },");

    e.line("          [](void* base, UI& ui) {");
    e.line(format!("              auto& field = static_cast<Self*>(base)->{name};"));
    match &member.kind {
        MemberKind::Array(arity) => {
            e.line(format!("              for (size_t i = 0; i < ({arity}); ++i) {{"));
            e.line(format!("                  ui.Element(\"{name}\", i, field[i]);"));
            e.line("              }");
        }
        MemberKind::Pointer => e.line(format!("              ui.Pointer(\"{name}\", field);")),
        MemberKind::Value | MemberKind::Reference => {
            e.line(format!("              ui.Field(\"{name}\", field);"))
        }
    }
    e.line("          } },");
}

fn enum_block(e: &mut Emitter, def: &EnumDef) {
    let ty = &def.qualified_name;

    e.line(format!("inline std::string ToString({ty} value) {{"));
    if def.enumerators.is_empty() {
        e.line("    (void)value;");
        e.line("    return \"\";");
        e.line("}");
        return;
    }
    e.line(format!("    static const EnumName<{ty}> names[] = {{"));
    for enumerator in &def.enumerators {
        e.line(format!(
            "        {{ {}::{enumerator}, \"{enumerator}\" }},",
            def.qualified_name
        ));
    }
    e.line("    };");
    e.line("    for (const auto& entry : names) {");
    e.line("        if (entry.value == value) {");
    e.line("            return entry.name;");
    e.line("        }");
    e.line("    }");
    e.line("    return \"\";");
    e.line("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::TypeTag;

    fn member(name: &str, kind: MemberKind) -> Member {
        Member {
            name: name.to_string(),
            type_text: "int".to_string(),
            generic: String::new(),
            kind,
        }
    }

    fn foo() -> StructDef {
        StructDef {
            tag: TypeTag::Struct,
            qualified_name: "Foo".to_string(),
            generic: String::new(),
            members: vec![
                member("x", MemberKind::Value),
                member("y", MemberKind::Array("3".to_string())),
            ],
        }
    }

    fn render_struct(def: &StructDef) -> String {
        let mut e = Emitter::default();
        struct_block(&mut e, def);
        e.finish()
    }

    #[test]
    fn test_struct_rows_follow_member_order() {
        let text = render_struct(&foo());
        let x = text.find("{ \"x\", offsetof(Self, x), sizeof(Self::x), (1), FieldKind::Value,").unwrap();
        let y = text.find("{ \"y\", offsetof(Self, y), sizeof(Self::y), (3), FieldKind::Array,").unwrap();
        assert!(x < y);
        assert!(text.contains("static const FieldTable table{ rows, 2 };"));
        assert!(text.contains("inline std::string ToString(const Foo& value) {"));
        assert!(text.contains("inline void ToUI(Foo& value, UI& ui) {"));
        assert!(!text.contains("template <"));
    }

    #[test]
    fn test_serializers_are_lambdas_in_the_row() {
        let text = render_struct(&foo());
        assert!(text.contains(
            "          [](const void* base, std::string& out) {\n              const auto& field = static_cast<const Self*>(base)->y;\n              for (size_t i = 0; i < (3); ++i) {\n                  AppendText(out, field[i]);"
        ));
        assert!(text.contains("                  ui.Element(\"y\", i, field[i]);"));
        assert!(text.contains("              AppendText(out, field);"));
        // only the table and the two entry points are named functions
        assert_eq!(text.matches("inline ").count(), 3);
    }

    #[test]
    fn test_reference_row_uses_pointer_storage() {
        let mut def = foo();
        def.members = vec![member("r", MemberKind::Reference), member("after", MemberKind::Value)];
        let text = render_struct(&def);
        assert!(text.contains("{ \"r\", offsetof(Self, r), sizeof(void*), (1), FieldKind::Reference,"));
        assert!(!text.contains("sizeof(Self::r)"));
        assert!(text.contains("sizeof(Self::after)"));
    }

    #[test]
    fn test_generic_struct_prefixes_every_function() {
        let mut def = foo();
        def.qualified_name = "Box<T>".to_string();
        def.generic = "typename T".to_string();
        let text = render_struct(&def);
        // table and two entry points
        assert_eq!(text.matches("template <typename T>\n").count(), 3);
        assert!(text.contains("template <typename T>\ninline const FieldTable& FieldsOf(const Box<T>*) {\n    using Self = Box<T>;"));
    }

    #[test]
    fn test_enum_table() {
        let def = EnumDef {
            qualified_name: "N::E".to_string(),
            enumerators: vec!["A".into(), "B".into(), "C".into()],
        };
        let mut e = Emitter::default();
        enum_block(&mut e, &def);
        let text = e.finish();
        assert!(text.contains("inline std::string ToString(N::E value) {"));
        assert!(text.contains("        { N::E::A, \"A\" },\n        { N::E::B, \"B\" },\n        { N::E::C, \"C\" },\n"));
        assert!(text.trim_end().ends_with("return \"\";\n}"));
    }

    #[test]
    fn test_empty_enum_has_no_table() {
        let def = EnumDef {
            qualified_name: "Empty".to_string(),
            enumerators: Vec::new(),
        };
        let mut e = Emitter::default();
        enum_block(&mut e, &def);
        assert!(!e.finish().contains("names[]"));
    }

    #[test]
    fn test_generated_header_preamble() {
        let config = Config::default();
        let text = generated_header("core/foo.h", &[TypeDef::Struct(foo())], &config);
        assert!(text.starts_with(
            "#pragma once\n#include \"core/foo.h\"\n#include \"reflection.h\"\n\nnamespace reflect {\n"
        ));
        assert!(text.ends_with("} // namespace reflect\n"));
    }

    #[test]
    fn test_symbols_file() {
        let text = symbols_file(&["int counter".to_string(), "void tick()".to_string()]);
        assert_eq!(text, "#pragma once\nextern int counter;\nextern void tick();\n");
    }

    #[test]
    fn test_aggregate_lines() {
        let decl = ForwardDecl {
            tag: TypeTag::Enum,
            qualified_name: "N::E".to_string(),
        };
        assert_eq!(
            aggregate_type_line("n/e.h", &decl),
            "#include \"n/e.h\" // enum N::E"
        );
        assert_eq!(aggregate_symbols_line("a.symbols.h"), "#include \"a.symbols.h\"");
    }
}
