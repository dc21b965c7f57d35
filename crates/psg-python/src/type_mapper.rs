use heck::ToShoutySnakeCase;
use psg_core::ir::{Primitive, TypeRef};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Map a `TypeRef` to a Python annotation. Standard-library and pydantic
/// names are module-qualified so they never clash with generated types.
pub fn type_ref_to_python(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Primitive(p) => primitive_to_python(*p).to_string(),
        TypeRef::Literal(values) => {
            let values: Vec<String> = values.iter().map(|v| string_literal(v)).collect();
            format!("typing.Literal[{}]", values.join(", "))
        }
        TypeRef::Array(inner) => format!("list[{}]", type_ref_to_python(inner)),
        TypeRef::Map(value) => format!("dict[str, {}]", type_ref_to_python(value)),
        TypeRef::Named(name) => name.clone(),
        TypeRef::Union(variants) => {
            let variants: Vec<String> = variants.iter().map(type_ref_to_python).collect();
            variants.join(" | ")
        }
        TypeRef::Any => "typing.Any".to_string(),
    }
}

/// Like [`type_ref_to_python`], but evaluable while the names `pending`
/// accepts are still unbound: those are quoted and unions use `typing.Union`.
pub fn forward_type_ref(type_ref: &TypeRef, pending: &dyn Fn(&str) -> bool) -> String {
    match type_ref {
        TypeRef::Named(name) if pending(name.as_str()) => string_literal(name),
        TypeRef::Array(inner) => format!("list[{}]", forward_type_ref(inner, pending)),
        TypeRef::Map(value) => format!("dict[str, {}]", forward_type_ref(value, pending)),
        TypeRef::Union(variants) => {
            let variants: Vec<String> = variants
                .iter()
                .map(|v| forward_type_ref(v, pending))
                .collect();
            format!("typing.Union[{}]", variants.join(", "))
        }
        other => type_ref_to_python(other),
    }
}

fn primitive_to_python(p: Primitive) -> &'static str {
    match p {
        Primitive::String => "str",
        Primitive::Integer => "int",
        Primitive::Number => "float",
        Primitive::Boolean => "bool",
        Primitive::DateTime => "str",
        Primitive::Binary => "bytes",
        Primitive::Null => "None",
    }
}

/// Whether `None` is already a valid value of the type.
pub fn accepts_none(type_ref: &TypeRef) -> bool {
    match type_ref {
        TypeRef::Primitive(Primitive::Null) | TypeRef::Any => true,
        TypeRef::Union(variants) => variants.iter().any(accepts_none),
        _ => false,
    }
}

/// Annotation for a value that may be omitted.
pub fn optional_annotation(type_ref: &TypeRef) -> String {
    let base = type_ref_to_python(type_ref);
    if accepts_none(type_ref) {
        base
    } else {
        format!("{base} | None")
    }
}

/// Annotation for a field or argument, optional when not required.
pub fn field_annotation(type_ref: &TypeRef, required: bool) -> String {
    if required {
        type_ref_to_python(type_ref)
    } else {
        optional_annotation(type_ref)
    }
}

/// Make `name` usable as a Python identifier: keywords get a trailing `_`,
/// names starting with a digit get a `v_` prefix.
pub fn python_identifier(name: &str) -> String {
    if KEYWORDS.contains(&name) {
        format!("{name}_")
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("v_{name}")
    } else {
        name.to_string()
    }
}

/// A double-quoted Python string literal.
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Member name for a string enum value.
pub fn enum_member_name(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let name = cleaned.to_shouty_snake_case();
    if name.is_empty() {
        "EMPTY".to_string()
    } else {
        python_identifier(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(type_ref_to_python(&TypeRef::Primitive(Primitive::String)), "str");
        assert_eq!(type_ref_to_python(&TypeRef::Primitive(Primitive::Number)), "float");
        assert_eq!(type_ref_to_python(&TypeRef::Primitive(Primitive::Integer)), "int");
        assert_eq!(type_ref_to_python(&TypeRef::Primitive(Primitive::Binary)), "bytes");
        assert_eq!(type_ref_to_python(&TypeRef::Primitive(Primitive::DateTime)), "str");
        assert_eq!(type_ref_to_python(&TypeRef::Any), "typing.Any");
    }

    #[test]
    fn test_containers() {
        assert_eq!(
            type_ref_to_python(&TypeRef::Array(Box::new(TypeRef::named("Pet")))),
            "list[Pet]"
        );
        assert_eq!(
            type_ref_to_python(&TypeRef::Map(Box::new(TypeRef::Primitive(Primitive::Integer)))),
            "dict[str, int]"
        );
    }

    #[test]
    fn test_literal_and_union() {
        let status = TypeRef::Literal(vec!["on".to_string(), "off".to_string()]);
        assert_eq!(type_ref_to_python(&status), r#"typing.Literal["on", "off"]"#);
        assert_eq!(
            type_ref_to_python(&TypeRef::named("Pet").nullable()),
            "Pet | None"
        );
    }

    #[test]
    fn test_optional_field() {
        let s = TypeRef::Primitive(Primitive::String);
        assert_eq!(field_annotation(&s, true), "str");
        assert_eq!(field_annotation(&s, false), "str | None");
        assert_eq!(field_annotation(&s.clone().nullable(), false), "str | None");
        assert_eq!(field_annotation(&TypeRef::Any, false), "typing.Any");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(python_identifier("from"), "from_");
        assert_eq!(python_identifier("2fa"), "v_2fa");
        assert_eq!(python_identifier("name"), "name");
        assert_eq!(enum_member_name("in-progress"), "IN_PROGRESS");
        assert_eq!(enum_member_name("application/json"), "APPLICATION_JSON");
        assert_eq!(enum_member_name("5xx"), "v_5XX");
        assert_eq!(enum_member_name("--"), "EMPTY");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(string_literal("a\\b"), r#""a\\b""#);
    }
}
