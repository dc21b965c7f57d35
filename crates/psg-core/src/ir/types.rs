use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::parse::schema::SchemaKind;

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
    pub snake_case: String,
    pub screaming_snake: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// A tag descriptor. Declared tags carry their description; tags that only
/// appear on operations are synthesized with the literal name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

impl Tag {
    pub fn synthetic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
        }
    }

    /// Tags are identified by case-insensitive name.
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// Non-owning handle on a component schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaRef {
    /// Component name as written in the document.
    pub name: String,
    #[serde(skip)]
    pub kind: SchemaKind,
}

/// Scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    Integer,
    Number,
    Boolean,
    DateTime,
    Binary,
    Null,
}

/// A resolved type reference, as used by fields, parameters, bodies and
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Primitive(Primitive),
    /// One of a fixed set of string values.
    Literal(Vec<String>),
    Array(Box<TypeRef>),
    /// String-keyed map.
    Map(Box<TypeRef>),
    /// A type emitted by name (PascalCase).
    Named(String),
    Union(Vec<TypeRef>),
    Any,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Wrap in a union with `null` unless already nullable.
    pub fn nullable(self) -> Self {
        match self {
            TypeRef::Primitive(Primitive::Null) | TypeRef::Any => self,
            TypeRef::Union(mut variants) => {
                if !variants.contains(&TypeRef::Primitive(Primitive::Null)) {
                    variants.push(TypeRef::Primitive(Primitive::Null));
                }
                TypeRef::Union(variants)
            }
            other => TypeRef::Union(vec![other, TypeRef::Primitive(Primitive::Null)]),
        }
    }

    /// Collect every named type this reference mentions.
    pub fn collect_named(&self, out: &mut BTreeSet<String>) {
        match self {
            TypeRef::Named(name) => {
                out.insert(name.clone());
            }
            TypeRef::Array(inner) | TypeRef::Map(inner) => inner.collect_named(out),
            TypeRef::Union(variants) => {
                for v in variants {
                    v.collect_named(out);
                }
            }
            TypeRef::Primitive(_) | TypeRef::Literal(_) | TypeRef::Any => {}
        }
    }
}

/// A field of an object type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: NormalizedName,
    pub original_name: String,
    pub type_ref: TypeRef,
    pub required: bool,
    pub description: Option<String>,
}

/// What a named type looks like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypeShape {
    Object(Vec<Field>),
    /// String enumeration, values in declaration order.
    Enum(Vec<String>),
    /// Another name for an existing type expression.
    Alias(TypeRef),
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDef {
    pub name: NormalizedName,
    pub description: Option<String>,
    pub shape: TypeShape,
}

impl TypeDef {
    pub fn type_name(&self) -> &str {
        &self.name.pascal_case
    }

    /// Named types referenced by this definition.
    pub fn references(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        match &self.shape {
            TypeShape::Object(fields) => {
                for f in fields {
                    f.type_ref.collect_named(&mut out);
                }
            }
            TypeShape::Enum(_) => {}
            TypeShape::Alias(target) => target.collect_named(&mut out),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_does_not_duplicate_null() {
        let t = TypeRef::Primitive(Primitive::String).nullable().nullable();
        assert_eq!(
            t,
            TypeRef::Union(vec![
                TypeRef::Primitive(Primitive::String),
                TypeRef::Primitive(Primitive::Null)
            ])
        );
    }

    #[test]
    fn collects_nested_named_types() {
        let t = TypeRef::Union(vec![
            TypeRef::Array(Box::new(TypeRef::named("Pet"))),
            TypeRef::Map(Box::new(TypeRef::named("Owner"))),
            TypeRef::Any,
        ]);
        let mut names = BTreeSet::new();
        t.collect_named(&mut names);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["Owner", "Pet"]);
    }

    #[test]
    fn tags_match_case_insensitively() {
        let tag = Tag::synthetic("Payments");
        assert!(tag.matches("payments"));
        assert!(!tag.matches("payment"));
    }
}
