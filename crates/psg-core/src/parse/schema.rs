use indexmap::IndexMap;
use serde::Deserialize;

/// A JSON Schema `type` keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
}

/// The `type` field can be a single type or an array of types (3.1).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

/// A reference or inline schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Schema(Box<Schema>),
}

/// The subset of JSON Schema the SDK generator consumes.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", default)]
    pub schema_type: Option<TypeSet>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// OpenAPI 3.0 nullability; 3.1 documents use `type: [.., "null"]`.
    #[serde(default)]
    pub nullable: Option<bool>,

    #[serde(default)]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default)]
    pub required: Vec<String>,

    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default)]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "allOf", default)]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default)]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(rename = "enum", default)]
    pub enum_values: Vec<serde_json::Value>,

    #[serde(rename = "const", default)]
    pub const_value: Option<serde_json::Value>,
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}

impl Schema {
    /// String values of `enum`, in declaration order.
    pub fn string_enum_values(&self) -> Vec<String> {
        self.enum_values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(false)
    }

    /// Sub-schemas of `oneOf`, falling back to `anyOf`.
    pub fn union_members(&self) -> &[SchemaOrRef] {
        if !self.one_of.is_empty() {
            &self.one_of
        } else {
            &self.any_of
        }
    }
}

/// Structural kind of a schema. The set is closed; every consumer matches
/// on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Object,
    Array,
    Primitive,
    Enum,
    Union,
    Reference,
}

impl SchemaKind {
    pub fn of(schema_or_ref: &SchemaOrRef) -> Self {
        match schema_or_ref {
            SchemaOrRef::Ref { .. } => SchemaKind::Reference,
            SchemaOrRef::Schema(schema) => Self::of_schema(schema),
        }
    }

    pub fn of_schema(schema: &Schema) -> Self {
        if !schema.string_enum_values().is_empty() {
            return SchemaKind::Enum;
        }
        if !schema.union_members().is_empty() {
            return SchemaKind::Union;
        }
        if !schema.all_of.is_empty() || !schema.properties.is_empty() {
            return SchemaKind::Object;
        }
        match &schema.schema_type {
            Some(TypeSet::Single(SchemaType::Object)) => SchemaKind::Object,
            Some(TypeSet::Single(SchemaType::Array)) => SchemaKind::Array,
            None if schema.items.is_some() => SchemaKind::Array,
            _ => SchemaKind::Primitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> SchemaOrRef {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn classifies_schema_kinds() {
        assert_eq!(
            SchemaKind::of(&parse("$ref: '#/components/schemas/Pet'")),
            SchemaKind::Reference
        );
        assert_eq!(
            SchemaKind::of(&parse("type: object\nproperties:\n  id:\n    type: string")),
            SchemaKind::Object
        );
        assert_eq!(
            SchemaKind::of(&parse("properties:\n  id:\n    type: string")),
            SchemaKind::Object
        );
        assert_eq!(
            SchemaKind::of(&parse("type: array\nitems:\n  type: string")),
            SchemaKind::Array
        );
        assert_eq!(
            SchemaKind::of(&parse("type: string\nenum: [a, b]")),
            SchemaKind::Enum
        );
        assert_eq!(
            SchemaKind::of(&parse("oneOf:\n  - type: string\n  - type: integer")),
            SchemaKind::Union
        );
        assert_eq!(SchemaKind::of(&parse("type: integer")), SchemaKind::Primitive);
    }

    #[test]
    fn integer_enum_is_not_a_string_enum() {
        assert_eq!(
            SchemaKind::of(&parse("type: integer\nenum: [1, 2]")),
            SchemaKind::Primitive
        );
    }
}
