use std::collections::{HashMap, HashSet};

use heck::ToPascalCase;

use crate::error::ResolveError;
use crate::ir::{Field, Primitive, SchemaRef, TypeDef, TypeRef, TypeShape};
use crate::parse::SpecModel;
use crate::parse::schema::{
    AdditionalProperties, Schema, SchemaKind, SchemaOrRef, SchemaType, TypeSet,
};

use super::naming::{NameRegistry, normalize_name};

/// Converts schemas into IR types for one resource.
///
/// Anonymous object schemas met along the way are hoisted into named
/// [`TypeDef`]s. Component names are claimed first, in index order, then
/// hoisted names, so every emitted name is unique within the resource.
/// Components whose names normalize to the same PascalCase form get
/// numeric suffixes.
pub struct TypeBuilder<'a> {
    model: SpecModel<'a>,
    names: NameRegistry,
    /// Component name as written in the document → emitted name.
    components: HashMap<String, String>,
    hoisted: Vec<TypeDef>,
}

/// Fields gathered while merging an object and its `allOf` members.
#[derive(Default)]
struct FieldSet {
    fields: Vec<Field>,
    required: HashSet<String>,
}

impl<'a> TypeBuilder<'a> {
    pub fn new(model: SpecModel<'a>, components: &[SchemaRef]) -> Self {
        let mut names = NameRegistry::default();
        let components = components
            .iter()
            .map(|c| {
                let base = normalize_name(&c.name).pascal_case;
                let emitted = names.claim(&base);
                if emitted != base {
                    log::warn!("component {:?} is emitted as {emitted}", c.name);
                }
                (c.name.clone(), emitted)
            })
            .collect();
        Self {
            model,
            names,
            components,
            hoisted: Vec::new(),
        }
    }

    /// Emitted name of a component schema.
    pub fn component_name(&self, name: &str) -> String {
        self.components
            .get(name)
            .cloned()
            .unwrap_or_else(|| normalize_name(name).pascal_case)
    }

    /// Hoist `shape` under a unique name derived from `base` and return
    /// that name.
    pub fn hoist(&mut self, base: &str, description: Option<String>, shape: TypeShape) -> String {
        let name = self.names.claim(base);
        let mut normalized = normalize_name(&name);
        normalized.pascal_case = name.clone();
        self.hoisted.push(TypeDef {
            name: normalized,
            description,
            shape,
        });
        name
    }

    /// Drain the types hoisted since the last call, in creation order.
    pub fn take_hoisted(&mut self) -> Vec<TypeDef> {
        std::mem::take(&mut self.hoisted)
    }

    /// Build the type definition for a component schema.
    pub fn component(&mut self, schema_ref: &SchemaRef) -> Result<TypeDef, ResolveError> {
        let definition = self.model.component_schema(&schema_ref.name)?;
        let mut name = normalize_name(&schema_ref.name);
        name.pascal_case = self.component_name(&schema_ref.name);
        let ctx = name.pascal_case.clone();

        let (description, shape) = match definition {
            SchemaOrRef::Ref { .. } => (None, TypeShape::Alias(self.type_ref(&ctx, definition)?)),
            SchemaOrRef::Schema(schema) => {
                let description = doc_of(schema);
                let shape = match schema_ref.kind {
                    SchemaKind::Enum => TypeShape::Enum(schema.string_enum_values()),
                    SchemaKind::Object if is_structured(schema) => {
                        let mut visiting = HashSet::from([schema_ref.name.clone()]);
                        TypeShape::Object(self.object_fields(&ctx, schema, &mut visiting)?)
                    }
                    SchemaKind::Object
                    | SchemaKind::Array
                    | SchemaKind::Primitive
                    | SchemaKind::Union
                    | SchemaKind::Reference => TypeShape::Alias(self.inline(&ctx, schema)?),
                };
                (description, shape)
            }
        };

        Ok(TypeDef {
            name,
            description,
            shape,
        })
    }

    /// Resolve a schema to a type reference. `ctx` is the name stem used for
    /// anything that needs hoisting.
    pub fn type_ref(
        &mut self,
        ctx: &str,
        schema: &'a SchemaOrRef,
    ) -> Result<TypeRef, ResolveError> {
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                let (name, _) = self.model.resolve_schema_ref(ref_path)?;
                Ok(TypeRef::named(self.component_name(name)))
            }
            SchemaOrRef::Schema(s) => self.inline(ctx, s),
        }
    }

    fn inline(&mut self, ctx: &str, schema: &'a Schema) -> Result<TypeRef, ResolveError> {
        let base = self.inline_base(ctx, schema)?;
        Ok(if is_nullable(schema) { base.nullable() } else { base })
    }

    fn inline_base(&mut self, ctx: &str, schema: &'a Schema) -> Result<TypeRef, ResolveError> {
        if let Some(value) = schema.const_value.as_ref().and_then(|v| v.as_str()) {
            return Ok(TypeRef::Literal(vec![value.to_string()]));
        }

        let values = schema.string_enum_values();
        if !values.is_empty() {
            return Ok(TypeRef::Literal(values));
        }

        let members = schema.union_members();
        if !members.is_empty() {
            let mut variants = Vec::with_capacity(members.len());
            for (i, member) in members.iter().enumerate() {
                let variant = self.type_ref(&format!("{ctx}Variant{}", i + 1), member)?;
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
            }
            return Ok(collapse(variants));
        }

        if schema.all_of.len() == 1 && schema.properties.is_empty() {
            return self.type_ref(ctx, &schema.all_of[0]);
        }

        if is_structured(schema) {
            let fields = self.object_fields(ctx, schema, &mut HashSet::new())?;
            let name = self.hoist(ctx, doc_of(schema), TypeShape::Object(fields));
            return Ok(TypeRef::named(name));
        }

        match &schema.schema_type {
            Some(TypeSet::Single(t)) => self.typed(ctx, schema, *t),
            Some(TypeSet::Multiple(types)) => {
                let mut variants = Vec::new();
                for t in types.iter().filter(|t| **t != SchemaType::Null) {
                    let variant = self.typed(ctx, schema, *t)?;
                    if !variants.contains(&variant) {
                        variants.push(variant);
                    }
                }
                if variants.is_empty() {
                    return Ok(TypeRef::Primitive(Primitive::Null));
                }
                Ok(collapse(variants))
            }
            None if schema.items.is_some() => self.typed(ctx, schema, SchemaType::Array),
            None if schema.additional_properties.is_some() => {
                self.typed(ctx, schema, SchemaType::Object)
            }
            None => Ok(TypeRef::Any),
        }
    }

    fn typed(
        &mut self,
        ctx: &str,
        schema: &'a Schema,
        schema_type: SchemaType,
    ) -> Result<TypeRef, ResolveError> {
        let primitive = match schema_type {
            SchemaType::String => match schema.format.as_deref() {
                Some("date" | "date-time") => Primitive::DateTime,
                Some("binary" | "byte") => Primitive::Binary,
                _ => Primitive::String,
            },
            SchemaType::Integer => Primitive::Integer,
            SchemaType::Number => Primitive::Number,
            SchemaType::Boolean => Primitive::Boolean,
            SchemaType::Null => Primitive::Null,
            SchemaType::Array => {
                let item = match schema.items {
                    Some(ref items) => self.type_ref(&format!("{ctx}Item"), items)?,
                    None => TypeRef::Any,
                };
                return Ok(TypeRef::Array(Box::new(item)));
            }
            SchemaType::Object => {
                let value = match schema.additional_properties {
                    Some(AdditionalProperties::Schema(ref value)) => {
                        self.type_ref(&format!("{ctx}Value"), value)?
                    }
                    Some(AdditionalProperties::Bool(_)) | None => TypeRef::Any,
                };
                return Ok(TypeRef::Map(Box::new(value)));
            }
        };
        Ok(TypeRef::Primitive(primitive))
    }

    /// Fields of an object schema. `allOf` members come first, in order, then
    /// the schema's own properties; a name already present keeps its first
    /// definition. `visiting` holds component names on the current merge
    /// path and stops self-referencing compositions.
    fn object_fields(
        &mut self,
        ctx: &str,
        schema: &'a Schema,
        visiting: &mut HashSet<String>,
    ) -> Result<Vec<Field>, ResolveError> {
        let mut set = FieldSet::default();
        self.merge_schema(ctx, schema, &mut set, visiting)?;
        let FieldSet {
            mut fields,
            required,
        } = set;
        for field in &mut fields {
            field.required = required.contains(&field.original_name);
        }
        Ok(fields)
    }

    fn merge_member(
        &mut self,
        ctx: &str,
        member: &'a SchemaOrRef,
        set: &mut FieldSet,
        visiting: &mut HashSet<String>,
    ) -> Result<(), ResolveError> {
        match member {
            SchemaOrRef::Ref { ref_path } => {
                let (name, definition) = self.model.resolve_schema_ref(ref_path)?;
                if visiting.insert(name.to_string()) {
                    self.merge_member(ctx, definition, set, visiting)?;
                    visiting.remove(name);
                }
                Ok(())
            }
            SchemaOrRef::Schema(schema) => self.merge_schema(ctx, schema, set, visiting),
        }
    }

    fn merge_schema(
        &mut self,
        ctx: &str,
        schema: &'a Schema,
        set: &mut FieldSet,
        visiting: &mut HashSet<String>,
    ) -> Result<(), ResolveError> {
        for member in &schema.all_of {
            self.merge_member(ctx, member, set, visiting)?;
        }
        set.required.extend(schema.required.iter().cloned());

        for (prop, prop_schema) in &schema.properties {
            if set.fields.iter().any(|f| f.original_name == *prop) {
                continue;
            }
            let field_ctx = format!("{ctx}{}", prop.to_pascal_case());
            let type_ref = self.type_ref(&field_ctx, prop_schema)?;
            set.fields.push(Field {
                name: normalize_name(prop),
                original_name: prop.clone(),
                type_ref,
                required: false,
                description: match prop_schema {
                    SchemaOrRef::Schema(s) => s.description.clone(),
                    SchemaOrRef::Ref { .. } => None,
                },
            });
        }
        Ok(())
    }
}

/// Build the types of a resource's component schemas. Each component is
/// followed by the types hoisted out of it.
pub fn schemas_to_types(
    builder: &mut TypeBuilder<'_>,
    schemas: &[SchemaRef],
) -> Result<Vec<TypeDef>, ResolveError> {
    let mut types = Vec::with_capacity(schemas.len());
    for schema in schemas {
        types.push(builder.component(schema)?);
        types.extend(builder.take_hoisted());
    }
    Ok(types)
}

fn is_structured(schema: &Schema) -> bool {
    !schema.properties.is_empty() || !schema.all_of.is_empty()
}

fn is_nullable(schema: &Schema) -> bool {
    schema.is_nullable()
        || matches!(
            &schema.schema_type,
            Some(TypeSet::Multiple(types)) if types.contains(&SchemaType::Null)
        )
}

fn doc_of(schema: &Schema) -> Option<String> {
    schema.description.clone().or_else(|| schema.title.clone())
}

fn collapse(mut variants: Vec<TypeRef>) -> TypeRef {
    if variants.len() == 1 {
        variants.remove(0)
    } else {
        TypeRef::Union(variants)
    }
}
