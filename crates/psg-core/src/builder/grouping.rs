use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{BuildError, ResolveError};
use crate::ir::{SchemaRef, Tag};
use crate::parse::content::{MediaType, preferred_media};
use crate::parse::schema::{AdditionalProperties, SchemaKind, SchemaOrRef};
use crate::parse::{OperationEntry, SpecModel};

use super::tags::TagResolver;

/// Everything indexed under one effective tag.
#[derive(Debug, Clone)]
pub struct TagGroup<'a> {
    pub tag: Tag,
    /// Operations in document order (path, then verb).
    pub operations: Vec<OperationEntry<'a>>,
    /// Component schemas reachable from the operations, first-seen order.
    pub schemas: Vec<SchemaRef>,
    seen: HashSet<String>,
}

impl<'a> TagGroup<'a> {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            operations: Vec::new(),
            schemas: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn insert_schema(&mut self, name: &str, definition: &SchemaOrRef) -> bool {
        if !self.seen.insert(name.to_string()) {
            return false;
        }
        self.schemas.push(SchemaRef {
            name: name.to_string(),
            kind: SchemaKind::of(definition),
        });
        true
    }
}

/// Per-tag index of operations and reachable component schemas.
///
/// Built once per run and never mutated afterwards; every later stage reads
/// it through a shared reference. Lookups by tag name are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex<'a> {
    groups: IndexMap<String, TagGroup<'a>>,
}

impl<'a> SchemaIndex<'a> {
    pub fn build(model: &SpecModel<'a>, tags: &TagResolver) -> Result<Self, BuildError> {
        let mut groups: IndexMap<String, TagGroup<'a>> = IndexMap::new();

        for entry in model.operations() {
            let index_err = |source| BuildError::Index {
                operation: entry.label(),
                source,
            };
            let tag = tags.effective_tag(&entry).map_err(index_err)?;
            let group = groups
                .entry(tag.name.to_lowercase())
                .or_insert_with(|| TagGroup::new(tag));
            group.operations.push(entry);
            collect_operation_schemas(model, &entry, group).map_err(index_err)?;
        }

        Ok(Self { groups })
    }

    /// Effective tags in first-seen order.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.groups.values().map(|g| &g.tag)
    }

    pub fn group(&self, tag: &str) -> Option<&TagGroup<'a>> {
        self.groups.get(&tag.to_lowercase())
    }

    pub fn schemas_for(&self, tag: &str) -> &[SchemaRef] {
        self.group(tag).map(|g| g.schemas.as_slice()).unwrap_or(&[])
    }

    pub fn paths_for(&self, tag: &str) -> &[OperationEntry<'a>] {
        self.group(tag)
            .map(|g| g.operations.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn collect_operation_schemas<'a>(
    model: &SpecModel<'a>,
    entry: &OperationEntry<'a>,
    group: &mut TagGroup<'a>,
) -> Result<(), ResolveError> {
    for param in model.effective_parameters(entry)? {
        if let Some(ref schema) = param.schema {
            walk(model, schema, group)?;
        }
    }

    if let Some(ref body) = entry.operation.request_body {
        let body = model.request_body(body)?;
        walk_media(model, preferred_media(&body.content), group)?;
    }

    for response in entry.operation.responses.values() {
        let response = model.response(response)?;
        walk_media(model, preferred_media(&response.content), group)?;
    }

    Ok(())
}

fn walk_media<'a>(
    model: &SpecModel<'a>,
    media: Option<(&str, &'a MediaType)>,
    group: &mut TagGroup<'a>,
) -> Result<(), ResolveError> {
    match media.and_then(|(_, mt)| mt.schema.as_ref()) {
        Some(schema) => walk(model, schema, group),
        None => Ok(()),
    }
}

/// Record every component reachable from `schema`. Already-recorded
/// components are not revisited, which also terminates reference cycles.
fn walk<'a>(
    model: &SpecModel<'a>,
    schema: &'a SchemaOrRef,
    group: &mut TagGroup<'a>,
) -> Result<(), ResolveError> {
    match schema {
        SchemaOrRef::Ref { ref_path } => {
            let (name, definition) = model.resolve_schema_ref(ref_path)?;
            if group.insert_schema(name, definition) {
                walk(model, definition, group)?;
            }
        }
        SchemaOrRef::Schema(s) => {
            for prop in s.properties.values() {
                walk(model, prop, group)?;
            }
            if let Some(ref items) = s.items {
                walk(model, items, group)?;
            }
            if let Some(AdditionalProperties::Schema(ref value)) = s.additional_properties {
                walk(model, value, group)?;
            }
            for member in s.all_of.iter().chain(&s.one_of).chain(&s.any_of) {
                walk(model, member, group)?;
            }
        }
    }
    Ok(())
}
