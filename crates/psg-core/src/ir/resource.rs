use std::collections::BTreeSet;

use serde::Serialize;

use super::methods::Method;
use super::types::{Tag, TypeDef};

/// The generated unit for one tag.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub tag: Tag,
    /// Directory and module name (snake_case).
    pub package: String,
    /// Class-name stem (PascalCase).
    pub service: String,
    /// Component types, emitted into the resource's types file.
    pub types: Vec<TypeDef>,
    /// Types hoisted out of operations (bodies, params, responses), emitted
    /// alongside the methods.
    pub inner_types: Vec<TypeDef>,
    pub methods: Vec<Method>,
    /// Sorted names of component types the resource file imports.
    pub type_names: Vec<String>,
}

impl Resource {
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn all_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.iter().chain(self.inner_types.iter())
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeDef> {
        self.all_types().find(|t| t.type_name() == name)
    }

    /// Names referenced by methods or types that no type in this resource
    /// defines. Empty for a well-formed resource.
    pub fn dangling_references(&self) -> Vec<String> {
        let defined: BTreeSet<&str> = self.all_types().map(TypeDef::type_name).collect();
        let mut referenced = BTreeSet::new();
        for m in &self.methods {
            referenced.extend(m.references());
        }
        for t in self.all_types() {
            referenced.extend(t.references());
        }
        referenced
            .into_iter()
            .filter(|name| !defined.contains(name.as_str()))
            .collect()
    }
}

/// A resource as listed by the aggregate client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientResource {
    /// Accessor stem (PascalCase).
    pub name: String,
    /// Module the resource lives in (snake_case).
    pub package: String,
    pub description: Option<String>,
    pub methods: usize,
}

/// Everything the aggregate client files need.
#[derive(Debug, Clone, Serialize)]
pub struct ClientIndex {
    pub title: String,
    pub version: String,
    pub base_url: Option<String>,
    /// Non-empty resources, sorted by name.
    pub resources: Vec<ClientResource>,
}

impl ClientIndex {
    pub fn new(
        title: String,
        version: String,
        base_url: Option<String>,
        resources: &[Resource],
    ) -> Self {
        let mut entries: Vec<ClientResource> = resources
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| ClientResource {
                name: r.service.clone(),
                package: r.package.clone(),
                description: r.tag.description.clone(),
                methods: r.methods.len(),
            })
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            title,
            version,
            base_url,
            resources: entries,
        }
    }
}
