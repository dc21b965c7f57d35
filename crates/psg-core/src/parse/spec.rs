use indexmap::IndexMap;
use serde::Deserialize;

use super::components::Components;
use super::operation::PathItem;

/// Info object describing the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    pub version: String,
}

/// Tag declared at the document root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A server URL. Only the first one is used, as the SDK's default base URL.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Top-level OpenAPI 3.x document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OpenApiSpec {
    pub openapi: String,

    pub info: Info,

    #[serde(default)]
    pub servers: Vec<Server>,

    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Option<Components>,

    #[serde(default)]
    pub tags: Vec<Tag>,
}
