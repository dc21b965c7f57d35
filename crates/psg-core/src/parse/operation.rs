use indexmap::IndexMap;
use serde::Deserialize;

use super::content::{RequestBodyOrRef, ResponseOrRef};
use super::parameter::ParameterOrRef;
use crate::ir::HttpMethod;

/// An API operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Operation {
    #[serde(rename = "operationId", default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(rename = "requestBody", default)]
    pub request_body: Option<RequestBodyOrRef>,

    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default)]
    pub deprecated: Option<bool>,
}

/// A path item, containing operations keyed by HTTP method.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub parameters: Vec<ParameterOrRef>,

    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub options: Option<Operation>,
    #[serde(default)]
    pub head: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub trace: Option<Operation>,
}

impl PathItem {
    /// Operations of this path item in a fixed verb order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}
