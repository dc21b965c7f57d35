use indexmap::IndexMap;
use serde::Deserialize;

use super::content::{RequestBodyOrRef, ResponseOrRef};
use super::parameter::ParameterOrRef;
use super::schema::SchemaOrRef;

/// Reusable definitions addressed by `#/components/{section}/{name}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaOrRef>,

    #[serde(default)]
    pub responses: IndexMap<String, ResponseOrRef>,

    #[serde(default)]
    pub parameters: IndexMap<String, ParameterOrRef>,

    #[serde(rename = "requestBodies", default)]
    pub request_bodies: IndexMap<String, RequestBodyOrRef>,
}
