pub mod components;
pub mod content;
pub mod model;
pub mod operation;
pub mod parameter;
pub mod schema;
pub mod spec;

pub use model::{OperationEntry, SpecModel};

use std::path::Path;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse a document, picking the format from the file extension of `path`.
/// `.json` is read as JSON, anything else as YAML.
pub fn from_path_contents(path: &Path, input: &str) -> Result<OpenApiSpec, ParseError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(input),
        _ => from_yaml(input),
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}
