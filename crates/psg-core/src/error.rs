use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),

    #[error("operation {operation} has an empty tag name")]
    EmptyTagName { operation: String },

    #[error("empty tag name passed to generation")]
    EmptyResourceTag,

    #[error("method {method} is defined twice (second definition: {path})")]
    DuplicateMethod { method: String, path: String },

    #[error("type {0} is referenced but never emitted")]
    DanglingType(String),

    #[error("tags {other:?} and {tag:?} both map to package {package}")]
    DuplicatePackage {
        package: String,
        tag: String,
        other: String,
    },
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to render {template}: {message}")]
    Render { template: String, message: String },
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to index operation {operation}: {source}")]
    Index {
        operation: String,
        #[source]
        source: ResolveError,
    },

    #[error("failed to build resource {tag}: {source}")]
    Resource {
        tag: String,
        #[source]
        source: ResolveError,
    },

    #[error("failed to emit {target}: {source}")]
    Emit {
        target: String,
        #[source]
        source: EmitError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}
