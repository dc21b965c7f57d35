pub mod builder;
pub mod config;
pub mod error;
pub mod ir;
pub mod parse;
pub mod writer;

pub use builder::{BuildReport, Builder};
pub use config::BuilderConfig;

use std::path::PathBuf;

use error::EmitError;
use ir::{ClientIndex, Resource};

/// Whether a file is regenerated on every run or belongs to the user once
/// written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Always rewritten.
    Generated,
    /// Written when absent; rewritten only with `force`.
    Scaffold,
}

/// A generated file with a path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
    pub kind: FileKind,
}

impl GeneratedFile {
    pub fn generated(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            path: path.into(),
            content,
            kind: FileKind::Generated,
        }
    }

    pub fn scaffold(path: impl Into<PathBuf>, content: String) -> Self {
        Self {
            path: path.into(),
            content,
            kind: FileKind::Scaffold,
        }
    }
}

/// A target language. Renders IR into files; never touches the disk.
pub trait SdkEmitter {
    /// The resource's component types file.
    fn types_file(&self, resource: &Resource, config: &BuilderConfig)
    -> Result<GeneratedFile, EmitError>;

    /// The resource module itself: hoisted types, the resource class and
    /// anything else the package directory needs.
    fn resource_files(
        &self,
        resource: &Resource,
        config: &BuilderConfig,
    ) -> Result<Vec<GeneratedFile>, EmitError>;

    /// The aggregate client entry point.
    fn client_file(&self, index: &ClientIndex, config: &BuilderConfig)
    -> Result<GeneratedFile, EmitError>;

    /// Package manifest and root package files.
    fn package_files(
        &self,
        index: &ClientIndex,
        config: &BuilderConfig,
    ) -> Result<Vec<GeneratedFile>, EmitError>;
}
