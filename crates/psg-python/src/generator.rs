use std::path::PathBuf;

use psg_core::error::EmitError;
use psg_core::ir::{ClientIndex, Resource};
use psg_core::{BuilderConfig, GeneratedFile, SdkEmitter};

use crate::context::package_module;
use crate::emitters;

/// Python SDK emitter: pydantic v2 models and an httpx client.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonEmitter;

impl SdkEmitter for PythonEmitter {
    fn types_file(
        &self,
        resource: &Resource,
        config: &BuilderConfig,
    ) -> Result<GeneratedFile, EmitError> {
        Ok(GeneratedFile::generated(
            package_path(resource, "types.py"),
            emitters::types::emit_types(resource, config)?,
        ))
    }

    fn resource_files(
        &self,
        resource: &Resource,
        config: &BuilderConfig,
    ) -> Result<Vec<GeneratedFile>, EmitError> {
        Ok(vec![
            GeneratedFile::generated(
                package_path(resource, "resource.py"),
                emitters::resource::emit_resource(resource, config)?,
            ),
            GeneratedFile::generated(
                package_path(resource, "__init__.py"),
                emitters::resource::emit_package_init(resource, config)?,
            ),
        ])
    }

    fn client_file(
        &self,
        index: &ClientIndex,
        config: &BuilderConfig,
    ) -> Result<GeneratedFile, EmitError> {
        Ok(GeneratedFile::generated(
            "client.py",
            emitters::client::emit_client(index, config)?,
        ))
    }

    fn package_files(
        &self,
        index: &ClientIndex,
        config: &BuilderConfig,
    ) -> Result<Vec<GeneratedFile>, EmitError> {
        Ok(vec![
            GeneratedFile::scaffold(
                "pyproject.toml",
                emitters::scaffold::emit_pyproject(index, config)?,
            ),
            GeneratedFile::scaffold(
                "__init__.py",
                emitters::scaffold::emit_root_init(index, config)?,
            ),
        ])
    }
}

fn package_path(resource: &Resource, file: &str) -> PathBuf {
    PathBuf::from(package_module(&resource.package)).join(file)
}
