use psg_core::BuilderConfig;
use psg_core::error::EmitError;
use psg_core::ir::Resource;

use crate::context::ResourceContext;

/// Emit `{package}/resource.py`: hoisted operation types and the
/// `{Service}Resource` class.
pub fn emit_resource(resource: &Resource, config: &BuilderConfig) -> Result<String, EmitError> {
    super::render("resource.py.j2", &ResourceContext::new(resource, config))
}

/// Emit `{package}/__init__.py`.
pub fn emit_package_init(
    resource: &Resource,
    config: &BuilderConfig,
) -> Result<String, EmitError> {
    super::render("package_init.py.j2", &ResourceContext::new(resource, config))
}
