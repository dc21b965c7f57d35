use psg_core::BuilderConfig;
use psg_core::error::EmitError;
use psg_core::ir::Resource;

use crate::context::TypesFileContext;

/// Emit `{package}/types.py`: pydantic models, enums and aliases for the
/// resource's component schemas.
pub fn emit_types(resource: &Resource, config: &BuilderConfig) -> Result<String, EmitError> {
    super::render("types.py.j2", &TypesFileContext::new(resource, config))
}
