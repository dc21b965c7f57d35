use psg_core::BuilderConfig;
use psg_core::error::EmitError;
use psg_core::ir::ClientIndex;

use crate::context::PackageContext;

/// Emit `pyproject.toml` (hatchling, httpx, pydantic).
pub fn emit_pyproject(index: &ClientIndex, config: &BuilderConfig) -> Result<String, EmitError> {
    super::render("pyproject.toml.j2", &PackageContext::new(index, config))
}

/// Emit the root `__init__.py` re-exporting the client class.
pub fn emit_root_init(index: &ClientIndex, config: &BuilderConfig) -> Result<String, EmitError> {
    super::render("root_init.py.j2", &PackageContext::new(index, config))
}
