use psg_core::BuilderConfig;
use psg_core::error::EmitError;
use psg_core::ir::ClientIndex;

use crate::context::ClientContext;

/// Emit `client.py` with one accessor per resource.
pub fn emit_client(index: &ClientIndex, config: &BuilderConfig) -> Result<String, EmitError> {
    super::render("client.py.j2", &ClientContext::new(index, config))
}
