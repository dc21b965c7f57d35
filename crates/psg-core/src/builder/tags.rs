use crate::error::ResolveError;
use crate::ir::Tag;
use crate::parse::OperationEntry;
use crate::parse::spec;

/// Tag assigned to operations that carry no tags at all.
pub const DEFAULT_TAG: &str = "default";

/// Maps tag names found on operations to canonical tag descriptors.
#[derive(Debug, Clone, Default)]
pub struct TagResolver {
    declared: Vec<Tag>,
}

impl TagResolver {
    pub fn new(declared: &[spec::Tag]) -> Self {
        Self {
            declared: declared
                .iter()
                .map(|t| Tag {
                    name: t.name.clone(),
                    description: t.description.clone(),
                })
                .collect(),
        }
    }

    /// Declared tag matching `name` case-insensitively, or a synthetic tag
    /// carrying only `name`. Never fails.
    pub fn resolve(&self, name: &str) -> Tag {
        self.declared
            .iter()
            .find(|t| t.matches(name))
            .cloned()
            .unwrap_or_else(|| Tag::synthetic(name))
    }

    /// The single tag an operation is generated under: its first tag, or
    /// [`DEFAULT_TAG`] when it has none.
    pub fn effective_tag(&self, entry: &OperationEntry<'_>) -> Result<Tag, ResolveError> {
        match entry.operation.tags.first() {
            None => Ok(self.resolve(DEFAULT_TAG)),
            Some(name) if name.trim().is_empty() => Err(ResolveError::EmptyTagName {
                operation: entry.label(),
            }),
            Some(name) => {
                if entry.operation.tags.len() > 1 {
                    log::debug!(
                        "operation {} has {} tags, generating it under {name:?}",
                        entry.label(),
                        entry.operation.tags.len()
                    );
                }
                Ok(self.resolve(name))
            }
        }
    }
}
