use std::collections::HashSet;

use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::ir::{HttpMethod, NormalizedName};

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let sanitized = sanitize_identifier(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// Synthesize an operation id for operations that do not declare one.
///
/// - `GET /users` → `listUsers`
/// - `GET /users/{id}` → `getUser`
/// - `POST /users` → `createUsers`
/// - `DELETE /users/{id}/keys/{keyId}` → `deleteUsersKey`
pub fn synthesize_operation_id(method: HttpMethod, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let prefix = match method {
        HttpMethod::Get if ends_with_param => "get",
        HttpMethod::Get => "list",
        HttpMethod::Post => "create",
        HttpMethod::Put => "update",
        HttpMethod::Delete => "delete",
        HttpMethod::Patch => "patch",
        HttpMethod::Options => "options",
        HttpMethod::Head => "head",
        HttpMethod::Trace => "trace",
    };

    let last = resource_parts.len().saturating_sub(1);
    let mut name = prefix.to_string();
    for (i, part) in resource_parts.iter().enumerate() {
        let word = if i == last && ends_with_param {
            singularize(part)
        } else {
            part.to_string()
        };
        name.push_str(&sanitize_identifier(&word).to_pascal_case());
    }
    name
}

/// Naive singularization for the trailing collection segment.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Replace runs of non-alphanumeric characters with a single `_`.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            pending_separator = false;
        } else {
            pending_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}

/// Set of type names already taken within one emitted file.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new<I: IntoIterator<Item = String>>(reserved: I) -> Self {
        Self {
            used: reserved.into_iter().collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Claim a unique PascalCase name derived from `base`, appending a numeric
    /// suffix when the plain name is taken.
    pub fn claim(&mut self, base: &str) -> String {
        let pascal = base.to_pascal_case();
        if self.used.insert(pascal.clone()) {
            return pascal;
        }
        let mut i = 2;
        loop {
            let candidate = format!("{pascal}{i}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}
