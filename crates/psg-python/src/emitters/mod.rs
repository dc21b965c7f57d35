pub mod client;
pub mod resource;
pub mod scaffold;
pub mod types;

use minijinja::{AutoEscape, Environment};
use psg_core::error::EmitError;
use serde::Serialize;

use crate::type_mapper::string_literal;

const TEMPLATES: &[(&str, &str)] = &[
    ("macros.j2", include_str!("../../templates/macros.j2")),
    ("types.py.j2", include_str!("../../templates/types.py.j2")),
    ("resource.py.j2", include_str!("../../templates/resource.py.j2")),
    ("package_init.py.j2", include_str!("../../templates/package_init.py.j2")),
    ("client.py.j2", include_str!("../../templates/client.py.j2")),
    ("pyproject.toml.j2", include_str!("../../templates/pyproject.toml.j2")),
    ("root_init.py.j2", include_str!("../../templates/root_init.py.j2")),
];

/// Template environment with every template and the Python filters loaded.
pub fn environment() -> Result<Environment<'static>, EmitError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_filter("docstring", docstring);
    env.add_filter("quote", quote);

    for &(name, source) in TEMPLATES {
        env.add_template(name, source)
            .map_err(|e| render_error(name, &e))?;
    }
    Ok(env)
}

/// Render `template` with `ctx`.
pub fn render<S: Serialize>(template: &str, ctx: &S) -> Result<String, EmitError> {
    log::trace!("rendering {template}");
    let env = environment()?;
    let tmpl = env
        .get_template(template)
        .map_err(|e| render_error(template, &e))?;
    tmpl.render(ctx).map_err(|e| render_error(template, &e))
}

fn render_error(template: &str, err: &minijinja::Error) -> EmitError {
    EmitError::Render {
        template: template.to_string(),
        message: format!("{err:#}"),
    }
}

/// Make text safe inside a triple-quoted docstring.
fn docstring(value: &str) -> String {
    let mut text = value.trim().replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
    if text.ends_with('"') {
        text.push(' ');
    }
    text
}

fn quote(value: &str) -> String {
    string_literal(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_load() {
        let env = environment().unwrap();
        for (name, _) in TEMPLATES {
            assert!(env.get_template(name).is_ok(), "{name} should load");
        }
    }

    #[test]
    fn docstring_escapes_quotes_and_backslashes() {
        assert_eq!(docstring("  plain  "), "plain");
        assert_eq!(docstring(r#"a """quoted""" word"#), r#"a \"\"\"quoted\"\"\" word"#);
        assert_eq!(docstring(r"C:\path"), r"C:\\path");
        assert_eq!(docstring(r#"ends with "x""#), r#"ends with "x" "#);
    }
}
