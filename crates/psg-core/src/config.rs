use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Immutable settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Output directory; the SDK package is written directly into it.
    pub out: PathBuf,
    /// Python import name of the generated package.
    pub module: String,
    /// Distribution name written to `pyproject.toml`.
    pub package_name: String,
    /// Display name; the client class is its PascalCase form.
    pub name: String,
    /// Rewrite scaffold files that already exist.
    pub force: bool,
}

impl BuilderConfig {
    pub fn new(
        out: impl Into<PathBuf>,
        module: impl Into<String>,
        package_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            out: out.into(),
            module: module.into(),
            package_name: package_name.into(),
            name: name.into(),
            force: false,
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Project configuration loaded from `.psg.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub input: String,
    pub output: String,
    pub module: Option<String>,
    pub package: Option<String>,
    pub name: Option<String>,
    pub force: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "./".to_string(),
            module: None,
            package: None,
            name: None,
            force: false,
        }
    }
}

impl ProjectConfig {
    /// Turn the project settings into a run configuration. Module, package
    /// and name have no defaults.
    pub fn to_builder_config(&self) -> Result<BuilderConfig, ConfigError> {
        let module = self.module.clone().ok_or(ConfigError::Missing("module"))?;
        let package = self.package.clone().ok_or(ConfigError::Missing("package"))?;
        let name = self.name.clone().ok_or(ConfigError::Missing("name"))?;
        Ok(BuilderConfig::new(&self.output, module, package, name).with_force(self.force))
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".psg.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ProjectConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# psg configuration
input: openapi.yaml
output: ./

# module: acme_sdk          # Python import name
# package: acme-sdk         # distribution name in pyproject.toml
# name: Acme                # client class is the PascalCase form

force: false                # rewrite pyproject.toml and __init__.py if present
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.input, "openapi.yaml");
        assert_eq!(config.output, "./");
        assert!(config.module.is_none());
        assert!(!config.force);
    }

    #[test]
    fn test_parse_config_yaml() {
        let yaml = r#"
input: spec.yaml
output: sdk
module: acme_sdk
package: acme-sdk
name: Acme
force: true
"#;
        let config: ProjectConfig = serde_yaml_ng::from_str(yaml).unwrap();
        let run = config.to_builder_config().unwrap();
        assert_eq!(run.out, PathBuf::from("sdk"));
        assert_eq!(run.module, "acme_sdk");
        assert_eq!(run.package_name, "acme-sdk");
        assert_eq!(run.name, "Acme");
        assert!(run.force);
    }

    #[test]
    fn test_missing_module_is_reported() {
        let config: ProjectConfig = serde_yaml_ng::from_str("input: api.yaml\n").unwrap();
        assert_eq!(config.output, "./");
        assert!(matches!(
            config.to_builder_config(),
            Err(ConfigError::Missing("module"))
        ));
    }

    #[test]
    fn test_default_content_parses() {
        let config: ProjectConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config, ProjectConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap().is_none());
    }
}
