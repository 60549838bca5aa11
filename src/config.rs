//! Configuration management for documentation runs
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-docs.toml)
//! - Environment variables (SCHEMA_DOCS__*)
//!
//! ## Example config file (schema-docs.toml):
//! ```toml
//! [input]
//! extension = "avpr"
//!
//! [output]
//! extension = "rst"
//!
//! [lineage]
//! max_depth = 10
//!
//! [render]
//! missing_doc = "documentation missing"
//! index_title = "Schemata"
//! templates_dir = "docs/_templates/schema"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::builder::BuildSettings;
use crate::lineage::MAX_ORIGIN_LEVEL;
use crate::loader::LoadConfig;
use crate::protocol::NO_DOC_STRING;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocsConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub lineage: LineageConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

/// Protocol input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Extension of protocol files
    #[serde(default = "default_input_extension")]
    pub extension: String,
}

/// Document output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extension of emitted documents
    #[serde(default = "default_output_extension")]
    pub extension: String,
}

/// Lineage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageConfig {
    /// Longest origin chain accepted before it is reported as cyclic
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Text used when a type, field or protocol has no doc
    #[serde(default = "default_missing_doc")]
    pub missing_doc: String,

    /// Title of the global index
    #[serde(default = "default_index_title")]
    pub index_title: String,

    /// Directory of `*.hbs` files overriding the embedded templates
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,
}

// Default value functions
fn default_input_extension() -> String {
    "avpr".to_string()
}

fn default_output_extension() -> String {
    "rst".to_string()
}

fn default_max_depth() -> usize {
    MAX_ORIGIN_LEVEL
}

fn default_missing_doc() -> String {
    NO_DOC_STRING.to_string()
}

fn default_index_title() -> String {
    "Schemata".to_string()
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: default_input_extension(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_output_extension(),
        }
    }
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            missing_doc: default_missing_doc(),
            index_title: default_index_title(),
            templates_dir: None,
        }
    }
}

impl DocsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, with `config_path` as a required extra source
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-docs.toml",
            ".schema-docs.toml",
            "config/schema-docs.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-docs") {
            let xdg_config = config_dir.config_dir().join("schema-docs.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_DOCS__LINEAGE__MAX_DEPTH=20
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_DOCS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            extension: self.input.extension.clone(),
        }
    }

    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            extension: self.output.extension.clone(),
            max_origin_depth: self.lineage.max_depth,
            missing_doc: self.render.missing_doc.clone(),
            index_title: self.render.index_title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DocsConfig::default();
        assert_eq!(config.input.extension, "avpr");
        assert_eq!(config.output.extension, "rst");
        assert_eq!(config.lineage.max_depth, 10);
        assert_eq!(config.render.missing_doc, "documentation missing");
    }

    #[test]
    fn test_serialize_config() {
        let config = DocsConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[lineage]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.toml");
        std::fs::write(&path, "[lineage]\nmax_depth = 25\n\n[output]\nextension = \"txt\"\n").unwrap();

        let config = DocsConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.lineage.max_depth, 25);
        assert_eq!(config.input.extension, "avpr");

        let settings = config.build_settings();
        assert_eq!(settings.extension, "txt");
        assert_eq!(settings.max_origin_depth, 25);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = DocsConfig::default();
        config.render.index_title = "Data catalogue".to_string();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = DocsConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.render.index_title, "Data catalogue");
    }
}
