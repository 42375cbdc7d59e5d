//! Configuration management for the builder generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (builders.toml)
//! - Environment variables (BUILDERS__*)
//!
//! ## Example config file (builders.toml):
//! ```toml
//! [plugin]
//! name = "hey-api-builders"
//! output = "builders"
//! export_from_index = true
//!
//! [input]
//! skip_prefixes = ["target/", "node_modules/"]
//!
//! [options]
//! use_examples = true
//! optionals_probability = 0.5
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codegen::BuilderOptions;
use crate::graph::LoadConfig;

/// Suffix of the generated file name
pub const GENERATED_EXTENSION: &str = "gen.ts";

/// Main configuration for the builder generator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildersConfig {
    /// Plugin identity and output
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Schema source settings
    #[serde(default)]
    pub input: InputConfig,

    /// Initial options of every generated builder
    #[serde(default)]
    pub options: BuilderOptions,
}

/// Plugin identity, handed to the file sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin name, used as the generated file id
    #[serde(default = "default_plugin_name")]
    pub name: String,

    /// Output path of the generated file, without extension
    #[serde(default = "default_output")]
    pub output: String,

    /// Re-export the generated module from the output directory's index
    #[serde(default = "default_true")]
    pub export_from_index: bool,
}

/// Schema source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Skip schema files under these relative prefixes
    #[serde(default = "default_skip_prefixes")]
    pub skip_prefixes: Vec<String>,

    /// Only load schema files under these prefixes (empty = all)
    #[serde(default)]
    pub include_prefixes: Vec<String>,
}

// Default value functions
fn default_plugin_name() -> String {
    "hey-api-builders".to_string()
}

fn default_output() -> String {
    "builders".to_string()
}

fn default_true() -> bool {
    true
}

fn default_skip_prefixes() -> Vec<String> {
    LoadConfig::default().skip_prefixes
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            name: default_plugin_name(),
            output: default_output(),
            export_from_index: true,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            skip_prefixes: default_skip_prefixes(),
            include_prefixes: Vec::new(),
        }
    }
}

impl PluginConfig {
    /// File name of the generated module, e.g. `builders.gen.ts`
    pub fn output_file_name(&self) -> String {
        format!("{}.{}", self.output, GENERATED_EXTENSION)
    }

    /// Import specifier used by the index re-export, e.g. `./builders.gen`
    pub fn module_specifier(&self) -> String {
        format!("./{}.gen", self.output)
    }
}

impl InputConfig {
    pub fn load_config(&self) -> LoadConfig {
        LoadConfig {
            skip_prefixes: self.skip_prefixes.clone(),
            include_prefixes: self.include_prefixes.clone(),
        }
    }
}

impl BuildersConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["builders.toml", ".builders.toml", "config/builders.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "hey-api", "builders") {
            let xdg_config = config_dir.config_dir().join("builders.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Environment variables (BUILDERS__PLUGIN__OUTPUT=...)
        builder = builder.add_source(
            Environment::with_prefix("BUILDERS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would produce invalid generated code
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plugin.output.trim().is_empty() {
            return Err(ConfigError::Message("plugin.output must not be empty".to_string()));
        }
        self.options.validate().map_err(ConfigError::Message)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Path of the generated file inside `out_dir`
    pub fn output_path(&self, out_dir: &Path) -> PathBuf {
        out_dir.join(self.plugin.output_file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::OptionalsProbability;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = BuildersConfig::default();
        assert_eq!(config.plugin.name, "hey-api-builders");
        assert_eq!(config.plugin.output, "builders");
        assert!(config.plugin.export_from_index);
        assert_eq!(config.plugin.output_file_name(), "builders.gen.ts");
        assert_eq!(config.plugin.module_specifier(), "./builders.gen");
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_serialize_config() {
        let config = BuildersConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[plugin]"));
        assert!(toml_str.contains("[input]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[plugin]\noutput = \"mocks\"\n\n[options]\nuse_examples = true\noptionals_probability = false\n",
        )
        .unwrap();

        let config = BuildersConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.plugin.output, "mocks");
        assert_eq!(config.plugin.name, "hey-api-builders");
        assert_eq!(config.options.use_examples, Some(true));
        assert_eq!(config.options.optionals_probability, Some(OptionalsProbability::Flag(false)));
        assert_eq!(config.output_path(Path::new("out")), Path::new("out/mocks.gen.ts"));
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = BuildersConfig::default();
        config.plugin.output = "fixtures".to_string();
        config.save(&path).unwrap();

        let loaded = BuildersConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.plugin, config.plugin);
    }

    #[test]
    fn test_output_path_with_nested_output() {
        let mut config = BuildersConfig::default();
        config.plugin.output = "client/builders".to_string();
        assert_eq!(
            config.output_path(Path::new("src")),
            Path::new("src/client/builders.gen.ts")
        );
    }

    #[test]
    fn test_invalid_probability_is_rejected() {
        let mut config = BuildersConfig::default();
        config.options.optionals_probability = Some(OptionalsProbability::Ratio(2.0));
        assert!(config.validate().is_err());
    }
}
