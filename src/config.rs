//! Configuration management for the rule tree builder
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (ruletree.toml)
//! - Environment variables (RULETREE__*)
//!
//! ## Example config file (ruletree.toml):
//! ```toml
//! [objects]
//! allow_unknown_properties = false
//!
//! [arguments]
//! delimiters = "reject"
//!
//! [export]
//! output_format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SchemaError};

/// Main configuration for the builder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// Object node defaults
    #[serde(default)]
    pub objects: ObjectConfig,

    /// Rule argument handling
    #[serde(default)]
    pub arguments: ArgumentConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Object node configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Initial `allow_unknown_properties` flag of every new object node
    #[serde(default)]
    pub allow_unknown_properties: bool,
}

/// Rule argument configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentConfig {
    /// What to do with argument text containing rule delimiters
    #[serde(default)]
    pub delimiters: DelimiterPolicy,
}

/// Treatment of `,` and `|` inside rule argument text.
///
/// Rule tokens are not escaped, so an argument such as `a,b` reads as two
/// arguments to the consuming engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterPolicy {
    /// Embed argument text unchanged
    #[default]
    Verbatim,
    /// Fail with `InvalidArgument` when an argument contains a delimiter
    Reject,
}

impl DelimiterPolicy {
    /// Apply the policy to one resolved argument
    pub fn check(&self, rule_name: &str, argument: &str) -> Result<()> {
        match self {
            DelimiterPolicy::Verbatim => Ok(()),
            DelimiterPolicy::Reject => {
                if argument.contains([',', '|']) {
                    Err(SchemaError::invalid(format!(
                        "argument {:?} of rule \"{}\" contains a rule delimiter",
                        argument, rule_name
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl BuilderConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["ruletree.toml", ".ruletree.toml", "config/ruletree.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "ruletree") {
            let xdg_config = config_dir.config_dir().join("ruletree.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // RULETREE__OBJECTS__ALLOW_UNKNOWN_PROPERTIES=true
        builder = builder.add_source(
            Environment::with_prefix("RULETREE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: BuilderConfig = builder.build()?.try_deserialize()?;
        debug!(?config, "loaded builder configuration");
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self
            .to_toml()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
