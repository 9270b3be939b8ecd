//! Configuration for schema config
//!
//! Layered with figment, lowest to highest priority:
//! - Default values
//! - Optional YAML file
//! - Environment variables (SCHEMA_CONFIG_*)

use crate::contract::Result;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SCHEMA_CONFIG_";

/// Schema config configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Application name for the default instance and app-less selections
    #[serde(default)]
    pub app_name: Option<String>,

    /// Schema id of the default instance
    #[serde(default = "default_schema_id")]
    pub default_schema_id: String,

    /// Base path of the default instance
    #[serde(default = "default_schema_path")]
    pub default_schema_path: String,

    /// Directories holding installed schema definitions
    #[serde(default)]
    pub schema_dirs: Vec<PathBuf>,

    /// Buffered change events per instance
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: None,
            default_schema_id: default_schema_id(),
            default_schema_path: default_schema_path(),
            schema_dirs: Vec::new(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_schema_id() -> String {
    "com.deepin.dtk".to_string()
}

fn default_schema_path() -> String {
    "/com/deepin/dtk/".to_string()
}

fn default_event_capacity() -> usize {
    64
}

impl Config {
    /// Load configuration from defaults, an optional YAML file and the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            figment = figment.merge(Yaml::file(path));
        }
        let config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        Ok(config)
    }

    /// Builder-style app name
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Configured app name, else the executable's file stem, else "app"
    pub fn resolve_app_name(&self) -> String {
        if let Some(name) = self.app_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "app".to_string())
    }
}
