//! Dashboard configuration
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, then
//! `INTEREST_*` environment variables. Command-line flags are applied on top
//! by the binary.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given and the file exists
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";
/// Environment variable prefix
pub const ENV_PREFIX: &str = "INTEREST";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub host: String,
    pub port: u16,
    /// Model artifact (JSON decision tree)
    pub model_path: PathBuf,
    /// Sample CSV for the batch view
    pub sample_path: Option<PathBuf>,
    /// Refuse to start unless the artifact fingerprint matches
    pub expected_model_hash: Option<String>,
    pub log_level: String,
    /// `pretty`, `compact` or `full`
    pub log_format: String,
    pub metrics_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            model_path: PathBuf::from("data/model.json"),
            sample_path: None,
            expected_model_hash: None,
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
        }
    }
}

/// Command-line values that win over every other source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub model_path: Option<PathBuf>,
    pub sample_path: Option<PathBuf>,
}

impl DashboardConfig {
    /// Config file to read: the `--config` path, which must exist, or
    /// [`DEFAULT_CONFIG_PATH`] when present.
    pub fn locate(config_path_override: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path_override {
            Some(path) if !path.exists() => bail!(
                "Configuration file {} not found (specified via --config)",
                path.display()
            ),
            Some(path) => Ok(Some(path.to_path_buf())),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                Ok(path.exists().then_some(path))
            }
        }
    }

    /// Layer defaults, the optional file and `{env_prefix}_*` variables.
    ///
    /// Not validated; call [`DashboardConfig::validate`] once overrides are in.
    pub fn load_from(source: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = source {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(Environment::with_prefix(env_prefix).try_parsing(true));

        builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(model_path) = overrides.model_path {
            self.model_path = model_path;
        }
        if let Some(sample_path) = overrides.sample_path {
            self.sample_path = Some(sample_path);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("port must be non-zero");
        }
        if self.model_path.as_os_str().is_empty() {
            bail!("model_path must not be empty");
        }
        if !matches!(self.log_format.as_str(), "pretty" | "compact" | "full") {
            bail!(
                "log_format '{}' is not one of pretty, compact, full",
                self.log_format
            );
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
