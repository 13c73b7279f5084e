//! Layered configuration: built-in defaults, then `config.toml`, then
//! `SESSION_REST__*` environment variables.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::host::LocalHostConfig;

pub const APP_NAME: &str = "session-rest";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub session: LocalHostConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1234,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (missing file is fine) and the environment.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self> {
        let built = Config::builder()
            .set_default("server.host", ServerConfig::default().host)?
            .set_default("server.port", i64::from(ServerConfig::default().port))?
            .set_default("logging.level", "info")?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env)
            .build()
            .with_context(|| format!("loading config from {}", path.display()))?;

        let mut config: AppConfig = built
            .try_deserialize()
            .context("deserializing configuration")?;

        if let Some(ref file) = config.session.startup_file {
            config.session.startup_file = Some(expand_str_path(file)?.display().to_string());
        }

        Ok(config)
    }

    /// Write the default configuration to `path`, creating parent directories.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(&AppConfig::default())
            .context("serializing default config to TOML")?;
        let mut body = String::new();
        body.push_str("# Configuration for ");
        body.push_str(APP_NAME);
        body.push('\n');
        body.push_str("# File: ");
        body.push_str(&path.display().to_string());
        body.push_str("\n\n");
        body.push_str(&toml);

        fs::write(path, body).with_context(|| format!("writing config file to {}", path.display()))
    }
}

/// Resolve the config file path, honouring an explicit override.
///
/// A directory override resolves to `config.toml` inside it.
pub fn config_file_path(override_path: Option<PathBuf>) -> Result<PathBuf> {
    match override_path {
        Some(path) => {
            let expanded = expand_path(path)?;
            if expanded.is_dir() {
                Ok(expanded.join("config.toml"))
            } else {
                Ok(expanded)
            }
        }
        None => Ok(default_config_dir()?.join("config.toml")),
    }
}

fn default_config_dir() -> Result<PathBuf> {
    if let Some(dir) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    if let Some(mut dir) = dirs::config_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine configuration directory"))
}

fn expand_path(path: PathBuf) -> Result<PathBuf> {
    match path.to_str() {
        Some(text) => expand_str_path(text),
        None => Ok(path),
    }
}

fn expand_str_path(text: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(text).context("expanding path")?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// `SESSION_REST__SECTION__KEY` overrides. List values are comma separated.
fn env_source() -> Environment {
    Environment::with_prefix(&env_prefix())
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
}

/// `SESSION_REST` for the default app name.
pub fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
