//! Application configuration for Web Baby.
//!
//! User config lives at `~/.webbaby/webbaby.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, WebBabyError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "webbaby.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".webbaby";

/// Default database file name inside the config directory.
const DB_FILE_NAME: &str = "webbaby.db";

/// Provider names accepted in `providers.topic_chain`.
pub const TOPIC_PROVIDER_NAMES: &[&str] = &["instant_answer", "encyclopedia", "proxy"];

// ---------------------------------------------------------------------------
// Config structs (matching webbaby.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Content provider endpoints and chain order.
    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file path. Defaults to `~/.webbaby/webbaby.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolve the database path, falling back to the config directory.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(DB_FILE_NAME)),
        }
    }
}

/// `[providers]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL of the recipe search API (`search.php` is appended).
    #[serde(default = "default_recipe_api_url")]
    pub recipe_api_url: Url,

    /// Base URL of the instant-answer API.
    #[serde(default = "default_instant_answer_url")]
    pub instant_answer_url: Url,

    /// Base URL of the encyclopedia REST API (`page/summary/<title>` is appended).
    #[serde(default = "default_encyclopedia_url")]
    pub encyclopedia_url: Url,

    /// Base URL of the personal fetch proxy. The proxy provider always fails
    /// when this is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<Url>,

    /// Per-call timeout for the light JSON APIs.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,

    /// Per-call timeout for the proxy path.
    #[serde(default = "default_proxy_timeout")]
    pub proxy_timeout_secs: u64,

    /// Topic providers in the order they are tried.
    #[serde(default = "default_topic_chain")]
    pub topic_chain: Vec<String>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            recipe_api_url: default_recipe_api_url(),
            instant_answer_url: default_instant_answer_url(),
            encyclopedia_url: default_encyclopedia_url(),
            proxy_url: None,
            api_timeout_secs: default_api_timeout(),
            proxy_timeout_secs: default_proxy_timeout(),
            topic_chain: default_topic_chain(),
        }
    }
}

impl ProvidersConfig {
    /// Reject unknown or duplicated names in `topic_chain`.
    pub fn validate(&self) -> Result<()> {
        if self.topic_chain.is_empty() {
            return Err(WebBabyError::config(
                "providers.topic_chain must name at least one provider",
            ));
        }
        for (i, name) in self.topic_chain.iter().enumerate() {
            if !TOPIC_PROVIDER_NAMES.contains(&name.as_str()) {
                return Err(WebBabyError::config(format!(
                    "unknown topic provider '{name}', expected one of: {}",
                    TOPIC_PROVIDER_NAMES.join(", ")
                )));
            }
            if self.topic_chain[..i].contains(name) {
                return Err(WebBabyError::config(format!(
                    "topic provider '{name}' is listed twice"
                )));
            }
        }
        Ok(())
    }
}

fn default_recipe_api_url() -> Url {
    Url::parse("https://www.themealdb.com/api/json/v1/1/").expect("valid default URL")
}
fn default_instant_answer_url() -> Url {
    Url::parse("https://api.duckduckgo.com/").expect("valid default URL")
}
fn default_encyclopedia_url() -> Url {
    Url::parse("https://en.wikipedia.org/api/rest_v1/").expect("valid default URL")
}
fn default_api_timeout() -> u64 {
    10
}
fn default_proxy_timeout() -> u64 {
    20
}
fn default_topic_chain() -> Vec<String> {
    TOPIC_PROVIDER_NAMES.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.webbaby/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WebBabyError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.webbaby/webbaby.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WebBabyError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| WebBabyError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.providers.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WebBabyError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WebBabyError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WebBabyError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
