use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search?query=";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Runtime settings. Every field has a default, so an empty or missing
/// config file is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Query prefix; the URL-encoded search term is appended to it.
    pub endpoint: String,
    /// Term used when nothing has been persisted yet.
    pub default_term: String,
    /// Preference key holding the last search term.
    pub preference_key: String,
    /// How many recent searches to offer.
    pub recent_limit: usize,
    pub request_timeout_secs: u64,
    /// Drop responses that belong to anything but the latest request.
    pub fence_stale_responses: bool,
    /// Hide results whose title does not contain the typed term.
    pub live_title_filter: bool,
    /// Where the preference database lives. Defaults to `~/.hn_search`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_term: "React".to_string(),
            preference_key: "search".to_string(),
            recent_limit: 5,
            request_timeout_secs: 10,
            fence_stale_responses: true,
            live_title_filter: false,
            data_dir: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("parsing config TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would make every fetch fail.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    /// Loads `path` when given, else `<data_dir>/config.toml` when it
    /// exists, else the defaults.
    pub fn load(path: Option<&Path>, data_dir: &Path) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }
        let fallback = data_dir.join(CONFIG_FILE_NAME);
        if fallback.exists() {
            return Self::load_from(&fallback);
        }
        Ok(Self::default())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
