use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::DEFAULT_DEBOUNCE;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSection {
    pub endpoint: Option<String>,
    pub network: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WalletSection {
    pub rpc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuerySection {
    pub debounce_ms: Option<u64>,
    pub metadata_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderSection,

    #[serde(default)]
    pub wallet: WalletSection,

    #[serde(default)]
    pub query: QuerySection,
}

impl QuerySection {
    pub fn debounce(&self) -> Duration {
        self.debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_DEBOUNCE)
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    parse(&content)
}

/// Malformed files fall back to defaults
pub fn parse(content: &str) -> Config {
    match toml::from_str::<Config>(content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("ignoring malformed config: {}", err);
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ERC20_INDEXER_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("erc20-indexer").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("erc20-indexer").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "erc20-indexer", "erc20-indexer")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("erc20-indexer"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("erc20-indexer"));
    }
    directories::ProjectDirs::from("io", "erc20-indexer", "erc20-indexer")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ERC20_INDEXER_LOG").map(PathBuf::from) {
        return Some(path);
    }
    data_dir().map(|dir| dir.join("erc20-indexer.log"))
}
