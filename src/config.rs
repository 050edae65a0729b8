use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TranslateError};
use crate::services::translation_cache::CorruptStorePolicy;

pub const CONFIG_ENV: &str = "LINGUA_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "lingua.json";

fn default_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Catalog JSON file. The bundled table is used when unset.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Cache root. Without one, requests are only cached when they name a
    /// directory themselves.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub corrupt_store: CorruptStorePolicy,

    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Config {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)
            .map_err(|e| TranslateError::Config(format!("{}: {e}", path.display())))?;

        serde_json::from_str(&data).map_err(|e| TranslateError::Config(format!("{}: {e}", path.display())))
    }

    /// Path named by `LINGUA_CONFIG`, else `lingua.json` in the working directory.
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}
