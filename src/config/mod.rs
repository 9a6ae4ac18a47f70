//! Configuration management

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "FLOWGUARD_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "flowguard";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Forward every call to this service instead of the embedded store
    pub remote_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// Snapshot directory; in-memory only when unset
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_seed_demo")]
    pub seed_demo: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            seed_demo: default_seed_demo(),
        }
    }
}

fn default_seed_demo() -> bool {
    true
}

impl Config {
    /// Remote URL with blank values treated as unset.
    pub fn remote_url(&self) -> Option<&str> {
        self.backend
            .remote_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }
}

pub fn load_config() -> Result<Config> {
    let file = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let config = ::config::Config::builder()
        // Start with defaults
        .set_default("port", 3000)?
        .set_default("backend.timeout_secs", 10)?
        .set_default("store.seed_demo", true)?
        // Load from config file if it exists
        .add_source(::config::File::with_name(&file).required(false))
        // Override with environment variables (FLOWGUARD_PORT, FLOWGUARD_BACKEND__REMOTE_URL, etc.)
        .add_source(
            ::config::Environment::with_prefix("FLOWGUARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "FLOWGUARD_PORT",
        "FLOWGUARD_BACKEND__REMOTE_URL",
        "FLOWGUARD_BACKEND__TIMEOUT_SECS",
        "FLOWGUARD_STORE__DATA_DIR",
        "FLOWGUARD_STORE__SEED_DEMO",
        CONFIG_PATH_ENV,
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/flowguard-test");
        let config = load_config().unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend.timeout_secs, 10);
        assert!(config.remote_url().is_none());
        assert!(config.store.seed_demo);
        assert!(config.store.data_dir.is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var(CONFIG_PATH_ENV, "/nonexistent/flowguard-test");
        std::env::set_var("FLOWGUARD_PORT", "8080");
        std::env::set_var("FLOWGUARD_BACKEND__REMOTE_URL", "http://127.0.0.1:5000");
        std::env::set_var("FLOWGUARD_STORE__SEED_DEMO", "false");
        std::env::set_var("FLOWGUARD_STORE__DATA_DIR", "/tmp/flowguard");

        let config = load_config().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.remote_url(), Some("http://127.0.0.1:5000"));
        assert!(!config.store.seed_demo);
        assert_eq!(config.store.data_dir, Some(PathBuf::from("/tmp/flowguard")));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "port = 4100\n[backend]\nremote_url = \"  \"\ntimeout_secs = 3\n",
        )
        .unwrap();
        std::env::set_var(CONFIG_PATH_ENV, path.to_string_lossy().to_string());

        let config = load_config().unwrap();
        assert_eq!(config.port, 4100);
        assert_eq!(config.backend.timeout_secs, 3);
        // blank url means embedded
        assert!(config.remote_url().is_none());
        clear_env();
    }
}
