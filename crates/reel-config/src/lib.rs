//! # reel-config
//!
//! Layered configuration loading for reel using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`REEL_*` prefix, `__` as separator)
//! 2. Project-level `.reel/config.toml`
//! 3. User-level `~/.config/reel/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `REEL_API__BASE_URL` -> `api.base_url`,
//! `REEL_POLLING__MAX_ATTEMPTS` -> `polling.max_attempts`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use reel_config::ReelConfig;
//!
//! let config = ReelConfig::load_with_dotenv().expect("config");
//! println!("polling {} every {:?}", config.api.base_url(), config.polling.base_interval());
//! ```

mod api;
mod error;
mod polling;
mod render;

pub use api::ApiConfig;
pub use error::ConfigError;
pub use polling::PollingConfig;
pub use render::{HistoryConfig, MAX_PAGE_SIZE, RenderConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReelConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl ReelConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".reel/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("REEL_").split("__"))
    }

    /// Check cross-field constraints that serde defaults cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url().is_empty() {
            return Err(ConfigError::invalid("api.base_url", "must not be empty"));
        }
        if self.api.request_timeout_secs == 0 || self.api.submit_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.request_timeout_secs",
                "timeouts must be greater than zero",
            ));
        }
        self.polling.validate()
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reel").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    /// Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
