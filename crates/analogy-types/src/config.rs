//! Configuration loading for vector-analogies.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/vector-analogies/config.toml.
//! Service endpoints are always injected from here; nothing downstream
//! compiles in a URL.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::convention::SignConvention;
use crate::error::AnalogyError;

/// Resolved URLs of the two service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// GET endpoint taking a `q` query parameter
    pub search: String,
    /// POST endpoint taking `{"vector": [...]}`
    pub nearest: String,
}

/// Search service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Shared prefix of the deployed endpoints
    #[serde(default = "default_endpoint_base")]
    pub endpoint_base: String,

    /// Deployment environment suffix (e.g. "dev"); production when unset
    #[serde(default)]
    pub environment: Option<String>,

    /// Host suffix appended after the function name
    #[serde(default = "default_host_suffix")]
    pub host_suffix: String,

    /// Function name of the text search endpoint
    #[serde(default = "default_search_function")]
    pub search_function: String,

    /// Function name of the nearest-vector endpoint
    #[serde(default = "default_nearest_function")]
    pub nearest_function: String,

    /// Full URL override for search
    #[serde(default)]
    pub search_url: Option<String>,

    /// Full URL override for nearest
    #[serde(default)]
    pub nearest_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint_base() -> String {
    "https://charles-modal-labs--modal-weaviate".to_string()
}

fn default_host_suffix() -> String {
    ".modal.run".to_string()
}

fn default_search_function() -> String {
    "query".to_string()
}

fn default_nearest_function() -> String {
    "vector".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            endpoint_base: default_endpoint_base(),
            environment: None,
            host_suffix: default_host_suffix(),
            search_function: default_search_function(),
            nearest_function: default_nearest_function(),
            search_url: None,
            nearest_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceSettings {
    /// Build the URL of a deployed function.
    ///
    /// `{endpoint_base}-{function}[-{environment}]{host_suffix}`
    pub fn function_url(&self, function: &str) -> String {
        let env_suffix = match self.environment.as_deref() {
            Some(env) if !env.is_empty() => format!("-{}", env),
            _ => String::new(),
        };
        format!(
            "{}-{}{}{}",
            self.endpoint_base.trim_end_matches('/'),
            function,
            env_suffix,
            self.host_suffix
        )
    }

    /// Resolve both endpoints, honouring explicit URL overrides.
    pub fn endpoints(&self) -> ServiceEndpoints {
        ServiceEndpoints {
            search: self
                .search_url
                .clone()
                .unwrap_or_else(|| self.function_url(&self.search_function)),
            nearest: self
                .nearest_url
                .clone()
                .unwrap_or_else(|| self.function_url(&self.nearest_function)),
        }
    }
}

/// Incremental search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Quiet period after the last keystroke before a search fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Analogy resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalogySettings {
    /// How operand vectors are combined
    #[serde(default)]
    pub sign_convention: SignConvention,
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Search service endpoints
    #[serde(default)]
    pub service: ServiceSettings,

    /// Keystroke debouncing
    #[serde(default)]
    pub search: SearchSettings,

    /// Vector arithmetic
    #[serde(default)]
    pub analogy: AnalogySettings,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            search: SearchSettings::default(),
            analogy: AnalogySettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/vector-analogies/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (ANALOGY_*, nested keys joined by `__`)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, AnalogyError> {
        let config_dir = ProjectDirs::from("", "", "vector-analogies")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("service.endpoint_base", default_endpoint_base())
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default("service.host_suffix", default_host_suffix())
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default("service.search_function", default_search_function())
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default("service.nearest_function", default_nearest_function())
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default("service.timeout_secs", default_timeout_secs() as i64)
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default("search.debounce_ms", default_debounce_ms() as i64)
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default(
                "analogy.sign_convention",
                SignConvention::default().to_string(),
            )
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| AnalogyError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: ANALOGY_SERVICE__ENDPOINT_BASE, ANALOGY_SEARCH__DEBOUNCE_MS, ...
        builder = builder.add_source(
            Environment::with_prefix("ANALOGY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| AnalogyError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| AnalogyError::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), AnalogyError> {
        if self.search.debounce_ms == 0 {
            return Err(AnalogyError::Config(
                "search.debounce_ms must be > 0".to_string(),
            ));
        }
        if self.service.endpoint_base.trim().is_empty()
            && (self.service.search_url.is_none() || self.service.nearest_url.is_none())
        {
            return Err(AnalogyError::Config(
                "service.endpoint_base must be set unless both endpoint URLs are overridden"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Debounce window as a duration.
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search.debounce_ms)
    }
}
