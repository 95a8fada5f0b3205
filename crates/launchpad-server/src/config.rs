//! Configuration for the Launchpad process
//!
//! Values come from built-in defaults, an optional `launchpad.{toml,yaml,json}`
//! file and `LAUNCHPAD_*` environment variables, in increasing precedence.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use launchpad_core::{CoreError, CoreResult, ScheduleDefaults};
use launchpad_spacex::{RetryPolicy, SpaceXClientConfig, DEFAULT_SPACEX_API_URL};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "LAUNCHPAD";

/// Config file base name, without extension
pub const CONFIG_FILE: &str = "launchpad";

const LIST_KEYS: [&str; 2] = ["default_customers", "known_planets"];

/// Launchpad process configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    /// Store location, `memory://` or a `sqlite:` URL
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Base URL of the SpaceX API
    #[serde(default = "default_spacex_api_url")]
    pub spacex_api_url: String,

    /// Per-request timeout for the provider, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Total fetch attempts, including the first
    #[serde(default = "default_fetch_max_attempts")]
    pub fetch_max_attempts: u32,

    /// Delay before the first fetch retry, in milliseconds
    #[serde(default = "default_fetch_initial_backoff_ms")]
    pub fetch_initial_backoff_ms: u64,

    /// Customers attached to scheduled launches
    #[serde(default = "default_customers")]
    pub default_customers: Vec<String>,

    /// Planet names seeded into the catalog at startup
    #[serde(default)]
    pub known_planets: Vec<String>,

    /// Tracing filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_store_url() -> String {
    "memory://".to_string()
}

fn default_spacex_api_url() -> String {
    DEFAULT_SPACEX_API_URL.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_fetch_max_attempts() -> u32 {
    3
}

fn default_fetch_initial_backoff_ms() -> u64 {
    500
}

fn default_customers() -> Vec<String> {
    ScheduleDefaults::default().customers
}

fn default_log_filter() -> String {
    "info,launchpad=debug".to_string()
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            store_url: default_store_url(),
            spacex_api_url: default_spacex_api_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            fetch_max_attempts: default_fetch_max_attempts(),
            fetch_initial_backoff_ms: default_fetch_initial_backoff_ms(),
            default_customers: default_customers(),
            known_planets: Vec::new(),
            log_filter: default_log_filter(),
        }
    }
}

/// Which store implementation a URL selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// Process-local maps
    InMemory,
    /// SQLite database at the given URL
    Sqlite(String),
}

impl LaunchpadConfig {
    /// Load from the optional config file and the process environment
    pub fn load() -> CoreResult<Self> {
        Self::from_environment(Some(CONFIG_FILE), Self::environment())
    }

    fn environment() -> Environment {
        let env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",");
        LIST_KEYS
            .iter()
            .fold(env, |env, key| env.with_list_parse_key(key))
    }

    /// Load from an optional config file and the given environment source
    pub fn from_environment(file: Option<&str>, env: Environment) -> CoreResult<Self> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }

        let config: Self = builder
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| CoreError::ConfigurationError(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values the process cannot start with
    pub fn validate(&self) -> CoreResult<()> {
        self.store_kind()?;

        if self.fetch_max_attempts == 0 {
            return Err(CoreError::ConfigurationError(
                "fetch_max_attempts must be at least 1".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(CoreError::ConfigurationError(
                "fetch_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Store implementation selected by `store_url`
    pub fn store_kind(&self) -> CoreResult<StoreKind> {
        let url = self.store_url.trim();
        if url.starts_with("memory:") {
            Ok(StoreKind::InMemory)
        } else if url.starts_with("sqlite:") {
            Ok(StoreKind::Sqlite(url.to_string()))
        } else {
            Err(CoreError::ConfigurationError(format!(
                "Unsupported store_url: {}",
                self.store_url
            )))
        }
    }

    /// Provider client settings
    pub fn spacex_client_config(&self) -> SpaceXClientConfig {
        SpaceXClientConfig {
            base_url: self.spacex_api_url.clone(),
            timeout_secs: self.fetch_timeout_secs,
            retry: RetryPolicy {
                max_attempts: self.fetch_max_attempts,
                initial_delay: Duration::from_millis(self.fetch_initial_backoff_ms),
                ..RetryPolicy::default()
            },
        }
    }

    /// Defaults applied to scheduled launches
    pub fn schedule_defaults(&self) -> ScheduleDefaults {
        ScheduleDefaults {
            customers: self.default_customers.clone(),
        }
    }
}
