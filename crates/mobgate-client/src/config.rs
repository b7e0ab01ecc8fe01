use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the MobSF base URL.
pub const BASE_URL_ENV: &str = "MOBSF_URL";
/// Environment variable overriding the MobSF API key.
pub const API_KEY_ENV: &str = "MOBSF_API_KEY";
/// Environment variable overriding the completion poll delay, in seconds.
pub const POLL_DELAY_ENV: &str = "MOBSF_POLL_DELAY_SECONDS";
/// Environment variable overriding the completion poll timeout, in seconds.
pub const POLL_TIMEOUT_ENV: &str = "MOBSF_POLL_TIMEOUT_SECONDS";

/// Base URL of a local MobSF instance.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// MobSF's out-of-the-box API key.
pub const DEFAULT_API_KEY: &str = "mobsf_default_api_key";
/// Default delay between completion polls, in seconds.
pub const DEFAULT_POLL_DELAY_SECS: u64 = 5;
/// Default completion poll timeout, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 600;
/// Default readiness wait, in seconds.
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 120;
/// Default delay between readiness probes, in seconds.
pub const DEFAULT_READY_INTERVAL_SECS: u64 = 3;

/// Settings for one audit run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    /// MobSF base URL, without a trailing slash.
    pub base_url: String,
    /// Value sent in the `Authorization` header.
    pub api_key: String,
    /// Delay between completion polls.
    pub poll_delay: Duration,
    /// Upper bound on the completion poll.
    pub poll_timeout: Duration,
    /// Upper bound on the readiness probe.
    pub ready_timeout: Duration,
    /// Delay between readiness probes.
    pub ready_interval: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
            poll_delay: Duration::from_secs(DEFAULT_POLL_DELAY_SECS),
            poll_timeout: Duration::from_secs(DEFAULT_POLL_TIMEOUT_SECS),
            ready_timeout: Duration::from_secs(DEFAULT_READY_TIMEOUT_SECS),
            ready_interval: Duration::from_secs(DEFAULT_READY_INTERVAL_SECS),
        }
    }
}

impl AuditConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to its value.
    ///
    /// Each option is defaulted independently. Invalid poll overrides fall
    /// back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = non_empty(BASE_URL_ENV, lookup(BASE_URL_ENV))
            .map(|url| trim_base_url(&url))
            .unwrap_or(defaults.base_url);
        let api_key = non_empty(API_KEY_ENV, lookup(API_KEY_ENV)).unwrap_or(defaults.api_key);

        let poll_delay = positive_secs(POLL_DELAY_ENV, lookup(POLL_DELAY_ENV), DEFAULT_POLL_DELAY_SECS);
        let poll_timeout = positive_secs(
            POLL_TIMEOUT_ENV,
            lookup(POLL_TIMEOUT_ENV),
            DEFAULT_POLL_TIMEOUT_SECS,
        );

        Self {
            base_url,
            api_key,
            poll_delay: Duration::from_secs(poll_delay),
            poll_timeout: Duration::from_secs(poll_timeout),
            ..defaults
        }
    }

    /// Replaces the base URL, dropping any trailing slash.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    /// Replaces the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn non_empty(name: &str, raw: Option<String>) -> Option<String> {
    match raw {
        Some(value) if value.trim().is_empty() => {
            warn!(variable = name, "Ignoring empty environment override");
            None
        }
        other => other,
    }
}

/// Parses a positive whole number of seconds, falling back to `default`.
pub fn positive_secs(name: &str, raw: Option<String>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 => parsed.unsigned_abs(),
        Ok(parsed) => {
            warn!(
                "{name:?} must be a positive integer; received {parsed}. Using default {default}."
            );
            default
        }
        Err(_) => {
            warn!(
                "Could not parse {name:?} value {raw:?} as an integer; using default {default}."
            );
            default
        }
    }
}
