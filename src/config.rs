//! Runtime configuration from `VITALTHROB_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::DEFAULT_BASE_URL;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_FILE: &str = "vitalthrob.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "file" => Some(Self::File),
            "stdout" => Some(Self::Stdout),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the prediction service
    pub predictor_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Directory receiving exports and printed reports
    pub export_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Variables that were set but unusable, reported once logging is up
    pub warnings: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            predictor_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            export_dir: PathBuf::from("."),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            warnings: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Unset or empty variables keep their defaults; unparsable ones do too,
    /// and are listed in `warnings`. Nothing is logged here because the
    /// subscriber is usually not installed yet; see [`AppConfig::log_warnings`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("VITALTHROB_PREDICTOR_URL") {
            config.predictor_url = url.trim().to_string();
        }

        if let Some(raw) = get("VITALTHROB_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => config.warnings.push(format!(
                    "Ignoring VITALTHROB_TIMEOUT_SECS={raw:?}, using {DEFAULT_TIMEOUT_SECS}s"
                )),
            }
        }

        if let Some(dir) = get("VITALTHROB_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        if let Some(raw) = get("VITALTHROB_LOG_MODE") {
            match LogMode::parse(&raw) {
                Some(mode) => config.log_mode = mode,
                None => config
                    .warnings
                    .push(format!("Ignoring VITALTHROB_LOG_MODE={raw:?}, using auto")),
            }
        }

        if let Some(file) = get("VITALTHROB_LOG_FILE") {
            config.log_file = PathBuf::from(file);
        }

        config
    }

    /// Emit the collected fallback warnings through `tracing`.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}
