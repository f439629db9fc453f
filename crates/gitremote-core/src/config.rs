//! Runtime settings.
//!
//! Values come from environment variables; command-line flags override them.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::alias::DEFAULT_SSH_TIMEOUT;
use crate::errors::ConfigError;

/// Explicit ssh program to use for alias resolution.
pub const ENV_SSH: &str = "GITREMOTE_SSH";
/// Timeout for one `ssh -G` run, in milliseconds.
pub const ENV_SSH_TIMEOUT_MS: &str = "GITREMOTE_SSH_TIMEOUT_MS";
/// Set to `1` or `true` to skip SSH alias resolution.
pub const ENV_NO_ALIAS: &str = "GITREMOTE_NO_ALIAS";
/// Maximum number of alias lookups in flight during one parse.
pub const ENV_MAX_RESOLUTIONS: &str = "GITREMOTE_MAX_RESOLUTIONS";

/// Default number of concurrent alias lookups.
pub const DEFAULT_MAX_CONCURRENT_RESOLUTIONS: usize = 8;

/// Settings for parsing and alias resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// ssh program override; `None` means look up `ssh` in `PATH`.
    pub ssh_program: Option<PathBuf>,
    /// Upper bound for one `ssh -G` run.
    pub ssh_timeout: Duration,
    /// Whether scp-style hosts go through `ssh -G`.
    pub resolve_aliases: bool,
    /// Maximum number of alias lookups in flight during one parse.
    pub max_concurrent_resolutions: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ssh_program: None,
            ssh_timeout: DEFAULT_SSH_TIMEOUT,
            resolve_aliases: true,
            max_concurrent_resolutions: DEFAULT_MAX_CONCURRENT_RESOLUTIONS,
        }
    }
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut settings = Self::default();

        if let Some(program) = lookup(ENV_SSH).filter(|v| !v.trim().is_empty()) {
            settings.ssh_program = Some(PathBuf::from(program.trim()));
        }

        if let Some(raw) = lookup(ENV_SSH_TIMEOUT_MS) {
            let millis: u64 = parse_positive(ENV_SSH_TIMEOUT_MS, &raw)?;
            settings.ssh_timeout = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_NO_ALIAS) {
            settings.resolve_aliases = !parse_flag(ENV_NO_ALIAS, &raw)?;
        }

        if let Some(raw) = lookup(ENV_MAX_RESOLUTIONS) {
            settings.max_concurrent_resolutions = parse_positive(ENV_MAX_RESOLUTIONS, &raw)?;
        }

        Ok(settings)
    }
}

fn parse_positive<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
