//! Runtime configuration.
//!
//! Sources, lowest precedence first: built-in defaults, `.env` (via `dotenvy`),
//! process environment, CLI flags.
//!
//! | variable            | default                  |
//! |---------------------|--------------------------|
//! | `UCONV_DB`          | `uconv.db`               |
//! | `UCONV_GUEST_LIMIT` | `5`                      |
//! | `UCONV_LOG`         | `unit_converter=info`    |
//! | `UCONV_LOG_FILE`    | `uconv.log` (TUI only)   |

use std::path::PathBuf;

use crate::cli::GlobalArgs;
use crate::error::AppError;
use crate::gate::DEFAULT_GUEST_LIMIT;

pub const ENV_DB: &str = "UCONV_DB";
pub const ENV_GUEST_LIMIT: &str = "UCONV_GUEST_LIMIT";
pub const ENV_LOG: &str = "UCONV_LOG";
pub const ENV_LOG_FILE: &str = "UCONV_LOG_FILE";

pub const DEFAULT_DB_PATH: &str = "uconv.db";
pub const DEFAULT_LOG_FILTER: &str = "unit_converter=info";
pub const DEFAULT_LOG_FILE: &str = "uconv.log";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub guest_limit: u32,
    pub log_filter: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            guest_limit: DEFAULT_GUEST_LIMIT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl AppConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(ENV_DB)) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = non_empty(lookup(ENV_GUEST_LIMIT)) {
            config.guest_limit = raw.trim().parse().map_err(|e| {
                AppError::usage(format!("Invalid {ENV_GUEST_LIMIT} '{raw}': {e}"))
            })?;
        }
        if let Some(filter) = non_empty(lookup(ENV_LOG)) {
            config.log_filter = filter;
        }
        if let Some(path) = non_empty(lookup(ENV_LOG_FILE)) {
            config.log_file = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Apply CLI flags on top of the environment.
    pub fn with_overrides(mut self, args: &GlobalArgs) -> Self {
        if let Some(path) = &args.db {
            self.db_path = path.clone();
        }
        if let Some(limit) = args.guest_limit {
            self.guest_limit = limit;
        }
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.guest_limit, 5);
    }

    #[test]
    fn environment_values_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB, "/tmp/x.db"),
            (ENV_GUEST_LIMIT, " 3 "),
            (ENV_LOG, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.guest_limit, 3);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn invalid_guest_limit_is_a_usage_error() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_GUEST_LIMIT, "five")])).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
    }

    #[test]
    fn cli_flags_override_environment() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_GUEST_LIMIT, "3")]))
            .unwrap()
            .with_overrides(&GlobalArgs {
                db: Some(PathBuf::from("cli.db")),
                guest_limit: Some(10),
            });
        assert_eq!(config.db_path, PathBuf::from("cli.db"));
        assert_eq!(config.guest_limit, 10);
    }
}
