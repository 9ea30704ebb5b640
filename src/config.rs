use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CareLink";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DB_ENV: &str = "CARELINK_DB";
pub const BIND_ENV: &str = "CARELINK_BIND";
pub const SEED_ENV: &str = "CARELINK_SEED";
pub const ADMIN_PASSWORD_ENV: &str = "CARELINK_ADMIN_PASSWORD";
pub const DOCTOR_PASSWORD_ENV: &str = "CARELINK_DOCTOR_PASSWORD";

const DEFAULT_BIND: &str = "127.0.0.1:8600";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "carelink=info,carelink_lib=info"
}

/// Get the application data directory: ~/CareLink/, or ./CareLink when no
/// home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

pub fn default_db_path() -> PathBuf {
    app_data_dir().join("carelink.db")
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var} must be a boolean (1/0/true/false/yes/no), got {value}")]
    InvalidFlag { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Passwords given to the default admin and doctor accounts when seeding.
#[derive(Clone, PartialEq, Eq)]
pub struct SeedCredentials {
    pub admin_password: String,
    pub doctor_password: String,
}

impl Default for SeedCredentials {
    fn default() -> Self {
        Self {
            admin_password: "admin".into(),
            doctor_password: "doctor".into(),
        }
    }
}

impl std::fmt::Debug for SeedCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedCredentials").finish_non_exhaustive()
    }
}

/// Runtime settings for the portal server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub db_path: PathBuf,
    pub bind: SocketAddr,
    /// Insert default admin and doctor accounts into an empty store on start.
    pub seed_defaults: bool,
    pub seed_credentials: SeedCredentials,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind: SocketAddr::from(([127, 0, 0, 1], 8600)),
            seed_defaults: true,
            seed_credentials: SeedCredentials::default(),
        }
    }
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = match lookup(DB_ENV) {
            Some(raw) if raw.trim().is_empty() => return Err(ConfigError::Empty { var: DB_ENV }),
            Some(raw) => PathBuf::from(raw.trim()),
            None => default_db_path(),
        };

        let raw_bind = lookup(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = raw_bind
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind {
                var: BIND_ENV,
                value: raw_bind.clone(),
            })?;

        let seed_defaults = match lookup(SEED_ENV) {
            Some(raw) => parse_flag(SEED_ENV, &raw)?,
            None => true,
        };

        let defaults = SeedCredentials::default();
        let seed_credentials = SeedCredentials {
            admin_password: non_empty(ADMIN_PASSWORD_ENV, lookup(ADMIN_PASSWORD_ENV))?
                .unwrap_or(defaults.admin_password),
            doctor_password: non_empty(DOCTOR_PASSWORD_ENV, lookup(DOCTOR_PASSWORD_ENV))?
                .unwrap_or(defaults.doctor_password),
        };

        Ok(Self {
            db_path,
            bind,
            seed_defaults,
            seed_credentials,
        })
    }
}

fn non_empty(var: &'static str, raw: Option<String>) -> Result<Option<String>, ConfigError> {
    match raw {
        Some(value) if value.is_empty() => Err(ConfigError::Empty { var }),
        other => Ok(other),
    }
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: raw.to_string(),
        }),
    }
}
