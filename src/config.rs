/// Configuration management for the account service
use crate::error::{PlatformError, PlatformResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub authentication: AuthConfig,
    pub profile: ProfileConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub account_db: PathBuf,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued session tokens, in days
    pub token_ttl_days: i64,
    /// Account ids granted admin permission (comma-separated in the environment)
    pub admin_ids: Vec<String>,
    /// Argon2id iteration count
    pub password_hash_cost: u32,
}

/// Self-service profile edit configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub cooldown_days: i64,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
pub const DEFAULT_COOLDOWN_DAYS: i64 = 7;
pub const DEFAULT_PASSWORD_HASH_COST: u32 = 2;
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;
pub const MAX_COOLDOWN_DAYS: i64 = 365;
pub const DEFAULT_LOG_FILTER: &str = "platform_accounts=debug,tower_http=debug";

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> PlatformResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("PLATFORM_HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let port = env::var("PLATFORM_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| PlatformError::Validation("Invalid port number".to_string()))?;
        let version = env::var("PLATFORM_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        let data_directory: PathBuf = env::var("PLATFORM_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let account_db = env::var("PLATFORM_ACCOUNT_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("accounts.sqlite"));

        let jwt_secret = env::var("PLATFORM_JWT_SECRET")
            .map_err(|_| PlatformError::Validation("JWT secret required".to_string()))?;
        let token_ttl_days = parse_or_default(
            "PLATFORM_TOKEN_TTL_DAYS",
            env::var("PLATFORM_TOKEN_TTL_DAYS").ok(),
            DEFAULT_TOKEN_TTL_DAYS,
        )?;
        let admin_ids = parse_id_list(&env::var("PLATFORM_ADMIN_IDS").unwrap_or_default());
        let password_hash_cost = parse_or_default(
            "PLATFORM_PASSWORD_HASH_COST",
            env::var("PLATFORM_PASSWORD_HASH_COST").ok(),
            DEFAULT_PASSWORD_HASH_COST,
        )?;

        let cooldown_days = parse_or_default(
            "PLATFORM_PROFILE_COOLDOWN_DAYS",
            env::var("PLATFORM_PROFILE_COOLDOWN_DAYS").ok(),
            DEFAULT_COOLDOWN_DAYS,
        )?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        let log_format = match env::var("PLATFORM_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version,
            },
            storage: StorageConfig {
                data_directory,
                account_db,
            },
            authentication: AuthConfig {
                jwt_secret,
                token_ttl_days,
                admin_ids,
                password_hash_cost,
            },
            profile: ProfileConfig { cooldown_days },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> PlatformResult<()> {
        if self.service.hostname.is_empty() {
            return Err(PlatformError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.authentication.jwt_secret.len() < 32 {
            return Err(PlatformError::Validation(
                "JWT secret must be at least 32 characters".to_string(),
            ));
        }

        if self.authentication.admin_ids.is_empty() {
            return Err(PlatformError::Validation(
                "At least one admin id must be configured".to_string(),
            ));
        }

        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.authentication.token_ttl_days) {
            return Err(PlatformError::Validation(format!(
                "Token TTL must be between 1 and {} days",
                MAX_TOKEN_TTL_DAYS
            )));
        }

        if self.authentication.password_hash_cost == 0 {
            return Err(PlatformError::Validation(
                "Password hash cost must be at least 1".to_string(),
            ));
        }

        if !(0..=MAX_COOLDOWN_DAYS).contains(&self.profile.cooldown_days) {
            return Err(PlatformError::Validation(format!(
                "Profile cooldown must be between 0 and {} days",
                MAX_COOLDOWN_DAYS
            )));
        }

        Ok(())
    }
}

/// Parse an optional environment value; unset falls back to `default`,
/// anything unparseable is rejected
fn parse_or_default<T: FromStr>(name: &str, raw: Option<String>, default: T) -> PlatformResult<T> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| PlatformError::Validation(format!("Invalid value for {}: {:?}", name, value))),
    }
}

/// Split a comma-separated id list, dropping blanks
fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        service: ServiceConfig {
            hostname: "localhost".to_string(),
            port: 3000,
            version: "0.1.0".to_string(),
        },
        storage: StorageConfig {
            data_directory: PathBuf::from("./data"),
            account_db: PathBuf::from(":memory:"),
        },
        authentication: AuthConfig {
            jwt_secret: "test-secret-key-for-testing-only-0123".to_string(),
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            admin_ids: vec!["admin-account-id".to_string()],
            password_hash_cost: 1,
        },
        profile: ProfileConfig {
            cooldown_days: DEFAULT_COOLDOWN_DAYS,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        },
    }
}
