use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub fcm: FcmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    /// Falls back to the project in the service account key when unset
    pub project_id: Option<String>,
    pub service_account_path: String,
    /// Overrides the FCM base URL (emulators)
    pub endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::Missing(name));
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Config {
            app: AppConfig {
                env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
                port: parse_or("APP_PORT", lookup("APP_PORT"), 8080)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    lookup("DATABASE_MAX_CONNECTIONS"),
                    5,
                )?,
                acquire_timeout_secs: parse_or(
                    "DATABASE_ACQUIRE_TIMEOUT_SECS",
                    lookup("DATABASE_ACQUIRE_TIMEOUT_SECS"),
                    10,
                )?,
            },
            fcm: FcmConfig {
                project_id: optional("FCM_PROJECT_ID"),
                service_account_path: required("FCM_SERVICE_ACCOUNT_PATH")?,
                endpoint: optional("FCM_ENDPOINT"),
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/chat"),
            ("FCM_SERVICE_ACCOUNT_PATH", "/secrets/fcm.json"),
        ]))
        .unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.port, 8080);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.fcm.project_id, None);
        assert_eq!(config.fcm.endpoint, None);
    }

    #[test]
    fn test_missing_database_url() {
        let result = Config::from_lookup(lookup_from(&[(
            "FCM_SERVICE_ACCOUNT_PATH",
            "/secrets/fcm.json",
        )]));
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/chat"),
            ("FCM_SERVICE_ACCOUNT_PATH", "/secrets/fcm.json"),
            ("APP_PORT", "eighty"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "APP_PORT", .. })
        ));
    }

    #[test]
    fn test_blank_optional_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/chat"),
            ("FCM_SERVICE_ACCOUNT_PATH", "/secrets/fcm.json"),
            ("FCM_PROJECT_ID", "chat-app"),
            ("FCM_ENDPOINT", "  "),
        ]))
        .unwrap();

        assert_eq!(config.fcm.project_id.as_deref(), Some("chat-app"));
        assert_eq!(config.fcm.endpoint, None);
    }
}
