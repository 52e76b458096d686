// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`ServerConfig`] loaded from
//! them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5001` |
//! | `DATA_DIR` | Root directory of the document store | `./data` |
//! | `JWT_SECRET` | HS256 secret for bearer tokens | Required in production |
//! | `TOKEN_TTL_DAYS` | Lifetime of issued tokens | `30` |
//! | `APP_ENV` | `production` hides error details | `development` |
//! | `ENABLE_DEV_ROUTES` | Mount `/api/seed` and `/api/debug/db` | `true` outside production |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the document store root.
///
/// Users and expenses are written as one JSON file each under this directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const TOKEN_TTL_DAYS_ENV: &str = "TOKEN_TTL_DAYS";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const DEV_ROUTES_ENV: &str = "ENABLE_DEV_ROUTES";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Where the client core reaches the backend unless told otherwise.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/";

/// Only used outside production, where a missing `JWT_SECRET` is tolerated.
const DEVELOPMENT_JWT_SECRET: &str = "savekaro-development-secret";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} must be set when APP_ENV=production")]
    Missing(&'static str),
}

/// Deployment mode. Production hides internal error detail from responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn is_production(self) -> bool {
        self == AppEnv::Production
    }
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub app_env: AppEnv,
    pub dev_routes: bool,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = match lookup(APP_ENV_ENV).as_deref() {
            Some("production") => AppEnv::Production,
            _ => AppEnv::Development,
        };

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let token_ttl_days = match lookup(TOKEN_TTL_DAYS_ENV) {
            Some(raw) => match raw.parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: TOKEN_TTL_DAYS_ENV,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_DAYS,
        };

        let jwt_secret = match lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if app_env.is_production() => return Err(ConfigError::Missing(JWT_SECRET_ENV)),
            None => DEVELOPMENT_JWT_SECRET.to_string(),
        };

        let dev_routes = match lookup(DEV_ROUTES_ENV) {
            Some(raw) => matches!(raw.as_str(), "1" | "true" | "yes"),
            None => !app_env.is_production(),
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: lookup(DATA_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            jwt_secret,
            token_ttl_days,
            app_env,
            dev_routes,
            log_format,
        })
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }

    /// Parse the bind address from host and port.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ConfigError::Invalid {
            name: HOST_ENV,
            value: raw,
        })
    }
}

/// Client-side settings: where the backend lives and where guest data is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Always ends with `/` so relative API paths join under it.
    pub api_base_url: String,
    /// redb file holding the local slots.
    pub local_db_path: PathBuf,
}

impl ClientConfig {
    pub fn new(local_db_path: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            local_db_path: local_db_path.into(),
        }
    }

    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::Invalid {
            name: "api_base_url",
            value: raw.to_string(),
        };
        let mut url = Url::parse(raw).map_err(|_| invalid())?;
        if url.cannot_be_a_base() {
            return Err(invalid());
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.api_base_url = url.into();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_in_development() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.token_ttl_days, 30);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.dev_routes);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.uses_development_secret());
    }

    #[test]
    fn production_requires_secret() {
        let result = ServerConfig::from_lookup(lookup_from(&[("APP_ENV", "production")]));
        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn production_disables_dev_routes_by_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();
        assert!(config.app_env.is_production());
        assert!(!config.dev_routes);
        assert!(!config.uses_development_secret());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = ServerConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "PORT", .. })));
    }

    #[test]
    fn bind_addr_combines_host_and_port() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8088"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8088");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn client_config_defaults_to_local_backend() {
        let config = ClientConfig::new("/tmp/savekaro.redb");
        assert_eq!(config.api_base_url, "http://localhost:5001/");
    }

    #[test]
    fn client_base_url_gains_trailing_slash() {
        let config = ClientConfig::new("/tmp/savekaro.redb")
            .with_api_base_url("https://expenses.example.com/backend")
            .unwrap();
        assert_eq!(config.api_base_url, "https://expenses.example.com/backend/");

        assert!(ClientConfig::new("x").with_api_base_url("not a url").is_err());
    }
}
