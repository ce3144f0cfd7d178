use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins of the editor front end, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Let any origin read `/api/viewer/*` so published maps can be embedded
    /// on agents' own sites.
    pub viewer_any_origin: bool,
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup (closing the pool).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. When absent the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `VIEWER_ALLOW_ANY_ORIGIN` | `true`                     |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `DATABASE_URL`            | unset (in-memory store)    |
    /// | `JWT_SECRET`              | required                   |
    ///
    /// # Panics
    ///
    /// Panics on a value that does not parse, or a missing `JWT_SECRET`.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed_env("PORT", 3000),
            cors_origins: split_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            viewer_any_origin: parsed_env("VIEWER_ALLOW_ANY_ORIGIN", true),
            request_timeout_secs: parsed_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parsed_env("SHUTDOWN_TIMEOUT_SECS", 30),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            jwt: JwtConfig::from_env(),
        }
    }
}

fn parsed_env<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
