use std::str::FromStr;

use threadmark_storage::StorageConfig;

/// Settings for the order and screenshot API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Storefront and admin origins allowed to call the API.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long to wait for the database pool to drain on shutdown.
    pub shutdown_timeout_secs: u64,
    /// Largest accepted request body. Batch screenshot uploads carry up to
    /// four base64 PNGs per item, so this is far above axum's default.
    pub max_body_bytes: usize,
    pub storage: StorageConfig,
}

impl ServerConfig {
    /// Read configuration from the environment.
    ///
    /// | Env Var                 | Default                                          |
    /// |-------------------------|--------------------------------------------------|
    /// | `HOST`                  | `0.0.0.0`                                        |
    /// | `PORT`                  | `3000`                                           |
    /// | `CORS_ORIGINS`          | `http://localhost:5173,http://localhost:5174`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `60`                                             |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                                             |
    /// | `MAX_BODY_MB`           | `64`                                             |
    ///
    /// Storage variables are documented on [`StorageConfig::from_env`].
    /// Panics on values that do not parse.
    pub fn from_env() -> Self {
        let max_body_mb: usize = parsed_var("MAX_BODY_MB", 64);

        Self {
            host: var_or("HOST", "0.0.0.0"),
            port: parsed_var("PORT", 3000),
            cors_origins: split_origins(&var_or(
                "CORS_ORIGINS",
                "http://localhost:5173,http://localhost:5174",
            )),
            request_timeout_secs: parsed_var("REQUEST_TIMEOUT_SECS", 60),
            shutdown_timeout_secs: parsed_var("SHUTDOWN_TIMEOUT_SECS", 30),
            max_body_bytes: max_body_mb * 1024 * 1024,
            storage: StorageConfig::from_env(),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_var<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} has invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            split_origins(" https://shop.example.com , ,https://admin.example.com"),
            vec!["https://shop.example.com", "https://admin.example.com"]
        );
    }

    #[test]
    fn unset_variable_uses_default() {
        let value: u16 = parsed_var("THREADMARK_TEST_UNSET_PORT_VAR", 4321);
        assert_eq!(value, 4321);
    }
}
