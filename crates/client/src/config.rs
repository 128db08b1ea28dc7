use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API origin, without the `/api/v1` suffix.
    pub api_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                  |
    /// |-----------------------|--------------------------|
    /// | `THREADMARK_API_URL`  | `http://localhost:3000`  |
    /// | `CLIENT_TIMEOUT_SECS` | `60`                     |
    pub fn from_env() -> Self {
        let api_url = std::env::var("THREADMARK_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs: u64 = std::env::var("CLIENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("CLIENT_TIMEOUT_SECS must be a valid u64");

        Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}
