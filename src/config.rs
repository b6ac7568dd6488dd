//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default primary database location.
pub const DEFAULT_DATABASE_URL: &str = "./data/personal-ai.db";

/// Default hosted compression endpoint.
pub const DEFAULT_SCALEDOWN_URL: &str = "https://api.scaledown.ai/v1/compress";

/// Application configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub api_host: String,
    pub api_port: u16,
    /// Shared secret for mutating requests. `None` disables the check.
    pub api_key: Option<SecretString>,
    /// Secret for admin and export endpoints. `None` disables the check.
    pub admin_api_key: Option<SecretString>,
    pub cors_origins: Vec<String>,
    pub ollama_base_url: String,
    pub ollama_model: String,
    /// libSQL location: file path, `:memory:`, or a `libsql://` / `https://` URL.
    /// `None` runs every store on its in-process fallback.
    pub database_url: Option<String>,
    pub database_auth_token: Option<SecretString>,
    /// Upper bound on every primary backend call.
    pub backend_timeout: Duration,
    pub neo4j_http_url: String,
    pub neo4j_user: String,
    pub neo4j_password: SecretString,
    pub nylas_configured: bool,
    pub plaid_configured: bool,
    pub scaledown_api_key: Option<SecretString>,
    pub scaledown_url: String,
}

const DEFAULT_API_PORT: u16 = 8000;
const DEFAULT_BACKEND_TIMEOUT_MS: u64 = 1500;

impl AppConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_port = parse_or(&lookup, "API_PORT", DEFAULT_API_PORT)?;
        let backend_timeout_ms =
            parse_or(&lookup, "BACKEND_TIMEOUT_MS", DEFAULT_BACKEND_TIMEOUT_MS)?;
        Ok(Self::assemble(
            &lookup,
            api_port,
            Duration::from_millis(backend_timeout_ms),
        ))
    }

    /// Configuration for tests: no secrets, no primary database, no external keys.
    pub fn for_tests() -> Self {
        Self::assemble(
            &|key: &str| (key == "DATABASE_URL").then(String::new),
            DEFAULT_API_PORT,
            Duration::from_millis(DEFAULT_BACKEND_TIMEOUT_MS),
        )
    }

    fn assemble(
        lookup: &dyn Fn(&str) -> Option<String>,
        api_port: u16,
        backend_timeout: Duration,
    ) -> Self {
        let get = |key: &str| non_empty(lookup, key);
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let secret = |key: &str| get(key).map(SecretString::from);

        let cors_origins = get_or("CORS_ORIGINS", "http://localhost:8501,http://127.0.0.1:8501")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // An explicitly empty DATABASE_URL means "no primary backend".
        let database_url = match lookup("DATABASE_URL") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw.trim().to_string()),
            None => Some(DEFAULT_DATABASE_URL.to_string()),
        };

        Self {
            app_name: get_or("APP_NAME", "Personal AI Ecosystem"),
            app_env: get_or("APP_ENV", "local"),
            api_host: get_or("API_HOST", "0.0.0.0"),
            api_port,
            api_key: secret("API_KEY"),
            admin_api_key: secret("ADMIN_API_KEY"),
            cors_origins,
            ollama_base_url: get_or("OLLAMA_BASE_URL", "http://localhost:11434"),
            ollama_model: get_or("OLLAMA_MODEL", "llama3.1:8b"),
            database_url,
            database_auth_token: secret("DATABASE_AUTH_TOKEN"),
            backend_timeout,
            neo4j_http_url: get_or("NEO4J_HTTP_URL", "http://localhost:7474"),
            neo4j_user: get_or("NEO4J_USER", "neo4j"),
            neo4j_password: SecretString::from(get_or("NEO4J_PASSWORD", "changeme")),
            nylas_configured: get("NYLAS_CLIENT_ID").is_some()
                && get("NYLAS_CLIENT_SECRET").is_some(),
            plaid_configured: get("PLAID_CLIENT_ID").is_some() && get("PLAID_SECRET").is_some(),
            scaledown_api_key: secret("SCALEDOWN_API_KEY"),
            scaledown_url: get_or("SCALEDOWN_URL", DEFAULT_SCALEDOWN_URL),
        }
    }
}

fn non_empty(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.into(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
