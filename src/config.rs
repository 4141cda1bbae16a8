use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_API_URL: &str = "http://localhost:8000/api/v1";
const DEFAULT_MAX_BODY_SIZE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid backend URL '{url}': {source}")]
    InvalidBackendUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Backend URL must use http or https: {0}")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub backend_api_url: String,
    pub request_timeout_secs: u64,
    pub max_body_size_bytes: usize,
    pub render_cache_ttl_secs: u64,
    pub query_stale_time_secs: u64,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let config = Self {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            backend_api_url: env::var("BACKEND_API_URL")
                .unwrap_or_else(|_| DEFAULT_BACKEND_API_URL.to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            max_body_size_bytes: env::var("MAX_BODY_SIZE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE_BYTES),
            render_cache_ttl_secs: env::var("RENDER_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            query_stale_time_secs: env::var("QUERY_STALE_TIME_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            secure_cookies: env::var("SECURE_COOKIES")
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_backend(backend_api_url: impl Into<String>) -> Self {
        Self {
            server_port: 8080,
            backend_api_url: backend_api_url.into(),
            request_timeout_secs: 30,
            max_body_size_bytes: DEFAULT_MAX_BODY_SIZE_BYTES,
            render_cache_ttl_secs: 60,
            query_stale_time_secs: 60,
            secure_cookies: false,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url =
            Url::parse(&self.backend_api_url).map_err(|source| ConfigError::InvalidBackendUrl {
                url: self.backend_api_url.clone(),
                source,
            })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            _ => Err(ConfigError::UnsupportedScheme(self.backend_api_url.clone())),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn render_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.render_cache_ttl_secs)
    }

    pub fn query_stale_time(&self) -> Duration {
        Duration::from_secs(self.query_stale_time_secs)
    }
}
