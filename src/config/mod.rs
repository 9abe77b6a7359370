use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::matching::RerankPolicy;

const DEFAULT_SCORING_URL: &str = "http://localhost:8000";
const DEFAULT_SCORING_TIMEOUT_SECS: u64 = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let service_url =
            env::var("APP_SCORING_URL").unwrap_or_else(|_| DEFAULT_SCORING_URL.to_string());
        let timeout_secs = match env::var("APP_SCORING_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidScoringTimeout { value: raw })?,
            Err(_) => DEFAULT_SCORING_TIMEOUT_SECS,
        };
        let rerank_policy = match env::var("APP_RERANK_POLICY") {
            Ok(raw) => RerankPolicy::parse(&raw)
                .ok_or(ConfigError::InvalidRerankPolicy { value: raw })?,
            Err(_) => RerankPolicy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                service_url,
                timeout: Duration::from_secs(timeout_secs),
                rerank_policy,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Remote scoring endpoint and ranking behavior.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub service_url: String,
    pub timeout: Duration,
    pub rerank_policy: RerankPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SCORING_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_SCORING_TIMEOUT_SECS),
            rerank_policy: RerankPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScoringTimeout { value: String },
    InvalidRerankPolicy { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScoringTimeout { value } => write!(
                f,
                "APP_SCORING_TIMEOUT_SECS must be a positive number of seconds (found '{value}')"
            ),
            ConfigError::InvalidRerankPolicy { value } => write!(
                f,
                "APP_RERANK_POLICY must be 'reset' or 'preserve' (found '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidScoringTimeout { .. }
            | ConfigError::InvalidRerankPolicy { .. } => None,
        }
    }
}
