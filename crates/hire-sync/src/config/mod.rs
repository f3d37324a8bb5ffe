use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::workflows::hired::EmployeePolicy;

pub const DEFAULT_PINPOINT_API_URL: &str = "https://developers-test.pinpointhq.com/api/v1";
pub const DEFAULT_HIBOB_API_URL: &str = "https://api.hibob.com/v1";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

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
    pub pinpoint: PinpointConfig,
    pub hibob: HibobConfig,
    pub policy: EmployeePolicy,
}

impl AppConfig {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok(), Local::now().date_naive())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// `today` anchors the default employee start date.
    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing { name });

        let environment =
            AppEnvironment::from_str(&var("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let host = var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("APP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());
        let log_format = match var("APP_LOG_FORMAT") {
            Some(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat { value: raw })?,
            None if environment == AppEnvironment::Production => LogFormat::Json,
            None => LogFormat::Compact,
        };

        let timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout { value: raw })?,
            None => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };
        let timeout = Duration::from_secs(timeout);

        let pinpoint = PinpointConfig {
            base_url: var("PINPOINT_API_URL")
                .unwrap_or_else(|| DEFAULT_PINPOINT_API_URL.to_string()),
            api_key: Secret::new(required("PINPOINT_API_KEY")?),
            timeout,
        };

        let hibob = HibobConfig {
            base_url: var("HIBOB_API_URL").unwrap_or_else(|| DEFAULT_HIBOB_API_URL.to_string()),
            user_id: required("HIBOB_USER_ID")?,
            password: Secret::new(required("HIBOB_PASSWORD")?),
            timeout,
        };

        let mut policy = EmployeePolicy::starting_after(today);
        if let Some(site) = var("HIBOB_WORK_SITE") {
            policy.site = site.trim().to_string();
        }
        if let Some(raw) = var("HIBOB_START_DATE") {
            policy.start_date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ConfigError::InvalidDate {
                    name: "HIBOB_START_DATE",
                    value: raw.clone(),
                }
            })?;
        }
        policy.email_override = var("HIBOB_EMAIL_OVERRIDE").map(|email| email.trim().to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            pinpoint,
            hibob,
            policy,
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
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Pinpoint API access.
#[derive(Debug, Clone)]
pub struct PinpointConfig {
    pub base_url: String,
    pub api_key: Secret,
    pub timeout: Duration,
}

/// HiBob API access via a service user.
#[derive(Debug, Clone)]
pub struct HibobConfig {
    pub base_url: String,
    pub user_id: String,
    pub password: Secret,
    pub timeout: Duration,
}

/// Credential value that is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    Missing { name: &'static str },
    InvalidDate { name: &'static str, value: String },
    InvalidTimeout { value: String },
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::Missing { name } => write!(f, "{name} must be set"),
            ConfigError::InvalidDate { name, value } => {
                write!(f, "{name} must be a YYYY-MM-DD date, got '{value}'")
            }
            ConfigError::InvalidTimeout { value } => write!(
                f,
                "UPSTREAM_TIMEOUT_SECS must be a positive number of seconds, got '{value}'"
            ),
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
