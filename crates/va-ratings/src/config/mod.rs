use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::disability::population::{
    PopulationSettings, DEFAULT_BATCH_SIZE, DEFAULT_POPULATION_SEED, MAX_BATCH_SIZE,
};

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
    pub population: PopulationConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            population: PopulationConfig::from_env()?,
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

/// Defaults for synthetic population batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationConfig {
    pub seed: u64,
    pub batch_size: usize,
    pub enhanced: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_POPULATION_SEED,
            batch_size: DEFAULT_BATCH_SIZE,
            enhanced: true,
        }
    }
}

impl PopulationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let seed = match env::var("POPULATION_SEED") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed(raw))?,
            Err(_) => defaults.seed,
        };

        let batch_size = match env::var("POPULATION_BATCH_SIZE") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(size) if (1..=MAX_BATCH_SIZE).contains(&size) => size,
                _ => return Err(ConfigError::InvalidBatchSize(raw)),
            },
            Err(_) => defaults.batch_size,
        };

        let enhanced = match env::var("POPULATION_ENHANCED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "POPULATION_ENHANCED",
                value: raw,
            })?,
            Err(_) => defaults.enhanced,
        };

        Ok(Self {
            seed,
            batch_size,
            enhanced,
        })
    }

    pub fn settings(&self) -> PopulationSettings {
        PopulationSettings {
            default_seed: self.seed,
            batch_size: self.batch_size,
            enhanced: self.enhanced,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSeed(String),
    InvalidBatchSize(String),
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSeed(value) => {
                write!(f, "POPULATION_SEED must be a valid u64, got '{value}'")
            }
            ConfigError::InvalidBatchSize(value) => write!(
                f,
                "POPULATION_BATCH_SIZE must be between 1 and {MAX_BATCH_SIZE}, got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSeed(_)
            | ConfigError::InvalidBatchSize(_)
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
