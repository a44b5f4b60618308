use crate::charts::DEFAULT_JPEG_QUALITY;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different deployment stages.
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

    /// Log level used when `REPORT_LOG_LEVEL` is unset.
    pub fn default_log_level(self) -> &'static str {
        match self {
            Self::Production => "warn",
            Self::Development | Self::Test => "info",
        }
    }
}

/// Host configuration for the command line renderer. The engine itself
/// never reads the environment; everything it needs arrives as arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub output: OutputConfig,
    pub render: RenderConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("REPORT_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let directory = PathBuf::from(env::var("REPORT_OUTPUT_DIR").unwrap_or_else(|_| ".".to_string()));

        let charts = match env::var("REPORT_CHARTS") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidChartsFlag { value: raw })?,
            Err(_) => true,
        };

        let jpeg_quality = match env::var("REPORT_JPEG_QUALITY") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|quality| (1..=100).contains(quality))
                .ok_or(ConfigError::InvalidJpegQuality { value: raw })?,
            Err(_) => DEFAULT_JPEG_QUALITY,
        };

        let log_level = env::var("REPORT_LOG_LEVEL")
            .unwrap_or_else(|_| environment.default_log_level().to_string());

        Ok(Self {
            environment,
            output: OutputConfig { directory },
            render: RenderConfig {
                charts,
                jpeg_quality,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where generated documents are written.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    pub charts: bool,
    pub jpeg_quality: u8,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidChartsFlag { value: String },
    InvalidJpegQuality { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidChartsFlag { value } => {
                write!(f, "REPORT_CHARTS must be true or false, got '{}'", value)
            }
            ConfigError::InvalidJpegQuality { value } => {
                write!(f, "REPORT_JPEG_QUALITY must be between 1 and 100, got '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
