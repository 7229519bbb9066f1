//! Deployment environment and the log output it implies

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Deployment the server runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Read `OTP_ENV`, falling back to `ENVIRONMENT`
    ///
    /// Unknown or missing values select `Development`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup("OTP_ENV")
            .or_else(|| lookup("ENVIRONMENT"))
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// Dotenv file holding overrides for this deployment, e.g. `.env.staging`
    pub fn env_file(&self) -> String {
        format!(".env.{}", self)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Shape of each log line written by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Level, target and message
    Pretty,
    /// Level and message only
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Log level, line format and timestamping
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default = "default_timestamp")]
    pub timestamp: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl LoggingConfig {
    /// Development logs verbosely for a terminal; deployed environments emit JSON
    pub fn for_environment(env: Environment) -> Self {
        let (level, format) = match env {
            Environment::Development => ("debug", LogFormat::Pretty),
            Environment::Staging => ("info", LogFormat::Json),
            Environment::Production => ("warn", LogFormat::Json),
        };
        Self {
            level: level.to_string(),
            format,
            timestamp: default_timestamp(),
        }
    }

    /// Apply `LOG_LEVEL`, `LOG_FORMAT` and `LOG_TIMESTAMP` from the process environment
    pub fn merge_env(self) -> Self {
        self.merge_lookup(|key| env::var(key).ok())
    }

    pub fn merge_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LOG_LEVEL").filter(|l| !l.trim().is_empty()) {
            self.level = level.trim().to_string();
        }
        if let Some(format) = lookup("LOG_FORMAT").and_then(|f| f.parse().ok()) {
            self.format = format;
        }
        if let Some(timestamp) = lookup("LOG_TIMESTAMP") {
            match timestamp.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.timestamp = true,
                "0" | "false" | "no" | "off" => self.timestamp = false,
                _ => {}
            }
        }
        self
    }

    /// Filter string for `env_logger`; `RUST_LOG` wins when set
    pub fn filter(&self) -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| self.level.clone())
    }
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_timestamp() -> bool {
    true
}
