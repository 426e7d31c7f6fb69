//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for log output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name reported on startup
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full directive
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to colour pretty output
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tank-bench".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `TB_SERVICE_NAME`: Service name (default: tank-bench)
    /// - `TB_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TB_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `NO_COLOR`: Disable ANSI colours when set
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("TB_SERVICE_NAME")
                .unwrap_or_else(|_| "tank-bench".to_string()),

            log_level: env::var("TB_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("TB_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(is_container),

            ansi: env::var("NO_COLOR").is_err(),
        }
    }

    /// Configuration for a named binary.
    pub fn for_service(name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = name.to_string();
        config
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "tank-bench");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("no"));
    }
}
