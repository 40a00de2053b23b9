//! Telemetry initialization - tracing subscriber setup for binaries.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt};

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Enable JSON logging (for production).
    pub json_logs: bool,
    /// Service name for tracing.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is not set.
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            service_name: "blog".to_string(),
            default_filter: "info,blog_infra=debug,sea_orm_migration=info".to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>, json_logs: bool) -> Self {
        Self {
            json_logs,
            service_name: service_name.into(),
            ..Self::default()
        }
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed, e.g. by the SeaORM migration CLI.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    // Build and init subscriber based on log format
    if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()?;
    }

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        let config = TelemetryConfig::new("blog-test", false);
        assert_eq!(config.default_filter, TelemetryConfig::default().default_filter);

        assert!(init_telemetry(&config).is_ok());
        assert!(init_telemetry(&config).is_err());
    }
}
