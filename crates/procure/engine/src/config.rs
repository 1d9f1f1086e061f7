//! Configuration for the evaluation engine

use procure_types::VarianceThresholds;
use serde::{Deserialize, Serialize};

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage backend
    #[serde(default)]
    pub storage: StorageConfig,

    /// Score comparison policy
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Event fan-out
    #[serde(default)]
    pub events: EventsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (for development/testing)
    #[default]
    Memory,

    /// PostgreSQL storage
    Postgres {
        /// Connection URL
        url: String,

        /// Maximum connections in pool
        #[serde(default = "default_pool_size")]
        max_connections: u32,

        /// Connection timeout in seconds
        #[serde(default = "default_connection_timeout")]
        connect_timeout_secs: u64,
    },
}

/// How individual scores are compared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Largest range still labelled `low`
    #[serde(default = "default_low_variance_max")]
    pub low_variance_max: f64,

    /// Largest range still labelled `medium`
    #[serde(default = "default_medium_variance_max")]
    pub medium_variance_max: f64,

    /// Ignore drafts when comparing and when snapshotting consensus sources
    #[serde(default)]
    pub submitted_only: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            low_variance_max: default_low_variance_max(),
            medium_variance_max: default_medium_variance_max(),
            submitted_only: false,
        }
    }
}

impl ScoringConfig {
    pub fn thresholds(&self) -> VarianceThresholds {
        VarianceThresholds {
            low_max: self.low_variance_max,
            medium_max: self.medium_variance_max,
        }
    }

    fn validate(&self) -> Result<(), String> {
        let ordered = self.low_variance_max.is_finite()
            && self.medium_variance_max.is_finite()
            && 0.0 <= self.low_variance_max
            && self.low_variance_max <= self.medium_variance_max;
        if ordered {
            Ok(())
        } else {
            Err(format!(
                "variance thresholds must satisfy 0 <= low ({}) <= medium ({})",
                self.low_variance_max, self.medium_variance_max
            ))
        }
    }
}

/// Event channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Broadcast buffer per subscriber
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or env-filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_pool_size() -> u32 {
    10
}

fn default_connection_timeout() -> u64 {
    5
}

fn default_low_variance_max() -> f64 {
    0.5
}

fn default_medium_variance_max() -> f64 {
    2.0
}

fn default_channel_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration: defaults, then the optional file, then
    /// `PROCURE_*` environment variables (`__` separates nested keys, e.g.
    /// `PROCURE_SCORING__SUBMITTED_ONLY=true`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PROCURE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: EngineConfig = builder.build()?.try_deserialize()?;
        loaded.scoring.validate().map_err(config::ConfigError::Message)?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert_eq!(config.scoring.thresholds(), VarianceThresholds::default());
        assert!(!config.scoring.submitted_only);
        assert_eq!(config.events.channel_capacity, 1024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_postgres_storage_from_json() {
        let config: StorageConfig = serde_json::from_value(serde_json::json!({
            "type": "postgres",
            "url": "postgres://localhost/procure"
        }))
        .unwrap();
        match config {
            StorageConfig::Postgres {
                max_connections,
                connect_timeout_secs,
                ..
            } => {
                assert_eq!(max_connections, 10);
                assert_eq!(connect_timeout_secs, 5);
            }
            StorageConfig::Memory => panic!("expected postgres"),
        }
    }

    #[test]
    fn test_threshold_order_is_validated() {
        let scoring = ScoringConfig {
            low_variance_max: 3.0,
            medium_variance_max: 1.0,
            submitted_only: false,
        };
        assert!(scoring.validate().is_err());
        assert!(ScoringConfig::default().validate().is_ok());
    }

    // Loading reads process-wide environment; tests touching it take turns.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn test_load_without_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = EngineConfig::load(None).unwrap();
        assert_eq!(config.scoring.medium_variance_max, 2.0);
    }

    #[test]
    fn test_env_overrides_nested_scoring_keys() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var("PROCURE_SCORING__SUBMITTED_ONLY", "true");
        std::env::set_var("PROCURE_SCORING__MEDIUM_VARIANCE_MAX", "3.5");

        let loaded = EngineConfig::load(None);

        std::env::remove_var("PROCURE_SCORING__SUBMITTED_ONLY");
        std::env::remove_var("PROCURE_SCORING__MEDIUM_VARIANCE_MAX");

        let config = loaded.unwrap();
        assert!(config.scoring.submitted_only);
        assert_eq!(config.scoring.medium_variance_max, 3.5);
        assert_eq!(config.scoring.low_variance_max, 0.5);
    }

    #[test]
    fn test_file_layer_and_threshold_rejection() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("procure.toml");
        std::fs::write(
            &good,
            "[scoring]\nlow_variance_max = 1.0\n\n[events]\nchannel_capacity = 64\n",
        )
        .unwrap();
        let config = EngineConfig::load(good.to_str()).unwrap();
        assert_eq!(config.scoring.low_variance_max, 1.0);
        assert_eq!(config.scoring.medium_variance_max, 2.0);
        assert_eq!(config.events.channel_capacity, 64);

        let misordered = dir.path().join("misordered.toml");
        std::fs::write(&misordered, "[scoring]\nlow_variance_max = 9.0\n").unwrap();
        assert!(EngineConfig::load(misordered.to_str()).is_err());
    }
}
