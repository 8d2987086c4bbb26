//! Service configuration loading and types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use atmosphere::{DispatcherConfig, ServiceSettings};

/// Service configuration, read from an optional YAML file and then
/// overridden from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Path of the `airports.dat` catalog.
    #[serde(default = "default_airports_file")]
    pub airports_file: PathBuf,

    /// Maximum number of tasks running at once.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// How long a caller waits for its task.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// Largest radius a weather query may ask for.
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,

    /// Window in which an update counts as recent.
    #[serde(default = "default_recent_window_hours")]
    pub recent_window_hours: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            airports_file: default_airports_file(),
            pool_size: default_pool_size(),
            task_timeout_secs: default_task_timeout_secs(),
            max_radius_km: default_max_radius_km(),
            recent_window_hours: default_recent_window_hours(),
        }
    }
}

impl ServiceConfig {
    /// Load from `path` if given, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            Some(path) => {
                tracing::warn!(
                    "Config file {} does not exist, using defaults",
                    path.display()
                );
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse: {:?}", path))
    }

    /// Apply `WEATHER_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(file) = lookup("WEATHER_AIRPORTS_FILE") {
            self.airports_file = PathBuf::from(file);
        }
        if let Some(size) = lookup("WEATHER_POOL_SIZE") {
            self.pool_size = size
                .parse()
                .with_context(|| format!("Invalid WEATHER_POOL_SIZE: {}", size))?;
        }
        if let Some(secs) = lookup("WEATHER_TASK_TIMEOUT_SECS") {
            self.task_timeout_secs = secs
                .parse()
                .with_context(|| format!("Invalid WEATHER_TASK_TIMEOUT_SECS: {}", secs))?;
        }
        if let Some(km) = lookup("WEATHER_MAX_RADIUS_KM") {
            self.max_radius_km = km
                .parse()
                .with_context(|| format!("Invalid WEATHER_MAX_RADIUS_KM: {}", km))?;
        }
        Ok(())
    }

    pub fn service_settings(&self) -> Result<ServiceSettings> {
        let recent_window_ms = self
            .recent_window_hours
            .checked_mul(3_600_000)
            .and_then(|ms| i64::try_from(ms).ok())
            .with_context(|| {
                format!("recent_window_hours {} is too large", self.recent_window_hours)
            })?;

        Ok(ServiceSettings {
            max_radius_km: self.max_radius_km,
            recent_window_ms,
        })
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            pool_size: self.pool_size,
            task_timeout: Duration::from_secs(self.task_timeout_secs),
        }
    }
}

fn default_airports_file() -> PathBuf {
    PathBuf::from("config/airports.dat")
}
fn default_pool_size() -> usize {
    100
}
fn default_task_timeout_secs() -> u64 {
    30
}
fn default_max_radius_km() -> f64 {
    25_000.0
}
fn default_recent_window_hours() -> u64 {
    24
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.pool_size, 100);
        assert_eq!(config.task_timeout_secs, 30);
        assert_eq!(config.service_settings().unwrap().recent_window_ms, 86_400_000);
        assert_eq!(config.dispatcher_config().task_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_yaml_parsing_fills_defaults() {
        let yaml = r#"
airports_file: /data/airports.dat
pool_size: 8
"#;
        let config: ServiceConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.airports_file, PathBuf::from("/data/airports.dat"));
        assert_eq!(config.pool_size, 8);
        assert_eq!(config.max_radius_km, 25_000.0);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::load(Some(&dir.path().join("nope.yaml"))).unwrap();
        // The process environment may carry overrides; compare the rest.
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config.recent_window_hours, 24);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weather.yaml");
        std::fs::write(&path, "task_timeout_secs: 5\nrecent_window_hours: 1\n").unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.task_timeout_secs, 5);
        assert_eq!(config.service_settings().unwrap().recent_window_ms, 3_600_000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WEATHER_AIRPORTS_FILE", "/tmp/a.dat"),
            ("WEATHER_POOL_SIZE", "4"),
            ("WEATHER_MAX_RADIUS_KM", "500"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.airports_file, PathBuf::from("/tmp/a.dat"));
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.max_radius_km, 500.0);
        assert_eq!(config.task_timeout_secs, 30);
    }

    #[test]
    fn test_oversized_recent_window_is_an_error() {
        let config = ServiceConfig {
            recent_window_hours: u64::MAX / 1_000,
            ..ServiceConfig::default()
        };
        let err = config.service_settings().unwrap_err();
        assert!(err.to_string().contains("recent_window_hours"));

        let config = ServiceConfig {
            recent_window_hours: u64::MAX / 3_600_000,
            ..ServiceConfig::default()
        };
        assert!(config.service_settings().is_err());
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let mut config = ServiceConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "WEATHER_POOL_SIZE").then(|| "many".to_string())
        });
        assert!(result.is_err());
    }
}
