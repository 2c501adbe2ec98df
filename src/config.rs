//! Application configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind: SocketAddr,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Artifact locations
    pub artifacts: ArtifactsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            log_level: "info".to_string(),
            artifacts: ArtifactsConfig::default(),
        }
    }
}

/// Where the four serving artifacts live
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Directory the file names below are resolved against
    pub dir: PathBuf,
    /// gbdt model file
    pub model: String,
    /// Scaler parameters (JSON)
    pub scaler: String,
    /// User-facing input columns (JSON list)
    pub ui_columns: String,
    /// Training-time model columns (JSON list)
    pub model_columns: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            model: "model.json".to_string(),
            scaler: "scaler.json".to_string(),
            ui_columns: "ui_columns.json".to_string(),
            model_columns: "model_columns.json".to_string(),
        }
    }
}

impl ArtifactsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(&self.scaler)
    }

    pub fn ui_columns_path(&self) -> PathBuf {
        self.dir.join(&self.ui_columns)
    }

    pub fn model_columns_path(&self) -> PathBuf {
        self.dir.join(&self.model_columns)
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            bind = "0.0.0.0:9000"

            [artifacts]
            dir = "/srv/models"
            model = "best_model.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.artifacts.model_path(), PathBuf::from("/srv/models/best_model.json"));
        assert_eq!(config.artifacts.scaler_path(), PathBuf::from("/srv/models/scaler.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.artifacts.dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn test_invalid_bind_is_rejected() {
        assert!(toml::from_str::<AppConfig>("bind = \"not an address\"").is_err());
    }
}
