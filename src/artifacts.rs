//! Read-only artifacts loaded once at startup, and the prediction pipeline
//! that runs over them.

use std::fs;
use std::path::{Path, PathBuf};

use gbdt::gradient_boost::GBDT;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ArtifactsConfig;
use crate::features::{encode, FeatureSchema};
use crate::model::{PredictError, Regressor};
use crate::record::CropRecord;
use crate::scaler::Scaler;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a prediction needs. Never mutated after construction.
pub struct Artifacts {
    model: Box<dyn Regressor>,
    scaler: Scaler,
    ui_columns: Vec<String>,
    schema: FeatureSchema,
}

impl Artifacts {
    pub fn new(
        model: Box<dyn Regressor>,
        scaler: Scaler,
        ui_columns: Vec<String>,
        model_columns: Vec<String>,
    ) -> Self {
        Self {
            model,
            scaler,
            ui_columns,
            schema: FeatureSchema::new(model_columns),
        }
    }

    /// Load the model, scaler and both column lists. The artifacts are not
    /// checked against each other here; a mismatch shows up on the first
    /// prediction.
    pub fn load(cfg: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        // same JSON layout `GBDT::save_model` writes
        let model_path = cfg.model_path();
        let model: GBDT = read_json(&model_path)?;
        tracing::info!(path = %model_path.display(), "model loaded");

        let scaler: Scaler = read_json(&cfg.scaler_path())?;
        let ui_columns: Vec<String> = read_json(&cfg.ui_columns_path())?;
        let model_columns: Vec<String> = read_json(&cfg.model_columns_path())?;
        tracing::info!(
            scaler_features = scaler.n_features(),
            ui_columns = ui_columns.len(),
            model_columns = model_columns.len(),
            "feature artifacts loaded"
        );

        Ok(Self::new(Box::new(model), scaler, ui_columns, model_columns))
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn ui_columns(&self) -> &[String] {
        &self.ui_columns
    }

    /// Encode, align, scale and predict a single validated record.
    pub fn predict(&self, record: &CropRecord) -> Result<f64, PredictError> {
        let row = self.schema.align(&encode(record));
        if !row.unseen.is_empty() {
            tracing::debug!(columns = ?row.unseen, "categories not seen at training time");
        }

        let scaled = self.scaler.transform(&row.values)?;
        let features: Vec<f32> = scaled.iter().map(|v| *v as f32).collect();
        let predicted = self.model.predict_row(&features)?;
        Ok(f64::from(predicted))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
