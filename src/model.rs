//! The regression model seam and its gbdt implementation.

use std::panic::{self, AssertUnwindSafe};

use gbdt::decision_tree::{Data, PredVec};
use gbdt::gradient_boost::GBDT;
use thiserror::Error;

use crate::scaler::ScalerError;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Scaler(#[from] ScalerError),
    #[error("model failed on a {width}-feature row")]
    Model { width: usize },
    #[error("model returned no prediction")]
    Empty,
}

/// A fitted single-output regressor.
pub trait Regressor: Send + Sync {
    fn predict_row(&self, row: &[f32]) -> Result<f32, PredictError>;
}

/// gbdt indexes feature vectors without bounds checks, so a row narrower than
/// the trained feature size panics inside `predict`. The panic is caught and
/// reported as [`PredictError::Model`]; the default panic hook still prints it
/// to stderr.
impl Regressor for GBDT {
    fn predict_row(&self, row: &[f32]) -> Result<f32, PredictError> {
        let test_data = vec![Data::new_test_data(row.to_vec(), None)];

        let predicted: PredVec = panic::catch_unwind(AssertUnwindSafe(|| self.predict(&test_data)))
            .map_err(|_| PredictError::Model { width: row.len() })?;

        predicted.first().copied().ok_or(PredictError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbdt::config::Config;
    use gbdt::decision_tree::DataVec;

    fn train() -> GBDT {
        let mut cfg = Config::new();
        cfg.set_feature_size(2);
        cfg.set_max_depth(3);

        let mut input_data: DataVec = (0..40)
            .map(|i| {
                let x = i as f32;
                Data::new_training_data(vec![x, (i % 4) as f32], 1.0, 3.0 * x + 5.0, None)
            })
            .collect();

        let mut gbdt = GBDT::new(&cfg);
        gbdt.fit(&mut input_data);
        gbdt
    }

    #[test]
    fn test_gbdt_prediction_is_deterministic() {
        let model = train();
        let a = model.predict_row(&[12.0, 0.0]).unwrap();
        let b = model.predict_row(&[12.0, 0.0]).unwrap();
        assert!(a.is_finite());
        assert_eq!(a, b);
    }

    #[test]
    fn test_saved_model_round_trips() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("model.json");
        let model = train();
        model
            .save_model(&path.to_string_lossy())
            .expect("failed to save the model");

        let content = std::fs::read_to_string(&path).expect("read saved model");
        let loaded: GBDT = serde_json::from_str(&content).expect("failed to load the model");
        assert_eq!(
            model.predict_row(&[7.0, 3.0]).unwrap(),
            loaded.predict_row(&[7.0, 3.0]).unwrap()
        );
    }

    #[test]
    fn test_short_row_is_a_model_error() {
        let mut cfg = Config::new();
        cfg.set_feature_size(3);
        cfg.set_max_depth(2);

        // only the last feature varies, so every split reads index 2
        let mut input_data: DataVec = (0..30)
            .map(|i| {
                let x = i as f32;
                Data::new_training_data(vec![0.0, 0.0, x], 1.0, 2.0 * x, None)
            })
            .collect();
        let mut gbdt = GBDT::new(&cfg);
        gbdt.fit(&mut input_data);

        assert!(gbdt.predict_row(&[1.0, 1.0, 4.0]).is_ok());
        assert!(matches!(
            gbdt.predict_row(&[1.0]),
            Err(PredictError::Model { width: 1 })
        ));
    }
}
