//! Numeric scalers fitted at training time and replayed at inference.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("X has {actual} features, but the scaler is expecting {expected} features as input")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("scaler parameters have mismatched lengths ({left} vs {right})")]
    Inconsistent { left: usize, right: usize },
}

/// Persisted scaler parameters, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of input features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { scale, .. } | Scaler::MinMax { scale, .. } => scale.len(),
        }
    }

    /// Transform a single row.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalerError> {
        let (offset, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };
        if offset.len() != scale.len() {
            return Err(ScalerError::Inconsistent {
                left: offset.len(),
                right: scale.len(),
            });
        }
        if row.len() != scale.len() {
            return Err(ScalerError::WidthMismatch {
                expected: scale.len(),
                actual: row.len(),
            });
        }

        let out = match self {
            Scaler::Standard { .. } => row
                .iter()
                .zip(offset.iter().zip(scale))
                .map(|(x, (m, s))| {
                    // constant features were fitted with a zero scale
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            Scaler::MinMax { .. } => row
                .iter()
                .zip(offset.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_transform() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.5],
        };
        assert_eq!(scaler.transform(&[14.0, 1.0]).unwrap(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_standard_zero_scale_only_centres() {
        let scaler = Scaler::Standard {
            mean: vec![3.0],
            scale: vec![0.0],
        };
        assert_eq!(scaler.transform(&[5.0]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = Scaler::MinMax {
            min: vec![-1.0, 0.0],
            scale: vec![0.25, 0.5],
        };
        assert_eq!(scaler.transform(&[20.0, 4.0]).unwrap(), vec![4.0, 2.0]);
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
        };
        assert_eq!(
            scaler.transform(&[1.0, 2.0]),
            Err(ScalerError::WidthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_inconsistent_parameters() {
        let scaler = Scaler::MinMax {
            min: vec![0.0; 2],
            scale: vec![1.0; 3],
        };
        assert!(matches!(
            scaler.transform(&[0.0; 3]),
            Err(ScalerError::Inconsistent { left: 2, right: 3 })
        ));
    }

    #[test]
    fn test_parse_tagged_json() {
        let scaler: Scaler =
            serde_json::from_str(r#"{"kind":"standard","mean":[1.0],"scale":[2.0]}"#).unwrap();
        assert_eq!(scaler.n_features(), 1);

        let scaler: Scaler =
            serde_json::from_str(r#"{"kind":"min_max","min":[0.0,0.0],"scale":[1.0,1.0]}"#).unwrap();
        assert!(matches!(scaler, Scaler::MinMax { .. }));
        assert_eq!(scaler.n_features(), 2);
    }
}
