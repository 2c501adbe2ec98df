//! HTTP routes.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::artifacts::Artifacts;
use crate::model::PredictError;
use crate::record::{CropRecord, FieldViolation, CATEGORICAL_FIELDS};

pub const ROOT_MESSAGE: &str =
    "Crop Yield Prediction API, POST a crop record to /predict for a yield prediction";

/// Artifacts live for the whole process and are only ever read.
pub type SharedArtifacts = &'static Artifacts;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_yield: f64,
}

#[derive(Debug, Serialize)]
pub struct SchemaResponse<'a> {
    pub input_columns: &'a [String],
    pub model_columns: usize,
    pub categories: BTreeMap<&'static str, Vec<&'a str>>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<FieldViolation>),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error(transparent)]
    Predict(#[from] PredictError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Value::Array(violations.iter().map(FieldViolation::to_detail).collect()),
            ),
            ApiError::Rejected { status, message } => (
                status,
                json!([{ "loc": ["body"], "msg": message, "type": "value_error.jsondecode" }]),
            ),
            ApiError::Predict(err) => {
                tracing::error!(error = %err, "prediction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Value::String("Internal Server Error".to_string()),
                )
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn router(artifacts: SharedArtifacts) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/predict", post(predict_crop_yield))
        .route("/schema", get(schema))
        .with_state(artifacts)
}

async fn root() -> &'static str {
    ROOT_MESSAGE
}

async fn predict_crop_yield(
    State(artifacts): State<SharedArtifacts>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    // only syntax and content-type failures are rejected here; field errors
    // come from `CropRecord::from_json`
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(reason = %rejection.body_text(), "rejected request body");
        ApiError::from(rejection)
    })?;

    let record = CropRecord::from_json(body).map_err(|violations| {
        tracing::debug!(count = violations.len(), "record failed to parse");
        ApiError::Validation(violations)
    })?;

    if let Err(violations) = record.validate() {
        tracing::debug!(count = violations.len(), "record failed validation");
        return Err(ApiError::Validation(violations));
    }

    let predicted_yield = artifacts.predict(&record)?;
    Ok(Json(PredictionResponse { predicted_yield }))
}

async fn schema(State(artifacts): State<SharedArtifacts>) -> Json<SchemaResponse<'static>> {
    let schema = artifacts.schema();
    let categories = CATEGORICAL_FIELDS
        .iter()
        .map(|field| (*field, schema.known_categories(field)))
        .collect();

    Json(SchemaResponse {
        input_columns: artifacts.ui_columns(),
        model_columns: schema.width(),
        categories,
    })
}
