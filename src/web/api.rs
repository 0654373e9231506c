//! Defines the Axum API routes and handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::calculator::{CalculationReport, RequestOverrides, calculate};
use crate::config::Config;
use crate::error::CalcError;
use crate::motion::s_curve::SCurveError;
use crate::validation::{DriveLimits, has_failures, validate};
use crate::web::models::{ErrorResponse, ValidateRequest, ValidateResponse};

pub type AppState = Arc<Config>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(config: AppState) -> Router {
    Router::new()
        .route("/api/v1/drives", get(list_drives))
        .route("/api/v1/profile", post(calculate_profile))
        .route("/api/v1/validate", post(validate_move))
        .with_state(config)
}

/// Error carried out of a handler as a status code and a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        let status = match &err {
            CalcError::Solve(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CalcError::UnknownDrive(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<SCurveError> for ApiError {
    fn from(err: SCurveError) -> Self {
        CalcError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("Request failed: {}", self.message);
        } else {
            tracing::debug!("Request rejected ({}): {}", self.status, self.message);
        }
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

/// Handler listing the configured drives.
async fn list_drives(State(config): State<AppState>) -> Json<Vec<DriveLimits>> {
    Json(config.drives.clone())
}

/// Handler solving and sampling one move.
async fn calculate_profile(
    State(config): State<AppState>,
    Json(payload): Json<RequestOverrides>,
) -> Result<Json<CalculationReport>, ApiError> {
    let input = payload.resolve(&config)?;
    let report = calculate(&input)?;
    Ok(Json(report))
}

/// Handler checking a move against a drive without solving it.
async fn validate_move(
    State(config): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let drive = config
        .drive(&payload.drive)
        .ok_or_else(|| CalcError::UnknownDrive(payload.drive.clone()))?;
    let request = payload.request.unwrap_or_else(|| config.defaults.request());
    let checks = validate(drive, &request, &drive.physics(payload.payload_mass_g));
    Ok(Json(ValidateResponse {
        drive: drive.name.clone(),
        request,
        passed: !has_failures(&checks),
        checks,
    }))
}
