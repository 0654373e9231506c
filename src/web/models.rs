//! Contains the data models for API requests and responses.

use serde::{Deserialize, Serialize};

use crate::units::MoveRequest;
use crate::validation::Check;

/// Body of `POST /api/v1/validate`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidateRequest {
    pub drive: String,
    /// Move to check; the configured defaults when left out
    #[serde(default)]
    pub request: Option<MoveRequest>,
    #[serde(default)]
    pub payload_mass_g: f64,
}

/// Result of checking one move against one drive.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidateResponse {
    pub drive: String,
    pub request: MoveRequest,
    pub passed: bool,
    pub checks: Vec<Check>,
}

/// Body returned with every non-2xx status.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
