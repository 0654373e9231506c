// src/error.rs - Errors surfaced by the calculator front ends
use thiserror::Error;

use crate::config::ConfigError;
use crate::motion::s_curve::SCurveError;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error(transparent)]
    Solve(#[from] SCurveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unknown drive: {0}")]
    UnknownDrive(String),
    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
