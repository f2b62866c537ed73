//! Model loading error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Shape error in {what}: expected {expected}, got {got}")]
    Shape {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("Coefficient {what}[{index}] = {value} does not fit a {total_bits}-bit register")]
    CoefficientOutOfRange {
        what: String,
        index: usize,
        value: i64,
        total_bits: u8,
    },

    #[error("Model config error: {0}")]
    Config(String),

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] fxpca_fixed_point::FixedPointError),
}

pub type Result<T> = std::result::Result<T, ModelError>;
