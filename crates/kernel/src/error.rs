//! Kernel error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Shape error in {what}: expected {expected}, got {got}")]
    Shape {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Scale mismatch: expected {expected}, got {got}")]
    ScaleMismatch { expected: u8, got: u8 },

    #[error("Model has no float parameters; the float reference path is unavailable")]
    MissingFloatParameters,

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] fxpca_fixed_point::FixedPointError),

    #[error("Model error: {0}")]
    Model(#[from] fxpca_model::ModelError),
}

pub type Result<T> = std::result::Result<T, KernelError>;
