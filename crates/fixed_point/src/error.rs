//! Fixed-point error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixedPointError {
    #[error("Domain error: cannot quantize non-finite value {value}")]
    Domain { value: f64 },

    #[error("Invalid register width: total_bits={total_bits}, frac_bits={frac_bits}")]
    InvalidWidth { total_bits: u8, frac_bits: u8 },

    #[error("Scale mismatch: expected {expected}, got {got}")]
    ScaleMismatch { expected: u8, got: u8 },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, FixedPointError>;
