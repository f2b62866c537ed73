//! fxpca Fixed-Point Encoding
//!
//! Fixed-point representation matching the scoring accelerator's registers.
//! Values are `i32` registers holding `total_bits`-wide two's-complement
//! numbers with an implicit scaling factor 2^frac_bits. Products are
//! accumulated in a wrapping `i64` accumulator and narrowed back to the
//! register width by modular reduction, never by saturation.

mod error;
mod quantize;
mod vector;
mod wrap;

pub use error::{FixedPointError, Result};
pub use quantize::{dequantize, quantize, quantize_to_register, QuantizeMode, Quantizer};
pub use vector::FixedVector;
pub use wrap::{
    check_width, fits_width, register_max, register_min, shift_and_wrap, wrap_to_width,
    Accumulator, MAX_TOTAL_BITS, MIN_TOTAL_BITS,
};
