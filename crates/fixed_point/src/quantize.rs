//! Float ↔ fixed-point conversion
//!
//! `quantize` rounds half away from zero (`f64::round`). What happens when
//! the rounded value does not fit the register is a model-level choice made
//! through [`QuantizeMode`].

use serde::{Deserialize, Serialize};

use crate::error::{FixedPointError, Result};
use crate::vector::FixedVector;
use crate::wrap::{check_width, register_max, register_min, wrap_to_width};

/// Out-of-range policy applied when a quantized value enters a register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantizeMode {
    /// Clamp to the signed `total_bits` range
    #[default]
    Saturating,
    /// Keep the unclamped value and let register wraparound reduce it
    WrapLater,
}

impl QuantizeMode {
    /// Parse from a configuration string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "saturating" | "saturate" | "clamp" => Some(Self::Saturating),
            "wrap_later" | "wrap-later" | "wrap" => Some(Self::WrapLater),
            _ => None,
        }
    }
}

fn scale_factor(frac_bits: u8) -> f64 {
    (1u64 << frac_bits) as f64
}

/// `round(x * 2^frac_bits)`, rounding half away from zero.
///
/// The result is unclamped (beyond `i64` it saturates, which no register
/// width can observe anyway). Non-finite input is rejected.
pub fn quantize(x: f64, frac_bits: u8) -> Result<i64> {
    if !x.is_finite() {
        return Err(FixedPointError::Domain { value: x });
    }
    Ok((x * scale_factor(frac_bits)).round() as i64)
}

/// `v / 2^frac_bits`
pub fn dequantize(v: i64, frac_bits: u8) -> f64 {
    v as f64 / scale_factor(frac_bits)
}

/// Quantize `x` straight into a `total_bits` register under `mode`.
pub fn quantize_to_register(x: f64, frac_bits: u8, total_bits: u8, mode: QuantizeMode) -> Result<i32> {
    check_width(total_bits, frac_bits)?;
    if !x.is_finite() {
        return Err(FixedPointError::Domain { value: x });
    }
    let scaled = (x * scale_factor(frac_bits)).round();

    let raw = match mode {
        QuantizeMode::Saturating => scaled
            .clamp(register_min(total_bits) as f64, register_max(total_bits) as f64)
            as i64,
        QuantizeMode::WrapLater => {
            // fmod is exact, so even values past i64 reduce correctly.
            // An overflowed product is a multiple of any register modulus.
            if scaled.is_finite() {
                let modulus = (1u64 << total_bits) as f64;
                scaled.rem_euclid(modulus) as i64
            } else {
                0
            }
        }
    };
    Ok(wrap_to_width(raw, total_bits))
}

/// Quantization settings shared by every value of one model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantizer {
    pub frac_bits: u8,
    pub total_bits: u8,
    pub mode: QuantizeMode,
}

impl Quantizer {
    pub fn new(frac_bits: u8, total_bits: u8, mode: QuantizeMode) -> Result<Self> {
        check_width(total_bits, frac_bits)?;
        Ok(Self {
            frac_bits,
            total_bits,
            mode,
        })
    }

    /// Quantize one scalar into a register
    pub fn quantize(&self, x: f64) -> Result<i32> {
        quantize_to_register(x, self.frac_bits, self.total_bits, self.mode)
    }

    /// Quantize a whole feature vector
    pub fn quantize_slice(&self, values: &[f64]) -> Result<FixedVector> {
        let data = values
            .iter()
            .map(|&v| self.quantize(v))
            .collect::<Result<Vec<i32>>>()?;
        Ok(FixedVector::from_raw(data, self.frac_bits))
    }

    pub fn dequantize(&self, v: i32) -> f64 {
        dequantize(i64::from(v), self.frac_bits)
    }
}
