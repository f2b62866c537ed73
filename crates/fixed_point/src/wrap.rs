//! Register-width wraparound
//!
//! The accelerator narrows every completed dot product by dropping the high
//! bits of its accumulator. These helpers reproduce that exactly: modular
//! reduction to `total_bits`, then two's-complement reinterpretation.

use crate::error::{FixedPointError, Result};

/// Narrowest supported register
pub const MIN_TOTAL_BITS: u8 = 2;

/// Widest supported register (values are held in `i32`)
pub const MAX_TOTAL_BITS: u8 = 32;

/// Validate a (total_bits, frac_bits) pair
pub fn check_width(total_bits: u8, frac_bits: u8) -> Result<()> {
    if !(MIN_TOTAL_BITS..=MAX_TOTAL_BITS).contains(&total_bits) || frac_bits >= total_bits {
        return Err(FixedPointError::InvalidWidth {
            total_bits,
            frac_bits,
        });
    }
    Ok(())
}

/// Smallest value representable in a `total_bits` register
pub fn register_min(total_bits: u8) -> i64 {
    -(1i64 << (total_bits - 1))
}

/// Largest value representable in a `total_bits` register
pub fn register_max(total_bits: u8) -> i64 {
    (1i64 << (total_bits - 1)) - 1
}

/// Whether `value` fits a `total_bits` register without wrapping
pub fn fits_width(value: i64, total_bits: u8) -> bool {
    value >= register_min(total_bits) && value <= register_max(total_bits)
}

/// Reduce `value` modulo 2^total_bits and reinterpret the result as signed.
///
/// Shifting the kept bits up to the top of the `i64` and arithmetic-shifting
/// them back down is the same as taking the low `total_bits` bits and
/// sign-extending from the top kept bit.
pub fn wrap_to_width(value: i64, total_bits: u8) -> i32 {
    debug_assert!((MIN_TOTAL_BITS..=MAX_TOTAL_BITS).contains(&total_bits));
    let shift = 64 - u32::from(total_bits);
    ((value << shift) >> shift) as i32
}

/// Rescale a Q·Q accumulator back to Q format, then narrow to the register.
///
/// `>>` on `i64` is arithmetic, so negative sums floor toward negative infinity.
pub fn shift_and_wrap(acc: i64, frac_bits: u8, total_bits: u8) -> i32 {
    wrap_to_width(acc >> frac_bits, total_bits)
}

/// Double-width multiply-accumulate register.
///
/// Partial sums wrap at 64 bits, like the hardware accumulator does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    acc: i64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// acc += a * b
    #[inline]
    pub fn mac(&mut self, a: i32, b: i32) {
        self.acc = self.acc.wrapping_add(i64::from(a) * i64::from(b));
    }

    /// Current raw accumulator contents
    pub fn raw(&self) -> i64 {
        self.acc
    }

    /// Shift by `frac_bits` and narrow to `total_bits`
    pub fn finish(self, frac_bits: u8, total_bits: u8) -> i32 {
        shift_and_wrap(self.acc, frac_bits, total_bits)
    }
}
