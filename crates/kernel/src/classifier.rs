//! Threshold classifier
//!
//! Scores are compared by absolute value, so a score that wrapped negative
//! still counts as large. The magnitude is taken in `i64` so `i32::MIN`
//! does not overflow.

/// Threshold in whole units, before scaling by 2^frac_bits
pub const THRESHOLD_UNITS: i64 = 100;

/// `100 * 2^frac_bits` in raw fixed-point units
pub fn threshold(frac_bits: u8) -> i64 {
    THRESHOLD_UNITS << frac_bits
}

/// `|major| > T || |minor| > T`
pub fn classify(major_score: i32, minor_score: i32, frac_bits: u8) -> bool {
    let t = threshold(frac_bits);
    i64::from(major_score).abs() > t || i64::from(minor_score).abs() > t
}
