//! Register vectors sharing one scale

use crate::error::{FixedPointError, Result};
use crate::wrap::{wrap_to_width, Accumulator};

/// Raw register values with a common number of fractional bits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedVector {
    pub data: Vec<i32>,
    pub scale: u8,
}

impl FixedVector {
    pub fn from_raw(data: Vec<i32>, scale: u8) -> Self {
        Self { data, scale }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if self.len() != got {
            return Err(FixedPointError::DimensionMismatch {
                expected: self.len(),
                got,
            });
        }
        Ok(())
    }

    /// Element-wise `self - other`, each difference wrapped to `total_bits`
    pub fn wrapping_sub(&self, other: &Self, total_bits: u8) -> Result<Self> {
        if self.scale != other.scale {
            return Err(FixedPointError::ScaleMismatch {
                expected: self.scale,
                got: other.scale,
            });
        }
        self.check_len(other.len())?;

        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| wrap_to_width(i64::from(a) - i64::from(b), total_bits))
            .collect();
        Ok(Self::from_raw(data, self.scale))
    }

    /// Dot product with a coefficient row at the same scale.
    ///
    /// Products are summed in index order in a wrapping `i64`, then shifted
    /// and wrapped to `total_bits` once.
    pub fn dot(&self, row: &[i32], total_bits: u8) -> Result<i32> {
        self.check_len(row.len())?;
        let mut acc = Accumulator::new();
        for (&a, &b) in self.data.iter().zip(row) {
            acc.mac(a, b);
        }
        Ok(acc.finish(self.scale, total_bits))
    }

    /// `dot(self, self)`
    pub fn energy(&self, total_bits: u8) -> i32 {
        let mut acc = Accumulator::new();
        for &v in &self.data {
            acc.mac(v, v);
        }
        acc.finish(self.scale, total_bits)
    }
}
