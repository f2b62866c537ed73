//! Inverse projection from the major subspace back to feature space.
//!
//! `recon[j] = wrap((Σ_k proj[k] * M[k][j]) >> frac_bits)`. Components are
//! summed in ascending index order; with 64-bit accumulator wraparound a
//! different order can produce a different register value.

use fxpca_fixed_point::{Accumulator, FixedVector};

use crate::error::{KernelError, Result};

/// Reconstruct an `n_features` vector from major-subspace coefficients.
pub fn reconstruct(
    proj: &FixedVector,
    major: &[Vec<i32>],
    n_features: usize,
    total_bits: u8,
) -> Result<FixedVector> {
    if proj.len() != major.len() {
        return Err(KernelError::Shape {
            what: "major projection",
            expected: major.len(),
            got: proj.len(),
        });
    }
    if let Some(row) = major.iter().find(|row| row.len() != n_features) {
        return Err(KernelError::Shape {
            what: "component row",
            expected: n_features,
            got: row.len(),
        });
    }

    let frac_bits = proj.scale;
    let recon = (0..n_features)
        .map(|j| {
            let mut acc = Accumulator::new();
            for (&p, row) in proj.data.iter().zip(major) {
                acc.mac(p, row[j]);
            }
            acc.finish(frac_bits, total_bits)
        })
        .collect();

    Ok(FixedVector::from_raw(recon, frac_bits))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstruct_basis() {
        // Two orthonormal components in a 3-feature space
        let major = vec![vec![256, 0, 0], vec![0, 0, 256]];
        let proj = FixedVector::from_raw(vec![512, -128], 8);
        let recon = reconstruct(&proj, &major, 3, 32).unwrap();
        assert_eq!(recon.data, vec![512, 0, -128]);
    }

    #[test]
    fn test_reconstruct_sums_components() {
        let major = vec![vec![128, 128], vec![128, -128]];
        let proj = FixedVector::from_raw(vec![256, 256], 8);
        let recon = reconstruct(&proj, &major, 2, 32).unwrap();
        // (256*128 + 256*128) >> 8 = 256 ; (256*128 - 256*128) >> 8 = 0
        assert_eq!(recon.data, vec![256, 0]);
    }

    #[test]
    fn test_reconstruct_no_components_is_zero() {
        let proj = FixedVector::from_raw(vec![], 8);
        let recon = reconstruct(&proj, &[], 4, 32).unwrap();
        assert_eq!(recon.data, vec![0; 4]);
    }

    #[test]
    fn test_reconstruct_narrow_register_wraps() {
        // (200 * 51200) >> 8 = 40000, past the 16-bit maximum of 32767
        let major = vec![vec![256 * 200]];
        let proj = FixedVector::from_raw(vec![200], 8);
        let recon = reconstruct(&proj, &major, 1, 16).unwrap();
        assert_eq!(recon.data, vec![40000 - 65536]);
    }

    #[test]
    fn test_reconstruct_shape_errors() {
        let proj = FixedVector::from_raw(vec![1], 8);
        assert!(matches!(
            reconstruct(&proj, &[vec![0; 3], vec![0; 3]], 3, 32),
            Err(KernelError::Shape { what: "major projection", .. })
        ));
        assert!(matches!(
            reconstruct(&proj, &[vec![0; 2]], 3, 32),
            Err(KernelError::Shape { what: "component row", .. })
        ));
    }
}
