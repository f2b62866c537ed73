//! Centering and subspace projection
//!
//! `proj[k] = wrap((Σ_i c[i] * M[k][i]) >> frac_bits)`, accumulated in
//! ascending feature order. The shift and the wrap happen once per completed
//! dot product, not per multiply-add.

use fxpca_fixed_point::FixedVector;

use crate::error::{KernelError, Result};

/// `centered[i] = wrap(features[i] - mean[i])`
pub fn center(features: &FixedVector, mean: &[i32], total_bits: u8) -> Result<FixedVector> {
    if features.len() != mean.len() {
        return Err(KernelError::Shape {
            what: "feature vector",
            expected: mean.len(),
            got: features.len(),
        });
    }
    let mean = FixedVector::from_raw(mean.to_vec(), features.scale);
    Ok(features.wrapping_sub(&mean, total_bits)?)
}

/// Project a centered vector onto each row of `components` (`[K][N]`).
pub fn project(centered: &FixedVector, components: &[Vec<i32>], total_bits: u8) -> Result<FixedVector> {
    if let Some(row) = components.iter().find(|row| row.len() != centered.len()) {
        return Err(KernelError::Shape {
            what: "component row",
            expected: centered.len(),
            got: row.len(),
        });
    }

    let proj = components
        .iter()
        .map(|row| centered.dot(row, total_bits))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(FixedVector::from_raw(proj, centered.scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center() {
        let features = FixedVector::from_raw(vec![512, 0, -256], 8);
        let centered = center(&features, &[256, 256, -256], 32).unwrap();
        assert_eq!(centered.data, vec![256, -256, 0]);
    }

    #[test]
    fn test_center_wraps() {
        let features = FixedVector::from_raw(vec![i32::MIN], 8);
        let centered = center(&features, &[1], 32).unwrap();
        assert_eq!(centered.data, vec![i32::MAX]);
    }

    #[test]
    fn test_center_shape_error() {
        let features = FixedVector::from_raw(vec![0; 3], 8);
        assert!(matches!(
            center(&features, &[0; 4], 32),
            Err(KernelError::Shape { expected: 4, got: 3, .. })
        ));
    }

    #[test]
    fn test_project_identity_rows() {
        // 1.0 in Q24.8 is 256
        let centered = FixedVector::from_raw(vec![512, -768, 1024], 8);
        let components = vec![vec![256, 0, 0], vec![0, 256, 0], vec![256, 256, 256]];
        let proj = project(&centered, &components, 32).unwrap();
        assert_eq!(proj.data, vec![512, -768, 768]);
    }

    #[test]
    fn test_project_negative_floor() {
        // -1 * 1 = -1, >> 8 floors to -1 rather than truncating to 0
        let centered = FixedVector::from_raw(vec![-1], 8);
        let proj = project(&centered, &[vec![1]], 32).unwrap();
        assert_eq!(proj.data, vec![-1]);
    }

    #[test]
    fn test_project_wraps_once_per_dot_product() {
        // Each term is 2^30 * 2^8 >> 8 = 2^30; two terms sum to 2^31,
        // which only overflows once the whole sum is narrowed.
        let centered = FixedVector::from_raw(vec![1 << 30, 1 << 30], 8);
        let proj = project(&centered, &[vec![256, 256]], 32).unwrap();
        assert_eq!(proj.data, vec![i32::MIN]);

        // Adding a third term of -2^30 brings the total back in range
        let centered = FixedVector::from_raw(vec![1 << 30, 1 << 30, -(1 << 30)], 8);
        let proj = project(&centered, &[vec![256, 256, 256]], 32).unwrap();
        assert_eq!(proj.data, vec![1 << 30]);
    }

    #[test]
    fn test_project_row_shape_error() {
        let centered = FixedVector::from_raw(vec![0; 3], 8);
        assert!(matches!(
            project(&centered, &[vec![0; 2]], 32),
            Err(KernelError::Shape { expected: 3, got: 2, .. })
        ));
    }

    #[test]
    fn test_project_no_components() {
        let centered = FixedVector::from_raw(vec![1, 2, 3], 8);
        assert!(project(&centered, &[], 32).unwrap().is_empty());
    }
}
