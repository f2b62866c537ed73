//! Floating-point PCA scores.
//!
//! Separate from the fixed-point path. These values are informational
//! (written next to golden records) and are never compared against
//! hardware output.

use fxpca_model::FloatParams;

use crate::error::{KernelError, Result};

/// Unquantized major (SPE) and minor scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatScores {
    pub major_score: f64,
    pub minor_score: f64,
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Score raw float features with unquantized parameters
pub fn score_float(params: &FloatParams, features: &[f64]) -> Result<FloatScores> {
    if features.len() != params.mean.len() {
        return Err(KernelError::Shape {
            what: "feature vector",
            expected: params.mean.len(),
            got: features.len(),
        });
    }

    let centered: Vec<f64> = features.iter().zip(&params.mean).map(|(x, m)| x - m).collect();
    let major_proj: Vec<f64> = params.major.iter().map(|row| dot(&centered, row)).collect();

    let mut recon = vec![0.0; centered.len()];
    for (p, row) in major_proj.iter().zip(&params.major) {
        for (r, m) in recon.iter_mut().zip(row) {
            *r += p * m;
        }
    }

    let major_score: f64 = centered
        .iter()
        .zip(&recon)
        .map(|(c, r)| (c - r) * (c - r))
        .sum();
    let minor_score: f64 = params
        .minor
        .iter()
        .map(|row| dot(&centered, row).powi(2))
        .sum();

    Ok(FloatScores {
        major_score,
        minor_score,
    })
}
