//! Anomaly scores
//!
//! Major score (SPE): `wrap((Σ_i residual[i]^2) >> frac_bits)` with
//! `residual[i] = wrap(centered[i] - recon[i])`.
//! Minor score: `wrap((Σ_k proj_minor[k]^2) >> frac_bits)`.
//!
//! Both are `total_bits`-wide signed registers and may come out negative
//! when the sum of squares overflows the register. That is the hardware
//! behavior and is not an error.

use serde::{Deserialize, Serialize};

use fxpca_fixed_point::FixedVector;
use fxpca_model::{GoldenRecord, PcaModel};

use crate::classifier::classify;
use crate::error::{KernelError, Result};
use crate::projection::{center, project};
use crate::reconstruction::reconstruct;

/// Kernel output for one feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreResult {
    pub major_score: i32,
    pub minor_score: i32,
    pub attack_detected: bool,
}

impl ScoreResult {
    pub fn new(major_score: i32, minor_score: i32, attack_detected: bool) -> Self {
        Self {
            major_score,
            minor_score,
            attack_detected,
        }
    }

    /// Build from the two scores, classifying with the standard threshold
    pub fn from_scores(major_score: i32, minor_score: i32, frac_bits: u8) -> Self {
        Self::new(major_score, minor_score, classify(major_score, minor_score, frac_bits))
    }
}

impl From<&GoldenRecord> for ScoreResult {
    fn from(record: &GoldenRecord) -> Self {
        Self::new(
            record.major_score_fixed,
            record.minor_score_fixed,
            record.attack_detected,
        )
    }
}

/// Every intermediate register of one scoring run, for diagnosing mismatches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreTrace {
    pub centered: FixedVector,
    pub major_proj: FixedVector,
    pub minor_proj: FixedVector,
    pub recon: FixedVector,
    pub residual: FixedVector,
    pub result: ScoreResult,
}

/// Squared prediction error between the centered input and its reconstruction
pub fn major_score(centered: &FixedVector, recon: &FixedVector, total_bits: u8) -> Result<i32> {
    let residual = centered.wrapping_sub(recon, total_bits)?;
    Ok(residual.energy(total_bits))
}

/// Energy of the minor-subspace projection
pub fn minor_score(minor_proj: &FixedVector, total_bits: u8) -> i32 {
    minor_proj.energy(total_bits)
}

/// Score one quantized feature vector against `model`
pub fn score_fixed(model: &PcaModel, features: &FixedVector) -> Result<ScoreResult> {
    Ok(score_fixed_traced(model, features)?.result)
}

/// Like [`score_fixed`], keeping every intermediate vector
pub fn score_fixed_traced(model: &PcaModel, features: &FixedVector) -> Result<ScoreTrace> {
    let n = model.n_features();
    let frac_bits = model.frac_bits();
    let total_bits = model.total_bits();

    // Reject before any arithmetic
    if features.len() != n {
        return Err(KernelError::Shape {
            what: "feature vector",
            expected: n,
            got: features.len(),
        });
    }
    if features.scale != frac_bits {
        return Err(KernelError::ScaleMismatch {
            expected: frac_bits,
            got: features.scale,
        });
    }

    let centered = center(features, model.mean(), total_bits)?;
    let major_proj = project(&centered, model.major(), total_bits)?;
    let minor_proj = project(&centered, model.minor(), total_bits)?;
    let recon = reconstruct(&major_proj, model.major(), n, total_bits)?;
    let residual = centered.wrapping_sub(&recon, total_bits)?;

    let major = major_score(&centered, &recon, total_bits)?;
    let minor = minor_score(&minor_proj, total_bits);
    let result = ScoreResult::from_scores(major, minor, frac_bits);

    tracing::debug!(
        major_score = result.major_score,
        minor_score = result.minor_score,
        attack = result.attack_detected,
        "Scored feature vector"
    );

    Ok(ScoreTrace {
        centered,
        major_proj,
        minor_proj,
        recon,
        residual,
        result,
    })
}
