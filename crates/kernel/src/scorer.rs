//! Golden scorer: quantize + score against one loaded model
//!
//! Vectors are independent, so batches are scored in parallel with rayon.
//! Within a vector the accumulation order is the fixed sequential order of
//! the single-vector path, and results come back in input order.

use rayon::prelude::*;
use std::sync::Arc;

use fxpca_fixed_point::{FixedVector, Quantizer};
use fxpca_model::PcaModel;

use crate::error::{KernelError, Result};
use crate::float_reference::{score_float, FloatScores};
use crate::scoring::{score_fixed, score_fixed_traced, ScoreResult, ScoreTrace};

/// Scores feature vectors against a shared, read-only model
#[derive(Debug, Clone)]
pub struct GoldenScorer {
    model: Arc<PcaModel>,
    quantizer: Quantizer,
}

impl GoldenScorer {
    pub fn new(model: PcaModel) -> Result<Self> {
        Self::from_shared(Arc::new(model))
    }

    pub fn from_shared(model: Arc<PcaModel>) -> Result<Self> {
        let quantizer = model.config().quantizer()?;
        Ok(Self { model, quantizer })
    }

    pub fn model(&self) -> &PcaModel {
        &self.model
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    /// Quantize raw features with the model's mode and register format
    pub fn quantize(&self, features: &[f64]) -> Result<FixedVector> {
        if features.len() != self.model.n_features() {
            return Err(KernelError::Shape {
                what: "feature vector",
                expected: self.model.n_features(),
                got: features.len(),
            });
        }
        Ok(self.quantizer.quantize_slice(features)?)
    }

    /// Score an already-quantized vector
    pub fn score_fixed(&self, features: &FixedVector) -> Result<ScoreResult> {
        score_fixed(&self.model, features)
    }

    /// Quantize, then score
    pub fn score_features(&self, features: &[f64]) -> Result<ScoreResult> {
        self.score_fixed(&self.quantize(features)?)
    }

    /// Quantize, then score, keeping every intermediate register
    pub fn trace_features(&self, features: &[f64]) -> Result<ScoreTrace> {
        score_fixed_traced(&self.model, &self.quantize(features)?)
    }

    /// Float reference scores, when the model carries float parameters
    pub fn score_float(&self, features: &[f64]) -> Result<FloatScores> {
        let params = self
            .model
            .float_params()
            .ok_or(KernelError::MissingFloatParameters)?;
        score_float(params, features)
    }

    /// Score many quantized vectors in parallel; output order matches input
    pub fn score_batch(&self, batch: &[FixedVector]) -> Result<Vec<ScoreResult>> {
        let results = batch
            .par_iter()
            .map(|features| self.score_fixed(features))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            vectors = results.len(),
            attacks = results.iter().filter(|r| r.attack_detected).count(),
            "Scored batch"
        );
        Ok(results)
    }

    /// Quantize and score many raw vectors in parallel
    pub fn score_features_batch(&self, batch: &[Vec<f64>]) -> Result<Vec<ScoreResult>> {
        let quantized = batch
            .par_iter()
            .map(|features| self.quantize(features))
            .collect::<Result<Vec<_>>>()?;
        self.score_batch(&quantized)
    }
}
