//! Golden-reference pipeline
//!
//! Vectors in, golden file out; golden file plus hardware trace in,
//! comparison out.

use std::path::Path;

use fxpca_fixed_point::FixedVector;
use fxpca_kernel::{GoldenScorer, ScoreResult};
use fxpca_model::{GoldenRecord, GoldenReference, PcaModel};

use crate::comparator::{compare_all, compare_trace, BatchOutcome, IndexBase};
use crate::error::{HarnessError, Result};
use crate::trace::HardwareTrace;
use crate::vectors::TestVector;

/// Produces golden references for one model
pub struct GoldenPipeline {
    scorer: GoldenScorer,
    with_float: bool,
}

impl GoldenPipeline {
    pub fn new(model: PcaModel) -> Result<Self> {
        Ok(Self {
            scorer: GoldenScorer::new(model)?,
            with_float: false,
        })
    }

    pub fn from_model_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(PcaModel::from_json_file(path)?)
    }

    /// Also record float scores; requires a model with float parameters
    pub fn with_float(mut self, enabled: bool) -> Self {
        self.with_float = enabled;
        self
    }

    pub fn scorer(&self) -> &GoldenScorer {
        &self.scorer
    }

    /// Quantize and score every vector, in order
    pub fn generate(&self, vectors: &[TestVector]) -> Result<GoldenReference> {
        let quantized = vectors
            .iter()
            .map(|v| self.scorer.quantize(&v.features))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let scores = self.scorer.score_batch(&quantized)?;

        let mut results = Vec::with_capacity(vectors.len());
        for (sample_id, ((vector, fixed), score)) in
            vectors.iter().zip(quantized).zip(scores).enumerate()
        {
            let float = if self.with_float {
                Some(self.scorer.score_float(&vector.features)?)
            } else {
                None
            };
            if let Some(expected) = vector.expected_attack {
                if expected != score.attack_detected {
                    tracing::debug!(
                        sample_id,
                        name = %vector.name,
                        expected,
                        detected = score.attack_detected,
                        "Scenario label differs from model decision"
                    );
                }
            }
            results.push(GoldenRecord {
                sample_id,
                name: Some(vector.name.clone()),
                features_fixed: fixed.data,
                major_score_fixed: score.major_score,
                minor_score_fixed: score.minor_score,
                attack_detected: score.attack_detected,
                major_score_float: float.map(|f| f.major_score),
                minor_score_float: float.map(|f| f.minor_score),
            });
        }

        let golden = GoldenReference::new(self.scorer.model().config().clone(), results);
        tracing::info!(
            samples = golden.len(),
            attacks = golden.attack_count(),
            "Generated golden reference"
        );
        Ok(golden)
    }

    /// Re-score the stored fixed-point features and compare exactly against
    /// the stored scores. Catches golden files produced by a different model.
    pub fn self_check(&self, golden: &GoldenReference) -> Result<BatchOutcome> {
        let model = self.scorer.model();
        if &golden.config != model.config() {
            return Err(HarnessError::InvalidInput(format!(
                "golden reference was built for {:?}, model is {:?}",
                golden.config,
                model.config()
            )));
        }

        let inputs: Vec<FixedVector> = golden
            .results
            .iter()
            .map(|r| FixedVector::from_raw(r.features_fixed.clone(), model.frac_bits()))
            .collect();
        let rescored = self.scorer.score_batch(&inputs)?;
        Ok(compare_all(&golden_scores(golden), &rescored, 0))
    }
}

/// Stored golden scores in sample order
pub fn golden_scores(golden: &GoldenReference) -> Vec<ScoreResult> {
    golden.results.iter().map(ScoreResult::from).collect()
}

/// Compare a hardware trace against a golden reference
pub fn verify_trace(
    golden: &GoldenReference,
    trace: &HardwareTrace,
    tolerance: u64,
    index_base: IndexBase,
) -> BatchOutcome {
    compare_trace(
        &golden_scores(golden),
        &trace.entries,
        tolerance,
        index_base,
        golden.config.total_bits,
    )
}
