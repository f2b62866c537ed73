//! fxpca Scoring Kernel
//!
//! Golden reference for the PCA anomaly-scoring accelerator. Every stage
//! mirrors the hardware datapath: multiply-accumulate into a wrapping 64-bit
//! accumulator, one arithmetic right shift by `frac_bits`, then wraparound to
//! the register width. Overflow is reproduced, never guarded against.
//!
//! Pipeline: center → project (major, minor) → reconstruct (major) →
//! score (SPE, minor energy) → classify.

mod classifier;
mod error;
pub mod float_reference;
mod projection;
mod reconstruction;
mod scorer;
mod scoring;

pub use classifier::{classify, threshold, THRESHOLD_UNITS};
pub use error::{KernelError, Result};
pub use float_reference::{score_float, FloatScores};
pub use projection::{center, project};
pub use reconstruction::reconstruct;
pub use scorer::GoldenScorer;
pub use scoring::{major_score, minor_score, score_fixed, score_fixed_traced, ScoreResult, ScoreTrace};
