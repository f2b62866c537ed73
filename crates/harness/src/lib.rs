//! fxpca Harness
//!
//! Glue between the golden kernel and the hardware verification flow:
//! seeded test-vector suites, golden-reference generation, hardware trace
//! loading and the golden-vs-hardware comparator.

mod comparator;
mod config;
mod error;
mod pipeline;
mod trace;
mod vectors;

pub use comparator::{
    compare, compare_all, compare_trace, BatchOutcome, ComparisonOutcome, ComparisonReport,
    IndexBase, Mismatch, TraceWarning,
};
pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use pipeline::{golden_scores, verify_trace, GoldenPipeline};
pub use trace::{HardwareTrace, TraceEntry};
pub use vectors::{TestVector, TestVectorSet, VectorBuilder};
