//! Hardware simulation traces
//!
//! A trace is what the RTL testbench reports per test: an id, the attack
//! flag and both score registers. Simulators commonly print a `[31:0]`
//! register unsigned, so scores are read as `i64` and reinterpreted as
//! signed registers of the model's width before comparison.

use serde::{Deserialize, Serialize};
use std::path::Path;

use fxpca_fixed_point::wrap_to_width;
use fxpca_kernel::ScoreResult;

use crate::error::{HarnessError, Result};

/// One reported hardware result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub test_id: usize,
    #[serde(with = "fxpca_model::flag")]
    pub attack_detected: bool,
    pub major_score: i64,
    pub minor_score: i64,
}

impl TraceEntry {
    pub fn new(test_id: usize, result: ScoreResult) -> Self {
        Self {
            test_id,
            attack_detected: result.attack_detected,
            major_score: result.major_score.into(),
            minor_score: result.minor_score.into(),
        }
    }

    /// Reported values as signed `total_bits` registers
    pub fn to_score_result(&self, total_bits: u8) -> ScoreResult {
        ScoreResult::new(
            wrap_to_width(self.major_score, total_bits),
            wrap_to_width(self.minor_score, total_bits),
            self.attack_detected,
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TraceFile {
    Wrapped { entries: Vec<TraceEntry> },
    Bare(Vec<TraceEntry>),
}

/// All entries reported by one simulation run, in reported order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HardwareTrace {
    pub entries: Vec<TraceEntry>,
}

impl HardwareTrace {
    pub fn new(entries: Vec<TraceEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `{"entries": [...]}` or a bare array of entries
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries = match serde_json::from_str(json)? {
            TraceFile::Wrapped { entries } | TraceFile::Bare(entries) => entries,
        };
        Ok(Self { entries })
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let trace = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), entries = trace.len(), "Loaded hardware trace");
        Ok(trace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_and_bare_forms() {
        let wrapped = r#"{"entries": [
            {"test_id": 1, "attack_detected": 0, "major_score": 174, "minor_score": 0}
        ]}"#;
        let bare = r#"[
            {"test_id": 1, "attack_detected": false, "major_score": 174, "minor_score": 0}
        ]"#;
        let a = HardwareTrace::from_json_str(wrapped).unwrap();
        let b = HardwareTrace::from_json_str(bare).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.entries[0].major_score, 174);
    }

    #[test]
    fn test_unsigned_register_dump_reinterpreted() {
        let entry = TraceEntry {
            test_id: 1,
            attack_detected: true,
            major_score: 4_294_967_295,
            minor_score: 2_500_000_000,
        };
        let result = entry.to_score_result(32);
        assert_eq!(result.major_score, -1);
        assert_eq!(result.minor_score, -1_794_967_296);
    }

    #[test]
    fn test_entry_from_score_result() {
        let entry = TraceEntry::new(7, ScoreResult::new(-3, 9, false));
        assert_eq!(entry.to_score_result(32), ScoreResult::new(-3, 9, false));
    }

    #[test]
    fn test_missing_trace_file() {
        let path = std::env::temp_dir().join("fxpca-trace-test-missing.json");
        let _ = std::fs::remove_file(&path);
        let err = HardwareTrace::from_json_file(&path).unwrap_err();
        assert!(err.is_missing_artifact());
    }
}
