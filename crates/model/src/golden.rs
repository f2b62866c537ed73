//! Golden-reference artifact
//!
//! One record per scored sample. Written by the golden pipeline, read back by
//! the comparator.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::PcaConfig;
use crate::error::{ModelError, Result};

/// Expected hardware output for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenRecord {
    pub sample_id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub features_fixed: Vec<i32>,
    pub major_score_fixed: i32,
    pub minor_score_fixed: i32,
    #[serde(with = "crate::flag")]
    pub attack_detected: bool,
    /// Informational only, never compared against hardware
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_score_float: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_score_float: Option<f64>,
}

/// The full golden-reference file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldenReference {
    pub config: PcaConfig,
    pub num_samples: usize,
    pub results: Vec<GoldenRecord>,
}

impl GoldenReference {
    pub fn new(config: PcaConfig, results: Vec<GoldenRecord>) -> Self {
        Self {
            config,
            num_samples: results.len(),
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of samples flagged as attacks
    pub fn attack_count(&self) -> usize {
        self.results.iter().filter(|r| r.attack_detected).count()
    }

    /// Load a golden file. A missing file is reported as `MissingArtifact`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let golden: Self = serde_json::from_str(&content)?;
        if golden.num_samples != golden.results.len() {
            tracing::warn!(
                declared = golden.num_samples,
                actual = golden.results.len(),
                "Golden reference sample count disagrees with its results"
            );
        }
        Ok(golden)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
