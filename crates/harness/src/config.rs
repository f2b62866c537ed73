//! Harness configuration

use crate::comparator::IndexBase;
use crate::error::{HarnessError, Result};

/// Comparison and generation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Allowed score difference in raw units. No default; must be chosen.
    pub tolerance: Option<u64>,

    /// Mismatches listed in a report before the rest are summarized
    pub max_listed_mismatches: usize,

    /// Numbering of test ids in hardware traces
    pub index_base: IndexBase,

    /// Seed for generated test vectors
    pub seed: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tolerance: None,
            max_listed_mismatches: 10,
            index_base: IndexBase::One,
            seed: 42,
        }
    }
}

impl HarnessConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup; unparsable values keep the default
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tol) = lookup("FXPCA_TOLERANCE") {
            match tol.trim().parse() {
                Ok(t) => config.tolerance = Some(t),
                Err(_) => tracing::warn!(value = %tol, "Ignoring unparsable FXPCA_TOLERANCE"),
            }
        }

        if let Some(max) = lookup("FXPCA_MAX_LISTED_MISMATCHES") {
            if let Ok(m) = max.trim().parse() {
                config.max_listed_mismatches = m;
            }
        }

        if let Some(base) = lookup("FXPCA_INDEX_BASE") {
            if let Some(b) = IndexBase::from_str(&base) {
                config.index_base = b;
            }
        }

        if let Some(seed) = lookup("FXPCA_SEED") {
            if let Ok(s) = seed.trim().parse() {
                config.seed = s;
            }
        }

        config
    }

    /// The tolerance, or an error naming how to set it
    pub fn require_tolerance(&self) -> Result<u64> {
        self.tolerance.ok_or_else(|| {
            HarnessError::Config(
                "no comparison tolerance given; pass --tolerance or set FXPCA_TOLERANCE".into(),
            )
        })
    }
}
