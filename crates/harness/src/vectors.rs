//! Test-vector generation
//!
//! The builder owns an explicitly seeded ChaCha20 stream, so a seed fully
//! determines every generated vector. The diverse suite follows the
//! network-flow feature layout used by the anomaly models:
//!
//! | index | feature            |
//! |-------|--------------------|
//! | 0     | duration           |
//! | 4     | src_bytes          |
//! | 5     | dst_bytes          |
//! | 9     | num_failed_logins  |
//! | 11    | logged_in          |
//! | 12    | num_compromised    |
//! | 20-21 | connection counts  |
//! | 24-25 | error rates        |
//!
//! Indices past `n_features` are dropped, so smaller models still get a
//! full suite.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{HarnessError, Result};

/// One named raw feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVector {
    pub name: String,
    pub features: Vec<f64>,
    /// Label from the scenario, not from the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_attack: Option<bool>,
}

impl TestVector {
    pub fn new(name: impl Into<String>, features: Vec<f64>, expected_attack: Option<bool>) -> Self {
        Self {
            name: name.into(),
            features,
            expected_attack,
        }
    }
}

/// A generated suite and the seed that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestVectorSet {
    pub seed: u64,
    pub n_features: usize,
    pub vectors: Vec<TestVector>,
}

impl TestVectorSet {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let set: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if let Some(v) = set.vectors.iter().find(|v| v.features.len() != set.n_features) {
            return Err(HarnessError::InvalidInput(format!(
                "vector '{}' has {} features, expected {}",
                v.name,
                v.features.len(),
                set.n_features
            )));
        }
        Ok(set)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Deterministic generator of feature vectors
pub struct VectorBuilder {
    n_features: usize,
    seed: u64,
    rng: ChaCha20Rng,
}

impl VectorBuilder {
    pub fn new(n_features: usize, seed: u64) -> Self {
        Self {
            n_features,
            seed,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// All zeros except the given `(index, value)` pairs
    pub fn sparse(&self, entries: &[(usize, f64)]) -> Vec<f64> {
        let mut v = vec![0.0; self.n_features];
        for &(i, x) in entries {
            if let Some(slot) = v.get_mut(i) {
                *slot = x;
            }
        }
        v
    }

    /// Every feature drawn from `range(index)`
    pub fn random_with<F>(&mut self, mut range: F) -> Vec<f64>
    where
        F: FnMut(usize) -> (f64, f64),
    {
        (0..self.n_features)
            .map(|i| {
                let (lo, hi) = range(i);
                self.rng.gen_range(lo..hi)
            })
            .collect()
    }

    /// The full diverse suite: fixed scenarios, sweeps and seeded random cases
    pub fn diverse_suite(mut self) -> TestVectorSet {
        let mut vectors = Vec::new();
        self.push_scenarios(&mut vectors);
        self.push_random_cases(&mut vectors);
        self.push_sweeps(&mut vectors);
        self.push_synthetic(&mut vectors);

        tracing::info!(
            seed = self.seed,
            vectors = vectors.len(),
            n_features = self.n_features,
            "Built test vector suite"
        );
        TestVectorSet {
            seed: self.seed,
            n_features: self.n_features,
            vectors,
        }
    }

    fn push_scenarios(&mut self, out: &mut Vec<TestVector>) {
        let scenarios: [(&str, &[(usize, f64)], Option<bool>); 8] = [
            ("All zeros", &[], Some(false)),
            (
                "Small values",
                &[(0, 0.1), (4, 10.0), (5, 5.0), (11, 0.5)],
                Some(false),
            ),
            (
                "Large src_bytes",
                &[(0, 5.0), (4, 50000.0), (5, 100.0), (11, 1.0)],
                Some(true),
            ),
            (
                "High connection rate",
                &[
                    (0, 0.1), (4, 100.0), (5, 50.0), (11, 1.0),
                    (20, 0.95), (21, 0.95), (24, 0.8), (25, 0.9),
                ],
                Some(true),
            ),
            (
                "Failed logins",
                &[(0, 10.0), (4, 200.0), (5, 100.0), (9, 5.0), (12, 5.0)],
                Some(true),
            ),
            (
                "Boundary",
                &[
                    (0, 1.0), (4, 1000.0), (5, 500.0), (11, 0.8),
                    (20, 0.5), (21, 0.5), (24, 0.5), (25, 0.5),
                ],
                None,
            ),
            (
                "Max values",
                &[
                    (0, 100.0), (4, 100000.0), (5, 50000.0), (11, 1.0),
                    (20, 1.0), (21, 1.0), (24, 1.0), (25, 1.0),
                ],
                Some(true),
            ),
            (
                "Mixed high rate",
                &[
                    (0, 2.0), (4, 5000.0), (5, 2500.0), (11, 1.0),
                    (20, 0.99), (21, 0.99), (24, 0.95), (25, 0.98),
                ],
                Some(true),
            ),
        ];
        for (name, entries, expected) in scenarios {
            out.push(TestVector::new(name, self.sparse(entries), expected));
        }

        out.push(TestVector::new(
            "Very small values",
            vec![0.001; self.n_features],
            Some(false),
        ));
        out.push(TestVector::new(
            "Alternating",
            (0..self.n_features)
                .map(|i| if i % 2 == 0 { 100.0 } else { 0.0 })
                .collect(),
            Some(true),
        ));
        out.push(TestVector::new(
            "Typical normal",
            self.sparse(&[
                (0, 0.5), (4, 500.0), (5, 250.0), (11, 0.7),
                (20, 0.3), (21, 0.3), (24, 0.4), (25, 0.4),
            ]),
            Some(false),
        ));
    }

    fn push_random_cases(&mut self, out: &mut Vec<TestVector>) {
        let normal = self.random_with(|i| match i {
            4 => (0.0, 1000.0),
            5 => (0.0, 500.0),
            _ => (0.0, 1.0),
        });
        out.push(TestVector::new("Random normal", normal, Some(false)));

        let attack = self.random_with(|i| match i {
            4 => (10000.0, 50000.0),
            5 => (5000.0, 10000.0),
            i if i > 20 => (0.7, 1.0),
            _ => (0.0, 1.0),
        });
        out.push(TestVector::new("Random attack", attack, Some(true)));

        for k in 0..5 {
            let features = self.random_with(|i| match i {
                4 => (0.0, 10000.0),
                5 => (0.0, 5000.0),
                _ => (0.0, 1.0),
            });
            out.push(TestVector::new(format!("Random variation {}", k + 1), features, None));
        }
    }

    fn push_sweeps(&mut self, out: &mut Vec<TestVector>) {
        for rate in [0.5, 0.6, 0.7, 0.85, 0.95] {
            out.push(TestVector::new(
                format!("Port scan rate {}", rate),
                self.sparse(&[
                    (0, 0.5), (4, 200.0), (5, 100.0), (11, 0.5),
                    (20, rate), (21, rate), (24, rate * 0.9), (25, rate * 0.95),
                ]),
                Some(rate > 0.7),
            ));
        }

        for bytes in [100.0, 1000.0, 5000.0, 20000.0, 80000.0] {
            out.push(TestVector::new(
                format!("Transfer {} bytes", bytes),
                self.sparse(&[
                    (0, 1.0), (4, bytes), (5, bytes / 2.0), (11, 0.8),
                    (20, 0.2), (21, 0.2), (24, 0.3), (25, 0.3),
                ]),
                Some(bytes > 10000.0),
            ));
        }

        for failed in [1.0, 3.0, 5.0, 10.0, 20.0] {
            let logged_in = if failed > 5.0 { 0.0 } else { 1.0 };
            out.push(TestVector::new(
                format!("Failed logins x{}", failed),
                self.sparse(&[
                    (0, 5.0), (4, 150.0), (5, 75.0), (9, failed),
                    (11, logged_in), (12, failed),
                ]),
                Some(failed >= 5.0),
            ));
        }
    }

    fn push_synthetic(&mut self, out: &mut Vec<TestVector>) {
        for k in 0..10 {
            let features = self.random_with(|i| match i {
                4 => (0.0, 0.05),
                5 => (0.0, 0.02),
                _ => (0.0, 0.001),
            });
            out.push(TestVector::new(format!("Synthetic normal {}", k + 1), features, Some(false)));
        }

        for k in 0..10 {
            let features = self.random_with(|i| match i {
                0 => (0.5, 2.0),
                4 => (5.0, 20.0),
                5 => (2.0, 10.0),
                i if i > 20 => (0.7, 1.0),
                _ => (0.0, 0.5),
            });
            out.push(TestVector::new(format!("Attack pattern {}", k + 1), features, Some(true)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_suite() {
        let a = VectorBuilder::new(28, 42).diverse_suite();
        let b = VectorBuilder::new(28, 42).diverse_suite();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_changes_random_cases_only() {
        let a = VectorBuilder::new(28, 42).diverse_suite();
        let b = VectorBuilder::new(28, 43).diverse_suite();
        assert_eq!(a.vectors[0], b.vectors[0]);
        let random = a.vectors.iter().position(|v| v.name == "Random normal").unwrap();
        assert_ne!(a.vectors[random], b.vectors[random]);
    }

    #[test]
    fn test_suite_shape() {
        let set = VectorBuilder::new(28, 7).diverse_suite();
        assert_eq!(set.len(), 11 + 7 + 15 + 20);
        assert!(set.vectors.iter().all(|v| v.features.len() == 28));
        assert!(set.vectors.iter().flat_map(|v| &v.features).all(|x| x.is_finite()));
    }

    #[test]
    fn test_small_models_drop_high_indices() {
        let builder = VectorBuilder::new(6, 0);
        assert_eq!(builder.sparse(&[(4, 1.0), (20, 9.0)]), vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let set = builder.diverse_suite();
        assert!(set.vectors.iter().all(|v| v.features.len() == 6));
    }

    #[test]
    fn test_random_ranges_respected() {
        let mut builder = VectorBuilder::new(8, 1);
        for _ in 0..50 {
            let v = builder.random_with(|i| if i == 3 { (10.0, 20.0) } else { (0.0, 1.0) });
            assert!((10.0..20.0).contains(&v[3]));
            assert!((0.0..1.0).contains(&v[0]));
        }
    }

    #[test]
    fn test_file_roundtrip_and_validation() {
        let path = std::env::temp_dir().join("fxpca-vectors-test.json");
        let set = VectorBuilder::new(4, 3).diverse_suite();
        set.to_json_file(&path).unwrap();
        assert_eq!(TestVectorSet::from_json_file(&path).unwrap(), set);

        let mut bad = set.clone();
        bad.vectors[0].features.pop();
        bad.to_json_file(&path).unwrap();
        assert!(matches!(
            TestVectorSet::from_json_file(&path),
            Err(HarnessError::InvalidInput(_))
        ));
        let _ = std::fs::remove_file(&path);
    }
}
