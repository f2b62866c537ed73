//! Quantized PCA model

use serde::{Deserialize, Serialize};
use std::path::Path;

use fxpca_fixed_point::fits_width;

use crate::config::PcaConfig;
use crate::error::{ModelError, Result};

/// On-disk layout produced by the training tooling.
///
/// Float fields are optional; extra keys such as `explained_variance_ratio`
/// are ignored.
#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    config: PcaConfig,
    mean_fixed: Vec<i64>,
    major_components_fixed: Vec<Vec<i64>>,
    minor_components_fixed: Vec<Vec<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    major_components: Option<Vec<Vec<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    minor_components: Option<Vec<Vec<f64>>>,
}

/// Unquantized parameters, used only by the float reference path
#[derive(Debug, Clone, PartialEq)]
pub struct FloatParams {
    pub mean: Vec<f64>,
    pub major: Vec<Vec<f64>>,
    pub minor: Vec<Vec<f64>>,
}

/// A validated, immutable quantized PCA model
#[derive(Debug, Clone, PartialEq)]
pub struct PcaModel {
    config: PcaConfig,
    mean: Vec<i32>,
    major: Vec<Vec<i32>>,
    minor: Vec<Vec<i32>>,
    float: Option<FloatParams>,
}

fn check_len(what: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(ModelError::Shape {
            what: what.to_string(),
            expected,
            got,
        });
    }
    Ok(())
}

fn check_matrix_shape<T>(what: &str, rows: &[Vec<T>], n_rows: usize, n_cols: usize) -> Result<()> {
    check_len(what, n_rows, rows.len())?;
    for (k, row) in rows.iter().enumerate() {
        check_len(&format!("{what}[{k}]"), n_cols, row.len())?;
    }
    Ok(())
}

fn narrow_row(what: &str, row: &[i64], total_bits: u8) -> Result<Vec<i32>> {
    row.iter()
        .enumerate()
        .map(|(index, &value)| {
            if fits_width(value, total_bits) {
                Ok(value as i32)
            } else {
                Err(ModelError::CoefficientOutOfRange {
                    what: what.to_string(),
                    index,
                    value,
                    total_bits,
                })
            }
        })
        .collect()
}

fn widen_row(row: &[i32]) -> Vec<i64> {
    row.iter().map(|&v| i64::from(v)).collect()
}

impl PcaModel {
    /// Build a model from quantized parameters, validating every invariant
    pub fn new(
        config: PcaConfig,
        mean: Vec<i32>,
        major: Vec<Vec<i32>>,
        minor: Vec<Vec<i32>>,
    ) -> Result<Self> {
        Self::from_wide(
            config,
            widen_row(&mean),
            major.iter().map(|r| widen_row(r)).collect(),
            minor.iter().map(|r| widen_row(r)).collect(),
        )
    }

    fn from_wide(
        config: PcaConfig,
        mean: Vec<i64>,
        major: Vec<Vec<i64>>,
        minor: Vec<Vec<i64>>,
    ) -> Result<Self> {
        config.validate()?;
        let n = config.n_features;
        let bits = config.total_bits;

        check_len("mean_fixed", n, mean.len())?;
        check_matrix_shape("major_components_fixed", &major, config.n_major_components, n)?;
        check_matrix_shape("minor_components_fixed", &minor, config.n_minor_components, n)?;

        let mean = narrow_row("mean_fixed", &mean, bits)?;
        let major = major
            .iter()
            .enumerate()
            .map(|(k, row)| narrow_row(&format!("major_components_fixed[{k}]"), row, bits))
            .collect::<Result<Vec<_>>>()?;
        let minor = minor
            .iter()
            .enumerate()
            .map(|(k, row)| narrow_row(&format!("minor_components_fixed[{k}]"), row, bits))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config,
            mean,
            major,
            minor,
            float: None,
        })
    }

    /// Attach float parameters for the float reference path
    pub fn with_float_params(mut self, params: FloatParams) -> Result<Self> {
        let n = self.config.n_features;
        check_len("mean", n, params.mean.len())?;
        check_matrix_shape("major_components", &params.major, self.config.n_major_components, n)?;
        check_matrix_shape("minor_components", &params.minor, self.config.n_minor_components, n)?;
        self.float = Some(params);
        Ok(self)
    }

    /// Parse a model from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        let model = Self::from_wide(
            file.config,
            file.mean_fixed,
            file.major_components_fixed,
            file.minor_components_fixed,
        )?;

        match (file.mean, file.major_components, file.minor_components) {
            (Some(mean), Some(major), Some(minor)) => {
                model.with_float_params(FloatParams { mean, major, minor })
            }
            _ => Ok(model),
        }
    }

    /// Load a model file. A missing file is reported as `MissingArtifact`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::MissingArtifact {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let model = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            n_features = model.config.n_features,
            n_major = model.config.n_major_components,
            n_minor = model.config.n_minor_components,
            format = %model.config.q_format(),
            "Loaded PCA model"
        );
        Ok(model)
    }

    /// Serialize in the same layout `from_json_str` reads
    pub fn to_json_string(&self) -> Result<String> {
        let file = ModelFile {
            config: self.config.clone(),
            mean_fixed: widen_row(&self.mean),
            major_components_fixed: self.major.iter().map(|r| widen_row(r)).collect(),
            minor_components_fixed: self.minor.iter().map(|r| widen_row(r)).collect(),
            mean: self.float.as_ref().map(|f| f.mean.clone()),
            major_components: self.float.as_ref().map(|f| f.major.clone()),
            minor_components: self.float.as_ref().map(|f| f.minor.clone()),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Write the model as JSON
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn config(&self) -> &PcaConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.config.n_features
    }

    pub fn frac_bits(&self) -> u8 {
        self.config.frac_bits
    }

    pub fn total_bits(&self) -> u8 {
        self.config.total_bits
    }

    /// Quantized mean, one entry per feature
    pub fn mean(&self) -> &[i32] {
        &self.mean
    }

    /// Major components, `[Q][N]`
    pub fn major(&self) -> &[Vec<i32>] {
        &self.major
    }

    /// Minor components, `[R][N]`
    pub fn minor(&self) -> &[Vec<i32>] {
        &self.minor
    }

    pub fn float_params(&self) -> Option<&FloatParams> {
        self.float.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> PcaConfig {
        PcaConfig {
            n_features: 3,
            n_major_components: 1,
            n_minor_components: 1,
            total_bits: 32,
            frac_bits: 8,
            ..Default::default()
        }
    }

    fn tiny_model() -> PcaModel {
        PcaModel::new(
            tiny_config(),
            vec![0, 256, -256],
            vec![vec![256, 0, 0]],
            vec![vec![0, 0, 256]],
        )
        .unwrap()
    }

    #[test]
    fn test_new_valid() {
        let model = tiny_model();
        assert_eq!(model.n_features(), 3);
        assert_eq!(model.major().len(), 1);
        assert_eq!(model.minor()[0], vec![0, 0, 256]);
        assert!(model.float_params().is_none());
    }

    #[test]
    fn test_mean_length_mismatch() {
        let err = PcaModel::new(tiny_config(), vec![0, 0], vec![vec![0; 3]], vec![vec![0; 3]])
            .unwrap_err();
        assert!(matches!(err, ModelError::Shape { expected: 3, got: 2, .. }));
    }

    #[test]
    fn test_component_count_mismatch() {
        let err = PcaModel::new(tiny_config(), vec![0; 3], vec![], vec![vec![0; 3]]).unwrap_err();
        assert!(matches!(err, ModelError::Shape { expected: 1, got: 0, .. }));
    }

    #[test]
    fn test_ragged_component_row() {
        let err = PcaModel::new(tiny_config(), vec![0; 3], vec![vec![0; 3]], vec![vec![0; 4]])
            .unwrap_err();
        assert!(matches!(err, ModelError::Shape { expected: 3, got: 4, .. }));
    }

    #[test]
    fn test_coefficient_out_of_range() {
        let config = PcaConfig {
            total_bits: 16,
            ..tiny_config()
        };
        let err = PcaModel::new(config, vec![0, 40000, 0], vec![vec![0; 3]], vec![vec![0; 3]])
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::CoefficientOutOfRange { index: 1, value: 40000, .. }
        ));
    }

    #[test]
    fn test_json_out_of_range_for_32_bits() {
        let json = r#"{
            "config": {"n_features": 1, "n_major_components": 0, "n_minor_components": 0,
                       "total_bits": 32, "frac_bits": 8},
            "mean_fixed": [2147483648],
            "major_components_fixed": [],
            "minor_components_fixed": []
        }"#;
        assert!(matches!(
            PcaModel::from_json_str(json),
            Err(ModelError::CoefficientOutOfRange { .. })
        ));
    }

    #[test]
    fn test_json_config_keys_required() {
        let empty = r#"{
            "config": {},
            "mean_fixed": [0],
            "major_components_fixed": [],
            "minor_components_fixed": []
        }"#;
        assert!(matches!(PcaModel::from_json_str(empty), Err(ModelError::Json(_))));

        let misspelled = r#"{
            "config": {"n_features": 1, "n_major_components": 0, "n_minor_components": 0,
                       "total_bits": 32, "frac_bit": 12},
            "mean_fixed": [0],
            "major_components_fixed": [],
            "minor_components_fixed": []
        }"#;
        assert!(matches!(PcaModel::from_json_str(misspelled), Err(ModelError::Json(_))));
    }

    #[test]
    fn test_json_roundtrip_with_float() {
        let model = tiny_model()
            .with_float_params(FloatParams {
                mean: vec![0.0, 1.0, -1.0],
                major: vec![vec![1.0, 0.0, 0.0]],
                minor: vec![vec![0.0, 0.0, 1.0]],
            })
            .unwrap();
        let json = model.to_json_string().unwrap();
        let back = PcaModel::from_json_str(&json).unwrap();
        assert_eq!(model, back);
    }

    #[test]
    fn test_json_ignores_extra_fields() {
        let json = r#"{
            "config": {"n_features": 2, "n_major_components": 1, "n_minor_components": 0,
                       "total_bits": 32, "frac_bits": 8},
            "mean_fixed": [1, 2],
            "major_components_fixed": [[3, 4]],
            "minor_components_fixed": [],
            "explained_variance_ratio": [0.9],
            "scale": [1.0, 1.0]
        }"#;
        let model = PcaModel::from_json_str(json).unwrap();
        assert_eq!(model.mean(), &[1, 2]);
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("fxpca-model-test-missing").join("model.json");
        assert!(matches!(
            PcaModel::from_json_file(&path),
            Err(ModelError::MissingArtifact { .. })
        ));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = std::env::temp_dir().join("fxpca-model-test-roundtrip");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");

        let model = tiny_model();
        model.to_json_file(&path).unwrap();
        let loaded = PcaModel::from_json_file(&path).unwrap();
        assert_eq!(model, loaded);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
