//! PCA model configuration

use serde::{Deserialize, Serialize};

use fxpca_fixed_point::{check_width, QuantizeMode, Quantizer};

use crate::error::{ModelError, Result};

/// Dimensions and number format of a quantized PCA model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PcaConfig {
    /// Number of input features (N)
    pub n_features: usize,

    /// Number of major (high-variance) components (Q)
    pub n_major_components: usize,

    /// Number of minor (low-variance) components (R)
    pub n_minor_components: usize,

    /// Register width in bits
    pub total_bits: u8,

    /// Fractional bits of every pipeline value
    pub frac_bits: u8,

    /// Out-of-range policy for feature quantization
    #[serde(default)]
    pub quantize_mode: QuantizeMode,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            n_features: 28,
            n_major_components: 4,
            n_minor_components: 2,
            total_bits: 32,
            frac_bits: 8,
            quantize_mode: QuantizeMode::default(),
        }
    }
}

impl PcaConfig {
    /// Quantizer for feature vectors scored against this model
    pub fn quantizer(&self) -> Result<Quantizer> {
        Ok(Quantizer::new(self.frac_bits, self.total_bits, self.quantize_mode)?)
    }

    /// Number format label, e.g. "Q24.8"
    pub fn q_format(&self) -> String {
        format!("Q{}.{}", self.total_bits - self.frac_bits, self.frac_bits)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(ModelError::Config("n_features must be at least 1".into()));
        }
        check_width(self.total_bits, self.frac_bits)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PcaConfig::default();
        assert_eq!(config.n_features, 28);
        assert_eq!(config.n_major_components, 4);
        assert_eq!(config.n_minor_components, 2);
        assert_eq!(config.q_format(), "Q24.8");
        config.validate().unwrap();
    }

    #[test]
    fn test_json_without_mode() {
        let json = r#"{
            "n_features": 3,
            "n_major_components": 1,
            "n_minor_components": 1,
            "total_bits": 16,
            "frac_bits": 4
        }"#;
        let config: PcaConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.quantize_mode, QuantizeMode::Saturating);
        assert_eq!(config.q_format(), "Q12.4");
    }

    #[test]
    fn test_invalid_width() {
        let config = PcaConfig {
            total_bits: 40,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ModelError::FixedPoint(_))));

        let config = PcaConfig {
            n_features: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ModelError::Config(_))));
    }
}
