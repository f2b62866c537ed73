//! Harness error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Model error: {0}")]
    Model(#[from] fxpca_model::ModelError),

    #[error("Kernel error: {0}")]
    Kernel(#[from] fxpca_kernel::KernelError),

    #[error("Fixed-point error: {0}")]
    FixedPoint(#[from] fxpca_fixed_point::FixedPointError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl HarnessError {
    /// True when the error comes from an input file that does not exist
    pub fn is_missing_artifact(&self) -> bool {
        matches!(
            self,
            Self::MissingArtifact { .. }
                | Self::Model(fxpca_model::ModelError::MissingArtifact { .. })
                | Self::Kernel(fxpca_kernel::KernelError::Model(
                    fxpca_model::ModelError::MissingArtifact { .. }
                ))
        )
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
