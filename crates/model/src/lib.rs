//! fxpca Model
//!
//! Quantized PCA parameters (mean, major and minor component matrices) and
//! the JSON artifacts exchanged with the training and simulation tooling.
//! A model is validated once at load time and is read-only afterwards.

mod config;
mod error;
pub mod flag;
mod golden;
mod model;

pub use config::PcaConfig;
pub use error::{ModelError, Result};
pub use golden::{GoldenRecord, GoldenReference};
pub use model::{FloatParams, PcaModel};
