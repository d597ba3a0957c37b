//! DermaLens core: on-device skin analysis.
//!
//! The crate owns everything between an uploaded image and a finished
//! report: model slot coordination ([`analysis::ModelLoadCoordinator`]),
//! the inference seam ([`backend::InferenceBackend`]), raw-output mapping,
//! the synthetic fallback, and result enhancement. The full flow lives in
//! [`analysis::AnalysisPipeline::analyze`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dermalens::analysis::{AnalysisPipeline, ModelLoadCoordinator};
//! use dermalens::backend::ImageInput;
//! use dermalens::config::AnalysisConfig;
//!
//! # async fn run(backend: Arc<impl dermalens::backend::InferenceBackend>) {
//! let coordinator = Arc::new(ModelLoadCoordinator::new(Arc::clone(&backend)));
//! let pipeline = AnalysisPipeline::new(backend, coordinator, AnalysisConfig::default());
//! let result = pipeline
//!     .analyze(&ImageInput::new("data:image/jpeg;base64,..."))
//!     .await;
//! # let _ = result;
//! # }
//! ```

pub mod analysis;
pub mod backend;
pub mod config;
pub mod models;
pub mod report;

pub use analysis::{AnalysisPipeline, ModelLoadCoordinator};
pub use backend::{ImageInput, InferenceBackend};
pub use models::{AnalysisResult, ModelSlot};
