//! Skin analysis core: slot loading, raw-output mapping, the synthetic
//! fallback, result enhancement, and the pipeline that ties them together.

pub mod coordinator;
pub mod enhancer;
pub mod mapper;
pub mod pipeline;
pub mod synthetic;
pub mod taxonomy;
pub mod types;

pub use coordinator::ModelLoadCoordinator;
pub use pipeline::AnalysisPipeline;
pub use synthetic::{AuxiliaryDataSource, FallbackGenerator};
pub use types::{AnalysisFailure, AnalysisNotice, AnalysisPhase, LoadError};
