//! Inference backend seam.
//!
//! The analysis pipeline is generic over `InferenceBackend` so the real
//! ONNX-backed implementation, the dataset-driven custom-model path, and the
//! test mocks all slot in without touching pipeline logic. Once initialized
//! a backend is a pure request/response surface: `classify` and `detect`
//! hold no additional state.

use std::future::Future;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::models::BoundingBox;

#[cfg(feature = "onnx-models")]
pub mod onnx;

// ---------------------------------------------------------------------------
// Image input
// ---------------------------------------------------------------------------

/// Opaque image payload from the upload/camera UI, either a base64 data URL or a
/// bare base64 string. The core never inspects it; backends decode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput(String);

impl ImageInput {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the payload to raw image bytes. Data URLs have their
    /// `data:image/...;base64,` prefix stripped first.
    pub fn decode_bytes(&self) -> Result<Vec<u8>, InferenceError> {
        let payload = match self.0.split_once(',') {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => self.0.as_str(),
        };
        BASE64
            .decode(payload.trim())
            .map_err(|e| InferenceError::InvalidImage(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Raw predictions
// ---------------------------------------------------------------------------

/// One classification label with its score, as emitted by the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawClassification {
    pub label: String,
    pub score: f32,
}

/// One detection hit with its score and optional box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub label: String,
    pub score: f32,
    pub bounding_box: Option<BoundingBox>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Both initialization attempts (accelerated device, then plain CPU) failed.
/// Cloneable because a failed init fans out to every waiter of the same
/// single-flight load.
#[derive(Debug, Clone, thiserror::Error)]
#[error("backend initialization failed (accelerated: {accelerated}; cpu: {cpu})")]
pub struct InitError {
    pub accelerated: String,
    pub cpu: String,
}

/// A classify/detect call failed after successful initialization. Distinct
/// from `InitError` so the pipeline can fall back for one request without
/// re-initializing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    #[error("image payload could not be decoded: {0}")]
    InvalidImage(String),
    #[error("classification failed: {0}")]
    Classification(String),
    #[error("detection failed: {0}")]
    Detection(String),
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// A vision inference library consumed as a black box.
///
/// `init` makes two attempts in order (accelerated device, then CPU) and
/// both count as one logical load from the coordinator's point of view.
pub trait InferenceBackend: Send + Sync + 'static {
    /// Initialize the library. Idempotent: a second call on an initialized
    /// backend returns immediately.
    fn init(&self) -> impl Future<Output = Result<(), InitError>> + Send;

    /// Image classification: labeled scores, highest first.
    fn classify(
        &self,
        image: &ImageInput,
    ) -> impl Future<Output = Result<Vec<RawClassification>, InferenceError>> + Send;

    /// Object detection: labeled scores with boxes.
    fn detect(
        &self,
        image: &ImageInput,
    ) -> impl Future<Output = Result<Vec<RawDetection>, InferenceError>> + Send;
}
