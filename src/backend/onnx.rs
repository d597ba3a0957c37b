//! ONNX Runtime backend (`onnx-models` feature).
//!
//! Loads a classifier and a detector session from the models directory.
//! Initialization makes two attempts in order: CUDA execution provider
//! first, plain CPU second. Both attempts form one logical load.

use std::path::PathBuf;
use std::sync::Mutex;

use image::imageops::FilterType;
use ndarray::Array4;
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;

use super::{ImageInput, InferenceBackend, InferenceError, InitError, RawClassification, RawDetection};
use crate::models::BoundingBox;

const INPUT_SIDE: u32 = 224;

fn poisoned_init<E>(_: E) -> InitError {
    InitError {
        accelerated: "session lock poisoned".into(),
        cpu: "session lock poisoned".into(),
    }
}
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Class labels of the bundled skin classifier, index-aligned with the
/// model's output vector.
const CLASS_LABELS: &[&str] = &[
    "acne and pimples",
    "redness and inflammation",
    "dark spots and patches",
    "rough texture",
    "dry flaky skin",
    "oily shiny skin",
    "normal skin",
];

/// Detector class labels (face-crop detector export).
const DETECT_LABELS: &[&str] = &["face", "eye", "nose", "mouth", "lesion"];

pub struct OrtBackend {
    model_dir: PathBuf,
    classifier: Mutex<Option<Session>>,
    detector: Mutex<Option<Session>>,
}

impl OrtBackend {
    /// Backend rooted at a directory containing `classifier.onnx` and
    /// `detector.onnx`.
    pub fn new(model_dir: PathBuf) -> Self {
        Self {
            model_dir,
            classifier: Mutex::new(None),
            detector: Mutex::new(None),
        }
    }

    /// Try CUDA first, then CPU. Returns the session or both failure
    /// messages for the `InitError`.
    fn load_session(&self, file: &str) -> Result<Session, InitError> {
        let path = self.model_dir.join(file);

        let accelerated = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| {
                b.with_execution_providers([CUDAExecutionProvider::default()
                    .build()
                    .error_on_failure()])
            })
            .and_then(|b| b.commit_from_file(&path));
        let accelerated_err = match accelerated {
            Ok(session) => return Ok(session),
            Err(e) => e.to_string(),
        };

        let cpu = Session::builder()
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(&path));
        match cpu {
            Ok(session) => {
                tracing::debug!(model = file, "accelerated init failed, using cpu session");
                Ok(session)
            }
            Err(e) => Err(InitError {
                accelerated: accelerated_err,
                cpu: e.to_string(),
            }),
        }
    }

    /// Decode, resize, and normalize to a NCHW float tensor.
    fn preprocess(&self, image: &ImageInput) -> Result<Array4<f32>, InferenceError> {
        let bytes = image.decode_bytes()?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| InferenceError::InvalidImage(e.to_string()))?
            .resize_exact(INPUT_SIDE, INPUT_SIDE, FilterType::CatmullRom)
            .to_rgb8();

        let side = INPUT_SIDE as usize;
        let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
        for (x, y, pixel) in decoded.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] =
                    (pixel.0[channel] as f32 / 255.0 - MEAN[channel]) / STD[channel];
            }
        }
        Ok(tensor)
    }
}

impl InferenceBackend for OrtBackend {
    fn init(&self) -> impl std::future::Future<Output = Result<(), InitError>> + Send {
        async move {
            {
                let classifier = self.classifier.lock().map_err(poisoned_init)?;
                let detector = self.detector.lock().map_err(poisoned_init)?;
                if classifier.is_some() && detector.is_some() {
                    return Ok(());
                }
            }
            let classifier = self.load_session("classifier.onnx")?;
            let detector = self.load_session("detector.onnx")?;
            *self.classifier.lock().map_err(poisoned_init)? = Some(classifier);
            *self.detector.lock().map_err(poisoned_init)? = Some(detector);
            tracing::info!("onnx backend initialized");
            Ok(())
        }
    }

    fn classify(
        &self,
        image: &ImageInput,
    ) -> impl std::future::Future<Output = Result<Vec<RawClassification>, InferenceError>> + Send
    {
        async move {
            let tensor = self.preprocess(image)?;
            let mut guard = self
                .classifier
                .lock()
                .map_err(|_| InferenceError::Classification("session lock poisoned".into()))?;
            let session = guard
                .as_mut()
                .ok_or_else(|| InferenceError::Classification("backend not initialized".into()))?;

            let input = ort::value::Tensor::from_array(tensor)
                .map_err(|e| InferenceError::Classification(e.to_string()))?;
            let outputs = session
                .run(ort::inputs!["input" => input])
                .map_err(|e| InferenceError::Classification(e.to_string()))?;
            let scores = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| InferenceError::Classification(e.to_string()))?;

            // Softmax over the logit row, highest first.
            let logits: Vec<f32> = scores.iter().copied().collect();
            let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let exp: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
            let denom: f32 = exp.iter().sum();

            let mut predictions: Vec<RawClassification> = exp
                .iter()
                .enumerate()
                .filter_map(|(idx, e)| {
                    CLASS_LABELS.get(idx).map(|label| RawClassification {
                        label: (*label).to_string(),
                        score: e / denom,
                    })
                })
                .collect();
            predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
            Ok(predictions)
        }
    }

    fn detect(
        &self,
        image: &ImageInput,
    ) -> impl std::future::Future<Output = Result<Vec<RawDetection>, InferenceError>> + Send {
        async move {
            let tensor = self.preprocess(image)?;
            let mut guard = self
                .detector
                .lock()
                .map_err(|_| InferenceError::Detection("session lock poisoned".into()))?;
            let session = guard
                .as_mut()
                .ok_or_else(|| InferenceError::Detection("backend not initialized".into()))?;

            let input = ort::value::Tensor::from_array(tensor)
                .map_err(|e| InferenceError::Detection(e.to_string()))?;
            let outputs = session
                .run(ort::inputs!["input" => input])
                .map_err(|e| InferenceError::Detection(e.to_string()))?;
            let hits = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| InferenceError::Detection(e.to_string()))?;

            // Post-NMS export: rows of [x, y, w, h, score, class].
            let flat: Vec<f32> = hits.iter().copied().collect();
            let detections = flat
                .chunks_exact(6)
                .filter(|row| row[4] > 0.25)
                .map(|row| {
                    let class = row[5] as usize;
                    RawDetection {
                        label: DETECT_LABELS
                            .get(class)
                            .copied()
                            .unwrap_or("object")
                            .to_string(),
                        score: row[4],
                        bounding_box: Some(BoundingBox {
                            x: row[0],
                            y: row[1],
                            width: row[2],
                            height: row[3],
                        }),
                    }
                })
                .collect();
            Ok(detections)
        }
    }
}
