//! Analysis orchestration.
//!
//! Single entry point `analyze()`: ensure the `general` slot, load the two
//! advanced slots against the timeout ceiling, run classify/detect, merge
//! mapped conditions with auxiliary data, enhance, return. Any failure on
//! the model path converts to the synthetic fallback; the result is always
//! all-advanced or all-synthetic, never a mix, except that environmental
//! factors are generated on both paths.
//!
//! `LoadError` and `InferenceError` never escape this module; only
//! `AnalysisFailure` (backup generator broke too) propagates to callers.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;

use super::coordinator::ModelLoadCoordinator;
use super::synthetic::{
    AuxiliaryDataSource, FallbackGenerator, RandomizedAuxiliary, RandomizedFallback,
};
use super::types::{AnalysisFailure, AnalysisNotice, AnalysisPhase, LoadError};
use super::{enhancer, mapper};
use crate::backend::{ImageInput, InferenceBackend, InferenceError};
use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, ModelSlot};
use crate::report::ReportTemplates;

/// Slots warmed best-effort for the advanced path. Their failure or timeout
/// degrades nothing.
const COSMETIC_SLOTS: [ModelSlot; 4] = [
    ModelSlot::WrinkleDetection,
    ModelSlot::PigmentationAnalysis,
    ModelSlot::SkinTextureAnalysis,
    ModelSlot::PoreAnalysis,
];

/// Why the advanced path was abandoned. Internal: always converted to the
/// fallback path, never surfaced.
#[derive(Debug, thiserror::Error)]
enum AdvancedFailure {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("model slot {0} did not become ready within the ceiling")]
    Timeout(ModelSlot),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// The analysis pipeline. Generic over the backend so the real ONNX
/// implementation, the custom-model path, and test mocks all fit.
pub struct AnalysisPipeline<B: InferenceBackend> {
    backend: Arc<B>,
    coordinator: Arc<ModelLoadCoordinator<B>>,
    auxiliary: Box<dyn AuxiliaryDataSource>,
    fallback: Box<dyn FallbackGenerator>,
    config: AnalysisConfig,
    notices: Option<UnboundedSender<AnalysisNotice>>,
    phase: Mutex<AnalysisPhase>,
}

impl<B: InferenceBackend> AnalysisPipeline<B> {
    pub fn new(
        backend: Arc<B>,
        coordinator: Arc<ModelLoadCoordinator<B>>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            backend,
            coordinator,
            auxiliary: Box::new(RandomizedAuxiliary),
            fallback: Box::new(RandomizedFallback),
            config,
            notices: None,
            phase: Mutex::new(AnalysisPhase::Idle),
        }
    }

    /// Swap the auxiliary data strategy (e.g. a real model integration).
    pub fn with_auxiliary_source(mut self, source: Box<dyn AuxiliaryDataSource>) -> Self {
        self.auxiliary = source;
        self
    }

    /// Swap the fallback strategy.
    pub fn with_fallback_generator(mut self, generator: Box<dyn FallbackGenerator>) -> Self {
        self.fallback = generator;
        self
    }

    /// Attach the toast-style notice channel.
    pub fn with_notices(mut self, sender: UnboundedSender<AnalysisNotice>) -> Self {
        self.notices = Some(sender);
        self
    }

    /// Current phase, for UI progress display.
    pub fn phase(&self) -> AnalysisPhase {
        self.phase
            .lock()
            .map(|phase| *phase)
            .unwrap_or(AnalysisPhase::Error)
    }

    /// Run one analysis to completion. Never returns a partial result: the
    /// report is either fully advanced or fully synthetic.
    pub async fn analyze(&self, image: &ImageInput) -> Result<AnalysisResult, AnalysisFailure> {
        let started = Instant::now();
        self.set_phase(AnalysisPhase::LoadingModels);

        let mut result = match self.advanced_analysis(image).await {
            Ok(result) => result,
            Err(failure) => {
                tracing::warn!(error = %failure, "advanced path unavailable, using backup analysis");
                self.notify(AnalysisNotice::FallbackEngaged);
                match self.fallback.generate() {
                    Ok(result) => result,
                    Err(e) => {
                        self.set_phase(AnalysisPhase::Error);
                        return Err(e);
                    }
                }
            }
        };

        // Environmental factors are generated on every path so downstream
        // consumers always see a uniform shape.
        result.environmental_factors = self.auxiliary.environmental_factors();

        let enhanced = enhancer::enhance(&result);
        self.set_phase(if enhanced.used_advanced_models {
            AnalysisPhase::Complete
        } else {
            AnalysisPhase::Fallback
        });

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            used_advanced = enhanced.used_advanced_models,
            conditions = enhanced.conditions.len(),
            "analysis complete"
        );
        Ok(enhanced)
    }

    /// The full-model path. The `general` slot is a blocking prerequisite;
    /// the two advanced slots are required and raced against the ceiling;
    /// the cosmetic slots are best-effort.
    async fn advanced_analysis(&self, image: &ImageInput) -> Result<AnalysisResult, AdvancedFailure> {
        self.coordinator.ensure_loaded(ModelSlot::General).await?;

        let (cnn, yolo) = tokio::join!(
            self.load_required(ModelSlot::CnnClassification),
            self.load_required(ModelSlot::YoloDetection),
        );
        cnn?;
        yolo?;

        self.warm_cosmetic_slots().await;

        self.set_phase(AnalysisPhase::Running);
        let (classifications, detections) =
            tokio::join!(self.backend.classify(image), self.backend.detect(image));
        let classifications = classifications?;
        let detections = detections?;

        let skin_type = mapper::infer_skin_type(&classifications);
        let conditions = mapper::map_classifications(&classifications);
        let profile = self.auxiliary.subtype_profile();

        let mut result = AnalysisResult::new(
            skin_type,
            ReportTemplates::overall(skin_type, &conditions),
            true,
        );
        result.conditions = conditions;
        result.detected_objects = mapper::map_detections(&detections);
        result.acne_types = Some(profile.acne);
        result.wrinkle_types = Some(profile.wrinkle);
        result.pigmentation_types = Some(profile.pigmentation);
        result.texture_types = Some(profile.texture);
        result.pore_types = Some(profile.pore);
        Ok(result)
    }

    /// Load one required advanced slot, racing the ceiling. The timeout
    /// abandons the wait only; the coordinator's load keeps running and may
    /// finish in the background for a later call.
    async fn load_required(&self, slot: ModelSlot) -> Result<(), AdvancedFailure> {
        self.notify(AnalysisNotice::ModelLoadStarted { slot });
        match timeout(self.config.aux_slot_timeout, self.coordinator.ensure_loaded(slot)).await {
            Ok(Ok(())) => {
                self.notify(AnalysisNotice::ModelLoadSucceeded { slot });
                Ok(())
            }
            Ok(Err(e)) => {
                self.notify(AnalysisNotice::ModelLoadFailed { slot });
                Err(e.into())
            }
            Err(_) => {
                self.notify(AnalysisNotice::ModelLoadFailed { slot });
                tracing::debug!(
                    slot = slot.as_str(),
                    "wait abandoned at the ceiling; load continues in the background"
                );
                Err(AdvancedFailure::Timeout(slot))
            }
        }
    }

    /// Warm the cosmetic slots concurrently; soft-fail on timeout or error.
    async fn warm_cosmetic_slots(&self) {
        let waits = COSMETIC_SLOTS.map(|slot| async move {
            match timeout(self.config.aux_slot_timeout, self.coordinator.ensure_loaded(slot)).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!(slot = slot.as_str(), error = %e, "cosmetic slot failed; continuing")
                }
                Err(_) => {
                    tracing::debug!(slot = slot.as_str(), "cosmetic slot still loading; continuing")
                }
            }
        });
        futures_util::future::join_all(waits).await;
    }

    fn set_phase(&self, phase: AnalysisPhase) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }

    fn notify(&self, notice: AnalysisNotice) {
        if let Some(sender) = &self.notices {
            // A gone receiver just means nobody is rendering toasts.
            let _ = sender.send(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::mpsc;

    use super::*;
    use crate::analysis::synthetic::FALLBACK_CONDITION_POOL;
    use crate::backend::{InitError, RawClassification, RawDetection};
    use crate::models::BoundingBox;

    /// Backend scripted per test: init/classify can fail or hang.
    #[derive(Default)]
    struct ScriptedBackend {
        fail_init: AtomicBool,
        hang_init: AtomicBool,
        fail_classify: AtomicBool,
    }

    impl ScriptedBackend {
        fn healthy() -> Self {
            Self::default()
        }
    }

    impl InferenceBackend for ScriptedBackend {
        fn init(&self) -> impl std::future::Future<Output = Result<(), InitError>> + Send {
            let fail = self.fail_init.load(Ordering::SeqCst);
            let hang = self.hang_init.load(Ordering::SeqCst);
            async move {
                if hang {
                    std::future::pending::<()>().await;
                }
                if fail {
                    Err(InitError {
                        accelerated: "no gpu".into(),
                        cpu: "missing runtime".into(),
                    })
                } else {
                    Ok(())
                }
            }
        }

        fn classify(
            &self,
            _image: &ImageInput,
        ) -> impl std::future::Future<Output = Result<Vec<RawClassification>, InferenceError>> + Send
        {
            let fail = self.fail_classify.load(Ordering::SeqCst);
            async move {
                if fail {
                    return Err(InferenceError::Classification("tensor shape mismatch".into()));
                }
                Ok(vec![
                    RawClassification {
                        label: "acne and pimples".into(),
                        score: 0.81,
                    },
                    RawClassification {
                        label: "dry flaky skin".into(),
                        score: 0.44,
                    },
                ])
            }
        }

        fn detect(
            &self,
            _image: &ImageInput,
        ) -> impl std::future::Future<Output = Result<Vec<RawDetection>, InferenceError>> + Send
        {
            std::future::ready(Ok(vec![RawDetection {
                label: "face".into(),
                score: 0.93,
                bounding_box: Some(BoundingBox {
                    x: 12.0,
                    y: 8.0,
                    width: 180.0,
                    height: 210.0,
                }),
            }]))
        }
    }

    fn pipeline(backend: ScriptedBackend) -> AnalysisPipeline<ScriptedBackend> {
        let backend = Arc::new(backend);
        let coordinator = Arc::new(ModelLoadCoordinator::new(Arc::clone(&backend)));
        AnalysisPipeline::new(backend, coordinator, AnalysisConfig::default())
    }

    fn image() -> ImageInput {
        ImageInput::new("data:image/jpeg;base64,ZmFrZQ==")
    }

    #[tokio::test(start_paused = true)]
    async fn advanced_path_end_to_end() {
        let pipeline = pipeline(ScriptedBackend::healthy());

        let result = pipeline.analyze(&image()).await.unwrap();

        assert!(result.used_advanced_models);
        assert_eq!(pipeline.phase(), AnalysisPhase::Complete);

        // Mapper output, enhanced with the acne primary subtype.
        assert!(result.conditions[0].condition.starts_with("Acne (primarily "));
        assert_eq!(result.conditions[1].condition, "Dryness");
        assert_eq!(result.detected_objects[0].label, "Facial Area Detected");

        // All five distributions present on the advanced path.
        assert!(result.acne_types.is_some());
        assert!(result.wrinkle_types.is_some());
        assert!(result.pigmentation_types.is_some());
        assert!(result.texture_types.is_some());
        assert!(result.pore_types.is_some());

        let factors: Vec<_> = result
            .environmental_factors
            .iter()
            .map(|f| f.factor.as_str())
            .collect();
        assert_eq!(factors, vec!["Humidity", "UV Exposure", "Air Pollution"]);
    }

    #[tokio::test(start_paused = true)]
    async fn classify_failure_falls_back_whole() {
        let backend = ScriptedBackend::healthy();
        backend.fail_classify.store(true, Ordering::SeqCst);
        let pipeline = pipeline(backend);

        let result = pipeline.analyze(&image()).await.unwrap();

        assert!(!result.used_advanced_models);
        assert_eq!(pipeline.phase(), AnalysisPhase::Fallback);
        assert!((2..=3).contains(&result.conditions.len()));
        for condition in &result.conditions {
            assert!(FALLBACK_CONDITION_POOL.contains(&condition.condition.as_str()));
        }
        // No advanced leftovers mixed in.
        assert!(result.detected_objects.is_empty());
        assert!(result.acne_types.is_none());
        // Environmental factors still present.
        assert_eq!(result.environmental_factors.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn init_failure_falls_back_and_notifies() {
        let backend = ScriptedBackend::healthy();
        backend.fail_init.store(true, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = pipeline(backend).with_notices(tx);

        let result = pipeline.analyze(&image()).await.unwrap();
        assert!(!result.used_advanced_models);

        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice);
        }
        assert!(notices.contains(&AnalysisNotice::ModelLoadStarted {
            slot: ModelSlot::CnnClassification
        }));
        assert!(notices.contains(&AnalysisNotice::ModelLoadStarted {
            slot: ModelSlot::YoloDetection
        }));
        assert!(notices
            .iter()
            .any(|n| matches!(n, AnalysisNotice::ModelLoadFailed { .. })));
        assert_eq!(notices.last(), Some(&AnalysisNotice::FallbackEngaged));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_load_times_out_into_fallback() {
        let backend = ScriptedBackend::healthy();
        backend.hang_init.store(true, Ordering::SeqCst);
        let pipeline = pipeline(backend);

        let result = pipeline.analyze(&image()).await.unwrap();

        assert!(!result.used_advanced_models);
        assert_eq!(result.environmental_factors.len(), 3);
        assert_eq!(pipeline.phase(), AnalysisPhase::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn success_notifies_both_advanced_slots() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let pipeline = pipeline(ScriptedBackend::healthy()).with_notices(tx);

        pipeline.analyze(&image()).await.unwrap();

        let mut notices = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            notices.push(notice);
        }
        for slot in [ModelSlot::CnnClassification, ModelSlot::YoloDetection] {
            assert!(notices.contains(&AnalysisNotice::ModelLoadStarted { slot }));
            assert!(notices.contains(&AnalysisNotice::ModelLoadSucceeded { slot }));
        }
        assert!(!notices.contains(&AnalysisNotice::FallbackEngaged));
    }

    #[tokio::test(start_paused = true)]
    async fn general_slot_is_loaded_before_anything_else() {
        let pipeline = pipeline(ScriptedBackend::healthy());

        pipeline.analyze(&image()).await.unwrap();

        assert!(pipeline.coordinator.is_loaded(ModelSlot::General));
        assert!(pipeline.coordinator.is_loaded(ModelSlot::CnnClassification));
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_analyze_reuses_loaded_slots() {
        let pipeline = pipeline(ScriptedBackend::healthy());

        let first = pipeline.analyze(&image()).await.unwrap();
        let second = pipeline.analyze(&image()).await.unwrap();

        assert!(first.used_advanced_models && second.used_advanced_models);
        assert_ne!(first.id, second.id, "each call produces a fresh result");
    }
}
