//! Model slot load coordination.
//!
//! Single-flight per slot: concurrent `ensure_loaded` calls for one slot
//! share one underlying load via a mutex-guarded map of shared futures.
//! A failed load clears its slot, so the next call retries from scratch and
//! no slot is ever wedged in "loading".
//!
//! The coordinator is an injectable object, not a global: construct one per
//! application session (or per test) and share it behind an `Arc`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;

use super::types::LoadError;
use crate::backend::InferenceBackend;
use crate::models::ModelSlot;

type SharedLoad = Shared<BoxFuture<'static, Result<(), LoadError>>>;

enum SlotState {
    Loading(SharedLoad),
    Loaded,
}

/// Staged warm-up duration for slots without a real model behind them.
fn warmup_delay(slot: ModelSlot) -> Duration {
    let millis = match slot {
        ModelSlot::General => 1500,
        ModelSlot::WrinkleDetection => 1800,
        ModelSlot::PigmentationAnalysis => 2000,
        ModelSlot::SkinTextureAnalysis => 1200,
        ModelSlot::PoreAnalysis => 1000,
        // Backend-driven slots load the real library instead.
        ModelSlot::CnnClassification | ModelSlot::YoloDetection => 0,
    };
    Duration::from_millis(millis)
}

/// Lifecycle manager for the named model slots.
pub struct ModelLoadCoordinator<B> {
    backend: Arc<B>,
    slots: Arc<Mutex<HashMap<ModelSlot, SlotState>>>,
}

impl<B: InferenceBackend> ModelLoadCoordinator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Ensure one slot is loaded.
    ///
    /// - Already loaded: resolves immediately, no new work.
    /// - Load in flight: awaits the same shared future as every other caller.
    /// - Otherwise: starts a fresh load (one attempt, no retry/backoff).
    pub async fn ensure_loaded(&self, slot: ModelSlot) -> Result<(), LoadError> {
        let load = {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| LoadError::new(slot, "slot registry lock poisoned"))?;
            match slots.get(&slot) {
                Some(SlotState::Loaded) => return Ok(()),
                Some(SlotState::Loading(load)) => load.clone(),
                None => {
                    let load = self.start_load(slot);
                    slots.insert(slot, SlotState::Loading(load.clone()));
                    // Detached driver: the load keeps making progress even if
                    // every waiter abandons it (e.g. a timeout race), so the
                    // slot can finish in the background for future calls.
                    tokio::spawn(load.clone());
                    load
                }
            }
        };
        load.await
    }

    /// Sequentially ensure every slot is loaded. Returns false on the first
    /// failure instead of raising, so the caller can decide on fallback.
    pub async fn load_all(&self) -> bool {
        for slot in ModelSlot::ALL {
            if let Err(e) = self.ensure_loaded(slot).await {
                tracing::warn!(slot = slot.as_str(), error = %e, "load_all stopped early");
                return false;
            }
        }
        true
    }

    pub fn is_loaded(&self, slot: ModelSlot) -> bool {
        self.slots
            .lock()
            .map(|slots| matches!(slots.get(&slot), Some(SlotState::Loaded)))
            .unwrap_or(false)
    }

    /// Test hook: drop all slot state, including in-flight markers.
    pub fn reset(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
        }
    }

    /// Build the shared future for one load attempt. The future records its
    /// own outcome in the registry before any waiter observes it: success
    /// marks the slot loaded, failure removes the entry entirely.
    fn start_load(&self, slot: ModelSlot) -> SharedLoad {
        let backend = Arc::clone(&self.backend);
        let slots = Arc::clone(&self.slots);
        async move {
            tracing::debug!(slot = slot.as_str(), "model load started");
            let outcome = if slot.requires_backend() {
                backend
                    .init()
                    .await
                    .map_err(|e| LoadError::new(slot, e.to_string()))
            } else {
                tokio::time::sleep(warmup_delay(slot)).await;
                Ok(())
            };

            if let Ok(mut slots) = slots.lock() {
                match &outcome {
                    Ok(()) => {
                        slots.insert(slot, SlotState::Loaded);
                    }
                    Err(_) => {
                        slots.remove(&slot);
                    }
                }
            }
            match &outcome {
                Ok(()) => tracing::info!(slot = slot.as_str(), "model slot loaded"),
                Err(e) => tracing::warn!(slot = slot.as_str(), error = %e, "model slot load failed"),
            }
            outcome
        }
        .boxed()
        .shared()
    }
}
