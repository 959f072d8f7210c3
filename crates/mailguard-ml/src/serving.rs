//! Atomic model serving
//!
//! Holds the model currently answering predictions behind an [`ArcSwap`],
//! so readers never lock and a retrain swaps the whole artifact in one
//! atomic step. In-flight predictions keep their `Arc` to the model they
//! started with; there is never a moment where a reader observes a
//! half-replaced model.

use crate::model::TrainedModel;
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Lock-free holder for the active model
pub struct ActiveModel {
    current: ArcSwapOption<TrainedModel>,
    version: AtomicU64,
}

impl ActiveModel {
    /// Start with no model; predictions fail until one is committed
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::const_empty(),
            version: AtomicU64::new(0),
        }
    }

    /// Start pre-loaded, e.g. from an artifact restored at boot
    pub fn with_model(model: TrainedModel) -> Self {
        Self {
            current: ArcSwapOption::new(Some(Arc::new(model))),
            version: AtomicU64::new(1),
        }
    }

    /// Snapshot the active model. The returned `Arc` stays valid even if a
    /// commit replaces the model while the caller is still using it.
    pub fn load(&self) -> Option<Arc<TrainedModel>> {
        self.current.load_full()
    }

    /// Swap in a new model and return the new serving version.
    pub fn commit(&self, model: TrainedModel) -> u64 {
        let algorithm = model.algorithm();
        self.current.store(Some(Arc::new(model)));
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        info!(version, %algorithm, "committed new active model");
        version
    }

    /// Monotonic counter of commits; 0 means nothing was ever committed
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }
}

impl Default for ActiveModel {
    fn default() -> Self {
        Self::new()
    }
}
