//! Process-wide default backend

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwapOption;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::backend::Backend;
use crate::core::{LogError, LogResult};
use crate::layer::BridgeLayer;

/// Backend published by the last initialization with `use_as_default`
static DEFAULT_BACKEND: LazyLock<ArcSwapOption<Backend>> = LazyLock::new(ArcSwapOption::empty);

/// Publish `backend` as the process default, replacing any previous one
pub fn publish(backend: Backend) {
    DEFAULT_BACKEND.store(Some(Arc::new(backend)));
}

/// The currently published default backend, if any
#[inline]
pub fn default_backend() -> Option<Arc<Backend>> {
    DEFAULT_BACKEND.load_full()
}

/// Withdraw the published default
pub fn clear() {
    DEFAULT_BACKEND.store(None);
}

/// Install [`BridgeLayer`] as the global `tracing` subscriber
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn install_tracing_bridge() -> LogResult<()> {
    tracing_subscriber::registry()
        .with(BridgeLayer::new())
        .try_init()
        .map_err(|e| LogError::Bridge(e.to_string()))
}
