//! External collaborators consumed by the adapters.
//!
//! The transport, the shared application store and the toast UI are not part of this crate.
//! Each is passed in explicitly so adapters can run against fakes in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;

/// Persists a full entity snapshot.
#[async_trait]
pub trait EntityUpdater<E: Send + 'static>: Send + Sync {
    async fn update(&self, next: E) -> Result<(), BackendError>;
}

/// Re-synchronises every entity held in shared application state from the backend.
#[async_trait]
pub trait Refresher: Send + Sync {
    async fn refresh(&self) -> Result<(), BackendError>;
}

/// Surfaces a user-visible failure.
pub trait ErrorNotifier: Send + Sync {
    fn notify_error(&self, message: &str);
}

/// The capability set an adapter needs for one entity kind.
pub struct Capabilities<E: Send + 'static> {
    pub updater: Arc<dyn EntityUpdater<E>>,
    pub refresher: Arc<dyn Refresher>,
    pub notifier: Arc<dyn ErrorNotifier>,
}

impl<E: Send + 'static> Capabilities<E> {
    pub fn new(
        updater: Arc<dyn EntityUpdater<E>>,
        refresher: Arc<dyn Refresher>,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> Self {
        Self {
            updater,
            refresher,
            notifier,
        }
    }
}

impl<E: Send + 'static> Clone for Capabilities<E> {
    fn clone(&self) -> Self {
        Self {
            updater: Arc::clone(&self.updater),
            refresher: Arc::clone(&self.refresher),
            notifier: Arc::clone(&self.notifier),
        }
    }
}
