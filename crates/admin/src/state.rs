//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::PgAssignmentStore;
use crate::store::AssignmentStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    store: Arc<dyn AssignmentStore>,
}

impl AppState {
    /// Build state backed by the `PostgreSQL` assignment store.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        let store = Arc::new(PgAssignmentStore::new(pool.clone()));
        Self::with_store(config, pool, store)
    }

    /// Build state over an arbitrary store.
    ///
    /// The pool is still used for readiness checks.
    #[must_use]
    pub fn with_store(config: AdminConfig, pool: PgPool, store: Arc<dyn AssignmentStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                store,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The assignment store.
    #[must_use]
    pub fn store(&self) -> &dyn AssignmentStore {
        self.inner.store.as_ref()
    }
}
