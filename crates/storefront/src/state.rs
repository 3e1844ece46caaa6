//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::ProductCatalog;
use crate::comments::CommentRepository;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The catalog and comment store sit behind
/// trait objects so tests can swap in the in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn ProductCatalog>,
    comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Arc<dyn ProductCatalog>,
        comments: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                comments,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> &dyn ProductCatalog {
        self.inner.catalog.as_ref()
    }

    /// The comment store.
    #[must_use]
    pub fn comments(&self) -> &dyn CommentRepository {
        self.inner.comments.as_ref()
    }
}
