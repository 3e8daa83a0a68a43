//! Application context shared by every view.

use std::sync::Arc;

use tracing::info;

use crate::access::DataAccess;
use crate::backend::{Backend, BackendError, HttpBackend};
use crate::cache::QueryCache;
use crate::config::{ClientConfig, ConfigError};
use crate::connection::Connection;
use crate::notify::Notifier;

/// Error connecting to the configured backend.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Application context.
///
/// Created once at start-up and torn down with [`AppContext::shutdown`].
/// Cheaply cloneable via `Arc`; every clone shares the same cache,
/// connection and notifier.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: ClientConfig,
    access: DataAccess,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.inner.config)
            .field("connection", self.inner.access.connection())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Create a context with an empty cache and no backend yet.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let cache = QueryCache::new(config.cache_capacity, config.cache_ttl, config.retry);
        let access = DataAccess::new(Connection::pending(), cache, Notifier::new());

        Self {
            inner: Arc::new(AppContextInner { config, access }),
        }
    }

    /// Attach a backend. Queries are enabled from here on.
    pub fn connect(&self, backend: Arc<dyn Backend>) {
        self.inner.access.connection().establish(backend);
    }

    /// Attach an [`HttpBackend`] built from the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend URL is configured or the HTTP client
    /// cannot be built.
    pub fn connect_http(&self) -> Result<(), ConnectError> {
        let config = &self.inner.config;
        let url = config.require_backend_url()?;
        let backend = HttpBackend::new(url, config.identity_token.clone(), config.connect_timeout)?;
        info!(backend = %url, "Connecting to backend");
        self.connect(Arc::new(backend));
        Ok(())
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Query and mutation bindings.
    #[must_use]
    pub fn access(&self) -> &DataAccess {
        &self.inner.access
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        self.inner.access.notifier()
    }

    /// Disconnect and drop every cached read.
    pub async fn shutdown(&self) {
        self.inner.access.connection().disconnect();
        self.inner.access.cache().clear().await;
        info!("Client shut down");
    }
}
