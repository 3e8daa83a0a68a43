//! Backend connection handle.
//!
//! Queries are disabled until a backend is attached. The handle is shared by
//! everything that talks to the backend, so attaching or detaching is seen
//! by all of them at once.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::backend::Backend;

/// Shared, possibly-absent backend.
#[derive(Clone)]
pub struct Connection {
    sender: Arc<watch::Sender<Option<Arc<dyn Backend>>>>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::pending()
    }
}

impl Connection {
    /// A connection with no backend yet.
    #[must_use]
    pub fn pending() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// A connection that is already established.
    #[must_use]
    pub fn ready(backend: Arc<dyn Backend>) -> Self {
        let connection = Self::pending();
        connection.establish(backend);
        connection
    }

    /// Attach `backend`, replacing any previous one.
    pub fn establish(&self, backend: Arc<dyn Backend>) {
        self.sender.send_replace(Some(backend));
        info!("Backend connection established");
    }

    /// Detach the backend. Queries become disabled again.
    pub fn disconnect(&self) {
        if self.sender.send_replace(None).is_some() {
            info!("Backend connection closed");
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// The current backend, if connected.
    #[must_use]
    pub fn backend(&self) -> Option<Arc<dyn Backend>> {
        self.sender.borrow().clone()
    }
}
