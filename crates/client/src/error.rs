//! Data access error types.

use std::sync::Arc;
use std::time::Duration;

use fairway_core::ProfileError;
use thiserror::Error;

use crate::access::MutationKind;
use crate::backend::BackendError;
use crate::cache::QueryKey;

/// Errors returned by cached reads.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
    /// The fetch failed.
    #[error("{key}: {source}")]
    Backend {
        key: QueryKey,
        #[source]
        source: Arc<BackendError>,
    },

    /// An earlier fetch failed and the retry delay has not elapsed.
    #[error("{key}: retrying in {}ms after: {source}", .retry_in.as_millis())]
    BackingOff {
        key: QueryKey,
        retry_in: Duration,
        #[source]
        source: Arc<BackendError>,
    },
}

impl QueryError {
    /// The key whose read failed.
    #[must_use]
    pub const fn key(&self) -> &QueryKey {
        match self {
            Self::Backend { key, .. } | Self::BackingOff { key, .. } => key,
        }
    }
}

/// Errors returned by mutations.
#[derive(Debug, Error)]
pub enum MutationError {
    /// No backend connection has been established.
    #[error("not connected to a backend")]
    NotConnected,

    /// The profile draft failed validation.
    #[error(transparent)]
    Invalid(#[from] ProfileError),

    /// A required text field was blank.
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// A course website is not a valid URL.
    #[error("invalid website URL: {0}")]
    InvalidWebsite(String),

    /// The backend call failed.
    #[error("{kind}: {source}")]
    Backend {
        kind: MutationKind,
        #[source]
        source: BackendError,
    },
}
