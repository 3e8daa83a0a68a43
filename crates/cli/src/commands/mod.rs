//! Command implementations.
//!
//! Results are reported through `tracing` so they share the log format and
//! end up in Sentry breadcrumbs when it is enabled.

pub mod courses;
pub mod discover;
pub mod events;
pub mod messages;
pub mod profile;
pub mod sponsors;

use fairway_client::{ConfigError, Fetched, MutationError, QueryError};
use fairway_core::Principal;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The backend connection was not established.
    #[error("not connected to a backend")]
    NotConnected,

    /// A named record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Unwrap a query result that must be enabled once connected.
pub fn ready<T>(fetched: Fetched<T>) -> Result<T, CommandError> {
    fetched.ready().ok_or(CommandError::NotConnected)
}

/// The caller's own principal, needed by commands that look at the thread or
/// attendee list from the caller's side.
pub fn require_principal(me: Option<Principal>) -> Result<Principal, ConfigError> {
    me.ok_or_else(|| ConfigError::MissingEnvVar("FAIRWAY_PRINCIPAL".to_string()))
}
