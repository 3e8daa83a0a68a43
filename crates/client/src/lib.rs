//! Fairway client library.
//!
//! Everything between the views and the remote backend actor lives here:
//!
//! - [`backend`] - the backend operations as an async trait, with an HTTP
//!   binding and an in-memory implementation
//! - [`cache`] - the query cache service (keys, entry states, invalidation,
//!   retry backoff)
//! - [`access`] - query and mutation bindings with enablement gating and
//!   invalidation sets
//! - [`poll`] - cancellable message-thread polling
//! - [`notify`] - user-facing transient notifications
//! - [`views`] - page-level computations built on the bindings
//! - [`config`] - environment-driven configuration
//! - [`app`] - the application context that owns all of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod app;
pub mod backend;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod notify;
pub mod poll;
pub mod views;

pub use access::{DataAccess, Fetched, MutationKind, MutationStatus};
pub use app::{AppContext, ConnectError};
pub use backend::{Backend, BackendError, HttpBackend, InMemoryBackend};
pub use cache::{QueryCache, QueryKey, RetryPolicy};
pub use config::{ClientConfig, ConfigError};
pub use connection::Connection;
pub use error::{MutationError, QueryError};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use poll::ThreadWatch;
