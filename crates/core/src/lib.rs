//! Fairway Core - Shared types and pure computations.
//!
//! This crate provides the types used across all Fairway components:
//! - `client` - Data access layer talking to the remote backend
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no async,
//! no HTTP clients. Everything here is deterministic and cheap to test.
//!
//! # Modules
//!
//! - [`types`] - Principals, profiles, courses, events, messages, timestamps
//! - [`discovery`] - Haversine distance and match filtering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod discovery;
pub mod types;

pub use discovery::{DiscoveryFilters, MatchCandidate, PreferenceFilter, discover, distance_miles};
pub use types::*;
