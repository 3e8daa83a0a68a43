//! Integration tests for Fairway.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fairway-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `data_access` - Queries, mutations and invalidation through [`AppContext`]
//! - `discovery_view` - Match discovery on top of cached reads
//! - `polling` - Message thread watches
//! - `http_backend` - The HTTP binding against a mock backend
//!
//! Everything runs in-process. HTTP tests start a `wiremock` server; the
//! rest use [`InMemoryBackend`].

use std::sync::Arc;
use std::time::Duration;

use fairway_client::{AppContext, ClientConfig, InMemoryBackend, RetryPolicy};
use fairway_core::{Coordinates, Gender, Preference, Principal, ProfileDraft, UserProfile};

/// Manhattan, used as the caller's home in most tests.
pub const NEW_YORK: Coordinates = Coordinates::new(40.7128, -74.0060);

/// Downtown Los Angeles, about 2446 miles from [`NEW_YORK`].
pub const LOS_ANGELES: Coordinates = Coordinates::new(34.0522, -118.2437);

/// Parse a principal used as a fixture.
///
/// # Panics
///
/// Panics if `name` is not a valid principal.
#[must_use]
pub fn principal(name: &str) -> Principal {
    Principal::parse(name).expect("fixture principal should be valid")
}

/// A stored profile at `location`.
#[must_use]
pub fn golfer(location: Coordinates, handicap: i64, preference: Preference) -> UserProfile {
    UserProfile {
        location,
        handicap,
        gender: Gender::Female,
        looking_for: Gender::Male,
        gender_preference: Gender::Male,
        preference,
        bio: "Plays most Saturdays".to_string(),
        avatar: None,
    }
}

/// A profile form filled in at `location`.
#[must_use]
pub fn draft(location: Coordinates, handicap: i64) -> ProfileDraft {
    ProfileDraft {
        handicap,
        latitude: location.lat,
        longitude: location.lon,
        gender: Gender::Male,
        looking_for: Gender::Female,
        gender_preference: Gender::Female,
        preference: Preference::Casual,
        bio: "New to the area, looking for a regular fourball".to_string(),
        avatar: None,
    }
}

/// Configuration for tests: small cache, immediate retries.
#[must_use]
pub fn test_config() -> ClientConfig {
    ClientConfig {
        cache_capacity: 100,
        cache_ttl: Duration::from_secs(300),
        message_poll_interval: Duration::from_secs(3),
        retry: RetryPolicy::none(),
        ..ClientConfig::default()
    }
}

/// An in-memory backend and an app context connected to it as `caller`.
#[derive(Debug, Clone)]
pub struct TestClient {
    pub backend: InMemoryBackend,
    pub app: AppContext,
}

impl TestClient {
    /// Connect a fresh app context to an empty backend.
    #[must_use]
    pub fn new(caller: &str) -> Self {
        Self::with_config(caller, test_config())
    }

    #[must_use]
    pub fn with_config(caller: &str, config: ClientConfig) -> Self {
        let backend = InMemoryBackend::new(principal(caller));
        let app = AppContext::new(config);
        app.connect(Arc::new(backend.clone()));
        Self { backend, app }
    }

    /// A second client on the same backend state, acting as `caller`.
    #[must_use]
    pub fn peer(&self, caller: &str) -> Self {
        let backend = self.backend.as_caller(principal(caller));
        let app = AppContext::new(test_config());
        app.connect(Arc::new(backend.clone()));
        Self { backend, app }
    }
}
