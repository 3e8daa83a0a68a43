use fairway_core::{Coordinates, DiscoveryFilters, MatchCandidate, discover};
use tracing::debug;

use crate::access::{DataAccess, Fetched};
use crate::error::QueryError;

/// Nearby golfers matching the caller's filters, closest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryPage {
    /// The caller's location, `None` until they have a profile.
    pub origin: Option<Coordinates>,
    pub matches: Vec<MatchCandidate>,
}

impl DiscoveryPage {
    /// Load the caller's profile and candidates, then filter.
    ///
    /// A caller without a profile gets an empty page.
    ///
    /// # Errors
    ///
    /// Returns an error if either read fails.
    pub async fn load(
        access: &DataAccess,
        filters: &DiscoveryFilters,
    ) -> Result<Fetched<Self>, QueryError> {
        let Fetched::Ready(caller) = access.caller_profile().await? else {
            return Ok(Fetched::Disabled);
        };
        let Fetched::Ready(candidates) = access.search_matches().await? else {
            return Ok(Fetched::Disabled);
        };

        let origin = caller.map(|profile| profile.location);
        let matches = discover(origin, &candidates, filters);
        debug!(
            candidates = candidates.len(),
            matches = matches.len(),
            "Discovery filtered"
        );

        Ok(Fetched::Ready(Self { origin, matches }))
    }
}
