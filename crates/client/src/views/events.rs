use fairway_core::{EventListing, EventPartition, Principal, Timestamp};

use crate::access::{DataAccess, Fetched};
use crate::error::{MutationError, QueryError};

/// Events split into upcoming and past.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventsPage {
    pub upcoming: Vec<EventListing>,
    pub past: Vec<EventListing>,
}

impl EventsPage {
    /// Load all events and split them around `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the events read fails.
    pub async fn load(access: &DataAccess, now: Timestamp) -> Result<Fetched<Self>, QueryError> {
        Ok(access.all_events().await?.map(|listings| {
            let EventPartition { upcoming, past } = EventPartition::split(listings, now);
            Self { upcoming, past }
        }))
    }
}

/// What toggling a caller's RSVP does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpAction {
    Rsvp,
    Cancel,
}

impl RsvpAction {
    /// Cancel if `me` is already attending, RSVP otherwise.
    #[must_use]
    pub fn for_listing(listing: &EventListing, me: &Principal) -> Self {
        if listing.is_attending(me) {
            Self::Cancel
        } else {
            Self::Rsvp
        }
    }

    /// Toggle `me`'s attendance and report which way it went.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation fails.
    pub async fn toggle(
        access: &DataAccess,
        listing: &EventListing,
        me: &Principal,
    ) -> Result<Self, MutationError> {
        let action = Self::for_listing(listing, me);
        match action {
            Self::Rsvp => access.rsvp_to_event(listing.id).await?,
            Self::Cancel => access.cancel_rsvp(listing.id).await?,
        }
        Ok(action)
    }
}
