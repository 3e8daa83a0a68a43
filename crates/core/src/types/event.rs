//! Golf events and RSVP bookkeeping.

use serde::{Deserialize, Serialize};

use super::id::EventId;
use super::principal::Principal;
use super::time::Timestamp;

/// An event as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub creator: Principal,
    pub course_name: String,
    pub description: String,
    pub timestamp: Timestamp,
}

/// An event with its attendees and the id used for RSVP calls.
///
/// The backend has no event id field; RSVP operations address an event by
/// its position in the `getAllEvents` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListing {
    pub id: EventId,
    pub event: Event,
    pub attendees: Vec<Principal>,
}

impl EventListing {
    /// Assign positional ids to a raw backend listing.
    #[must_use]
    pub fn from_backend(raw: Vec<(Event, Vec<Principal>)>) -> Vec<Self> {
        raw.into_iter()
            .enumerate()
            .map(|(index, (event, attendees))| Self {
                id: EventId::from_index(index),
                event,
                attendees,
            })
            .collect()
    }

    /// Whether `who` has RSVP'd.
    #[must_use]
    pub fn is_attending(&self, who: &Principal) -> bool {
        self.attendees.contains(who)
    }
}

/// Events split around a reference time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPartition {
    /// Events strictly after the reference time.
    pub upcoming: Vec<EventListing>,
    /// Events at or before the reference time.
    pub past: Vec<EventListing>,
}

impl EventPartition {
    /// Partition listings, keeping backend order inside each half.
    #[must_use]
    pub fn split(listings: Vec<EventListing>, now: Timestamp) -> Self {
        let (upcoming, past) = listings
            .into_iter()
            .partition(|listing| listing.event.timestamp > now);
        Self { upcoming, past }
    }
}
