//! Core types for Fairway.
//!
//! This module provides type-safe wrappers for the backend's domain records.

pub mod course;
pub mod event;
pub mod id;
pub mod message;
pub mod principal;
pub mod profile;
pub mod time;

pub use course::{CourseDetails, CourseFilter, CourseWithMembers, LocationFilter};
pub use event::{Event, EventListing, EventPartition};
pub use id::*;
pub use message::Message;
pub use principal::{Principal, PrincipalError};
pub use profile::{Coordinates, Gender, Preference, ProfileDraft, ProfileError, UserProfile};
pub use time::Timestamp;
