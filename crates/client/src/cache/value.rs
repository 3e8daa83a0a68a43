//! Cached value types.

use fairway_core::{CourseDetails, CourseWithMembers, EventListing, Message, UserProfile};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Profile(Option<Box<UserProfile>>),
    Profiles(Vec<UserProfile>),
    CourseDirectory(Vec<(String, CourseDetails)>),
    Course(Option<Box<CourseWithMembers>>),
    Messages(Vec<Message>),
    Events(Vec<EventListing>),
    Sponsors(Vec<String>),
    Flag(bool),
}

/// A read result that can be stored in the query cache.
pub trait Cached: Clone + Send + 'static {
    fn into_value(self) -> CacheValue;

    /// `None` if `value` holds a different variant.
    fn from_value(value: &CacheValue) -> Option<Self>;
}

macro_rules! cached {
    ($ty:ty => $variant:ident) => {
        impl Cached for $ty {
            fn into_value(self) -> CacheValue {
                CacheValue::$variant(self)
            }

            fn from_value(value: &CacheValue) -> Option<Self> {
                match value {
                    CacheValue::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

cached!(Vec<UserProfile> => Profiles);
cached!(Vec<(String, CourseDetails)> => CourseDirectory);
cached!(Vec<Message> => Messages);
cached!(Vec<EventListing> => Events);
cached!(Vec<String> => Sponsors);
cached!(bool => Flag);

impl Cached for Option<UserProfile> {
    fn into_value(self) -> CacheValue {
        CacheValue::Profile(self.map(Box::new))
    }

    fn from_value(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::Profile(profile) => Some(profile.as_deref().cloned()),
            _ => None,
        }
    }
}

impl Cached for Option<CourseWithMembers> {
    fn into_value(self) -> CacheValue {
        CacheValue::Course(self.map(Box::new))
    }

    fn from_value(value: &CacheValue) -> Option<Self> {
        match value {
            CacheValue::Course(course) => Some(course.as_deref().cloned()),
            _ => None,
        }
    }
}
