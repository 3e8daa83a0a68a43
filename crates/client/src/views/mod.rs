//! Page-level computations on top of the data access layer.
//!
//! Each view loads what its page needs through [`DataAccess`](crate::DataAccess)
//! and shapes it for display. Rendering is left to the front end.

mod chat;
mod courses;
mod discovery;
mod events;

pub use chat::ChatView;
pub use courses::{CourseDirectoryPage, CoursePage};
pub use discovery::DiscoveryPage;
pub use events::{EventsPage, RsvpAction};
