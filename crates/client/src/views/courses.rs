use fairway_core::{CourseDetails, CourseFilter, CourseWithMembers};

use crate::access::{DataAccess, Fetched};
use crate::error::QueryError;

/// The course directory after search and location filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseDirectoryPage {
    pub courses: Vec<CourseDetails>,
    /// Size of the unfiltered directory.
    pub total: usize,
}

impl CourseDirectoryPage {
    /// # Errors
    ///
    /// Returns an error if the directory read fails.
    pub async fn load(
        access: &DataAccess,
        filter: &CourseFilter,
    ) -> Result<Fetched<Self>, QueryError> {
        Ok(access.course_directory().await?.map(|directory| Self {
            courses: filter
                .apply(&directory)
                .into_iter()
                .map(|(_, details)| details.clone())
                .collect(),
            total: directory.len(),
        }))
    }
}

/// One course with the golfers who play it.
#[derive(Debug, Clone, PartialEq)]
pub struct CoursePage {
    pub course: Option<CourseWithMembers>,
}

impl CoursePage {
    /// Disabled for a blank name; `course` is `None` for an unknown one.
    ///
    /// # Errors
    ///
    /// Returns an error if the course read fails.
    pub async fn load(access: &DataAccess, name: &str) -> Result<Fetched<Self>, QueryError> {
        Ok(access
            .course_with_members(Some(name.trim()))
            .await?
            .map(|course| Self { course }))
    }
}
