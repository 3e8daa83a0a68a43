//! Course directory.

use fairway_client::AppContext;
use fairway_client::views::{CourseDirectoryPage, CoursePage};
use fairway_core::{CourseFilter, LocationFilter};

use super::{CommandError, ready};

pub async fn list(
    app: &AppContext,
    search: String,
    location: LocationFilter,
) -> Result<(), CommandError> {
    let filter = CourseFilter { search, location };
    let page = ready(CourseDirectoryPage::load(app.access(), &filter).await?)?;

    tracing::info!("{} of {} courses", page.courses.len(), page.total);
    for course in &page.courses {
        let kind = if course.is_local { "local" } else { "regional" };
        tracing::info!("{:<32} {:<8} {}", course.name, kind, course.website);
    }
    Ok(())
}

pub async fn show(app: &AppContext, name: &str) -> Result<(), CommandError> {
    let page = ready(CoursePage::load(app.access(), name).await?)?;
    let course = page
        .course
        .ok_or_else(|| CommandError::NotFound(format!("course '{name}'")))?;

    tracing::info!("{} ({})", course.course.name, course.course.website);
    tracing::info!("{} members", course.members.len());
    for member in &course.members {
        tracing::info!(
            "handicap {:>3} | {} | {}",
            member.handicap,
            member.preference.label(),
            member.bio
        );
    }
    Ok(())
}

pub async fn add(
    app: &AppContext,
    name: &str,
    website: &str,
    is_local: bool,
) -> Result<(), CommandError> {
    app.access().add_course(name, website, is_local).await?;
    Ok(())
}
