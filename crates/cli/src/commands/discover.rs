//! Match discovery.

use fairway_client::AppContext;
use fairway_client::views::DiscoveryPage;
use fairway_core::DiscoveryFilters;

use super::{CommandError, ready};

/// List golfers matching `filters`, closest first.
pub async fn run(app: &AppContext, filters: &DiscoveryFilters) -> Result<(), CommandError> {
    let page = ready(DiscoveryPage::load(app.access(), filters).await?)?;

    if page.origin.is_none() {
        tracing::info!("Create a profile first: matches are measured from your location");
        return Ok(());
    }

    tracing::info!("{} golfers found", page.matches.len());
    for candidate in &page.matches {
        let profile = &candidate.profile;
        tracing::info!(
            "{:>6.1} mi | handicap {:>3} | {} looking for {} | {} | {}",
            candidate.distance_miles,
            profile.handicap,
            profile.gender.label(),
            profile.looking_for.label(),
            profile.preference.label(),
            profile.bio,
        );
    }
    Ok(())
}
