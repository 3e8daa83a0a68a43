//! Events and RSVPs.

use fairway_client::AppContext;
use fairway_client::views::{EventsPage, RsvpAction};
use fairway_core::{EventId, EventListing, Principal, Timestamp};

use super::{CommandError, ready};

fn log_listing(listing: &EventListing, me: Option<&Principal>) {
    let attending = me.is_some_and(|me| listing.is_attending(me));
    tracing::info!(
        "#{:<3} {} | {} | {} | {} going{}",
        listing.id,
        listing.event.timestamp,
        listing.event.course_name,
        listing.event.description,
        listing.attendees.len(),
        if attending { " (including you)" } else { "" },
    );
}

pub async fn list(app: &AppContext, me: Option<&Principal>) -> Result<(), CommandError> {
    let page = ready(EventsPage::load(app.access(), Timestamp::now()).await?)?;

    tracing::info!("Upcoming events: {}", page.upcoming.len());
    for listing in &page.upcoming {
        log_listing(listing, me);
    }
    tracing::info!("Past events: {}", page.past.len());
    for listing in &page.past {
        log_listing(listing, me);
    }
    Ok(())
}

pub async fn create(
    app: &AppContext,
    course_name: &str,
    description: &str,
) -> Result<(), CommandError> {
    app.access().create_event(course_name, description).await?;
    Ok(())
}

/// RSVP to the event, or cancel if already attending.
pub async fn toggle_rsvp(
    app: &AppContext,
    me: Principal,
    event_id: EventId,
) -> Result<(), CommandError> {
    let events = ready(app.access().all_events().await?)?;
    let listing = events
        .iter()
        .find(|listing| listing.id == event_id)
        .ok_or_else(|| CommandError::NotFound(format!("event #{event_id}")))?;

    let action = RsvpAction::toggle(app.access(), listing, &me).await?;
    tracing::debug!(?action, %event_id, "RSVP toggled");
    Ok(())
}
