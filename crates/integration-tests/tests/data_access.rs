//! Queries, mutations and cache invalidation through the app context.
//!
//! Run with: cargo test -p fairway-integration-tests --test data_access

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use fairway_client::backend::ops;
use fairway_client::cache::EntryState;
use fairway_client::views::{CourseDirectoryPage, CoursePage, EventsPage, RsvpAction};
use fairway_client::{
    Fetched, MutationError, MutationKind, MutationStatus, NotificationLevel, QueryError, QueryKey,
    RetryPolicy,
};
use fairway_core::{CourseFilter, Event, LocationFilter, Preference, Timestamp};
use fairway_integration_tests::{NEW_YORK, TestClient, draft, golfer, principal, test_config};

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_first_save_replaces_empty_profile() {
    let client = TestClient::new("newcomer");
    let access = client.app.access();

    assert_eq!(access.caller_profile().await.unwrap(), Fetched::Ready(None));

    let saved = access.save_caller_profile(draft(NEW_YORK, 18)).await.unwrap();
    assert_eq!(saved.bio, "New to the area, looking for a regular fourball");

    // Read is stale after the save and goes back to the backend
    let profile = access.caller_profile().await.unwrap().ready().unwrap();
    assert_eq!(profile, Some(saved));
    assert_eq!(client.backend.calls(ops::GET_CALLER_USER_PROFILE).await, 2);
    assert_eq!(
        access.mutation_status(MutationKind::SaveCallerProfile).await,
        MutationStatus::Succeeded
    );
}

#[tokio::test]
async fn test_saved_profile_visible_to_peers() {
    let me = TestClient::new("alice");
    let peer = me.peer("bob");

    me.app
        .access()
        .save_caller_profile(draft(NEW_YORK, 12))
        .await
        .unwrap();

    let seen = peer
        .app
        .access()
        .user_profile(Some(&principal("alice")))
        .await
        .unwrap()
        .ready()
        .unwrap()
        .unwrap();
    assert_eq!(seen.handicap, 12);

    let candidates = peer.app.access().search_matches().await.unwrap().ready().unwrap();
    assert_eq!(candidates.len(), 1);
}

#[tokio::test]
async fn test_rejected_save_keeps_previous_profile() {
    let client = TestClient::new("alice");
    let access = client.app.access();
    let mut notifications = client.app.notifier().subscribe();

    access.save_caller_profile(draft(NEW_YORK, 10)).await.unwrap();
    let before = access.caller_profile().await.unwrap();
    let _ = notifications.try_recv();

    client.backend.fail_on(ops::SAVE_CALLER_USER_PROFILE).await;
    let err = access.save_caller_profile(draft(NEW_YORK, 30)).await.unwrap_err();
    assert!(matches!(
        err,
        MutationError::Backend {
            kind: MutationKind::SaveCallerProfile,
            ..
        }
    ));

    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(notification.message.starts_with("Failed to save profile"));

    assert_eq!(access.caller_profile().await.unwrap(), before);
    assert_eq!(
        access.mutation_status(MutationKind::SaveCallerProfile).await,
        MutationStatus::Failed
    );
}

// ============================================================================
// Courses
// ============================================================================

#[tokio::test]
async fn test_admin_adds_course_and_directory_refreshes() {
    let admin = TestClient::new("secretary");
    admin.backend.seed_admin(principal("secretary")).await;
    let access = admin.app.access();

    assert_eq!(access.is_caller_admin().await.unwrap(), Fetched::Ready(true));
    let empty = CourseDirectoryPage::load(access, &CourseFilter::default())
        .await
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(empty.total, 0);

    access
        .add_course("Pine Valley", "https://pinevalley.example.org", true)
        .await
        .unwrap();
    access
        .add_course("Oakmont", "https://oakmont.example.org", false)
        .await
        .unwrap();

    let filter = CourseFilter {
        search: "pine".to_string(),
        location: LocationFilter::Local,
    };
    let page = CourseDirectoryPage::load(access, &filter)
        .await
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.courses.len(), 1);
    assert_eq!(page.courses[0].name, "Pine Valley");
}

#[tokio::test]
async fn test_non_admin_cannot_add_course() {
    let client = TestClient::new("alice");
    let mut notifications = client.app.notifier().subscribe();

    let err = client
        .app
        .access()
        .add_course("Oakmont", "https://oakmont.example.org", false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unauthorized"));

    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(notification.message.starts_with("Failed to add course"));
}

#[tokio::test]
async fn test_course_page_lists_members() {
    let admin = TestClient::new("secretary");
    admin.backend.seed_admin(principal("secretary")).await;
    admin
        .app
        .access()
        .add_course("Merion", "https://merion.example.org", true)
        .await
        .unwrap();
    admin.backend.seed_profile(principal("bob"), golfer(NEW_YORK, 8, Preference::Business)).await;
    admin.backend.seed_membership("Merion", principal("bob")).await;

    let page = CoursePage::load(admin.app.access(), "  Merion ")
        .await
        .unwrap()
        .ready()
        .unwrap();
    let course = page.course.unwrap();
    assert_eq!(course.members.len(), 1);

    let unknown = CoursePage::load(admin.app.access(), "Augusta")
        .await
        .unwrap()
        .ready()
        .unwrap();
    assert!(unknown.course.is_none());

    assert!(CoursePage::load(admin.app.access(), "   ").await.unwrap().is_disabled());
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_event_lifecycle() {
    let host = TestClient::new("alice");
    let guest = host.peer("bob");
    let mut notifications = host.app.notifier().subscribe();

    host.app
        .access()
        .create_event("  Bethpage Black ", " Saturday fourball ")
        .await
        .unwrap();
    let notification = notifications.try_recv().unwrap();
    assert_eq!(notification.level, NotificationLevel::Success);
    assert_eq!(notification.message, "Event created successfully!");

    let listings = guest.app.access().all_events().await.unwrap().ready().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].event.course_name, "Bethpage Black");
    assert_eq!(listings[0].event.description, "Saturday fourball");

    let bob = principal("bob");
    let action = RsvpAction::toggle(guest.app.access(), &listings[0], &bob)
        .await
        .unwrap();
    assert_eq!(action, RsvpAction::Rsvp);

    let listings = guest.app.access().all_events().await.unwrap().ready().unwrap();
    assert!(listings[0].is_attending(&bob));

    let action = RsvpAction::toggle(guest.app.access(), &listings[0], &bob)
        .await
        .unwrap();
    assert_eq!(action, RsvpAction::Cancel);

    let listings = guest.app.access().all_events().await.unwrap().ready().unwrap();
    assert!(!listings[0].is_attending(&bob));
}

#[tokio::test]
async fn test_events_page_splits_on_now() {
    let client = TestClient::new("alice");
    for (course, at) in [("Merion", 1_000), ("Oakmont", 3_000), ("Baltusrol", 2_000)] {
        client
            .backend
            .seed_event(Event {
                creator: principal("secretary"),
                course_name: course.to_string(),
                description: "Members' day".to_string(),
                timestamp: Timestamp::from_nanos(at),
            })
            .await;
    }

    let page = EventsPage::load(client.app.access(), Timestamp::from_nanos(2_000))
        .await
        .unwrap()
        .ready()
        .unwrap();

    let upcoming: Vec<_> = page.upcoming.iter().map(|l| l.event.course_name.as_str()).collect();
    let past: Vec<_> = page.past.iter().map(|l| l.event.course_name.as_str()).collect();
    assert_eq!(upcoming, ["Oakmont"]);
    assert_eq!(past, ["Merion", "Baltusrol"]);
    // Ids follow backend order, not the split
    assert_eq!(page.past[1].id.as_u64(), 2);
}

#[tokio::test]
async fn test_rsvp_to_missing_event_fails() {
    let client = TestClient::new("alice");
    let err = client
        .app
        .access()
        .rsvp_to_event(fairway_core::EventId::new(9))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MutationError::Backend {
            kind: MutationKind::RsvpToEvent,
            ..
        }
    ));
}

// ============================================================================
// Cache behaviour
// ============================================================================

#[tokio::test]
async fn test_reads_are_cached_until_invalidated() {
    let client = TestClient::new("alice");
    client.backend.seed_sponsor("Fairway Outfitters").await;
    let access = client.app.access();

    for _ in 0..3 {
        let sponsors = access.sponsors().await.unwrap().ready().unwrap();
        assert_eq!(sponsors, ["Fairway Outfitters"]);
    }
    assert_eq!(client.backend.calls(ops::GET_SPONSORS).await, 1);

    assert_eq!(access.cache().invalidate(&QueryKey::sponsors()).await, 1);
    access.sponsors().await.unwrap();
    assert_eq!(client.backend.calls(ops::GET_SPONSORS).await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_read_backs_off_then_recovers() {
    let config = fairway_client::ClientConfig {
        retry: RetryPolicy {
            base: Duration::from_secs(2),
            max: Duration::from_secs(30),
            jitter: false,
        },
        ..test_config()
    };
    let client = TestClient::with_config("alice", config);
    client.backend.seed_sponsor("Nineteenth Hole Brewing").await;
    client.backend.fail_on(ops::GET_SPONSORS).await;
    let access = client.app.access();

    let err = access.sponsors().await.unwrap_err();
    assert!(matches!(err, QueryError::Backend { .. }));

    let err = access.sponsors().await.unwrap_err();
    assert!(matches!(err, QueryError::BackingOff { .. }));
    assert_eq!(client.backend.calls(ops::GET_SPONSORS).await, 1);

    let snapshot = access.cache().snapshot(&QueryKey::sponsors()).await.unwrap();
    assert_eq!(snapshot.state, EntryState::Failed);
    assert_eq!(snapshot.failures, 1);

    client.backend.clear_failures().await;
    tokio::time::advance(Duration::from_secs(2)).await;

    let sponsors = access.sponsors().await.unwrap().ready().unwrap();
    assert_eq!(sponsors, ["Nineteenth Hole Brewing"]);
    let snapshot = access.cache().snapshot(&QueryKey::sponsors()).await.unwrap();
    assert_eq!(snapshot.state, EntryState::Ready);
    assert_eq!(snapshot.failures, 0);
}

#[tokio::test]
async fn test_shutdown_disables_every_query() {
    let client = TestClient::new("alice");
    let access = client.app.access();
    access.sponsors().await.unwrap();

    client.app.shutdown().await;

    assert!(access.sponsors().await.unwrap().is_disabled());
    assert!(access.caller_profile().await.unwrap().is_disabled());
    assert!(matches!(
        access.send_message(&principal("bob"), "Still there?").await,
        Err(MutationError::NotConnected)
    ));
    assert_eq!(client.backend.calls(ops::GET_CALLER_USER_PROFILE).await, 0);
}
