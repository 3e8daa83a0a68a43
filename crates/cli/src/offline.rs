//! Seeded in-memory data for `--offline`.

use std::error::Error;

use fairway_client::{Backend, InMemoryBackend};
use fairway_core::{
    Coordinates, Event, Gender, Preference, Principal, Timestamp, UserProfile,
};

const NANOS_PER_DAY: i64 = 86_400 * 1_000_000_000;

fn golfer(
    lat: f64,
    lon: f64,
    handicap: i64,
    gender: Gender,
    preference: Preference,
    bio: &str,
) -> UserProfile {
    UserProfile {
        location: Coordinates::new(lat, lon),
        handicap,
        gender,
        looking_for: Gender::Couple,
        gender_preference: Gender::Female,
        preference,
        bio: bio.to_string(),
        avatar: None,
    }
}

/// A backend with a few golfers, courses, events and messages around
/// Manhattan. The caller is `demo-golfer`.
pub async fn seeded_backend() -> Result<InMemoryBackend, Box<dyn Error>> {
    let me = Principal::parse("demo-golfer")?;
    let backend = InMemoryBackend::new(me.clone());
    let admin = backend.as_caller(Principal::parse("club-secretary")?);
    backend.seed_admin(Principal::parse("club-secretary")?).await;

    backend
        .seed_profile(
            me.clone(),
            golfer(
                40.7128,
                -74.0060,
                18,
                Gender::Male,
                Preference::Casual,
                "Bogey golfer, early tee times",
            ),
        )
        .await;

    let golfers = [
        ("hudson-hitter", (40.7580, -73.9855), 9, Gender::Female, Preference::Business, "Client rounds on weekdays"),
        ("jersey-jane", (40.7178, -74.0431), 22, Gender::Female, Preference::Casual, "Twilight nines"),
        ("long-island-lou", (40.7891, -73.1350), 4, Gender::Male, Preference::Pleasure, "Match play, walking only"),
        ("westchester-pair", (41.0340, -73.7629), 15, Gender::Couple, Preference::Romantic, "Couples scramble fans"),
        ("la-lefty", (34.0522, -118.2437), 12, Gender::Male, Preference::Casual, "Visiting in the spring"),
    ];
    for (owner, (lat, lon), handicap, gender, preference, bio) in golfers {
        backend
            .seed_profile(Principal::parse(owner)?, golfer(lat, lon, handicap, gender, preference, bio))
            .await;
    }

    let courses = [
        ("Bethpage Black", "https://bethpage.example.org", true),
        ("Liberty National", "https://liberty.example.org", true),
        ("Winged Foot", "https://wingedfoot.example.org", false),
        ("Shinnecock Hills", "https://shinnecock.example.org", false),
    ];
    for (name, website, is_local) in courses {
        admin.add_course(name, website, is_local).await?;
    }
    backend.seed_membership("Bethpage Black", Principal::parse("long-island-lou")?).await;
    backend.seed_membership("Bethpage Black", me.clone()).await;
    backend.seed_membership("Liberty National", Principal::parse("jersey-jane")?).await;

    let now = Timestamp::now().as_nanos();
    let events = [
        ("Bethpage Black", "Saturday fourball, all handicaps", now + 3 * NANOS_PER_DAY),
        ("Liberty National", "After-work nine", now + 7 * NANOS_PER_DAY),
        ("Winged Foot", "Club championship viewing", now - 14 * NANOS_PER_DAY),
    ];
    for (course_name, description, at) in events {
        backend
            .seed_event(Event {
                creator: Principal::parse("club-secretary")?,
                course_name: course_name.to_string(),
                description: description.to_string(),
                timestamp: Timestamp::from_nanos(at),
            })
            .await;
    }

    for sponsor in ["Fairway Outfitters", "Nineteenth Hole Brewing"] {
        backend.seed_sponsor(sponsor).await;
    }

    let jane = backend.as_caller(Principal::parse("jersey-jane")?);
    jane.send_message(&me, "Up for a twilight nine at Liberty?")
        .await?;

    Ok(backend)
}
