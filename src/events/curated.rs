// src/events/curated.rs
//! Hand-authored baseline events, decorated with picture-of-the-day images.

use chrono::{Duration, NaiveDate};
use futures::future::join_all;

use crate::events::types::{Event, EventKind};
use crate::sources::{display_url_or_fallback, PictureSource};

pub const CURATED_PRIORITY: u8 = 2;

struct Seed {
    id: i64,
    title: &'static str,
    date: &'static str,
    kind: EventKind,
    location: &'static str,
    description: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        id: 1,
        title: "Perseid Meteor Shower",
        date: "2025-08-12T00:00:00",
        kind: EventKind::MeteorShower,
        location: "Northern Hemisphere",
        description: "Annual meteor shower producing up to 100 meteors per hour in August.",
    },
    Seed {
        id: 2,
        title: "Jupiter at Opposition",
        date: "2025-11-03T00:00:00",
        kind: EventKind::PlanetaryEvent,
        location: "Night sky worldwide",
        description: "Jupiter shines the brightest and is closest to Earth. Look east after sunset.",
    },
    Seed {
        id: 3,
        title: "Total Solar Eclipse",
        date: "2026-08-12T00:00:00",
        kind: EventKind::Eclipse,
        location: "Europe & Asia",
        description: "The Moon blocks the Sun completely, turning day into night.",
    },
    Seed {
        id: 4,
        title: "Mars Close Approach",
        date: "2025-12-08T00:00:00",
        kind: EventKind::PlanetaryEvent,
        location: "Eastern sky after sunset",
        description: "Mars will appear bright and red, best time to view with a telescope.",
    },
    Seed {
        id: 5,
        title: "Geminid Meteor Shower",
        date: "2025-12-14T00:00:00",
        kind: EventKind::MeteorShower,
        location: "Northern Hemisphere",
        description: "A strong meteor shower known for bright colorful meteors every December.",
    },
    Seed {
        id: 6,
        title: "Venus-Jupiter Conjunction",
        date: "2025-03-01T00:00:00",
        kind: EventKind::PlanetaryConjunction,
        location: "Pre-dawn eastern sky",
        description: "Venus and Jupiter appear very close, a stunning view without a telescope.",
    },
    Seed {
        id: 7,
        title: "Annular Solar Eclipse",
        date: "2026-02-17T00:00:00",
        kind: EventKind::Eclipse,
        location: "Southern Hemisphere",
        description: "Moon doesn't fully cover the Sun. Watch the \"ring of fire\" safely.",
    },
    Seed {
        id: 8,
        title: "Saturn at Opposition",
        date: "2025-08-27T00:00:00",
        kind: EventKind::PlanetaryEvent,
        location: "Worldwide night sky",
        description: "Best time to view Saturn and its rings all night long.",
    },
    Seed {
        id: 9,
        title: "Lyrid Meteor Shower",
        date: "2026-04-22T00:00:00",
        kind: EventKind::MeteorShower,
        location: "Pre-dawn hours",
        description: "20+ meteors per hour. Best seen early morning under dark skies.",
    },
];

/// Number of curated records (and of image lookups).
pub fn curated_count() -> usize {
    SEEDS.len()
}

/// Anchor dates for the decorative images: today, yesterday, ... one per seed.
pub fn image_anchor_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..SEEDS.len() as i64)
        .map(|i| today - Duration::days(i))
        .collect()
}

/// Curated events in authoring order, each with its image resolved.
/// Lookups run concurrently; any failure leaves the placeholder for that slot only.
pub async fn curated_events(pictures: &dyn PictureSource, today: NaiveDate) -> Vec<Event> {
    let anchors = image_anchor_dates(today);
    let urls = join_all(
        anchors
            .iter()
            .map(|d| display_url_or_fallback(pictures, *d)),
    )
    .await;

    SEEDS
        .iter()
        .zip(urls)
        .map(|(seed, image_url)| Event {
            id: seed.id,
            title: seed.title.to_string(),
            date: seed.date.to_string(),
            kind: seed.kind,
            subtype: None,
            location: seed.location.to_string(),
            image_url,
            description: seed.description.to_string(),
            is_real_event: false,
            priority: CURATED_PRIORITY,
            raw_data: None,
        })
        .collect()
}
