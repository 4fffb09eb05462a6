//! Integration tests: feed download, cache round trip and week building.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use chrono::{Datelike, NaiveDate, Weekday};
use roomweek_calendar::{
    render_html, CalendarError, FeedCache, FeedClient, FixedClock, RetryConfig, WeeklyCalendar,
};
use roomweek_core::DocumentConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper to create a feed record
fn record(title: &str, day: &str, start: &str, end: &str, room: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "start_date": day,
        "start_time": start,
        "end_time": end,
        "locations": [{"location_name": room}]
    })
}

fn sample_feed() -> serde_json::Value {
    serde_json::json!([
        [
            [
                record("Story Time", "2024-02-05", "10:00:00 -0500", "11:00:00 -0500", "Main Hall"),
                record("Story Time", "2024-02-05", "10:00:00 -0500", "11:00:00 -0500", "Annex")
            ],
            [record("Chess Club", "2024-02-10", "18:30:00 -0500", "20:00:00 -0500", "Room B")]
        ],
        [
            [record("Book Sale", "2024-02-01", "09:00:00 -0500", "17:00:00 -0500", "Lobby")],
            [record("Closed", "2024-02-11", "00:00:00 -0500", "23:59:00 -0500", "Everywhere")]
        ]
    ])
}

#[test]
fn test_story_time_lands_on_next_monday() {
    let mut calendar = WeeklyCalendar::with_clock(FixedClock(date(2024, 2, 1)));
    calendar.set_events(&sample_feed()).unwrap();

    let monday = calendar.events_on(date(2024, 2, 5));
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].title(), "Story Time");
    assert_eq!(monday[0].location(), "Main Hall");
    assert_eq!(monday[0].full_display_string(), "10:00am - 11:00am");

    let saturday = calendar.events_on(date(2024, 2, 10));
    assert_eq!(saturday[0].full_display_string(), "6:30pm - 8:00pm");

    // Out-of-week records are dropped; every day of the week is still present.
    assert_eq!(calendar.event_count(), 2);
    assert_eq!(calendar.events().len(), 6);
    assert_eq!(calendar.week_of(), Some(date(2024, 2, 5)));
}

#[test]
fn test_week_always_monday_to_saturday() {
    for day in 1..=14 {
        let calendar = WeeklyCalendar::with_clock(FixedClock(date(2024, 7, day)));
        let dates = calendar.next_weeks_dates().unwrap();

        assert_eq!(dates[0].weekday(), Weekday::Mon);
        assert_eq!(dates[5].weekday(), Weekday::Sat);
        let today = date(2024, 7, day);
        assert!(dates[0] >= today);
        assert!((dates[0] - today).num_days() < 7);
    }
}

#[test]
fn test_bad_feed_keeps_previous_week() {
    let mut calendar = WeeklyCalendar::with_clock(FixedClock(date(2024, 2, 1)));
    calendar.set_events(&sample_feed()).unwrap();

    let broken = serde_json::json!([[
        [record("Story Time", "2024-02-06", "25:00", "26:00", "Main Hall")]
    ]]);
    let err = calendar.set_events(&broken).unwrap_err();

    assert!(matches!(err, CalendarError::InvalidInput(_)));
    assert_eq!(calendar.event_count(), 2);
}

#[test]
fn test_file_cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("nested").join("feeds.db");

    {
        let cache = FeedCache::new(&db).unwrap();
        cache.save("all-events", &sample_feed()).unwrap();
    }

    let cache = FeedCache::new(&db).unwrap();
    let feed = cache.load("all-events").unwrap().unwrap();

    let mut calendar = WeeklyCalendar::with_clock(FixedClock(date(2024, 2, 1)));
    calendar.set_events(&feed).unwrap();
    assert_eq!(calendar.event_count(), 2);
}

#[tokio::test]
async fn test_fetch_build_and_render() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_feed()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = FeedClient::new(
        &format!("{}/api/events", mock_server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_retry(RetryConfig::none());

    let feed = client.fetch().await.unwrap();

    let mut calendar = WeeklyCalendar::with_clock(FixedClock(date(2024, 2, 1)));
    calendar.set_events(&feed).unwrap();

    let html = render_html(calendar.events(), &DocumentConfig::default());
    assert!(html.contains("Story Time"));
    assert!(html.contains("Chess Club"));
    assert!(!html.contains("Book Sale"));
    assert_eq!(html.matches("No events").count(), 4);
}
