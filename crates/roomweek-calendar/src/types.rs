//! Validated schedule entries.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CalendarError;
use crate::time::ClockTime;

/// One room booking on the printed schedule.
///
/// Built only through [`Event::new`], which rejects empty or malformed
/// fields; there are no setters, so a constructed event is always valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    title: String,
    date: NaiveDate,
    start_time: String,
    end_time: String,
    location: String,
    #[serde(skip)]
    start: ClockTime,
    #[serde(skip)]
    end: ClockTime,
}

impl Event {
    /// Validate and build an event.
    ///
    /// `date` must be `YYYY-MM-DD`; times are `HH:MM:SS [+-]HHMM` or `HH:MM`.
    /// Title and location are stored trimmed.
    pub fn new(
        title: &str,
        date: &str,
        start_time: &str,
        end_time: &str,
        location: &str,
    ) -> Result<Self, CalendarError> {
        let title = require_text("title", title)?;
        let date_str = require_text("date", date)?;
        let start_time = require_text("start_time", start_time)?;
        let end_time = require_text("end_time", end_time)?;
        let location = require_text("location", location)?;

        let date = parse_canonical_date(date_str)?;
        let start = ClockTime::parse(start_time).map_err(|e| e.in_context("`start_time`"))?;
        let end = ClockTime::parse(end_time).map_err(|e| e.in_context("`end_time`"))?;

        Ok(Self {
            title: title.to_string(),
            date,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            location: location.to_string(),
            start,
            end,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Start time as it appeared in the feed.
    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    /// End time as it appeared in the feed.
    pub fn end_time(&self) -> &str {
        &self.end_time
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn start(&self) -> ClockTime {
        self.start
    }

    pub fn end(&self) -> ClockTime {
        self.end
    }

    /// Time range for the schedule cell, e.g. `10:00am - 11:00am`.
    pub fn full_display_string(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Event(title={}, date={}, location={})",
            self.title, self.date, self.location
        )
    }
}

/// Parse `YYYY-MM-DD`, rejecting the unpadded, signed and short-year forms
/// (`2024-2-5`, `+2024-02-05`, `24-02-05`) that `%Y-%m-%d` lets through.
fn parse_canonical_date(raw: &str) -> Result<NaiveDate, CalendarError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
        CalendarError::invalid(format!("`date` value `{raw}` is not YYYY-MM-DD: {e}"))
    })?;

    if date.format("%Y-%m-%d").to_string() != raw {
        return Err(CalendarError::invalid(format!(
            "`date` value `{raw}` is not YYYY-MM-DD"
        )));
    }
    Ok(date)
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, CalendarError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CalendarError::invalid(format!("`{field}` cannot be empty")));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn story_time() -> Result<Event, CalendarError> {
        Event::new(
            "Story Time",
            "2024-02-05",
            "10:00:00 -0500",
            "11:00:00 -0500",
            "Main Hall",
        )
    }

    #[test]
    fn test_event_new() {
        let event = story_time().unwrap();

        assert_eq!(event.title(), "Story Time");
        assert_eq!(event.date(), NaiveDate::from_ymd_opt(2024, 2, 5).unwrap());
        assert_eq!(event.start_time(), "10:00:00 -0500");
        assert_eq!(event.end_time(), "11:00:00 -0500");
        assert_eq!(event.location(), "Main Hall");
    }

    #[test]
    fn test_full_display_string() {
        let event = story_time().unwrap();
        assert_eq!(event.full_display_string(), "10:00am - 11:00am");

        let evening = Event::new("Chess Club", "2024-02-06", "18:30", "20:00", "Room B").unwrap();
        assert_eq!(evening.full_display_string(), "6:30pm - 8:00pm");
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = Event::new("", "2024-02-05", "10:00", "11:00", "Main Hall").unwrap_err();
        assert!(matches!(err, CalendarError::InvalidInput(ref m) if m.contains("title")));
    }

    #[test]
    fn test_whitespace_title_rejected() {
        let err = Event::new("   ", "2024-02-05", "10:00", "11:00", "Main Hall").unwrap_err();
        assert!(matches!(err, CalendarError::InvalidInput(ref m) if m.contains("title")));
    }

    #[test]
    fn test_each_field_required() {
        assert!(Event::new("T", "", "10:00", "11:00", "L").is_err());
        assert!(Event::new("T", "2024-02-05", "", "11:00", "L").is_err());
        assert!(Event::new("T", "2024-02-05", "10:00", " ", "L").is_err());
        assert!(Event::new("T", "2024-02-05", "10:00", "11:00", "").is_err());
    }

    #[test]
    fn test_malformed_date_rejected() {
        let err = Event::new("T", "02/05/2024", "10:00", "11:00", "L").unwrap_err();
        assert!(err.to_string().contains("YYYY-MM-DD"));

        assert!(Event::new("T", "2024-02-30", "10:00", "11:00", "L").is_err());
    }

    #[test]
    fn test_non_canonical_date_rejected() {
        for date in ["2024-2-5", "2024-02-5", "+2024-02-05", "24-02-05", "02024-02-05"] {
            let err = Event::new("T", date, "10:00", "11:00", "L").unwrap_err();
            assert!(
                matches!(err, CalendarError::InvalidInput(ref m) if m.contains("YYYY-MM-DD")),
                "{date} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_time_names_field() {
        let err = Event::new("T", "2024-02-05", "10:00", "late", "L").unwrap_err();
        assert!(err.to_string().contains("end_time"));
    }

    #[test]
    fn test_title_and_location_trimmed() {
        let event = Event::new("  Lego Club ", "2024-02-05", "15:00", "16:00", " Annex ").unwrap();
        assert_eq!(event.title(), "Lego Club");
        assert_eq!(event.location(), "Annex");
    }

    #[test]
    fn test_serializes_feed_fields() {
        let event = story_time().unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["title"], "Story Time");
        assert_eq!(json["date"], "2024-02-05");
        assert_eq!(json["start_time"], "10:00:00 -0500");
        assert_eq!(json["location"], "Main Hall");
        assert!(json.get("start").is_none());
    }
}
