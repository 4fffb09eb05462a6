//! Walking the raw event feed.
//!
//! The feed is a list of branches. Each branch lists groups of alternate
//! representations of the same occurrence, and only the first record of a
//! group is authoritative:
//!
//! ```text
//! [ [ [ {record}, {alternate}, ... ], ... ],   <- branch 0
//!   [ ... ] ]                                  <- branch 1
//! ```
//!
//! A branch entry that is a bare record object counts as a group of one.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::CalendarError;
use crate::types::Event;

/// Where a record sits in the feed, for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPosition {
    pub branch: usize,
    pub entry: usize,
}

impl fmt::Display for RecordPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch {}, entry {}", self.branch, self.entry)
    }
}

/// The canonical record of one feed group.
#[derive(Debug, Clone, Copy)]
pub struct FeedRecord<'a> {
    pub position: RecordPosition,
    record: &'a Map<String, Value>,
}

/// Collect the canonical record of every group, in feed order.
///
/// Fails if the feed is not a non-empty list of lists, if a group is empty,
/// or if a canonical record is not an object.
pub fn canonical_records(raw_feed: &Value) -> Result<Vec<FeedRecord<'_>>, CalendarError> {
    let branches = match raw_feed {
        Value::Array(branches) if !branches.is_empty() => branches,
        Value::Array(_) => return Err(CalendarError::invalid("event feed is empty")),
        Value::Null => return Err(CalendarError::invalid("event feed is missing")),
        other => {
            return Err(CalendarError::invalid(format!(
                "event feed must be a list of branches, got {}",
                kind(other)
            )))
        }
    };

    let mut records = Vec::new();
    for (branch, entries) in branches.iter().enumerate() {
        let Value::Array(entries) = entries else {
            return Err(CalendarError::invalid(format!(
                "branch {branch} must be a list, got {}",
                kind(entries)
            )));
        };

        for (entry, group) in entries.iter().enumerate() {
            let position = RecordPosition { branch, entry };
            let canonical = match group {
                Value::Array(alternates) => alternates.first().ok_or_else(|| {
                    CalendarError::invalid(format!("{position}: event group is empty"))
                })?,
                record => record,
            };

            let Value::Object(record) = canonical else {
                return Err(CalendarError::invalid(format!(
                    "{position}: event record must be an object, got {}",
                    kind(canonical)
                )));
            };

            records.push(FeedRecord { position, record });
        }
    }

    Ok(records)
}

impl<'a> FeedRecord<'a> {
    /// The record's `start_date`, exactly as written.
    pub fn start_date(&self) -> Result<&'a str, CalendarError> {
        self.text("start_date")
    }

    /// Convert to an [`Event`]; the location is `locations[0].location_name`.
    pub fn to_event(&self) -> Result<Event, CalendarError> {
        let title = self.text("title")?;
        let start_date = self.text("start_date")?;
        let start_time = self.text("start_time")?;
        let end_time = self.text("end_time")?;
        let location = self.location_name()?;

        Event::new(title, start_date, start_time, end_time, location)
            .map_err(|e| e.in_context(self.position))
    }

    fn text(&self, key: &str) -> Result<&'a str, CalendarError> {
        match self.record.get(key) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(CalendarError::invalid(format!(
                "{}: `{key}` must be text, got {}",
                self.position,
                kind(other)
            ))),
            None => Err(CalendarError::invalid(format!(
                "{}: `{key}` is missing",
                self.position
            ))),
        }
    }

    fn location_name(&self) -> Result<&'a str, CalendarError> {
        let first = match self.record.get("locations") {
            Some(Value::Array(locations)) => locations.first().ok_or_else(|| {
                CalendarError::invalid(format!("{}: `locations` is empty", self.position))
            })?,
            Some(other) => {
                return Err(CalendarError::invalid(format!(
                    "{}: `locations` must be a list, got {}",
                    self.position,
                    kind(other)
                )))
            }
            None => {
                return Err(CalendarError::invalid(format!(
                    "{}: `locations` is missing",
                    self.position
                )))
            }
        };

        match first.get("location_name") {
            Some(Value::String(name)) => Ok(name.as_str()),
            Some(other) => Err(CalendarError::invalid(format!(
                "{}: `locations[0].location_name` must be text, got {}",
                self.position,
                kind(other)
            ))),
            None => Err(CalendarError::invalid(format!(
                "{}: `locations[0].location_name` is missing",
                self.position
            ))),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
