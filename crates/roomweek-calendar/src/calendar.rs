//! The upcoming Monday–Saturday schedule.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, info, instrument, trace};

use crate::error::CalendarError;
use crate::feed::canonical_records;
use crate::types::Event;

/// Days on the printed schedule: Monday through Saturday.
pub const WEEK_LENGTH: usize = 6;

/// Events grouped by day, in date order.
pub type DayBuckets = BTreeMap<NaiveDate, Vec<Event>>;

/// Source of "today".
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The nearest Monday on or after `today`.
pub fn next_monday(today: NaiveDate) -> Result<NaiveDate, CalendarError> {
    let days_ahead = (7 - today.weekday().num_days_from_monday()) % 7;
    today
        .checked_add_days(Days::new(u64::from(days_ahead)))
        .ok_or_else(|| CalendarError::invalid(format!("no Monday follows {today}")))
}

/// Monday through Saturday of the week starting at `next_monday(today)`.
pub fn next_weeks_dates(today: NaiveDate) -> Result<[NaiveDate; WEEK_LENGTH], CalendarError> {
    let monday = next_monday(today)?;
    let mut dates = [monday; WEEK_LENGTH];
    for (offset, date) in dates.iter_mut().enumerate().skip(1) {
        *date = monday
            .checked_add_days(Days::new(offset as u64))
            .ok_or_else(|| CalendarError::invalid(format!("week of {monday} runs past the calendar")))?;
    }
    Ok(dates)
}

/// `YYYY-MM-DD`, the form feed records use for `start_date`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Group the feed's events for the week after `today`.
///
/// All six days are present in the result, with an empty list when nothing
/// is booked. Records dated outside the week are skipped; any record inside
/// the week that fails validation aborts the whole build.
pub fn build_calendar(raw_feed: &Value, today: NaiveDate) -> Result<DayBuckets, CalendarError> {
    let records = canonical_records(raw_feed)?;
    let dates = next_weeks_dates(today)?;
    let keys = dates.map(date_key);

    let mut buckets: DayBuckets = dates.iter().map(|date| (*date, Vec::new())).collect();
    let mut skipped = 0usize;

    for record in &records {
        let start_date = record.start_date()?;
        let Some(day) = keys.iter().position(|key| key == start_date) else {
            trace!(position = %record.position, start_date, "Record outside target week");
            skipped += 1;
            continue;
        };

        let event = record.to_event()?;
        buckets.entry(dates[day]).or_default().push(event);
    }

    info!(
        week_of = %dates[0],
        matched = records.len() - skipped,
        skipped,
        "Built weekly calendar"
    );
    Ok(buckets)
}

/// Schedule for the week after the clock's current date.
#[derive(Debug)]
pub struct WeeklyCalendar<C = SystemClock> {
    clock: C,
    events: DayBuckets,
}

impl WeeklyCalendar<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for WeeklyCalendar<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> WeeklyCalendar<C> {
    /// A calendar with no events until a feed is assigned.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            events: DayBuckets::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The six target dates, recomputed from the clock on each call.
    pub fn next_weeks_dates(&self) -> Result<[NaiveDate; WEEK_LENGTH], CalendarError> {
        next_weeks_dates(self.clock.today())
    }

    /// Build the day buckets for `raw_feed` without touching this calendar.
    pub fn build_calendar(&self, raw_feed: &Value) -> Result<DayBuckets, CalendarError> {
        build_calendar(raw_feed, self.clock.today())
    }

    /// Replace the calendar's events with those from `raw_feed`.
    ///
    /// On error the previous events are kept.
    #[instrument(skip_all, level = "debug")]
    pub fn set_events(&mut self, raw_feed: &Value) -> Result<(), CalendarError> {
        let events = self.build_calendar(raw_feed)?;
        debug!(days = events.len(), "Replacing calendar events");
        self.events = events;
        Ok(())
    }

    pub fn events(&self) -> &DayBuckets {
        &self.events
    }

    /// Events booked on `date`; empty for dates outside the week.
    pub fn events_on(&self, date: NaiveDate) -> &[Event] {
        self.events.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Monday of the loaded week, if a feed has been assigned.
    pub fn week_of(&self) -> Option<NaiveDate> {
        self.events.keys().next().copied()
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }
}
