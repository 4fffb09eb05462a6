//! Weekly room-schedule builder.
//!
//! Turns a library's per-branch event feed into a Monday–Saturday calendar
//! and renders it for printing. The feed can be fetched over HTTP and kept in
//! a local SQLite cache.

pub mod cache;
pub mod calendar;
pub mod client;
pub mod error;
pub mod feed;
pub mod render;
pub mod retry;
pub mod time;
pub mod types;

pub use cache::FeedCache;
pub use calendar::{
    build_calendar, date_key, next_monday, next_weeks_dates, Clock, DayBuckets, FixedClock,
    SystemClock, WeeklyCalendar, WEEK_LENGTH,
};
pub use client::FeedClient;
pub use error::CalendarError;
pub use render::render_html;
pub use retry::RetryConfig;
pub use time::{format_time, ClockTime};
pub use types::Event;
