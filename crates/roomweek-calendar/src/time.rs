//! Feed clock times and their 12-hour display form.
//!
//! The feed writes times as `HH:MM:SS -0500`. Seconds and the UTC offset are
//! accepted but dropped: the printed schedule only shows `2:30pm`.

use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Hour and minute of a feed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, CalendarError> {
        if hour > 23 {
            return Err(CalendarError::invalid(format!("hour {hour} is out of range")));
        }
        if minute > 59 {
            return Err(CalendarError::invalid(format!(
                "minute {minute} is out of range"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parse `H:MM`, `HH:MM:SS`, optionally followed by a space and an offset.
    pub fn parse(raw: &str) -> Result<Self, CalendarError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CalendarError::invalid("time cannot be empty"));
        }

        // The offset segment, if any, is discarded.
        let clock = trimmed.split_whitespace().next().unwrap_or(trimmed);
        let parts: Vec<&str> = clock.split(':').collect();

        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m] => (*h, *m, None),
            [h, m, s] => (*h, *m, Some(*s)),
            _ => {
                return Err(CalendarError::invalid(format!(
                    "time `{trimmed}` is not HH:MM or HH:MM:SS"
                )))
            }
        };

        if !is_digits(hours, 1, 2) {
            return Err(CalendarError::invalid(format!(
                "time `{trimmed}` has a malformed hour"
            )));
        }
        if !is_digits(minutes, 2, 2) {
            return Err(CalendarError::invalid(format!(
                "time `{trimmed}` has a malformed minute"
            )));
        }
        if let Some(seconds) = seconds {
            if !is_digits(seconds, 1, 2) {
                return Err(CalendarError::invalid(format!(
                    "time `{trimmed}` has malformed seconds"
                )));
            }
        }

        let hour = hours
            .parse::<u8>()
            .map_err(|e| CalendarError::invalid(format!("time `{trimmed}`: {e}")))?;
        let minute = minutes
            .parse::<u8>()
            .map_err(|e| CalendarError::invalid(format!("time `{trimmed}`: {e}")))?;

        Self::new(hour, minute)
            .map_err(|e| e.in_context(format!("time `{trimmed}`")))
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// `am` before noon, `pm` from noon on.
    pub fn suffix(&self) -> &'static str {
        if self.hour < 12 {
            "am"
        } else {
            "pm"
        }
    }

    /// Hour on a 12-hour dial: midnight is 12, 13–23 wrap to 1–11.
    pub fn hour12(&self) -> u8 {
        match self.hour {
            0 => 12,
            h if h > 12 => h - 12,
            h => h,
        }
    }
}

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for ClockTime {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders `2:30pm`.
impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}{}", self.hour12(), self.minute, self.suffix())
    }
}

/// Format a 24-hour feed time (`"14:30:12 -0500"`) as `"2:30pm"`.
pub fn format_time(raw: &str) -> Result<String, CalendarError> {
    Ok(ClockTime::parse(raw)?.to_string())
}
