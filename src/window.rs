//! Event time-window classification.
//!
//! Every function takes the reference `now` explicitly; handlers pass
//! `chrono::Utc::now()`. Timestamps are RFC 3339 strings, either UTC or
//! offset-aware.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    /// Minutes that must remain (strictly more) for a late join to be allowed.
    pub join_late_threshold_minutes: i64,
    pub starting_soon_window_minutes: i64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        WindowPolicy {
            join_late_threshold_minutes: crate::hang::JOIN_LATE_THRESHOLD_MINUTES,
            starting_soon_window_minutes: crate::hang::STARTING_SOON_WINDOW_MINUTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    NotStarted,
    JoinableLate,
    InProgressNotJoinable,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventWindow {
    pub state: WindowState,
    pub minutes_until_start: i64,
    pub minutes_until_end: i64,
    pub starting_soon: bool,
    pub label: String,
}

/// Parses an RFC 3339 timestamp, trimming surrounding whitespace and normalising to UTC.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<Timestamp, ValidationError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|it| it.with_timezone(&Utc))
        .map_err(|err| ValidationError::new(field, format!("not an RFC 3339 timestamp: {err}")))
}

// floor division, clamped at zero
fn whole_minutes_between(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_seconds().div_euclid(60).max(0)
}

impl WindowPolicy {
    pub fn can_join_late(&self, start: Timestamp, end: Timestamp, now: Timestamp) -> bool {
        start < now
            && now < end
            && whole_minutes_between(now, end) > self.join_late_threshold_minutes
    }

    pub fn is_starting_soon(&self, start: Timestamp, now: Timestamp) -> bool {
        let minutes = whole_minutes_between(now, start);
        0 < minutes && minutes <= self.starting_soon_window_minutes
    }

    pub fn classify(&self, start: Timestamp, end: Timestamp, now: Timestamp) -> EventWindow {
        let state = if now <= start {
            WindowState::NotStarted
        } else if now >= end {
            WindowState::Ended
        } else if self.can_join_late(start, end, now) {
            WindowState::JoinableLate
        } else {
            WindowState::InProgressNotJoinable
        };

        let minutes_until_start = whole_minutes_between(now, start);
        EventWindow {
            state,
            minutes_until_start,
            minutes_until_end: whole_minutes_between(now, end),
            starting_soon: self.is_starting_soon(start, now),
            label: format_minutes_until_start(minutes_until_start),
        }
    }

    pub fn classify_raw(
        &self,
        start: &str,
        end: &str,
        now: Timestamp,
    ) -> Result<EventWindow, ValidationError> {
        let start = parse_timestamp("start_time", start)?;
        let end = parse_timestamp("end_time", end)?;
        Ok(self.classify(start, end, now))
    }
}

pub fn minutes_until_event_end(end: &str, now: Timestamp) -> Result<i64, ValidationError> {
    let end = parse_timestamp("end_time", end)?;
    Ok(whole_minutes_between(now, end))
}

pub fn can_join_late(start: &str, end: &str, now: Timestamp) -> Result<bool, ValidationError> {
    let start = parse_timestamp("start_time", start)?;
    let end = parse_timestamp("end_time", end)?;
    Ok(WindowPolicy::default().can_join_late(start, end, now))
}

pub fn minutes_until_start(start: &str, now: Timestamp) -> Result<i64, ValidationError> {
    let start = parse_timestamp("start_time", start)?;
    Ok(whole_minutes_between(now, start))
}

pub fn format_time_until_start(start: &str, now: Timestamp) -> Result<String, ValidationError> {
    Ok(format_minutes_until_start(minutes_until_start(start, now)?))
}

pub fn is_starting_soon(start: &str, now: Timestamp) -> Result<bool, ValidationError> {
    let start = parse_timestamp("start_time", start)?;
    Ok(WindowPolicy::default().is_starting_soon(start, now))
}

fn format_minutes_until_start(minutes: i64) -> String {
    match (minutes / 60, minutes % 60) {
        (0, 0) => String::from("Starting now"),
        (0, minutes) => format!("in {minutes}m"),
        (hours, 0) => format!("in {hours}h"),
        (hours, minutes) => format!("in {hours}h {minutes}m"),
    }
}
