// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar days, durations and date formatting.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::Serialize;

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Unix timestamp of local midnight starting `date`.
pub fn day_start_timestamp(date: NaiveDate, offset: &FixedOffset) -> i64 {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match offset.from_local_datetime(&midnight).single() {
        Some(dt) => dt.timestamp(),
        None => midnight.and_utc().timestamp(),
    }
}

/// Every day from `start` through `end`, inclusive.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// First and last snapshot dates seen during aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportingPeriod {
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Widen the period to include `date`.
    pub fn include(&mut self, date: NaiveDate) {
        self.start = self.start.min(date);
        self.end = self.end.max(date);
    }

    /// One-based day number of the last day in the period.
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Period end formatted like "December 5".
    pub fn end_label(&self) -> String {
        self.end.format("%B %-d").to_string()
    }
}

/// Format an activity duration as `h:mm:ss`, or `mm:ss` under one hour.
pub fn format_seconds(seconds: u64) -> String {
    if seconds >= 3600 {
        format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        )
    } else {
        format!("{:02}:{:02}", (seconds / 60) % 60, seconds % 60)
    }
}

/// Format a total duration as `h:mm`, or `:mm` under one hour.
pub fn format_hours(seconds: u64) -> String {
    if seconds >= 3600 {
        format!("{}:{:02}", seconds / 3600, (seconds / 60) % 60)
    } else {
        format!(":{:02}", (seconds / 60) % 60)
    }
}

/// Format a date as `M/D/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Render timestamp shown in page footers, e.g. "Sat, 05 Dec 2020 08:30 -05:00".
pub fn format_render_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%a, %d %b %Y %H:%M %:z").to_string()
}
