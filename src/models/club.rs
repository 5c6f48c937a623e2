// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Club metadata and the raw per-day snapshots loaded for a club.

use crate::models::RawActivity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Club details as returned by `GET /clubs/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Vanity URL slug, may be empty
    #[serde(default)]
    pub url: Option<String>,
    /// Large avatar URL
    #[serde(default)]
    pub profile: String,
    /// Medium avatar URL
    #[serde(default)]
    pub profile_medium: String,
}

impl Club {
    /// Path segment for the club's Strava page, preferring the vanity URL.
    pub fn slug(&self) -> String {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => self.id.to_string(),
        }
    }
}

/// One day's worth of raw activities for a club.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub activities: Vec<RawActivity>,
}

/// Everything read from storage for one club, in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClubSnapshots {
    pub club: Club,
    pub snapshots: Vec<Snapshot>,
}
