// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Club activity records, as stored in snapshots and after normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Athlete reference embedded in a club activity.
///
/// Club feeds only expose first name and last initial, so there is no athlete id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAthlete {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
}

impl RawAthlete {
    /// Display name used to group activities ("Jane D.").
    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).replace(" .", "")
    }
}

/// One entry of a club activity feed, exactly as returned by Strava.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    #[serde(default)]
    pub athlete: RawAthlete,
    #[serde(default)]
    pub name: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Elapsed time in seconds
    pub elapsed_time: u64,
    #[serde(default)]
    pub total_elevation_gain: f64,
    /// Activity type (Ride, Run, Hike, etc.)
    #[serde(rename = "type")]
    pub activity_type: String,
}

impl RawActivity {
    /// Heuristic for activities entered by hand rather than recorded with GPS.
    ///
    /// Recorded activities nearly always have some elevation gain and a pause or
    /// two. Both false positives and false negatives are possible and accepted.
    pub fn is_manual(&self) -> bool {
        self.total_elevation_gain == 0.0 && self.moving_time == self.elapsed_time
    }
}

/// Normalized activity produced by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// Synthesized identifier (see [`synthesize_id`])
    pub id: String,
    pub athlete: RawAthlete,
    pub name: String,
    /// Sport after `convert_to` and pace reclassification
    pub sport: String,
    /// Distance in the configured distance unit
    pub distance: f64,
    pub moving_time: u64,
    pub elapsed_time: u64,
    pub total_elevation_gain: f64,
    /// Snapshot date the activity was recorded under
    pub date: NaiveDate,
    /// Adjusted distance or score
    pub total: f64,
}

/// Build a stable identifier for an activity.
///
/// Club feeds carry no activity id, so one is derived from values that do not
/// change between fetches. Any edit to the activity upstream changes the id.
#[allow(clippy::too_many_arguments)]
pub fn synthesize_id(
    club_id: u64,
    athlete: &str,
    date: NaiveDate,
    distance: f64,
    sport: &str,
    moving_time: u64,
    elapsed_time: u64,
    elevation_gain: f64,
) -> String {
    let key = format!(
        "{}{}{}{:.6}{}{}{}{:.6}",
        club_id,
        athlete,
        date.format("%Y-%m-%d"),
        distance,
        sport,
        moving_time,
        elapsed_time,
        elevation_gain
    );
    hex::encode(Sha256::digest(key.as_bytes()))
}
