// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use strava_club_tracker::config::TrackerRules;
use strava_club_tracker::error::AppError;
use strava_club_tracker::models::{Club, ClubSnapshots, RawActivity, RawAthlete, Snapshot};
use strava_club_tracker::services::{ClubActivitySource, TrackerSettings};

/// Meters per mile, the default distance unit.
#[allow(dead_code)]
pub const MILE: f64 = 1609.344;

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[allow(dead_code)]
pub fn club(id: u64, name: &str) -> Club {
    Club {
        id,
        name: name.to_string(),
        url: None,
        profile: "avatar/club/large.png".to_string(),
        profile_medium: "avatar/club/medium.png".to_string(),
    }
}

/// A GPS-recorded activity: some elevation gain and a short pause.
#[allow(dead_code)]
pub fn activity(athlete: &str, sport: &str, miles: f64, moving_time: u64) -> RawActivity {
    let (first, last) = athlete.split_once(' ').unwrap_or((athlete, ""));
    RawActivity {
        athlete: RawAthlete {
            firstname: first.to_string(),
            lastname: last.to_string(),
        },
        name: format!("{} {} miles", sport, miles),
        distance: miles * MILE,
        moving_time,
        elapsed_time: moving_time + 60,
        total_elevation_gain: 10.0,
        activity_type: sport.to_string(),
    }
}

/// An activity that looks hand-entered: no elevation, no pauses.
#[allow(dead_code)]
pub fn manual_activity(athlete: &str, sport: &str, miles: f64, moving_time: u64) -> RawActivity {
    RawActivity {
        elapsed_time: moving_time,
        total_elevation_gain: 0.0,
        ..activity(athlete, sport, miles, moving_time)
    }
}

#[allow(dead_code)]
pub fn snapshot(date: NaiveDate, activities: Vec<RawActivity>) -> Snapshot {
    Snapshot { date, activities }
}

#[allow(dead_code)]
pub fn club_snapshots(club: Club, snapshots: Vec<Snapshot>) -> ClubSnapshots {
    ClubSnapshots { club, snapshots }
}

/// Ride x0.25, Run max 15, Walk max 8, Hike -> Walk, in miles.
#[allow(dead_code)]
pub fn default_settings() -> TrackerSettings {
    TrackerSettings::from(&TrackerRules::default())
}

/// Club activity JSON as the club feed returns it.
#[allow(dead_code)]
pub fn feed_entry(athlete: &str, sport: &str, meters: f64, moving_time: u64) -> Value {
    let (first, last) = athlete.split_once(' ').unwrap_or((athlete, ""));
    json!({
        "resource_state": 2,
        "athlete": {"resource_state": 2, "firstname": first, "lastname": last},
        "name": format!("{} {}", sport, meters),
        "distance": meters,
        "moving_time": moving_time,
        "elapsed_time": moving_time + 30,
        "total_elevation_gain": 12.5,
        "type": sport,
        "sport_type": sport,
        "workout_type": null
    })
}

/// In-memory club feed. Each entry has the Unix time it started.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FakeStrava {
    feed: Arc<Mutex<Vec<(i64, Value)>>>,
    calls: Arc<AtomicU32>,
}

#[allow(dead_code)]
impl FakeStrava {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, started_at: i64, entry: Value) {
        self.feed.lock().unwrap().push((started_at, entry));
    }

    /// Remote calls made so far, across every clone.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClubActivitySource for FakeStrava {
    async fn get_club(&self, club_id: u64) -> Result<Value, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({
            "id": club_id,
            "name": format!("Club {}", club_id),
            "url": "",
            "profile": "avatar/club/large.png",
            "profile_medium": "avatar/club/medium.png"
        }))
    }

    async fn club_activities_after(
        &self,
        _club_id: u64,
        after: i64,
    ) -> Result<Vec<Value>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Newest first, like the real feed.
        let mut entries: Vec<(i64, Value)> = self
            .feed
            .lock()
            .unwrap()
            .iter()
            .filter(|(started_at, _)| *started_at > after)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(entries.into_iter().map(|(_, entry)| entry).collect())
    }
}
