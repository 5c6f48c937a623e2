// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregation engine: turns raw club snapshots into ranked standings.
//!
//! Aggregation is a pure function of the loaded snapshots and the tracker
//! settings. Each pass builds a fresh [`Standings`]; queries afterwards only
//! read it.
//!
//! Per activity, in order:
//! 1. drop activities at or under the moving-time floor
//! 2. drop manual activities unless allowed
//! 3. resolve the sport (`convert_to`, then slow Run -> Walk)
//! 4. convert meters to the distance unit
//! 5. synthesize the activity id
//! 6. compute the adjusted total
//! 7. record the activity and, for registered sports, add it to totals

use crate::config::TrackerRules;
use crate::models::{
    synthesize_id, Activity, AthleteTotals, Club, ClubSnapshots, DistanceUnit, RawActivity,
    ScoringMode, SportRegistry, TotalKind, Totals,
};
use crate::time_utils::ReportingPeriod;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Runs slower than this many meters per second (about 17:00 per mile) count as walks.
pub const RUN_MIN_SPEED_MPS: f64 = 5700.0 / 3600.0;

/// Activities with a longer elapsed time (18 hours) count as 0 unless whitelisted.
pub const MAX_ELAPSED_SECONDS: u64 = 64_800;

/// Everything that controls how activities are counted.
#[derive(Debug, Clone, Default)]
pub struct TrackerSettings {
    pub distance_unit: DistanceUnit,
    pub allow_manual: bool,
    pub scoring: ScoringMode,
    pub sports: SportRegistry,
    /// Activity ids exempt from the speed and duration checks.
    ///
    /// Ids only exist after an activity has been aggregated once, so whitelisting
    /// takes a dry run to discover the id first.
    pub whitelist: HashSet<String>,
}

impl From<&TrackerRules> for TrackerSettings {
    fn from(rules: &TrackerRules) -> Self {
        Self {
            distance_unit: rules.distance_unit.clone(),
            allow_manual: rules.allow_manual,
            scoring: rules.scoring,
            sports: rules.registry(),
            whitelist: rules.whitelist_set(),
        }
    }
}

/// Builds [`Standings`] from raw snapshots.
#[derive(Debug, Clone)]
pub struct Aggregator {
    settings: TrackerSettings,
}

impl Aggregator {
    pub fn new(settings: TrackerSettings) -> Self {
        Self { settings }
    }

    /// Aggregate every club's snapshots into ranked standings.
    pub fn aggregate(&self, input: &[ClubSnapshots]) -> Standings {
        let mut period: Option<ReportingPeriod> = None;
        let mut clubs = Vec::with_capacity(input.len());

        for club_input in input {
            let club = self.aggregate_club(club_input);
            for snapshot in &club_input.snapshots {
                period = Some(match period {
                    Some(mut p) => {
                        p.include(snapshot.date);
                        p
                    }
                    None => ReportingPeriod::single(snapshot.date),
                });
            }
            clubs.push(club);
        }

        sort_desc_by(&mut clubs, |club| club.totals().total);

        if let Some(p) = &period {
            tracing::info!(
                clubs = clubs.len(),
                start = %p.start,
                end = %p.end,
                "Aggregated club standings"
            );
        }

        Standings { clubs, period }
    }

    fn aggregate_club(&self, input: &ClubSnapshots) -> AggregatedClub {
        let club_id = input.club.id;
        let mut athletes: Vec<AthleteResults> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut activity_count = 0usize;

        for snapshot in &input.snapshots {
            for raw in &snapshot.activities {
                let Some(activity) = self.normalize(club_id, snapshot.date, raw) else {
                    continue;
                };
                activity_count += 1;

                let name = raw.athlete.display_name();
                let slot = *index.entry(name.clone()).or_insert_with(|| {
                    athletes.push(AthleteResults::new(name));
                    athletes.len() - 1
                });
                athletes[slot].record(activity, &self.settings.sports);
            }
        }

        for athlete in &mut athletes {
            // Stable: same-date activities keep load order, so manual files interleave by date.
            athlete.activities.sort_by_key(|activity| activity.date);
        }
        sort_desc_by(&mut athletes, |athlete| athlete.totals.grand().total);

        tracing::debug!(
            club_id,
            athletes = athletes.len(),
            activities = activity_count,
            "Aggregated club"
        );

        AggregatedClub {
            club: input.club.clone(),
            athletes,
        }
    }

    /// Normalize one raw activity, or `None` when it is not retained at all.
    pub fn normalize(&self, club_id: u64, date: NaiveDate, raw: &RawActivity) -> Option<Activity> {
        if raw.moving_time <= self.settings.scoring.min_moving_time() {
            tracing::debug!(club_id, %date, name = %raw.name, "Skipping short activity");
            return None;
        }
        if raw.is_manual() && !self.settings.allow_manual {
            tracing::debug!(club_id, %date, name = %raw.name, "Skipping manual activity");
            return None;
        }

        let athlete = raw.athlete.display_name();
        let sport = self.resolve_sport(raw);
        let distance = self.settings.distance_unit.from_meters(raw.distance);
        let id = synthesize_id(
            club_id,
            &athlete,
            date,
            distance,
            &sport,
            raw.moving_time,
            raw.elapsed_time,
            raw.total_elevation_gain,
        );
        let total = self.adjust_distance(
            &id,
            distance,
            &sport,
            Some(raw.moving_time),
            Some(raw.elapsed_time),
        );

        Some(Activity {
            id,
            athlete: raw.athlete.clone(),
            name: raw.name.clone(),
            sport,
            distance,
            moving_time: raw.moving_time,
            elapsed_time: raw.elapsed_time,
            total_elevation_gain: raw.total_elevation_gain,
            date,
            total,
        })
    }

    /// Sport an activity is counted under.
    ///
    /// Slow runs become walks even when neither sport is registered.
    pub fn resolve_sport(&self, raw: &RawActivity) -> String {
        let sport = self.settings.sports.resolve(&raw.activity_type);
        if sport == "Run" && raw.distance / (raw.moving_time as f64) < RUN_MIN_SPEED_MPS {
            return "Walk".to_string();
        }
        sport.to_string()
    }

    /// Adjusted total for one activity.
    ///
    /// Unregistered sports count 0. Otherwise the distance is clamped to the
    /// sport's limit, then multiplied. Unless whitelisted, the result is zeroed
    /// when the sport's max speed or the 18 hour elapsed limit is exceeded.
    pub fn adjust_distance(
        &self,
        id: &str,
        distance: f64,
        sport: &str,
        moving_time: Option<u64>,
        elapsed_time: Option<u64>,
    ) -> f64 {
        let Some(rule) = self.settings.sports.get(sport) else {
            return 0.0;
        };

        let mut adjusted = distance;
        if let Some(limit) = rule.distance_limit {
            adjusted = adjusted.min(limit);
        }
        if let Some(multiplier) = rule.distance_multiplier {
            adjusted *= multiplier;
        }

        if !self.settings.whitelist.contains(id) {
            if let (Some(moving), Some(max_speed)) = (moving_time, rule.max_speed) {
                if 3600.0 * adjusted / moving as f64 > max_speed {
                    return 0.0;
                }
            }
            if elapsed_time.is_some_and(|elapsed| elapsed > MAX_ELAPSED_SECONDS) {
                return 0.0;
            }
        }

        adjusted
    }
}

/// Stable descending sort; ties keep their current (first-encountered) order.
fn sort_desc_by<T, F: Fn(&T) -> f64>(items: &mut [T], key: F) {
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
}

/// One athlete's retained activities and per-sport totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthleteResults {
    pub name: String,
    /// Ordered by date, then load order
    pub activities: Vec<Activity>,
    pub totals: AthleteTotals,
}

impl AthleteResults {
    fn new(name: String) -> Self {
        Self {
            name,
            activities: Vec::new(),
            totals: AthleteTotals::default(),
        }
    }

    fn record(&mut self, activity: Activity, sports: &SportRegistry) {
        if sports.contains(&activity.sport) {
            self.totals.update_from_activity(&activity);
        }
        self.activities.push(activity);
    }
}

/// A club with its athletes ranked by adjusted total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedClub {
    pub club: Club,
    pub athletes: Vec<AthleteResults>,
}

impl AggregatedClub {
    pub fn athlete(&self, name: &str) -> Option<&AthleteResults> {
        self.athletes.iter().find(|a| a.name == name)
    }

    /// Totals over every athlete and sport in the club.
    pub fn totals(&self) -> Totals {
        let mut sum = Totals::default();
        for athlete in &self.athletes {
            sum += &athlete.totals.grand();
        }
        sum
    }
}

/// Optional club, athlete and sport restrictions for queries. Unset means "all".
#[derive(Debug, Clone, Copy, Default)]
pub struct Filter<'a> {
    pub club_id: Option<u64>,
    pub athlete: Option<&'a str>,
    pub sport: Option<&'a str>,
}

impl<'a> Filter<'a> {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn club(mut self, club_id: u64) -> Self {
        self.club_id = Some(club_id);
        self
    }

    pub fn athlete(mut self, name: &'a str) -> Self {
        self.athlete = Some(name);
        self
    }

    pub fn sport(mut self, sport: &'a str) -> Self {
        self.sport = Some(sport);
        self
    }

    fn matches_club(&self, club_id: u64) -> bool {
        self.club_id.is_none_or(|id| id == club_id)
    }

    fn matches_athlete(&self, name: &str) -> bool {
        self.athlete.is_none_or(|a| a == name)
    }

    fn matches_sport(&self, sport: &str) -> bool {
        self.sport.is_none_or(|s| s == sport)
    }
}

/// An athlete's distance for one sport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderEntry {
    pub distance: f64,
    pub club_id: u64,
    pub athlete: String,
}

/// A single activity flattened for ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopActivity {
    pub total: f64,
    pub distance: f64,
    pub club_id: u64,
    pub athlete: String,
    pub date: NaiveDate,
    pub name: String,
    pub sport: String,
}

/// Result of an aggregation pass: clubs ranked by adjusted total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standings {
    clubs: Vec<AggregatedClub>,
    period: Option<ReportingPeriod>,
}

impl Standings {
    /// Clubs in ranking order.
    pub fn clubs(&self) -> &[AggregatedClub] {
        &self.clubs
    }

    pub fn club(&self, club_id: u64) -> Option<&AggregatedClub> {
        self.clubs.iter().find(|c| c.club.id == club_id)
    }

    /// First and last snapshot dates, or `None` when nothing was loaded.
    pub fn period(&self) -> Option<ReportingPeriod> {
        self.period
    }

    /// Sum distance, moving time and adjusted total over the filtered totals.
    pub fn totals(&self, filter: Filter<'_>) -> Totals {
        let mut sum = Totals::default();
        for club in self.clubs.iter().filter(|c| filter.matches_club(c.club.id)) {
            for athlete in club
                .athletes
                .iter()
                .filter(|a| filter.matches_athlete(&a.name))
            {
                for (sport, totals) in &athlete.totals.by_sport {
                    if filter.matches_sport(sport) {
                        sum += totals;
                    }
                }
            }
        }
        sum
    }

    /// One quantity of [`Standings::totals`].
    pub fn total(&self, kind: TotalKind, filter: Filter<'_>) -> f64 {
        self.totals(filter).get(kind)
    }

    /// Every athlete in every club with their distance for `sport`, highest first.
    ///
    /// Athletes without that sport are included with 0. Equal distances fall
    /// back to club id, then athlete name, both descending.
    pub fn sport_leaders(&self, sport: &str) -> Vec<LeaderEntry> {
        let mut leaders: Vec<LeaderEntry> = self
            .clubs
            .iter()
            .flat_map(|club| {
                club.athletes.iter().map(move |athlete| LeaderEntry {
                    distance: athlete.totals.sport(sport).map_or(0.0, |t| t.distance),
                    club_id: club.club.id,
                    athlete: athlete.name.clone(),
                })
            })
            .collect();
        leaders.sort_by(|a, b| {
            b.distance
                .total_cmp(&a.distance)
                .then_with(|| b.club_id.cmp(&a.club_id))
                .then_with(|| b.athlete.cmp(&a.athlete))
        });
        leaders
    }

    /// Individual activities matching `filter`, highest adjusted total first.
    ///
    /// Ties are broken on the remaining fields in order, all descending.
    pub fn top_activities(&self, filter: Filter<'_>) -> Vec<TopActivity> {
        let mut activities = Vec::new();
        for club in self.clubs.iter().filter(|c| filter.matches_club(c.club.id)) {
            for athlete in club
                .athletes
                .iter()
                .filter(|a| filter.matches_athlete(&a.name))
            {
                for activity in athlete
                    .activities
                    .iter()
                    .filter(|a| filter.matches_sport(&a.sport))
                {
                    activities.push(TopActivity {
                        total: activity.total,
                        distance: activity.distance,
                        club_id: club.club.id,
                        athlete: athlete.name.clone(),
                        date: activity.date,
                        name: activity.name.clone(),
                        sport: activity.sport.clone(),
                    });
                }
            }
        }
        activities.sort_by(|a, b| {
            b.total
                .total_cmp(&a.total)
                .then_with(|| b.distance.total_cmp(&a.distance))
                .then_with(|| b.club_id.cmp(&a.club_id))
                .then_with(|| b.athlete.cmp(&a.athlete))
                .then_with(|| b.date.cmp(&a.date))
                .then_with(|| b.name.cmp(&a.name))
                .then_with(|| b.sport.cmp(&a.sport))
        });
        activities
    }
}
