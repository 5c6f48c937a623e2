//! Running totals accumulated per athlete and per sport.
//!
//! Totals only grow while activities are folded in; they are rebuilt from
//! scratch on every aggregation pass.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::AddAssign;

use crate::models::Activity;

/// Which accumulated quantity a total query sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalKind {
    /// Distance in the configured unit
    Distance,
    /// Moving time in seconds
    MovingTime,
    /// Adjusted distance or score
    Total,
}

/// Distance, moving time and adjusted total for some set of activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    pub distance: f64,
    pub moving_time: u64,
    pub total: f64,
}

impl Totals {
    /// Read one quantity as a number.
    pub fn get(&self, kind: TotalKind) -> f64 {
        match kind {
            TotalKind::Distance => self.distance,
            TotalKind::MovingTime => self.moving_time as f64,
            TotalKind::Total => self.total,
        }
    }
}

impl AddAssign<&Totals> for Totals {
    fn add_assign(&mut self, other: &Totals) {
        self.distance += other.distance;
        self.moving_time += other.moving_time;
        self.total += other.total;
    }
}

/// Per-sport totals for one athlete, keyed and ordered by sport id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AthleteTotals {
    #[serde(flatten)]
    pub by_sport: BTreeMap<String, Totals>,
}

impl AthleteTotals {
    /// Fold a counted activity into the totals for its sport.
    pub fn update_from_activity(&mut self, activity: &Activity) {
        let entry = self.by_sport.entry(activity.sport.clone()).or_default();
        entry.distance += activity.distance;
        entry.moving_time += activity.moving_time;
        entry.total += activity.total;
    }

    pub fn sport(&self, sport: &str) -> Option<&Totals> {
        self.by_sport.get(sport)
    }

    /// Sum over all sports.
    pub fn grand(&self) -> Totals {
        let mut sum = Totals::default();
        for totals in self.by_sport.values() {
            sum += totals;
        }
        sum
    }

    pub fn len(&self) -> usize {
        self.by_sport.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sport.is_empty()
    }
}
