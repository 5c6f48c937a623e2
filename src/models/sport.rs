// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sport rules and the registry that decides which sports count.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Distance unit used for reporting, with its length in meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceUnit {
    pub label: String,
    pub meters: f64,
}

impl DistanceUnit {
    pub fn miles() -> Self {
        Self {
            label: "Miles".to_string(),
            meters: 1609.344,
        }
    }

    pub fn kilometers() -> Self {
        Self {
            label: "KM".to_string(),
            meters: 1000.0,
        }
    }

    /// Convert a raw distance in meters to this unit.
    pub fn from_meters(&self, meters: f64) -> f64 {
        meters / self.meters
    }

    /// Lowercase singular form of the label ("Miles" -> "mile").
    pub fn singular(&self) -> String {
        let label = self.label.strip_suffix('s').unwrap_or(&self.label);
        label.to_lowercase()
    }
}

impl Default for DistanceUnit {
    fn default() -> Self {
        Self::miles()
    }
}

/// Whether adjusted values are reported as distances or as competition scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    #[default]
    Distance,
    Score,
}

impl ScoringMode {
    /// Activities with moving time at or below this many seconds are dropped.
    pub fn min_moving_time(self) -> u64 {
        match self {
            ScoringMode::Distance => 90,
            ScoringMode::Score => 120,
        }
    }

    /// Name of the adjusted-total field in views and exports.
    pub fn total_key(self) -> &'static str {
        match self {
            ScoringMode::Distance => "total",
            ScoringMode::Score => "score",
        }
    }
}

/// Counting rules for one sport identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SportRule {
    /// Display name; the sport id is used when unset.
    #[serde(default)]
    pub label: Option<String>,
    /// Reclassify activities of this sport as another sport (e.g. Hike -> Walk).
    #[serde(default)]
    pub convert_to: Option<String>,
    /// Factor applied to distance to produce the adjusted total.
    #[serde(default, alias = "score_multiplier")]
    pub distance_multiplier: Option<f64>,
    /// Distance units per hour above which an activity counts as 0.
    #[serde(default)]
    pub max_speed: Option<f64>,
    /// Per-activity distance ceiling; longer activities are clamped to it.
    #[serde(default)]
    pub distance_limit: Option<f64>,
}

impl SportRule {
    pub fn label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn convert_to(mut self, sport: &str) -> Self {
        self.convert_to = Some(sport.to_string());
        self
    }

    pub fn multiplier(mut self, factor: f64) -> Self {
        self.distance_multiplier = Some(factor);
        self
    }

    pub fn max_speed(mut self, speed: f64) -> Self {
        self.max_speed = Some(speed);
        self
    }

    pub fn distance_limit(mut self, limit: f64) -> Self {
        self.distance_limit = Some(limit);
        self
    }
}

/// Registered sports, in declaration order.
///
/// Sports absent from the registry never contribute to totals.
#[derive(Debug, Clone, Default)]
pub struct SportRegistry {
    order: Vec<String>,
    rules: HashMap<String, SportRule>,
}

impl SportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sport. Replacing keeps the original position.
    pub fn set(&mut self, sport_id: &str, rule: SportRule) {
        if self.rules.insert(sport_id.to_string(), rule).is_none() {
            self.order.push(sport_id.to_string());
        }
    }

    pub fn with(mut self, sport_id: &str, rule: SportRule) -> Self {
        self.set(sport_id, rule);
        self
    }

    pub fn get(&self, sport_id: &str) -> Option<&SportRule> {
        self.rules.get(sport_id)
    }

    pub fn contains(&self, sport_id: &str) -> bool {
        self.rules.contains_key(sport_id)
    }

    /// Sport ids in the order they were registered.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Display label for a sport, falling back to the id.
    pub fn label<'a>(&'a self, sport_id: &'a str) -> &'a str {
        self.get(sport_id)
            .and_then(|rule| rule.label.as_deref())
            .unwrap_or(sport_id)
    }

    /// Apply `convert_to` for the raw sport type, if one is registered.
    pub fn resolve<'a>(&'a self, sport_id: &'a str) -> &'a str {
        self.get(sport_id)
            .and_then(|rule| rule.convert_to.as_deref())
            .unwrap_or(sport_id)
    }
}
