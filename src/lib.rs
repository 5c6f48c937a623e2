// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava club tracker: distance challenge standings for Strava clubs
//!
//! This crate downloads daily snapshots of club activity feeds, aggregates
//! them into per-athlete and per-club totals under configurable sport rules,
//! and renders standings pages and a CSV export.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::{Config, TrackerRules};
use db::SnapshotStore;
use error::Result;
use services::{Aggregator, Standings, TrackerSettings};

/// Everything needed to build reports from stored snapshots.
pub struct Tracker {
    pub store: SnapshotStore,
    pub settings: TrackerSettings,
}

impl Tracker {
    pub fn new(store: SnapshotStore, rules: &TrackerRules) -> Self {
        Self {
            store,
            settings: TrackerSettings::from(rules),
        }
    }

    /// Tracker over `config.data_dir` with the configured rules.
    pub fn from_config(config: &Config) -> Result<Self> {
        let rules = config.tracker_rules()?;
        Ok(Self::new(SnapshotStore::new(config.data_dir.clone()), &rules))
    }

    /// Read every snapshot, then aggregate.
    pub fn load_standings(&self) -> Result<Standings> {
        let input = self.store.load_all()?;
        Ok(Aggregator::new(self.settings.clone()).aggregate(&input))
    }
}
