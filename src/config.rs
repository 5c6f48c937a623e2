// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables and a rules file.
//!
//! Environment variables (or a `.env` file) describe where data lives and what
//! to fetch. Counting rules for sports live in a JSON rules file because they
//! are structured; without one, built-in defaults are used.

use crate::models::{DistanceUnit, ScoringMode, SportRegistry, SportRule};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

/// Default Strava API base URL.
pub const STRAVA_API_BASE: &str = "https://www.strava.com/api/v3";

/// Strava's 15-minute short-term limit for read requests.
pub const DEFAULT_REQUEST_LIMIT: u32 = 100;

/// Process-level configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the fetch step (not needed to build reports)
    pub access_token: Option<String>,
    pub api_base: String,
    /// Root of the snapshot store
    pub data_dir: PathBuf,
    /// Where rendered pages are written
    pub output_dir: PathBuf,
    /// Templates used by the placeholder renderer
    pub template_dir: PathBuf,
    /// Clubs to fetch
    pub club_ids: Vec<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Maximum number of API requests per run
    pub request_limit: u32,
    /// Offset used to turn calendar days into timestamps
    pub utc_offset: FixedOffset,
    /// Optional tracker rules file
    pub rules_path: Option<PathBuf>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            access_token: None,
            api_base: STRAVA_API_BASE.to_string(),
            data_dir: PathBuf::from("json"),
            output_dir: PathBuf::from("htdocs"),
            template_dir: PathBuf::from("templates"),
            club_ids: Vec::new(),
            start_date: None,
            end_date: None,
            request_limit: DEFAULT_REQUEST_LIMIT,
            utc_offset: utc(),
            rules_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            var(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let club_ids = match non_empty("CLUB_IDS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| id.parse().map_err(|_| invalid("CLUB_IDS", id)))
                .collect::<Result<Vec<u64>, _>>()?,
            None => Vec::new(),
        };

        let date = |key: &'static str| -> Result<Option<NaiveDate>, ConfigError> {
            non_empty(key)
                .map(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| invalid(key, &v)))
                .transpose()
        };

        let request_limit = match non_empty("REQUEST_LIMIT") {
            Some(v) => v.parse().map_err(|_| invalid("REQUEST_LIMIT", &v))?,
            None => DEFAULT_REQUEST_LIMIT,
        };

        let utc_offset = match non_empty("UTC_OFFSET") {
            Some(v) => v.parse().map_err(|_| invalid("UTC_OFFSET", &v))?,
            None => utc(),
        };

        Ok(Self {
            access_token: non_empty("STRAVA_ACCESS_TOKEN"),
            api_base: non_empty("STRAVA_API_BASE").unwrap_or_else(|| STRAVA_API_BASE.to_string()),
            data_dir: non_empty("DATA_DIR").unwrap_or_else(|| "json".to_string()).into(),
            output_dir: non_empty("OUTPUT_DIR").unwrap_or_else(|| "htdocs".to_string()).into(),
            template_dir: non_empty("TEMPLATE_DIR")
                .unwrap_or_else(|| "templates".to_string())
                .into(),
            club_ids,
            start_date: date("START_DATE")?,
            end_date: date("END_DATE")?,
            request_limit,
            utc_offset,
            rules_path: non_empty("TRACKER_RULES").map(PathBuf::from),
        })
    }

    /// Access token, required only when talking to Strava.
    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .ok_or(ConfigError::Missing("STRAVA_ACCESS_TOKEN"))
    }

    /// Load tracker rules from `rules_path`, or the built-in defaults.
    pub fn tracker_rules(&self) -> Result<TrackerRules, ConfigError> {
        match &self.rules_path {
            Some(path) => TrackerRules::load(path),
            None => Ok(TrackerRules::default()),
        }
    }
}

/// Counting rules for the aggregation engine, as written in the rules file.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerRules {
    #[serde(default)]
    pub distance_unit: DistanceUnit,
    /// Count activities that look hand-entered (no GPS)
    #[serde(default)]
    pub allow_manual: bool,
    #[serde(default)]
    pub scoring: ScoringMode,
    /// Registered sports; order drives report column order
    #[serde(default)]
    pub sports: Vec<SportEntry>,
    /// Activity ids exempt from speed and duration checks
    #[serde(default)]
    pub whitelist: Vec<String>,
}

/// A sport id together with its rule.
#[derive(Debug, Clone, Deserialize)]
pub struct SportEntry {
    pub id: String,
    #[serde(flatten)]
    pub rule: SportRule,
}

impl Default for TrackerRules {
    fn default() -> Self {
        let sport = |id: &str, rule: SportRule| SportEntry {
            id: id.to_string(),
            rule,
        };
        Self {
            distance_unit: DistanceUnit::miles(),
            allow_manual: false,
            scoring: ScoringMode::Distance,
            sports: vec![
                sport("Ride", SportRule::default().multiplier(0.25)),
                sport("Run", SportRule::default().max_speed(15.0)),
                sport("Walk", SportRule::default().label("Walk/Hike").max_speed(8.0)),
                sport("Hike", SportRule::default().convert_to("Walk")),
            ],
            whitelist: Vec::new(),
        }
    }
}

impl TrackerRules {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::RulesFile(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let rules: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::RulesFile(e.to_string()))?;
        if rules.distance_unit.meters <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "distance_unit.meters",
                value: rules.distance_unit.meters.to_string(),
            });
        }
        Ok(rules)
    }

    /// Registered sports in declaration order.
    pub fn registry(&self) -> SportRegistry {
        let mut registry = SportRegistry::new();
        for entry in &self.sports {
            registry.set(&entry.id, entry.rule.clone());
        }
        registry
    }

    pub fn whitelist_set(&self) -> HashSet<String> {
        self.whitelist.iter().cloned().collect()
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("Tracker rules file error: {0}")]
    RulesFile(String),
}
