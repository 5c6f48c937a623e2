// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod club;
pub mod sport;
pub mod stats;

pub use activity::{synthesize_id, Activity, RawActivity, RawAthlete};
pub use club::{Club, ClubSnapshots, Snapshot};
pub use sport::{DistanceUnit, ScoringMode, SportRegistry, SportRule};
pub use stats::{AthleteTotals, TotalKind, Totals};
