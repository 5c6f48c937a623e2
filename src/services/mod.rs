// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - fetch, aggregation and reporting.

pub mod aggregator;
pub mod export;
pub mod fetcher;
pub mod report;
pub mod strava;
pub mod template;

pub use aggregator::{Aggregator, Filter, Standings, TrackerSettings};
pub use fetcher::{FetchSummary, SnapshotFetcher};
pub use report::ReportBuilder;
pub use strava::{ClubActivitySource, StravaClient};
pub use template::{PlaceholderRenderer, Renderer, TemplateId, View};
