// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Incremental download of per-day club activity snapshots.
//!
//! The club activities endpoint can only answer "activities after T". One day
//! of activities is therefore synthesized as
//! `activities_after(day) - activities_after(day + 1)`, comparing entries by
//! full structural equality since club feeds carry no activity id. This relies
//! on Strava returning both responses in the same chronological order.
//!
//! Each day is written once; days that already have a snapshot are skipped, so
//! re-running a range costs no requests. A request ceiling is checked before
//! every remote call and stops the run with [`AppError::RequestLimitExceeded`].

use crate::db::SnapshotStore;
use crate::error::{AppError, Result};
use crate::services::strava::ClubActivitySource;
use crate::time_utils::{day_start_timestamp, days_inclusive, SECONDS_PER_DAY};
use chrono::{FixedOffset, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;

/// Counts from a fetch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Club detail files written
    pub clubs_written: u32,
    /// Snapshot files written
    pub snapshots_written: u32,
    /// Snapshot days skipped because a file already existed
    pub snapshots_skipped: u32,
}

/// Downloads club data into a [`SnapshotStore`], one request at a time.
pub struct SnapshotFetcher<S> {
    source: S,
    store: SnapshotStore,
    offset: FixedOffset,
    request_limit: u32,
    request_count: u32,
    /// "Activities after T" responses keyed by (club, T); consecutive days share one.
    response_cache: HashMap<(u64, i64), Vec<Value>>,
}

impl<S: ClubActivitySource> SnapshotFetcher<S> {
    pub fn new(source: S, store: SnapshotStore, offset: FixedOffset, request_limit: u32) -> Self {
        Self {
            source,
            store,
            offset,
            request_limit,
            request_count: 0,
            response_cache: HashMap::new(),
        }
    }

    /// Number of remote requests made so far.
    pub fn request_count(&self) -> u32 {
        self.request_count
    }

    /// Download details and daily snapshots for every club in `start..=end`.
    ///
    /// Stops at the first error. On [`AppError::RequestLimitExceeded`] everything
    /// written so far is kept and a later run resumes where this one stopped.
    pub async fn sync(
        &mut self,
        club_ids: &[u64],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchSummary> {
        tracing::info!(%start, %end, clubs = club_ids.len(), "Updating snapshots");

        let mut summary = FetchSummary::default();
        for &club_id in club_ids {
            if self.download_club(club_id).await? {
                summary.clubs_written += 1;
            }
            let club_summary = self.download_club_activities(club_id, start, end).await?;
            summary.snapshots_written += club_summary.snapshots_written;
            summary.snapshots_skipped += club_summary.snapshots_skipped;
        }

        tracing::info!(requests = self.request_count, "Done updating snapshots");
        Ok(summary)
    }

    /// Download club details unless already stored. Returns whether a file was written.
    pub async fn download_club(&mut self, club_id: u64) -> Result<bool> {
        if self.store.has_club(club_id) {
            return Ok(false);
        }

        self.check_request_limit()?;
        self.request_count += 1;
        let club = self.source.get_club(club_id).await?;
        let path = self.store.write_club(club_id, &club)?;
        tracing::info!(club_id, file = %path.display(), "Saved club details");
        Ok(true)
    }

    /// Download one snapshot per day in `start..=end`, skipping days already stored.
    pub async fn download_club_activities(
        &mut self,
        club_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchSummary> {
        let mut summary = FetchSummary::default();

        for day in days_inclusive(start, end) {
            if self.store.has_snapshot(club_id, day) {
                summary.snapshots_skipped += 1;
                continue;
            }

            let day_start = day_start_timestamp(day, &self.offset);
            let on_day = self.club_activities_after(club_id, day_start).await?;
            let day_after = self
                .club_activities_after(club_id, day_start + SECONDS_PER_DAY)
                .await?;
            let activities = day_difference(&on_day, &day_after);

            let path = self.store.write_snapshot(club_id, day, &activities)?;
            tracing::info!(
                club_id,
                date = %day,
                activities = activities.len(),
                file = %path.display(),
                "Saved club activities"
            );
            summary.snapshots_written += 1;
        }

        Ok(summary)
    }

    /// Cached wrapper around the remote call; cache hits cost no request.
    async fn club_activities_after(&mut self, club_id: u64, after: i64) -> Result<Vec<Value>> {
        if let Some(cached) = self.response_cache.get(&(club_id, after)) {
            tracing::debug!(club_id, after, "Using cached club activities");
            return Ok(cached.clone());
        }

        tracing::debug!(club_id, after, "Calling Strava for club activities");
        self.check_request_limit()?;
        self.request_count += 1;
        let response = self.source.club_activities_after(club_id, after).await?;
        self.response_cache
            .insert((club_id, after), response.clone());
        Ok(response)
    }

    fn check_request_limit(&self) -> Result<()> {
        if self.request_count >= self.request_limit {
            tracing::warn!(
                limit = self.request_limit,
                "Configured Strava request limit reached"
            );
            return Err(AppError::RequestLimitExceeded {
                limit: self.request_limit,
            });
        }
        Ok(())
    }
}

/// Activities present in `on_day` that are absent from `day_after`.
///
/// Order of `on_day` is preserved. Entries are compared by full structural equality.
pub fn day_difference(on_day: &[Value], day_after: &[Value]) -> Vec<Value> {
    on_day
        .iter()
        .filter(|activity| !day_after.contains(activity))
        .cloned()
        .collect()
}
