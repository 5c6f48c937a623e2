// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Filesystem-backed store of raw Strava responses.
//!
//! Layout under the store root:
//! - `<club>/club.json` club details
//! - `<club>/results-YYYY-MM-DD.json` one day of club activities
//! - `manual/<club>/*YYYY-MM-DD*.json` hand-entered supplementary activities
//!
//! Snapshots are written once and never modified. Files are written to a
//! temporary name and renamed, so a snapshot either exists completely or not at all.

use crate::db::layout;
use crate::error::{AppError, Result};
use crate::models::{Club, ClubSnapshots, RawActivity, Snapshot};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Snapshot store rooted at a directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn club_dir(&self, club_id: u64) -> PathBuf {
        self.root.join(club_id.to_string())
    }

    pub fn club_path(&self, club_id: u64) -> PathBuf {
        self.club_dir(club_id).join(layout::CLUB_FILE)
    }

    pub fn snapshot_path(&self, club_id: u64, date: NaiveDate) -> PathBuf {
        self.club_dir(club_id).join(format!(
            "{}{}.{}",
            layout::RESULTS_PREFIX,
            date.format("%Y-%m-%d"),
            layout::JSON_EXT
        ))
    }

    pub fn manual_dir(&self, club_id: u64) -> PathBuf {
        self.root
            .join(layout::MANUAL_DIR)
            .join(club_id.to_string())
    }

    pub fn has_club(&self, club_id: u64) -> bool {
        self.club_path(club_id).is_file()
    }

    pub fn has_snapshot(&self, club_id: u64, date: NaiveDate) -> bool {
        self.snapshot_path(club_id, date).is_file()
    }

    /// Store the raw club details response.
    pub fn write_club<T: Serialize>(&self, club_id: u64, club: &T) -> Result<PathBuf> {
        let path = self.club_path(club_id);
        write_json(&path, club)?;
        Ok(path)
    }

    /// Store one day of raw club activities.
    pub fn write_snapshot<T: Serialize>(
        &self,
        club_id: u64,
        date: NaiveDate,
        activities: &[T],
    ) -> Result<PathBuf> {
        let path = self.snapshot_path(club_id, date);
        write_json(&path, &activities)?;
        Ok(path)
    }

    /// All clubs with stored details, ordered by club id.
    pub fn list_clubs(&self) -> Result<Vec<Club>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut clubs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path().join(layout::CLUB_FILE);
            if path.is_file() {
                clubs.push(read_json::<Club>(&path)?);
            }
        }
        clubs.sort_by_key(|club| club.id);
        Ok(clubs)
    }

    /// Snapshot files for a club with the date parsed from each file name.
    ///
    /// Automated results come first, then manual files, each group in file name
    /// order. Files without a date in their name are ignored.
    pub fn snapshot_files(&self, club_id: u64) -> Result<Vec<(PathBuf, NaiveDate)>> {
        let mut files = dated_json_files(&self.club_dir(club_id), Some(layout::RESULTS_PREFIX))?;
        files.extend(dated_json_files(&self.manual_dir(club_id), None)?);
        Ok(files)
    }

    pub fn read_snapshot(&self, path: &Path) -> Result<Vec<RawActivity>> {
        tracing::debug!(file = %path.display(), "Reading snapshot");
        read_json(path)
    }

    /// Read every club and every snapshot into memory.
    ///
    /// Aggregation runs only after this returns, so storage is never read
    /// while totals are being computed.
    pub fn load_all(&self) -> Result<Vec<ClubSnapshots>> {
        let mut loaded = Vec::new();
        for club in self.list_clubs()? {
            let mut snapshots = Vec::new();
            for (path, date) in self.snapshot_files(club.id)? {
                snapshots.push(Snapshot {
                    date,
                    activities: self.read_snapshot(&path)?,
                });
            }
            tracing::debug!(club_id = club.id, snapshots = snapshots.len(), "Loaded club");
            loaded.push(ClubSnapshots { club, snapshots });
        }
        Ok(loaded)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| AppError::MalformedSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode {}: {}", path.display(), e)))?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn dated_json_files(dir: &Path, prefix: Option<&str>) -> Result<Vec<(PathBuf, NaiveDate)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(layout::JSON_EXT) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if prefix.is_some_and(|p| !name.starts_with(p)) {
            continue;
        }
        if let Some(date) = date_in_name(name) {
            files.push((path, date));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Find the first `YYYY-MM-DD` date embedded in a file name.
fn date_in_name(name: &str) -> Option<NaiveDate> {
    let bytes = name.as_bytes();
    (0..bytes.len().saturating_sub(9)).find_map(|i| {
        let window = name.get(i..i + 10)?;
        let shaped = window.bytes().enumerate().all(|(j, b)| match j {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
        if !shaped {
            return None;
        }
        NaiveDate::parse_from_str(window, "%Y-%m-%d").ok()
    })
}
