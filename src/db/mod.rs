//! Storage layer (filesystem snapshot store).

pub mod snapshots;

pub use snapshots::SnapshotStore;

/// File and directory names inside the store root.
pub mod layout {
    /// Club details, one per club directory
    pub const CLUB_FILE: &str = "club.json";
    /// Prefix of automated per-day snapshot files
    pub const RESULTS_PREFIX: &str = "results-";
    /// Directory holding hand-entered snapshot files, one subdirectory per club
    pub const MANUAL_DIR: &str = "manual";
    pub const JSON_EXT: &str = "json";
}
