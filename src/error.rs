// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the fetch and report steps.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The configured request ceiling would be exceeded by the next remote call.
    ///
    /// Callers should stop the fetch loop and resume later; this is never retried.
    #[error("Strava request limit of {limit} requests reached")]
    RequestLimitExceeded { limit: u32 },

    #[error("Strava API error: {0}")]
    StravaApi(String),

    #[error("Malformed snapshot {}: {source}", path.display())]
    MalformedSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const STRAVA_RATE_LIMIT: &'static str = "Strava rate limit exceeded";
    pub const STRAVA_TOKEN_ERROR: &'static str = "Strava token invalid or expired";

    /// True for the request ceiling error, which means "stop now, resume later".
    pub fn is_request_limit(&self) -> bool {
        matches!(self, AppError::RequestLimitExceeded { .. })
    }

    /// True when the upstream API rejected our access token.
    pub fn is_strava_token_error(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_TOKEN_ERROR)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
