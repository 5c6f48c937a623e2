// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for club details and club activity feeds.
//!
//! Handles:
//! - Club details (`GET /clubs/{id}`)
//! - Club activities after a timestamp (`GET /clubs/{id}/activities`)
//! - Rate limit and token error detection
//!
//! Responses are kept as raw JSON values so snapshots store exactly what
//! Strava returned and can be compared structurally.

use crate::config::STRAVA_API_BASE;
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Largest page size the club activities endpoint accepts.
pub const CLUB_ACTIVITIES_PER_PAGE: u32 = 200;

/// Remote source of club data, implemented by [`StravaClient`].
///
/// The fetcher only depends on this trait so it can be driven by a fake in tests.
#[allow(async_fn_in_trait)]
pub trait ClubActivitySource {
    /// Club details.
    async fn get_club(&self, club_id: u64) -> Result<Value, AppError>;

    /// All club activities recorded after `after` (Unix timestamp), oldest first.
    async fn club_activities_after(&self, club_id: u64, after: i64)
        -> Result<Vec<Value>, AppError>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl StravaClient {
    /// Create a new Strava client for an already-authorized access token.
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(STRAVA_API_BASE.to_string(), access_token)
    }

    pub fn with_base_url(base_url: String, access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// List club activities.
    ///
    /// Strava rejects requests carrying both `before` and `after`, and ignores
    /// `page`, so only the first page of activities after `after` is available.
    pub async fn list_club_activities(
        &self,
        club_id: u64,
        after: i64, // Unix timestamp
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/clubs/{}/activities", self.base_url, club_id);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("after", after.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

impl ClubActivitySource for StravaClient {
    async fn get_club(&self, club_id: u64) -> Result<Value, AppError> {
        let url = format!("{}/clubs/{}", self.base_url, club_id);
        self.get_json(&url).await
    }

    async fn club_activities_after(
        &self,
        club_id: u64,
        after: i64,
    ) -> Result<Vec<Value>, AppError> {
        self.list_club_activities(club_id, after, 1, CLUB_ACTIVITIES_PER_PAGE)
            .await
    }
}
