// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV export of every retained activity.

use crate::models::{Activity, ScoringMode};
use crate::services::aggregator::Standings;

/// Column names, in order. The last column is named after the scoring mode.
pub fn header(scoring: ScoringMode) -> Vec<&'static str> {
    vec![
        "id",
        "club",
        "athlete",
        "name",
        "distance",
        "moving_time",
        "elapsed_time",
        "total_elevation_gain",
        "type",
        "date",
        scoring.total_key(),
    ]
}

/// Quote a field containing a double quote, comma, space or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains(['"', ',', ' ', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn row(club_name: &str, activity: &Activity) -> String {
    let athlete = format!(
        "{} {}",
        activity.athlete.firstname, activity.athlete.lastname
    );
    [
        escape_field(&activity.id),
        escape_field(club_name),
        escape_field(&athlete),
        escape_field(&activity.name),
        activity.distance.to_string(),
        activity.moving_time.to_string(),
        activity.elapsed_time.to_string(),
        activity.total_elevation_gain.to_string(),
        escape_field(&activity.sport),
        activity.date.format("%Y-%m-%d").to_string(),
        activity.total.to_string(),
    ]
    .join(",")
}

/// One row per retained activity across all clubs, in standings order.
///
/// Rows are joined by `\n` with no trailing newline. The header is only
/// written when there is at least one activity.
pub fn to_csv(standings: &Standings, scoring: ScoringMode) -> String {
    let mut rows = Vec::new();
    for club in standings.clubs() {
        for athlete in &club.athletes {
            for activity in &athlete.activities {
                if rows.is_empty() {
                    rows.push(header(scoring).join(","));
                }
                rows.push(row(&club.club.name, activity));
            }
        }
    }
    rows.join("\n")
}
