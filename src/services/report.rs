// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTML views over aggregated standings.
//!
//! Each view builds an HTML fragment, merges it over the base values every
//! template receives, and hands the result to the injected [`Renderer`].

use crate::error::{AppError, Result};
use crate::models::{ScoringMode, TotalKind};
use crate::services::aggregator::{AggregatedClub, Filter, Standings, TrackerSettings};
use crate::services::template::{Renderer, TemplateId, View};
use crate::time_utils::{format_date, format_hours, format_render_timestamp, format_seconds};
use chrono::{DateTime, FixedOffset, Utc};
use std::fs;
use std::path::{Path, PathBuf};

/// Rows shown in the per-sport leader and top activity tables.
pub const DEFAULT_LIMIT: usize = 5;

const SADFACE_SVG: &str = "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='{size}' height='{size}' viewBox='0 0 500 500'%3E%3Cpath d='M427 73A250 250 0 1073 428 250 250 0 00427 73z'/%3E%3Cpath d='M400 400a212 212 0 11-300-300 212 212 0 01300 300z' fill='%23ff0'/%3E%3Cpath d='M289 182a29 29 0 1159 0 29 29 0 01-59 0zM157 182a29 29 0 1158 0 29 29 0 01-58 0zM363 349a14 14 0 11-26 11 88 88 0 00-82-52c-37 0-70 21-83 52a14 14 0 11-26-11c18-42 60-69 109-69 48 0 90 27 108 69z'/%3E%3C/svg%3E";

/// Builds report pages from one aggregation pass.
pub struct ReportBuilder<'a, R> {
    standings: &'a Standings,
    settings: &'a TrackerSettings,
    renderer: R,
    rendered_at: DateTime<FixedOffset>,
}

impl<'a, R: Renderer> ReportBuilder<'a, R> {
    pub fn new(standings: &'a Standings, settings: &'a TrackerSettings, renderer: R) -> Self {
        Self {
            standings,
            settings,
            renderer,
            rendered_at: Utc::now().fixed_offset(),
        }
    }

    /// Fix the footer timestamp, e.g. for reproducible output.
    pub fn with_rendered_at(mut self, at: DateTime<FixedOffset>) -> Self {
        self.rendered_at = at;
        self
    }

    /// Values every template receives unless overridden.
    pub fn base_view(&self) -> View {
        let (current_day, current_date) = match self.standings.period() {
            Some(period) => (period.day_count().to_string(), period.end_label()),
            None => ("0".to_string(), String::new()),
        };

        let mut view = View::new();
        view.insert("homeurl".into(), "../".into());
        view.insert("distanceUnit".into(), self.settings.distance_unit.label.clone());
        view.insert("currentDay".into(), current_day);
        view.insert("currentDate".into(), current_date);
        view.insert("timestamp".into(), format_render_timestamp(&self.rendered_at));
        view
    }

    fn apply_template(&self, overrides: View, template: TemplateId) -> Result<String> {
        let mut view = self.base_view();
        view.extend(overrides);
        self.renderer.render(&view, template)
    }

    fn content(&self, html: Vec<String>, template: TemplateId) -> Result<String> {
        let mut view = View::new();
        view.insert("content".into(), html.join("\n"));
        self.apply_template(view, template)
    }

    /// Sports shown as summary columns: registered, in registry order, with a nonzero adjusted total.
    pub fn active_sports(&self) -> Vec<&'a str> {
        self.settings
            .sports
            .ids()
            .filter(|sport| {
                self.standings
                    .total(TotalKind::Total, Filter::all().sport(sport))
                    > 0.0
            })
            .collect()
    }

    fn unit(&self) -> &str {
        &self.settings.distance_unit.label
    }

    fn label<'s>(&'s self, sport: &'s str) -> &'s str {
        self.settings.sports.label(sport)
    }

    fn club_avatar(&self, club_id: u64) -> String {
        self.standings
            .club(club_id)
            .map(|c| filter_club_image(&c.club.profile_medium))
            .unwrap_or_default()
    }

    /// Top athletes by distance for one sport.
    pub fn sport_leaders_html(&self, sport: &str, limit: usize) -> Result<String> {
        let mut html = vec![
            format!(
                r#"<div class="leaders" id="leaders-{}"><h3>{}</h3>"#,
                sport,
                self.label(sport)
            ),
            format!(
                r#"<table><tbody><tr><th>Athlete</th><th class="numeric">{}</th></tr>"#,
                self.unit()
            ),
        ];
        for entry in self.standings.sport_leaders(sport).iter().take(limit) {
            html.push(format!(
                r#"<tr><th><img alt="logo" src="{}" style="height:20px"><a href="{}">{}</a></th><td class="numeric">{}</td></tr>"#,
                self.club_avatar(entry.club_id),
                person_url(entry.club_id, &entry.athlete),
                escape_html(&ucfirst(&entry.athlete)),
                format_number(entry.distance)
            ));
        }
        html.push("</tbody></table></div>".into());

        self.content(html, TemplateId::Leaders)
    }

    /// Best single activities by adjusted total for one sport.
    pub fn top_activities_html(&self, sport: &str, limit: usize) -> Result<String> {
        let mut html = vec![
            format!(
                r#"<div class="activities" id="activities-{}"><h3>{}</h3>"#,
                sport,
                self.label(sport)
            ),
            format!(
                r#"<table><tbody><tr><th>Athlete</th><th class="numeric">{}</th><th>Date</th><th>Description</th></tr>"#,
                self.unit()
            ),
        ];
        let top = self.standings.top_activities(Filter::all().sport(sport));
        for activity in top.iter().take(limit) {
            html.push(format!(
                r#"<tr><th><img alt="logo" src="{}" style="height:20px"><a href="{}">{}</a></th><td class="numeric">{}</td><td>{}</td><td>{}</td></tr>"#,
                self.club_avatar(activity.club_id),
                person_url(activity.club_id, &activity.athlete),
                escape_html(&ucfirst(&activity.athlete)),
                format_number(activity.distance),
                format_date(activity.date),
                escape_html(&activity.name)
            ));
        }
        html.push("</tbody></table></div>".into());

        self.content(html, TemplateId::Activities)
    }

    /// Activity log for one athlete, with a totals row.
    pub fn person_html(&self, club_id: u64, name: &str) -> Result<String> {
        let club = self.club(club_id)?;
        let athlete = club
            .athlete(name)
            .ok_or_else(|| AppError::NotFound(format!("athlete {} in club {}", name, club_id)))?;
        let unit = self.unit();

        let mut html = vec![
            format!(
                r#"<h3 id="{}"><a href="https://www.strava.com/clubs/{}"><img alt="logo" src="{}"></a> {}</h3>"#,
                club_id,
                club.club.slug(),
                filter_club_image(&club.club.profile),
                escape_html(&ucfirst(name))
            ),
            format!(
                r#"<table class="athlete"><tbody><tr><th>Date</th><th>Event</th><th>Description</th><th class="numeric">Duration</th><th class="numeric">{unit}</th><th class="numeric">{unit} (Adjusted)</th></tr>"#
            ),
        ];
        for activity in &athlete.activities {
            html.push(format!(
                r#"<tr title="{}"><td>{}</td><td>{}</td><td>{}</td><td class="numeric">{}</td><td class="numeric">{}</td><td class="numeric">{}</td></tr>"#,
                activity.id,
                format_date(activity.date),
                self.label(&activity.sport),
                escape_html(&activity.name),
                format_seconds(activity.moving_time),
                format_number(activity.distance),
                format_number(activity.total)
            ));
        }
        let totals = self.standings.totals(Filter::all().club(club_id).athlete(name));
        html.push(format!(
            r#"<tr><th colspan="3">Total</th><th class="numeric">{}</th><th class="numeric">{}</th><th class="numeric">{}</th></tr>"#,
            format_seconds(totals.moving_time),
            format_number(totals.distance),
            format_number(totals.total)
        ));
        html.push("</tbody></table>".into());

        self.content(html, TemplateId::Person)
    }

    /// Club roster with per-sport totals and each athlete's top effort.
    pub fn club_html(&self, club_id: u64) -> Result<String> {
        let club = self.club(club_id)?;

        let mut html = vec![
            format!(
                r#"<h3 id="{}"><a href="https://www.strava.com/clubs/{}"><img alt="logo" src="{}"> {}</a></h3>"#,
                club_id,
                club.club.slug(),
                filter_club_image(&club.club.profile),
                escape_html(&club.club.name)
            ),
            format!(
                r#"<table class="club"><tbody><tr><th>Athlete</th><th>Event</th><th class="numeric">Hours</th><th class="numeric">{}</th><th class="numeric">Total</th><th>Top Effort</th><th class="numeric">Total (Adjusted)</th></tr>"#,
                self.unit()
            ),
        ];

        for athlete in &club.athletes {
            let filter = Filter::all().club(club_id).athlete(&athlete.name);
            let rows = athlete.totals.len().max(1);
            html.push(format!(
                r#"<tr><th rowspan="{}"><a href="{}">{}</a></th>"#,
                rows,
                person_url(club_id, &athlete.name),
                escape_html(&ucfirst(&athlete.name))
            ));

            // Athletes with only uncounted sports still get one row.
            let mut sport_cells: Vec<String> = athlete
                .totals
                .by_sport
                .iter()
                .map(|(sport, totals)| {
                    format!(
                        r#"<td>{}</td><td class="numeric">{}</td><td class="numeric">{}</td>"#,
                        self.label(sport),
                        format_hours(totals.moving_time),
                        format_number(totals.distance)
                    )
                })
                .collect();
            if sport_cells.is_empty() {
                sport_cells.push(r#"<td></td><td class="numeric"></td><td class="numeric"></td>"#.into());
            }

            for (row, cells) in sport_cells.into_iter().enumerate() {
                if row > 0 {
                    html.push("<tr>".into());
                }
                html.push(cells);
                if row == 0 {
                    html.push(format!(
                        r#"<td class="numeric" rowspan="{rows}">{}</td><td rowspan="{rows}">{}</td><th class="numeric" rowspan="{rows}">{}</th>"#,
                        format_number(self.standings.total(TotalKind::Distance, filter)),
                        self.top_effort(filter),
                        format_number(self.standings.total(TotalKind::Total, filter))
                    ));
                }
                html.push("</tr>".into());
            }
        }

        let totals = self.standings.totals(Filter::all().club(club_id));
        html.push(format!(
            r#"<tr><th>Club Total</th><th></th><th class="numeric">{}</th><th></th><th class="numeric">{}</th><th></th><th class="numeric">{}</th></tr>"#,
            format_hours(totals.moving_time),
            format_number(totals.distance),
            format_number(totals.total)
        ));
        html.push("</tbody></table>".into());

        self.content(html, TemplateId::Club)
    }

    /// "12.4 mile ride" for the athlete's best activity, or empty.
    fn top_effort(&self, filter: Filter<'_>) -> String {
        match self.standings.top_activities(filter).first() {
            Some(top) => format!(
                "{} {} {}",
                format_number(top.distance),
                self.settings.distance_unit.singular(),
                top.sport.to_lowercase()
            ),
            None => String::new(),
        }
    }

    /// Main page: standings table, per-sport leaders and top activities, every club.
    pub fn summary_html(&self) -> Result<String> {
        let sports = self.active_sports();

        let mut html = vec![r#"<table class="standings"><tbody><tr><th colspan="2">Club</th>"#.to_string()];
        for sport in &sports {
            html.push(format!(r#"<th class="numeric">{}</th>"#, self.label(sport)));
        }
        html.push(r#"<th class="numeric">Total</th><th class="numeric">Total (Adjusted)</th></tr>"#.into());

        for (place, club) in self.standings.clubs().iter().enumerate() {
            let club_id = club.club.id;
            html.push(format!(
                r##"<tr><th>{}.</th><th><img alt="logo" src="{}" style="height:20px"><a href="#{}">{}</a></th>"##,
                place + 1,
                filter_club_image(&club.club.profile_medium),
                club_id,
                escape_html(&club.club.name)
            ));
            for sport in &sports {
                html.push(format!(
                    r#"<td class="numeric">{}</td>"#,
                    format_number(
                        self.standings
                            .total(TotalKind::Distance, Filter::all().club(club_id).sport(sport))
                    )
                ));
            }
            let totals = self.standings.totals(Filter::all().club(club_id));
            html.push(format!(
                r#"<td class="numeric">{}</td><th class="numeric">{}</th></tr>"#,
                format_number(totals.distance),
                format_number(totals.total)
            ));
        }

        let grand = self.standings.totals(Filter::all());
        html.push(r#"<tr><th colspan="2">Totals</th>"#.into());
        for sport in &sports {
            html.push(format!(
                r#"<td class="numeric">{}</td>"#,
                format_number(
                    self.standings
                        .total(TotalKind::Distance, Filter::all().sport(sport))
                )
            ));
        }
        html.push(format!(
            r#"<td class="numeric">{}</td><th class="numeric">{}</th></tr>"#,
            format_number(grand.distance),
            format_number(grand.total)
        ));
        html.push("</tbody></table>".into());

        let mut leaders = Vec::with_capacity(sports.len());
        let mut activities = Vec::with_capacity(sports.len());
        for sport in &sports {
            leaders.push(self.sport_leaders_html(sport, DEFAULT_LIMIT)?);
            activities.push(self.top_activities_html(sport, DEFAULT_LIMIT)?);
        }

        let clubs = self
            .standings
            .clubs()
            .iter()
            .map(|club| self.club_html(club.club.id))
            .collect::<Result<Vec<_>>>()?;

        let (summary_key, template) = match self.settings.scoring {
            ScoringMode::Distance => ("summary", TemplateId::Index),
            ScoringMode::Score => ("scoreboard", TemplateId::Scoreboard),
        };

        let mut view = View::new();
        view.insert("homeurl".into(), "./".into());
        view.insert("distance".into(), format!("{:.0}", grand.distance.round()));
        view.insert(
            "moving_time".into(),
            format!("{:.0}", (grand.moving_time as f64 / 3600.0).round()),
        );
        view.insert(summary_key.into(), html.join("\n"));
        view.insert("leaders".into(), leaders.join("\n"));
        view.insert("activities".into(), activities.join("\n"));
        view.insert("clubs".into(), clubs.join("\n"));

        self.apply_template(view, template)
    }

    fn club(&self, club_id: u64) -> Result<&'a AggregatedClub> {
        self.standings
            .club(club_id)
            .ok_or_else(|| AppError::NotFound(format!("club {}", club_id)))
    }
}

/// Relative URL of an athlete's page, e.g. `123/Jane_D_.html`.
pub fn person_url(club_id: u64, name: &str) -> String {
    format!("{}/{}.html", club_id, person_slug(name))
}

/// Filesystem path of an athlete's page under `base`, creating the club directory.
pub fn person_file(base: &Path, club_id: u64, name: &str) -> Result<PathBuf> {
    let dir = base.join(club_id.to_string());
    fs::create_dir_all(&dir)?;
    Ok(dir.join(format!("{}.html", person_slug(name))))
}

fn person_slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() || c == '.' { '_' } else { c })
        .collect()
}

/// Replace Strava's placeholder club avatars with an inline image.
pub fn filter_club_image(url: &str) -> String {
    match url {
        "avatar/club/medium.png" => SADFACE_SVG.replace("{size}", "60"),
        "avatar/club/large.png" => SADFACE_SVG.replace("{size}", "124"),
        _ => url.to_string(),
    }
}

/// One decimal place with comma thousands separators: 12345.67 -> "12,345.7".
///
/// Halves round away from zero, so 0.25 -> "0.3".
pub fn format_number(value: f64) -> String {
    let fixed = format!("{:.1}", (value.abs() * 10.0).round() / 10.0);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

/// Uppercase the first character.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape user-supplied text (athlete, club and activity names) for HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
