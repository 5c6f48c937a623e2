// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregation engine behavior over in-memory snapshots.

mod common;

use common::{
    activity, club, club_snapshots, date, default_settings, manual_activity, snapshot, MILE,
};
use strava_club_tracker::models::{ClubSnapshots, SportRule, TotalKind};
use strava_club_tracker::services::{Aggregator, Filter, Standings, TrackerSettings};

fn aggregate(settings: TrackerSettings, input: &[ClubSnapshots]) -> Standings {
    Aggregator::new(settings).aggregate(input)
}

fn one_club(activities: Vec<strava_club_tracker::models::RawActivity>) -> Vec<ClubSnapshots> {
    vec![club_snapshots(
        club(1, "Solo"),
        vec![snapshot(date(2020, 12, 1), activities)],
    )]
}

fn season() -> Vec<ClubSnapshots> {
    vec![
        club_snapshots(
            club(10, "Riders"),
            vec![
                snapshot(
                    date(2020, 12, 1),
                    vec![
                        activity("Ann K.", "Ride", 40.0, 3 * 3600),
                        activity("Bob S.", "Run", 6.0, 3000),
                    ],
                ),
                snapshot(
                    date(2020, 12, 2),
                    vec![
                        activity("Ann K.", "Run", 3.0, 1500),
                        activity("Bob S.", "Hike", 4.0, 2 * 3600),
                    ],
                ),
            ],
        ),
        club_snapshots(
            club(20, "Runners"),
            vec![
                snapshot(
                    date(2020, 12, 1),
                    vec![activity("Cat L.", "Run", 13.1, 2 * 3600)],
                ),
                snapshot(
                    date(2020, 12, 3),
                    vec![activity("Dan M.", "Swim", 1.0, 2400)],
                ),
            ],
        ),
    ]
}

#[test]
fn test_aggregation_is_deterministic() {
    let input = season();
    let a = aggregate(default_settings(), &input);
    let b = aggregate(default_settings(), &input);
    assert_eq!(a, b);

    let ids = |s: &Standings| -> Vec<String> {
        s.clubs()
            .iter()
            .flat_map(|c| c.athletes.iter())
            .flat_map(|a| a.activities.iter().map(|x| x.id.clone()))
            .collect()
    };
    assert_eq!(ids(&a), ids(&b));
    assert_eq!(ids(&a).len(), 6);
}

#[test]
fn test_clubs_and_athletes_ranked_by_adjusted_total() {
    let standings = aggregate(default_settings(), &season());

    // Riders: Ann 40*0.25 + 3 = 13, Bob 6 + 4 = 10. Runners: Cat 13.1, Dan 0.
    let clubs: Vec<&str> = standings.clubs().iter().map(|c| c.club.name.as_str()).collect();
    assert_eq!(clubs, vec!["Riders", "Runners"]);

    let riders: Vec<&str> = standings.clubs()[0]
        .athletes
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(riders, vec!["Ann K.", "Bob S."]);

    let runners = &standings.clubs()[1];
    assert_eq!(runners.athletes[0].name, "Cat L.");
    assert_eq!(runners.athletes[1].name, "Dan M.");
}

#[test]
fn test_ties_keep_first_encountered_order() {
    let input = one_club(vec![
        activity("Zed A.", "Run", 5.0, 2400),
        activity("Amy B.", "Run", 5.0, 2400),
    ]);
    let standings = aggregate(default_settings(), &input);
    let names: Vec<&str> = standings.clubs()[0]
        .athletes
        .iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, vec!["Zed A.", "Amy B."]);
}

#[test]
fn test_hike_counted_only_as_walk() {
    let standings = aggregate(default_settings(), &season());
    let bob = standings.clubs()[0].athlete("Bob S.").unwrap();

    assert!(bob.totals.sport("Hike").is_none());
    let walk = bob.totals.sport("Walk").unwrap();
    assert!((walk.distance - 4.0).abs() < 1e-9);
    assert!(bob.activities.iter().all(|a| a.sport != "Hike"));
    assert_eq!(
        standings.total(TotalKind::Distance, Filter::all().sport("Hike")),
        0.0
    );
}

#[test]
fn test_slow_run_reclassified_as_walk() {
    let standings = aggregate(
        default_settings(),
        &one_club(vec![
            activity("Slow P.", "Run", 1.0, 1080),
            activity("Fast P.", "Run", 1.0, 900),
        ]),
    );
    let club = &standings.clubs()[0];
    assert_eq!(club.athlete("Slow P.").unwrap().activities[0].sport, "Walk");
    assert_eq!(club.athlete("Fast P.").unwrap().activities[0].sport, "Run");
}

#[test]
fn test_speed_cap_zeroes_total() {
    let standings = aggregate(
        default_settings(),
        &one_club(vec![
            activity("Too F.", "Run", 20.0, 3600),
            activity("Just R.", "Run", 10.0, 3600),
        ]),
    );
    let club = &standings.clubs()[0];

    let too_fast = &club.athlete("Too F.").unwrap().activities[0];
    assert_eq!(too_fast.total, 0.0);
    assert!((too_fast.distance - 20.0).abs() < 1e-9);

    let ok = &club.athlete("Just R.").unwrap().activities[0];
    assert!((ok.total - 10.0).abs() < 1e-9);
}

#[test]
fn test_whitelist_bypasses_quality_checks() {
    let mut long_day = activity("Ultra R.", "Run", 20.0, 3600);
    long_day.elapsed_time = 70_000;
    let input = one_club(vec![long_day]);

    let dry_run = aggregate(default_settings(), &input);
    let id = dry_run.clubs()[0].athletes[0].activities[0].id.clone();
    assert_eq!(dry_run.clubs()[0].athletes[0].activities[0].total, 0.0);

    let mut settings = default_settings();
    settings.whitelist.insert(id.clone());
    let standings = aggregate(settings, &input);
    let counted = &standings.clubs()[0].athletes[0].activities[0];
    assert_eq!(counted.id, id);
    assert!((counted.total - 20.0).abs() < 1e-9);
}

#[test]
fn test_elapsed_over_18_hours_zeroed() {
    let mut ride = activity("Tour R.", "Ride", 100.0, 8 * 3600);
    ride.elapsed_time = 64_801;
    let standings = aggregate(default_settings(), &one_club(vec![ride]));
    assert_eq!(standings.clubs()[0].athletes[0].activities[0].total, 0.0);
}

#[test]
fn test_distance_limit_clamps_before_multiplier() {
    let mut settings = default_settings();
    settings.sports.set(
        "VirtualRun",
        SportRule::default()
            .label("Treadmill")
            .distance_limit(4.0)
            .multiplier(0.5),
    );
    let standings = aggregate(
        settings,
        &one_club(vec![activity("Tread M.", "VirtualRun", 10.0, 5400)]),
    );
    let activity = &standings.clubs()[0].athletes[0].activities[0];
    assert!((activity.total - 2.0).abs() < 1e-9);
    assert!((activity.distance - 10.0).abs() < 1e-9);
}

#[test]
fn test_manual_activities_follow_allow_manual() {
    let input = one_club(vec![
        manual_activity("Hand E.", "Run", 3.0, 1800),
        activity("Gps R.", "Run", 3.0, 1800),
    ]);

    let excluded = aggregate(default_settings(), &input);
    assert!(excluded.clubs()[0].athlete("Hand E.").is_none());
    assert!((excluded.total(TotalKind::Distance, Filter::all()) - 3.0).abs() < 1e-9);

    let mut settings = default_settings();
    settings.allow_manual = true;
    let included = aggregate(settings, &input);
    assert!(included.clubs()[0].athlete("Hand E.").is_some());
    assert!((included.total(TotalKind::Distance, Filter::all()) - 6.0).abs() < 1e-9);
}

#[test]
fn test_short_activities_dropped() {
    let standings = aggregate(
        default_settings(),
        &one_club(vec![activity("Quick Q.", "Run", 0.1, 90)]),
    );
    assert!(standings.clubs()[0].athletes.is_empty());
}

#[test]
fn test_unregistered_sport_recorded_but_not_counted() {
    let standings = aggregate(default_settings(), &season());
    let dan = standings.club(20).unwrap().athlete("Dan M.").unwrap();

    assert_eq!(dan.activities.len(), 1);
    assert_eq!(dan.activities[0].sport, "Swim");
    assert_eq!(dan.activities[0].total, 0.0);
    assert!(dan.totals.is_empty());
}

#[test]
fn test_activities_sorted_by_date_with_stable_ties() {
    // Manual files load after automated ones, so dates arrive out of order.
    let input = vec![club_snapshots(
        club(1, "Solo"),
        vec![
            snapshot(
                date(2020, 12, 3),
                vec![activity("Jane D.", "Run", 3.0, 1500)],
            ),
            snapshot(
                date(2020, 12, 1),
                vec![
                    activity("Jane D.", "Run", 4.0, 2000),
                    activity("Jane D.", "Ride", 10.0, 2400),
                ],
            ),
        ],
    )];
    let standings = aggregate(default_settings(), &input);
    let jane = &standings.clubs()[0].athletes[0];

    let order: Vec<(u32, &str)> = jane
        .activities
        .iter()
        .map(|a| (chrono::Datelike::day(&a.date), a.sport.as_str()))
        .collect();
    assert_eq!(order, vec![(1, "Run"), (1, "Ride"), (3, "Run")]);

    let sports: Vec<&str> = jane.totals.by_sport.keys().map(String::as_str).collect();
    assert_eq!(sports, vec!["Ride", "Run"]);
}

#[test]
fn test_total_filters() {
    let standings = aggregate(default_settings(), &season());

    let all = standings.total(TotalKind::Total, Filter::all());
    assert!((all - (13.0 + 10.0 + 13.1)).abs() < 1e-9);

    let riders = standings.total(TotalKind::Total, Filter::all().club(10));
    assert!((riders - 23.0).abs() < 1e-9);

    let ann_rides = standings.total(
        TotalKind::Distance,
        Filter::all().club(10).athlete("Ann K.").sport("Ride"),
    );
    assert!((ann_rides - 40.0).abs() < 1e-9);

    let runs = standings.total(TotalKind::Distance, Filter::all().sport("Run"));
    assert!((runs - (6.0 + 3.0 + 13.1)).abs() < 1e-9);

    let moving = standings.total(TotalKind::MovingTime, Filter::all().athlete("Bob S."));
    assert_eq!(moving, (3000 + 2 * 3600) as f64);

    assert_eq!(
        standings.total(TotalKind::Total, Filter::all().club(999)),
        0.0
    );
}

#[test]
fn test_sport_leaders_include_everyone() {
    let standings = aggregate(default_settings(), &season());
    let leaders = standings.sport_leaders("Run");

    assert_eq!(leaders.len(), 4);
    assert_eq!(leaders[0].athlete, "Cat L.");
    assert_eq!(leaders[0].club_id, 20);
    assert!((leaders[1].distance - 6.0).abs() < 1e-9);
    assert_eq!(leaders[3].distance, 0.0);
}

#[test]
fn test_leader_and_activity_ties_use_remaining_fields() {
    let input = vec![
        club_snapshots(
            club(10, "Riders"),
            vec![snapshot(
                date(2020, 12, 1),
                vec![
                    activity("Ann K.", "Ride", 8.0, 3600),
                    activity("Zed Q.", "Ride", 8.0, 3600),
                ],
            )],
        ),
        club_snapshots(
            club(20, "Runners"),
            vec![snapshot(
                date(2020, 12, 1),
                vec![activity("Bob S.", "Ride", 8.0, 3600)],
            )],
        ),
    ];
    let standings = aggregate(default_settings(), &input);

    let leaders: Vec<(u64, String)> = standings
        .sport_leaders("Run")
        .into_iter()
        .map(|entry| (entry.club_id, entry.athlete))
        .collect();
    assert_eq!(
        leaders,
        vec![
            (20, "Bob S.".to_string()),
            (10, "Zed Q.".to_string()),
            (10, "Ann K.".to_string()),
        ]
    );

    let top: Vec<String> = standings
        .top_activities(Filter::all())
        .into_iter()
        .map(|a| a.athlete)
        .collect();
    assert_eq!(top, vec!["Bob S.", "Zed Q.", "Ann K."]);
}

#[test]
fn test_top_activities_ranked_by_adjusted_total() {
    let standings = aggregate(default_settings(), &season());

    let top = standings.top_activities(Filter::all());
    let totals: Vec<f64> = top.iter().map(|a| a.total).collect();
    let mut sorted = totals.clone();
    sorted.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(totals, sorted);
    assert_eq!(top[0].athlete, "Cat L.");

    let ann = standings.top_activities(Filter::all().club(10).athlete("Ann K."));
    assert_eq!(ann.len(), 2);
    assert_eq!(ann[0].sport, "Ride");
    assert!((ann[0].distance - 40.0).abs() < 1e-9);
    assert_eq!(ann[1].date, date(2020, 12, 2));
}

#[test]
fn test_reporting_period_spans_all_snapshots() {
    let standings = aggregate(default_settings(), &season());
    let period = standings.period().unwrap();
    assert_eq!(period.start, date(2020, 12, 1));
    assert_eq!(period.end, date(2020, 12, 3));
    assert_eq!(period.day_count(), 3);

    assert!(aggregate(default_settings(), &[]).period().is_none());
}

#[test]
fn test_kilometer_unit_converts_distances() {
    let mut settings = default_settings();
    settings.distance_unit = strava_club_tracker::models::DistanceUnit::kilometers();
    let standings = aggregate(
        settings,
        &one_club(vec![activity("Jane D.", "Ride", 10.0, 3600)]),
    );
    let ride = &standings.clubs()[0].athletes[0].activities[0];
    assert!((ride.distance - 10.0 * MILE / 1000.0).abs() < 1e-9);
}
