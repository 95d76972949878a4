//! Attribution scenarios over whole aggregates.

use builds::{Actor, AnalyzedActors, BuildEvent, Builds, Event, Outcome};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeSet;

fn t(n: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + n, 0).unwrap()
}

fn builds_from(events: &[(&str, &str, Outcome, i64, &[&str])]) -> Builds {
    let mut builds = Builds::new();
    for (build, job, outcome, time, names) in events {
        builds.apply(&BuildEvent::new(
            *build,
            *job,
            Event::new(*outcome, t(*time), names.iter().copied()),
        ));
    }
    builds
}

fn actors(list: &[(&str, &str, &str)]) -> BTreeSet<Actor> {
    list.iter()
        .map(|(name, build, job)| Actor::new(*name, *build, *job))
        .collect()
}

// =============================================================================
// Single job scenarios
// =============================================================================

#[test]
fn broken_job_yields_villain() {
    let builds = builds_from(&[("b0", "j0", Outcome::Broken, 1, &["n1"])]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(result.villains, actors(&[("n1", "b0", "j0")]));
    assert!(result.heroes.is_empty());
}

#[test]
fn fixed_job_yields_hero() {
    let builds = builds_from(&[
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
        ("b0", "j0", Outcome::Fixed, 2, &["n2"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(result.heroes, actors(&[("n2", "b0", "j0")]));
    assert!(result.villains.is_empty());
}

#[test]
fn never_broken_job_yields_nobody() {
    let builds = builds_from(&[
        ("b0", "j0", Outcome::Fixed, 1, &["n1"]),
        ("b0", "j0", Outcome::Fixed, 2, &["n2"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert!(result.is_empty());
}

#[test]
fn redundant_fix_after_fix_is_ignored() {
    let builds = builds_from(&[
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
        ("b0", "j0", Outcome::Fixed, 2, &["n2"]),
        ("b0", "j0", Outcome::Fixed, 3, &["n3"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(result.heroes, actors(&[("n2", "b0", "j0")]));
    assert!(result.villains.is_empty());
}

#[test]
fn consecutive_breaks_accumulate_villains() {
    let builds = builds_from(&[
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
        ("b0", "j0", Outcome::Fixed, 2, &["n2"]),
        ("b0", "j0", Outcome::Broken, 3, &["n3"]),
        ("b0", "j0", Outcome::Broken, 5, &["n4"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(
        result.villains,
        actors(&[("n3", "b0", "j0"), ("n4", "b0", "j0")])
    );
    assert!(result.heroes.is_empty());
}

#[test]
fn arrival_order_does_not_matter() {
    let builds = builds_from(&[
        ("b0", "j0", Outcome::Broken, 5, &["n4"]),
        ("b0", "j0", Outcome::Fixed, 2, &["n2"]),
        ("b0", "j0", Outcome::Broken, 3, &["n3"]),
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(
        result.villains,
        actors(&[("n3", "b0", "j0"), ("n4", "b0", "j0")])
    );
    let job = builds.get_job("b0", "j0").unwrap();
    assert_eq!(job.last_event().map(|e| e.time), Some(t(5)));
}

// =============================================================================
// Aggregate-wide behavior
// =============================================================================

#[test]
fn union_across_builds_and_jobs() {
    let builds = builds_from(&[
        ("bolt", "smoke", Outcome::Broken, 1, &["cdehaudt"]),
        ("bolt", "smoke", Outcome::Fixed, 2, &["cdehaudt"]),
        ("bolt", "regression", Outcome::Broken, 3, &["machung"]),
        ("nut", "unit", Outcome::Broken, 4, &["fuzhong", "cjerome"]),
        ("nut", "lint", Outcome::Fixed, 5, &["dxie"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(result.heroes, actors(&[("cdehaudt", "bolt", "smoke")]));
    assert_eq!(
        result.villains,
        actors(&[
            ("machung", "bolt", "regression"),
            ("fuzhong", "nut", "unit"),
            ("cjerome", "nut", "unit"),
        ])
    );
    assert_eq!(
        result.villain_names(),
        BTreeSet::from(["cjerome", "fuzhong", "machung"])
    );
}

#[test]
fn same_name_on_two_jobs_is_two_actors() {
    let builds = builds_from(&[
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
        ("b0", "j1", Outcome::Broken, 1, &["n1"]),
    ]);
    let result = AnalyzedActors::new(&builds);
    assert_eq!(result.villains.len(), 2);
    assert_eq!(result.villain_names().len(), 1);
}

#[test]
fn duplicate_events_do_not_change_history() {
    let once = builds_from(&[("b0", "j0", Outcome::Broken, 1, &["n1"])]);
    let twice = builds_from(&[
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
    ]);
    assert_eq!(once, twice);
}

#[test]
fn purge_preserves_attribution() {
    let mut builds = builds_from(&[
        ("b0", "j0", Outcome::Broken, 1, &["n1"]),
        ("b0", "j0", Outcome::Fixed, 2, &["n2"]),
        ("b0", "j0", Outcome::Broken, 3, &["n3"]),
        ("b0", "j0", Outcome::Broken, 4, &["n4"]),
        ("b0", "j1", Outcome::Broken, 1, &["n5"]),
        ("b0", "j1", Outcome::Fixed, 2, &["n6"]),
        ("b0", "j1", Outcome::Fixed, 3, &["n7"]),
        ("b1", "j0", Outcome::Fixed, 1, &["n8"]),
        ("b1", "j0", Outcome::Fixed, 2, &["n9"]),
    ]);
    builds.build("b2").job("idle");
    let before = AnalyzedActors::new(&builds);
    let summary = builds.purge();
    let after = AnalyzedActors::new(&builds);

    assert_eq!(before, after);
    assert_eq!(summary.builds, 1);
    assert_eq!(summary.jobs, 1);
    assert_eq!(summary.events, 2);
    assert!(builds.get_job("b1", "j0").is_some());
}

#[test]
fn late_break_after_purge_does_not_join_current_streak() {
    let history: &[(&str, &str, Outcome, i64, &[&str])] = &[
        ("b0", "j0", Outcome::Broken, 10, &["n1"]),
        ("b0", "j0", Outcome::Fixed, 20, &["n2"]),
        ("b0", "j0", Outcome::Broken, 30, &["n3"]),
    ];
    let mut untouched = builds_from(history);
    let mut purged = builds_from(history);
    purged.purge();

    let late = BuildEvent::new("b0", "j0", Event::broken(t(5), ["late"]));
    untouched.apply(&late);
    purged.apply(&late);

    let expected = actors(&[("n3", "b0", "j0")]);
    assert_eq!(AnalyzedActors::new(&untouched).villains, expected);
    assert_eq!(AnalyzedActors::new(&purged).villains, expected);
}
