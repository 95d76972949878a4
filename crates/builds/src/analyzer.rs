//! Heroes and villains attribution.
//!
//! Attribution is derived purely from event history. For each job the events
//! are walked in time order:
//!
//! - a break while green starts a new broken streak owned by its committers;
//!   further breaks add their committers to the streak;
//! - a fix while broken ends the streak, and its committers become the job's
//!   heroes; a fix while already green is ignored.
//!
//! A job that ends broken contributes its streak committers as villains. A job
//! that ends green after at least one break contributes the committers of the
//! fix that ended the last streak as heroes.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::actor::Actor;
use crate::aggregate::Builds;
use crate::event::Outcome;
use crate::job::Job;

/// Attribution for a single job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobAnalysis {
    /// Whether the job is currently broken
    pub broken: bool,
    /// Committers of the fix that ended the last broken streak
    pub heroes: BTreeSet<String>,
    /// Committers of the current broken streak
    pub villains: BTreeSet<String>,
}

impl JobAnalysis {
    #[must_use]
    pub fn of(job: &Job) -> Self {
        let mut broken = false;
        let mut current: BTreeSet<String> = BTreeSet::new();
        let mut fix: Option<&BTreeSet<String>> = None;

        for event in job.events() {
            match (event.outcome, broken) {
                (Outcome::Broken, true) => current.extend(event.responsible.iter().cloned()),
                (Outcome::Broken, false) => {
                    current.clone_from(&event.responsible);
                    broken = true;
                }
                (Outcome::Fixed, true) => {
                    fix = Some(&event.responsible);
                    broken = false;
                    current.clear();
                }
                (Outcome::Fixed, false) => {}
            }
        }

        if broken {
            Self {
                broken,
                heroes: BTreeSet::new(),
                villains: current,
            }
        } else {
            Self {
                broken,
                heroes: fix.cloned().unwrap_or_default(),
                villains: BTreeSet::new(),
            }
        }
    }
}

/// Heroes and villains across every job of every build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyzedActors {
    pub heroes: BTreeSet<Actor>,
    pub villains: BTreeSet<Actor>,
}

impl AnalyzedActors {
    #[must_use]
    pub fn new(builds: &Builds) -> Self {
        let mut actors = Self::default();
        for build in builds.iter() {
            for job in build.jobs() {
                let analysis = JobAnalysis::of(job);
                let to_actor = |name: &String| Actor::new(name.as_str(), &build.name, &job.name);
                actors.heroes.extend(analysis.heroes.iter().map(to_actor));
                actors.villains.extend(analysis.villains.iter().map(to_actor));
            }
        }
        actors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty() && self.villains.is_empty()
    }

    /// Distinct villain names, regardless of which job they broke.
    #[must_use]
    pub fn villain_names(&self) -> BTreeSet<&str> {
        self.villains.iter().map(|a| a.name.as_str()).collect()
    }

    /// Distinct hero names, regardless of which job they fixed.
    #[must_use]
    pub fn hero_names(&self) -> BTreeSet<&str> {
        self.heroes.iter().map(|a| a.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Event;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_empty_job_contributes_nothing() {
        assert_eq!(JobAnalysis::of(&Job::new("j0")), JobAnalysis::default());
    }

    #[test]
    fn test_fix_while_broken_overwrites_previous_fix() {
        let at = |s| Utc.timestamp_opt(s, 0).unwrap();
        let job = Job::with_events(
            "j0",
            [
                Event::broken(at(1), ["a"]),
                Event::fixed(at(2), ["b"]),
                Event::broken(at(3), ["c"]),
                Event::fixed(at(4), ["d", "e"]),
            ],
        );
        let analysis = JobAnalysis::of(&job);
        assert!(!analysis.broken);
        assert_eq!(
            analysis.heroes,
            BTreeSet::from(["d".to_string(), "e".to_string()])
        );
        assert!(analysis.villains.is_empty());
    }

    #[test]
    fn test_streak_resets_after_fix() {
        let at = |s| Utc.timestamp_opt(s, 0).unwrap();
        let job = Job::with_events(
            "j0",
            [
                Event::broken(at(1), ["a"]),
                Event::fixed(at(2), ["b"]),
                Event::broken(at(3), ["c"]),
            ],
        );
        let analysis = JobAnalysis::of(&job);
        assert!(analysis.broken);
        assert_eq!(analysis.villains, BTreeSet::from(["c".to_string()]));
        assert!(analysis.heroes.is_empty());
    }
}
