//! The root aggregate of all builds.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::build::Build;
use crate::event::{BuildEvent, Outcome};
use crate::job::Job;

/// Counts of what a purge removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub builds: usize,
    pub jobs: usize,
    pub events: usize,
}

impl PurgeSummary {
    fn absorb(&mut self, other: Self) {
        self.builds += other.builds;
        self.jobs += other.jobs;
        self.events += other.events;
    }
}

/// All builds, keyed by name.
///
/// Cloning produces a fully independent snapshot: every build, job and event
/// is owned, so nothing is shared with the original.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builds {
    #[serde(default)]
    builds: IndexMap<String, Build>,
}

impl Builds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the named build, creating an empty one if needed.
    pub fn build(&mut self, name: &str) -> &mut Build {
        self.builds
            .entry(name.to_string())
            .or_insert_with(|| Build::new(name))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Build> {
        self.builds.get(name)
    }

    #[must_use]
    pub fn get_job(&self, build: &str, job: &str) -> Option<&Job> {
        self.builds.get(build).and_then(|b| b.get(job))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Build> {
        self.builds.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.builds.len()
    }

    /// Record an event against its build and job.
    ///
    /// Returns true if the event matters for alerting: it is a break, or it
    /// follows a break.
    pub fn apply(&mut self, event: &BuildEvent) -> bool {
        let job = self.build(&event.build).job(&event.job);
        let was_broken = job
            .last_event()
            .is_some_and(|last| last.outcome == Outcome::Broken);
        job.add_event(event.event.clone());
        event.event.is_broken() || was_broken
    }

    /// Erase history everywhere, keeping every build and job.
    pub fn clear(&mut self) {
        self.builds.values_mut().for_each(Build::clear);
    }

    /// Erase the history of one build's jobs. Returns false if the build is
    /// unknown.
    pub fn clear_build(&mut self, build: &str) -> bool {
        self.builds.get_mut(build).map(Build::clear).is_some()
    }

    /// Erase the history of one job. Returns false if the job is unknown.
    pub fn clear_job(&mut self, build: &str, job: &str) -> bool {
        self.builds.get_mut(build).is_some_and(|b| b.clear_job(job))
    }

    /// Remove every build.
    pub fn delete_all(&mut self) {
        self.builds.clear();
    }

    /// Remove a build and all its jobs.
    pub fn delete(&mut self, build: &str) -> Option<Build> {
        self.builds.shift_remove(build)
    }

    /// Remove one job from a build.
    pub fn delete_job(&mut self, build: &str, job: &str) -> Option<Job> {
        self.builds.get_mut(build).and_then(|b| b.delete(job))
    }

    /// Drop builds and jobs without history, and trim old events.
    ///
    /// Anything holding at least one event survives.
    pub fn purge(&mut self) -> PurgeSummary {
        let mut summary = PurgeSummary::default();
        self.builds.retain(|name, build| {
            summary.absorb(build.purge());
            if build.is_empty() {
                debug!(build = %name, "Purging build with no history");
                summary.builds += 1;
                false
            } else {
                true
            }
        });
        summary
    }
}
