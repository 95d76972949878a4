//! A named build line and its jobs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::job::Job;
use crate::PurgeSummary;

/// Jobs of one build, in the order they were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    #[serde(default)]
    jobs: IndexMap<String, Job>,
}

impl Build {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: IndexMap::new(),
        }
    }

    /// Get the named job, creating an empty one if needed.
    pub fn job(&mut self, name: &str) -> &mut Job {
        self.jobs
            .entry(name.to_string())
            .or_insert_with(|| Job::new(name))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True if any job has recorded history.
    #[must_use]
    pub fn has_events(&self) -> bool {
        self.jobs.values().any(|job| !job.is_empty())
    }

    /// Erase the history of every job, keeping the jobs.
    pub fn clear(&mut self) {
        self.jobs.values_mut().for_each(Job::clear);
    }

    /// Erase the history of one job, if it exists. Returns false if the
    /// job is unknown.
    pub fn clear_job(&mut self, name: &str) -> bool {
        self.jobs.get_mut(name).map(Job::clear).is_some()
    }

    /// Remove a job entirely.
    pub fn delete(&mut self, name: &str) -> Option<Job> {
        self.jobs.shift_remove(name)
    }

    /// Remove every job.
    pub fn delete_all(&mut self) {
        self.jobs.clear();
    }

    /// Drop jobs with no history and trim the history of the rest.
    pub fn purge(&mut self) -> PurgeSummary {
        let mut summary = PurgeSummary::default();
        self.jobs.retain(|_, job| {
            if job.is_empty() {
                summary.jobs += 1;
                false
            } else {
                summary.events += job.purge();
                true
            }
        });
        summary
    }
}
