//! A single job's event history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::event::Event;

/// Time-ordered history of events for one job.
///
/// Events are held in a set, so re-recording an event that is already known
/// leaves the history unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub name: String,
    #[serde(default)]
    events: BTreeSet<Event>,
}

impl Job {
    /// Create a job with no history.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: BTreeSet::new(),
        }
    }

    /// Create a job seeded with the given events.
    pub fn with_events(name: impl Into<String>, events: impl IntoIterator<Item = Event>) -> Self {
        let mut job = Self::new(name);
        job.add_events(events);
        job
    }

    /// Record an event. Returns false if the event was already present.
    pub fn add_event(&mut self, event: Event) -> bool {
        self.events.insert(event)
    }

    /// Record several events.
    pub fn add_events(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Events in chronological order.
    pub fn events(&self) -> impl DoubleEndedIterator<Item = &Event> + ExactSizeIterator {
        self.events.iter()
    }

    /// The chronologically latest event, if any.
    #[must_use]
    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drop all history, keeping the job itself.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drop history that no longer affects attribution.
    ///
    /// Keeps the most recent broken streak together with the fix just before
    /// it. That fix leaves the job green whatever precedes it, so events that
    /// arrive late with an older timestamp cannot join the current streak. A
    /// job that never broke keeps only its latest event. Returns the number
    /// of events removed.
    pub fn purge(&mut self) -> usize {
        let Some(cutoff) = self.retain_from().cloned() else {
            return 0;
        };
        let before = self.events.len();
        self.events = self.events.split_off(&cutoff);
        before - self.events.len()
    }

    fn retain_from(&self) -> Option<&Event> {
        match self.streak_start() {
            Some(start) => self.events.range(..start).next_back().or(Some(start)),
            None => self.last_event(),
        }
    }

    fn streak_start(&self) -> Option<&Event> {
        let mut broken = false;
        let mut start = None;
        for event in &self.events {
            match (event.is_broken(), broken) {
                (true, false) => {
                    start = Some(event);
                    broken = true;
                }
                (false, true) => broken = false,
                _ => {}
            }
        }
        start
    }
}
