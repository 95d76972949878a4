//! Build status events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Outcome of a single job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The job failed
    Broken,
    /// The job passed
    Fixed,
}

impl Outcome {
    /// Get display name for this outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Broken => "broken",
            Self::Fixed => "fixed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable status transition for a job.
///
/// Events order by time first. Events at the same instant fall back to
/// outcome and then responsible names, so the ordering is total and
/// deterministic, and identical events compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Event {
    /// When the job reported this outcome
    pub time: DateTime<Utc>,
    /// Broken or fixed
    pub outcome: Outcome,
    /// Committers responsible for the change
    #[serde(default)]
    pub responsible: BTreeSet<String>,
}

impl Event {
    /// Create an event with the given outcome and responsible names.
    pub fn new<I, S>(outcome: Outcome, time: DateTime<Utc>, responsible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            time,
            outcome,
            responsible: responsible.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a broken event.
    pub fn broken<I, S>(time: DateTime<Utc>, responsible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Outcome::Broken, time, responsible)
    }

    /// Create a fixed event.
    pub fn fixed<I, S>(time: DateTime<Utc>, responsible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Outcome::Fixed, time, responsible)
    }

    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.outcome == Outcome::Broken
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.responsible.iter().map(String::as_str).collect();
        write!(
            f,
            "{} at {} by [{}]",
            self.outcome,
            self.time.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
            names.join(", ")
        )
    }
}

/// An event addressed to a job within a build, as received from ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildEvent {
    pub build: String,
    pub job: String,
    #[serde(flatten)]
    pub event: Event,
}

impl BuildEvent {
    pub fn new(build: impl Into<String>, job: impl Into<String>, event: Event) -> Self {
        Self {
            build: build.into(),
            job: job.into(),
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_events_order_by_time_first() {
        let early = Event::fixed(at(1), ["zed"]);
        let late = Event::broken(at(2), ["amy"]);
        assert!(early < late);
    }

    #[test]
    fn test_same_instant_ties_are_deterministic() {
        let broken = Event::broken(at(5), ["n1"]);
        let fixed = Event::fixed(at(5), ["n1"]);
        assert!(broken < fixed);
        assert_ne!(broken, fixed);
    }

    #[test]
    fn test_responsible_names_collapse() {
        let event = Event::broken(at(1), ["n1", "n2", "n1"]);
        assert_eq!(event.responsible.len(), 2);
        assert!(event.is_broken());
    }

    #[test]
    fn test_build_event_json_shape() {
        let json = r#"{"build":"b0","job":"j0","time":"1970-01-01T00:00:10Z","outcome":"broken","responsible":["n1"]}"#;
        let parsed: BuildEvent = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, BuildEvent::new("b0", "j0", Event::broken(at(10), ["n1"])));
    }

    #[test]
    fn test_display() {
        let event = Event::fixed(at(0), ["a", "b"]);
        assert_eq!(event.to_string(), "fixed at 1970-01-01 00:00:00.000 UTC by [a, b]");
    }
}
