use serde::{Deserialize, Serialize};
use std::fmt;

/// A committer attributed with a job's state.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    pub build: String,
    pub job: String,
}

impl Actor {
    pub fn new(name: impl Into<String>, build: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            build: build.into(),
            job: job.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.build, self.job)
    }
}
