//! Alert channel that reports attribution changes through `tracing`.

use async_trait::async_trait;
use builds::{Actor, AnalyzedActors, Builds};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use super::{ActorChanges, Alerter};
use crate::error::ChannelError;

/// Logs who broke and who fixed builds.
///
/// Remembers the attribution it last reported so repeated updates with the
/// same state stay quiet.
#[derive(Debug, Default)]
pub struct LogAlerter {
    last: Mutex<AnalyzedActors>,
}

impl LogAlerter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The attribution this channel last acted on.
    pub fn last_reported(&self) -> AnalyzedActors {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, current: AnalyzedActors) -> AnalyzedActors {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *last, current)
    }
}

fn join(actors: &[&Actor]) -> String {
    actors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl Alerter for LogAlerter {
    fn name(&self) -> &str {
        "log"
    }

    async fn update(&self, builds: &Builds) -> Result<(), ChannelError> {
        let current = AnalyzedActors::new(builds);
        let previous = self.swap(current.clone());
        let changes = ActorChanges::between(&previous, &current);

        if changes.is_empty() {
            debug!(channel = self.name(), "No attribution changes");
            return Ok(());
        }

        for actor in &changes.new_villains {
            warn!(
                name = %actor.name,
                build = %actor.build,
                job = %actor.job,
                "Build broken"
            );
        }
        for actor in &changes.new_heroes {
            info!(
                name = %actor.name,
                build = %actor.build,
                job = %actor.job,
                "Build fixed"
            );
        }
        if !changes.former_villains.is_empty() {
            let former: Vec<&Actor> = changes.former_villains.iter().collect();
            info!(actors = %join(&former), "No longer responsible for a broken build");
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), ChannelError> {
        let previous = self.swap(AnalyzedActors::default());
        if !previous.is_empty() {
            info!(channel = self.name(), "All builds clear");
        }
        Ok(())
    }

    async fn remind(&self) -> Result<(), ChannelError> {
        let last = self.last_reported();
        if last.villains.is_empty() {
            return Ok(());
        }
        let villains: Vec<&Actor> = last.villains.iter().collect();
        warn!(villains = %join(&villains), "Builds still broken");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use builds::Event;
    use chrono::Utc;

    #[tokio::test]
    async fn test_update_tracks_last_state() {
        let alerter = LogAlerter::new();
        let mut builds = Builds::new();
        builds
            .build("bolt")
            .job("smoke")
            .add_event(Event::broken(Utc::now(), ["dxie"]));

        alerter.update(&builds).await.unwrap();
        let last = alerter.last_reported();
        assert!(last.villains.contains(&Actor::new("dxie", "bolt", "smoke")));

        alerter.remind().await.unwrap();
        alerter.clear().await.unwrap();
        assert!(alerter.last_reported().is_empty());
    }
}
