//! Alert channel interface and implementations.

pub mod log;

use async_trait::async_trait;
use builds::{Actor, AnalyzedActors, Builds};
use std::collections::BTreeSet;

use crate::error::ChannelError;

/// Trait for alert channels (audio, SMS, relays, dashboards, ...).
///
/// The service only guarantees delivery of the latest state, not of every
/// intermediate one. Implementations keep their own view of what they last
/// acted on and only produce side effects for what changed since.
#[async_trait]
pub trait Alerter: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &str;

    /// Apply the current state of all builds.
    async fn update(&self, builds: &Builds) -> Result<(), ChannelError>;

    /// Nothing is tracked any more; reset to the all-clear state.
    async fn clear(&self) -> Result<(), ChannelError>;

    /// Nothing changed within the reminder interval.
    async fn remind(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Difference between two attributions, from an alerter's point of view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorChanges {
    /// Villains not present before
    pub new_villains: BTreeSet<Actor>,
    /// Villains no longer responsible for a broken job
    pub former_villains: BTreeSet<Actor>,
    /// Heroes not present before
    pub new_heroes: BTreeSet<Actor>,
}

impl ActorChanges {
    #[must_use]
    pub fn between(previous: &AnalyzedActors, current: &AnalyzedActors) -> Self {
        Self {
            new_villains: current
                .villains
                .difference(&previous.villains)
                .cloned()
                .collect(),
            former_villains: previous
                .villains
                .difference(&current.villains)
                .cloned()
                .collect(),
            new_heroes: current.heroes.difference(&previous.heroes).cloned().collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.new_villains.is_empty() && self.former_villains.is_empty() && self.new_heroes.is_empty()
    }
}
