//! Fan-out of build state to every registered alert channel.

use builds::Builds;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::channels::Alerter;
use crate::error::ChannelError;

/// What is being delivered to the channels.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Current state of all builds
    Update(Arc<Builds>),
    /// All builds removed
    Clear,
    /// Nothing changed within the reminder interval
    Remind,
}

impl Delivery {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Update(_) => "update",
            Self::Clear => "clear",
            Self::Remind => "remind",
        }
    }
}

/// Registered alert channels.
///
/// Each delivery runs every channel in its own task, bounded by the channel
/// timeout. A channel that fails, hangs or panics is logged and does not
/// affect the others.
#[derive(Clone)]
pub struct AlerterGroup {
    alerters: Vec<Arc<dyn Alerter>>,
    timeout: Duration,
}

impl AlerterGroup {
    /// Create a group with specific channels.
    #[must_use]
    pub fn new(alerters: Vec<Arc<dyn Alerter>>, timeout: Duration) -> Self {
        Self { alerters, timeout }
    }

    /// Create a group with no channels.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![], Duration::ZERO)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.alerters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alerters.is_empty()
    }

    pub async fn update(&self, builds: Arc<Builds>) -> Vec<(String, Result<(), ChannelError>)> {
        self.deliver(Delivery::Update(builds)).await
    }

    pub async fn clear(&self) -> Vec<(String, Result<(), ChannelError>)> {
        self.deliver(Delivery::Clear).await
    }

    pub async fn remind(&self) -> Vec<(String, Result<(), ChannelError>)> {
        self.deliver(Delivery::Remind).await
    }

    /// Deliver to every channel and wait until each finished or timed out.
    pub async fn deliver(&self, delivery: Delivery) -> Vec<(String, Result<(), ChannelError>)> {
        if self.alerters.is_empty() {
            debug!(kind = delivery.kind(), "No channels configured, skipping delivery");
            return vec![];
        }

        let timeout = self.timeout;
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);

        let (names, handles): (Vec<_>, Vec<_>) = self
            .alerters
            .iter()
            .map(|alerter| {
                let alerter = Arc::clone(alerter);
                let delivery = delivery.clone();
                let name = alerter.name().to_string();
                let handle = tokio::spawn(async move {
                    let call = async {
                        match &delivery {
                            Delivery::Update(builds) => alerter.update(builds).await,
                            Delivery::Clear => alerter.clear().await,
                            Delivery::Remind => alerter.remind().await,
                        }
                    };
                    tokio::time::timeout(timeout, call)
                        .await
                        .unwrap_or(Err(ChannelError::Timeout { timeout_ms }))
                });
                (name, handle)
            })
            .unzip();

        let joined = join_all(handles).await;

        names
            .into_iter()
            .zip(joined)
            .map(|(name, joined)| {
                let result = joined.unwrap_or_else(|e| Err(ChannelError::Panicked(e.to_string())));
                match &result {
                    Ok(()) => debug!(channel = %name, kind = delivery.kind(), "Delivered"),
                    Err(e) => error!(
                        channel = %name,
                        kind = delivery.kind(),
                        error = %e,
                        "Failed to deliver to channel"
                    ),
                }
                (name, result)
            })
            .collect()
    }
}
