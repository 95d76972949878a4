//! The alert service: live build state plus a debounced dispatch loop.
//!
//! Any number of callers mutate the live [`Builds`] concurrently. Each
//! mutation marks the state as changed and wakes the dispatch loop; the loop
//! takes a snapshot under the lock and delivers it to the channels outside
//! the lock. Mutations made while a delivery is in flight are coalesced into
//! the next snapshot, so channels always receive the latest state but not
//! necessarily every intermediate one.

use builds::{Build, BuildEvent, Builds, Event, Job, PurgeSummary};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Level};

use crate::config::AlertConfig;
use crate::error::ServiceError;
use crate::group::{AlerterGroup, Delivery};

#[derive(Default)]
struct State {
    builds: Builds,
    changed: bool,
}

/// State shared between callers and the background tasks.
#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    signal: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a mutation and wake the dispatch loop if it reports a change.
    fn mutate<R>(&self, f: impl FnOnce(&mut Builds) -> (R, bool)) -> R {
        let mut state = self.lock();
        let (result, changed) = f(&mut state.builds);
        if changed {
            state.changed = true;
            self.signal.notify_one();
        }
        result
    }

    /// Read and reset the changed flag, snapshotting the builds if it was set.
    fn take_changed(&self) -> Option<Arc<Builds>> {
        let mut state = self.lock();
        if !state.changed {
            return None;
        }
        state.changed = false;
        Some(Arc::new(state.builds.clone()))
    }

    fn purge(&self) -> PurgeSummary {
        let summary = self.lock().builds.purge();
        info!(
            builds = summary.builds,
            jobs = summary.jobs,
            events = summary.events,
            "Purged stale history"
        );
        summary
    }
}

/// Service that manages the state of builds and drives the alert channels.
///
/// Must be started from within a Tokio runtime. Mutations are synchronous
/// and never wait for delivery.
pub struct AlertService {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_timeout: Duration,
}

impl AlertService {
    /// Start the dispatch loop, plus the purge loop if configured.
    #[must_use]
    pub fn start(group: AlerterGroup, config: &AlertConfig) -> Self {
        let shared = Arc::new(Shared::default());
        let cancel = CancellationToken::new();

        info!(
            channels = group.len(),
            reminder_secs = config.reminder.map(|d| d.as_secs()),
            purge_interval_secs = config.purge_interval.map(|d| d.as_secs()),
            "Starting alert service"
        );

        let mut tasks = vec![tokio::spawn(dispatch_loop(
            Arc::clone(&shared),
            group,
            config.reminder,
            cancel.clone(),
        ))];
        if let Some(interval) = config.purge_interval {
            tasks.push(tokio::spawn(purge_loop(
                Arc::clone(&shared),
                interval,
                cancel.clone(),
            )));
        }

        Self {
            shared,
            cancel,
            tasks: Mutex::new(tasks),
            shutdown_timeout: config.shutdown_timeout,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Record that a job broke now.
    pub fn broken<I, S>(&self, build: &str, job: &str, responsible: I) -> Result<(), ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(build, job, Event::broken(Utc::now(), responsible))
    }

    /// Record that a job was fixed now.
    pub fn fixed<I, S>(&self, build: &str, job: &str, responsible: I) -> Result<(), ServiceError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record(build, job, Event::fixed(Utc::now(), responsible))
    }

    /// Record an event with an explicit timestamp.
    pub fn record(&self, build: &str, job: &str, event: Event) -> Result<(), ServiceError> {
        ServiceError::check_build(build)?;
        ServiceError::check_job(job)?;
        info!(build, job, outcome = %event.outcome, "Recording event");
        self.shared.mutate(|builds| {
            builds.build(build).job(job).add_event(event);
            ((), true)
        });
        Ok(())
    }

    /// Record a batch of events under a single lock.
    ///
    /// The whole batch is rejected if any event names an invalid build or job.
    /// Channels are only woken if some event matters for alerting: a break,
    /// or anything following a break. Returns the number of events applied.
    pub fn process(
        &self,
        events: impl IntoIterator<Item = BuildEvent>,
    ) -> Result<usize, ServiceError> {
        let events: Vec<BuildEvent> = events.into_iter().collect();
        for event in &events {
            ServiceError::check_build(&event.build)?;
            ServiceError::check_job(&event.job)?;
        }
        info!(count = events.len(), "Processing build events");
        let relevant = self.shared.mutate(|builds| {
            let relevant = events
                .iter()
                .fold(false, |relevant, event| builds.apply(event) || relevant);
            (relevant, relevant)
        });
        if !relevant {
            debug!("No alert-relevant events in batch");
        }
        Ok(events.len())
    }

    /// Erase the history of every job.
    pub fn clear_all(&self) {
        debug!("Clearing all builds");
        self.shared.mutate(|builds| {
            builds.clear();
            ((), true)
        });
    }

    /// Erase the history of every job in a build. Unknown builds are ignored.
    pub fn clear_build(&self, build: &str) -> Result<(), ServiceError> {
        ServiceError::check_build(build)?;
        debug!(build, "Clearing build");
        self.shared.mutate(|builds| ((), builds.clear_build(build)));
        Ok(())
    }

    /// Erase the history of one job. Unknown jobs are ignored.
    pub fn clear_job(&self, build: &str, job: &str) -> Result<(), ServiceError> {
        ServiceError::check_build(build)?;
        ServiceError::check_job(job)?;
        debug!(build, job, "Clearing job");
        self.shared.mutate(|builds| ((), builds.clear_job(build, job)));
        Ok(())
    }

    /// Remove every build. Channels receive a clear.
    pub fn delete_all(&self) {
        debug!("Deleting all builds");
        self.shared.mutate(|builds| {
            builds.delete_all();
            ((), true)
        });
    }

    /// Remove a build entirely.
    pub fn delete_build(&self, build: &str) -> Result<(), ServiceError> {
        ServiceError::check_build(build)?;
        debug!(build, "Deleting build");
        self.shared.mutate(|builds| ((), builds.delete(build).is_some()));
        Ok(())
    }

    /// Remove a job entirely.
    pub fn delete_job(&self, build: &str, job: &str) -> Result<(), ServiceError> {
        ServiceError::check_build(build)?;
        ServiceError::check_job(job)?;
        debug!(build, job, "Deleting job");
        self.shared.mutate(|builds| ((), builds.delete_job(build, job).is_some()));
        Ok(())
    }

    /// Drop builds and jobs without history and trim old events.
    ///
    /// Housekeeping only: channels are not woken.
    pub fn purge(&self) -> PurgeSummary {
        self.shared.purge()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// A copy of the current state of all builds.
    pub fn builds(&self) -> Builds {
        self.shared.lock().builds.clone()
    }

    /// A copy of the current state of a build, if known.
    pub fn build(&self, build: &str) -> Option<Build> {
        self.shared.lock().builds.get(build).cloned()
    }

    /// A copy of the current state of a job, if known.
    pub fn job(&self, build: &str, job: &str) -> Option<Job> {
        self.shared.lock().builds.get_job(build, job).cloned()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Stop the background tasks.
    ///
    /// A delivery already in progress is allowed to finish; nothing is
    /// delivered afterwards. Waits at most the configured shutdown timeout.
    pub async fn shutdown(&self) {
        info!("Shutting down the alert service");
        self.cancel.cancel();

        let tasks = std::mem::take(
            &mut *self
                .tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        let timeout_ms = u64::try_from(self.shutdown_timeout.as_millis()).unwrap_or(u64::MAX);
        let deadline = Instant::now() + self.shutdown_timeout;
        for task in tasks {
            match tokio::time::timeout_at(deadline, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Alert service task failed"),
                Err(_) => warn!(timeout_ms, "Alert service task did not shut down in time"),
            }
        }
        info!("Alert service shut down");
    }

    /// True once shutdown has been requested.
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for AlertService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Wait for changes and deliver snapshots until cancelled.
///
/// An empty snapshot means every build was removed and channels receive a
/// clear. If a reminder interval is set and it passes without changes,
/// channels receive a reminder.
async fn dispatch_loop(
    shared: Arc<Shared>,
    group: AlerterGroup,
    reminder: Option<Duration>,
    cancel: CancellationToken,
) {
    loop {
        debug!("Waiting for signal");
        let delivery = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = shared.signal.notified() => match shared.take_changed() {
                Some(builds) if builds.is_empty() => Delivery::Clear,
                Some(builds) => Delivery::Update(builds),
                None => continue,
            },
            () = wait_for_reminder(reminder) => Delivery::Remind,
        };

        if let Delivery::Update(builds) = &delivery {
            log_snapshot(builds);
        }
        group.deliver(delivery).await;
    }
    debug!("Dispatch loop stopped");
}

async fn wait_for_reminder(reminder: Option<Duration>) {
    match reminder {
        Some(interval) => tokio::time::sleep(interval).await,
        None => std::future::pending().await,
    }
}

/// Purge on a fixed interval until cancelled.
async fn purge_loop(shared: Arc<Shared>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                shared.purge();
            }
        }
    }
    debug!("Purge loop stopped");
}

fn log_snapshot(builds: &Builds) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }
    match serde_json::to_string(builds) {
        Ok(json) => debug!(builds = %json, "Alerting for builds"),
        Err(e) => warn!(error = %e, "Failed to serialize snapshot"),
    }
}
