//! Debounced alerting on CI build state.
//!
//! This crate keeps the live state of CI builds and pushes it to alert
//! channels (speakers, SMS, relays, dashboards) whenever it changes. Bursts
//! of updates are coalesced: channels receive the latest state, not every
//! step that led to it.
//!
//! # Usage
//!
//! ```no_run
//! use alert::{AlertConfig, AlertService, Alerter, AlerterGroup, LogAlerter};
//! use std::sync::Arc;
//!
//! # async fn run() {
//! let config = AlertConfig::from_env();
//! let channels: Vec<Arc<dyn Alerter>> = vec![Arc::new(LogAlerter::new())];
//! let group = AlerterGroup::new(channels, config.channel_timeout);
//! let service = AlertService::start(group, &config);
//!
//! service.broken("bolt", "smoke", ["dxie"]).unwrap();
//! service.fixed("bolt", "smoke", ["cjerome"]).unwrap();
//!
//! service.shutdown().await;
//! # }
//! ```
//!
//! # Configuration
//!
//! [`AlertConfig::from_env`] reads:
//!
//! - `ALERT_REMINDER_SECS`: remind channels after this long without changes (0 disables)
//! - `ALERT_PURGE_INTERVAL_SECS`: purge stale history on this interval (0 disables)
//! - `ALERT_CHANNEL_TIMEOUT_MS`: time budget for each channel delivery
//! - `ALERT_SHUTDOWN_TIMEOUT_MS`: time budget for background tasks on shutdown
//! - `ALERT_DISABLED`: set to "true" to run without channels
//!
//! # Architecture
//!
//! - [`Alerter`] trait defines the interface for alert channels
//! - [`LogAlerter`] reports attribution changes through `tracing`
//! - [`AlerterGroup`] fans a delivery out to every channel with failure isolation
//! - [`AlertService`] owns the build state and runs the dispatch loop

pub mod channels;
pub mod config;
pub mod error;
pub mod group;
pub mod service;

pub use channels::log::LogAlerter;
pub use channels::{ActorChanges, Alerter};
pub use config::AlertConfig;
pub use error::{ChannelError, ServiceError};
pub use group::{AlerterGroup, Delivery};
pub use service::AlertService;
