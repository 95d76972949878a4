//! Event-sourced model of CI build state.
//!
//! Builds contain jobs, jobs contain a time-ordered, de-duplicated history of
//! [`Event`]s. [`Builds`] is the root aggregate; cloning it yields an
//! independent snapshot that can be handed to other tasks while the live
//! aggregate keeps changing.
//!
//! [`AnalyzedActors`] turns a snapshot into heroes (who fixed a broken job)
//! and villains (who is responsible for a job that is still broken).
//!
//! # Usage
//!
//! ```
//! use builds::{Actor, AnalyzedActors, Builds, Event};
//! use chrono::Utc;
//!
//! let mut builds = Builds::new();
//! builds
//!     .build("bolt")
//!     .job("smoke")
//!     .add_event(Event::broken(Utc::now(), ["dxie"]));
//!
//! let actors = AnalyzedActors::new(&builds);
//! assert!(actors.villains.contains(&Actor::new("dxie", "bolt", "smoke")));
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod actor;
pub mod aggregate;
pub mod analyzer;
pub mod build;
pub mod event;
pub mod job;

pub use actor::Actor;
pub use aggregate::{Builds, PurgeSummary};
pub use analyzer::{AnalyzedActors, JobAnalysis};
pub use build::Build;
pub use event::{BuildEvent, Event, Outcome};
pub use job::Job;
