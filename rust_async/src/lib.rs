//! Tokio orchestration of the Monte Carlo π run: the progress aggregator is an
//! actor task, samplers run on the blocking pool, and drawn points can be
//! streamed into a [`plot::PointCanvas`].
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod actor;
pub mod dispatcher;
pub mod orchestrator;
pub mod plot;

pub use actor::ProgressHandle;
pub use plot::PointCanvas;
