//! Monte Carlo estimation of π split across independent tasks, with a
//! progress aggregator the caller can poll while the tasks run.
//!
//! This crate holds the shared pieces (configuration, sampler, progress
//! record, run log) and the thread-per-task orchestration strategy.
#![cfg_attr(not(test), deny(clippy::expect_used, clippy::unwrap_used))]

pub mod actor;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod monte_carlo;
pub mod observer;
pub mod orchestrator;
pub mod progress;
pub mod runlog;

pub use actor::ProgressHandle;
pub use config::{RunConfig, TaskId, TaskSpec};
pub use error::{ConfigError, RunError, TaskError};
pub use monte_carlo::{estimate_pi, sampling_task, ProgressReporter, SamplePoint};
pub use observer::{ConsoleProgress, ProgressHistory, ProgressObserver};
pub use orchestrator::RunOutcome;
pub use progress::{ProgressRecord, ProgressSnapshot};
pub use runlog::{RunLog, RunRecord};
