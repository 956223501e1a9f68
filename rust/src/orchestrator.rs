use std::thread;
use std::time::{Duration, Instant};

use crate::actor::ProgressHandle;
use crate::config::{RunConfig, TaskSpec};
use crate::dispatcher::{dispatch_with, TaskHandle};
use crate::error::{RunError, TaskError};
use crate::monte_carlo::{estimate_pi, sampling_task};
use crate::observer::ProgressObserver;
use crate::progress::ProgressSnapshot;
use crate::runlog::RunRecord;

/// Result of a run that finished with every task accounted for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOutcome {
    pub inside: u64,
    pub total_samples: u64,
    pub pi_estimate: f64,
    pub runtime: Duration,
}

impl RunOutcome {
    pub fn new(inside: u64, total_samples: u64, runtime: Duration) -> Self {
        Self {
            inside,
            total_samples,
            pi_estimate: estimate_pi(inside, total_samples),
            runtime,
        }
    }

    /// The row handed to the run log, stamped with the current local time.
    pub fn record(&self) -> RunRecord {
        RunRecord::now(self.runtime, self.pi_estimate)
    }

    pub fn print_summary(&self, heading: &str) {
        println!("{heading}");
        println!("Total samples: {}", self.total_samples);
        println!("Points inside circle: {}", self.inside);
        println!("Pi estimate: {:.6}", self.pi_estimate);
        println!("Error: {:.6}", std::f64::consts::PI - self.pi_estimate);
        println!("Runtime: {:.3}s", self.runtime.as_secs_f64());
    }
}

/// Runs the sampler on one OS thread per task and polls the aggregator until done.
pub fn run(config: &RunConfig, observer: impl ProgressObserver) -> Result<RunOutcome, RunError> {
    run_with(config, observer, |spec, progress| sampling_task(spec, &progress))
}

/// Like [`run`] with a custom task body.
pub fn run_with<F>(
    config: &RunConfig,
    mut observer: impl ProgressObserver,
    body: F,
) -> Result<RunOutcome, RunError>
where
    F: Fn(TaskSpec, ProgressHandle) -> Result<u64, TaskError> + Send + Sync + 'static,
{
    let span = tracing::info_span!(
        "run",
        tasks = config.num_tasks(),
        samples_per_task = config.samples_per_task()
    );
    let _entered = span.enter();

    let started = Instant::now();
    let progress = ProgressHandle::spawn_for(config)?;
    let handles = dispatch_with(config, &progress, body)?;

    let mut last = poll_until_done(config, &progress, &handles, &mut observer)?;
    let inside = collect(handles)?;

    // Every result is in, so every task's final report is already queued ahead of this read.
    if !last.is_complete() {
        last = poll_once(config, &progress, &mut observer)?;
    }
    if !last.is_complete() {
        return Err(RunError::Incomplete {
            completed: last.completed,
            total: last.total,
        });
    }

    let outcome = RunOutcome::new(inside, config.total_samples(), started.elapsed());
    tracing::info!(
        inside,
        pi_estimate = outcome.pi_estimate,
        runtime_secs = outcome.runtime.as_secs_f64(),
        "run finished"
    );
    Ok(outcome)
}

/// Reports progress every poll interval. Stops once the aggregate reaches the budget, or once
/// every worker has exited (a failed task never reports its full budget).
fn poll_until_done(
    config: &RunConfig,
    progress: &ProgressHandle,
    handles: &[TaskHandle],
    observer: &mut impl ProgressObserver,
) -> Result<ProgressSnapshot, RunError> {
    loop {
        let snapshot = poll_once(config, progress, &mut *observer)?;
        if snapshot.is_complete() {
            return Ok(snapshot);
        }
        if handles.iter().all(TaskHandle::is_finished) {
            tracing::debug!(?snapshot, "all workers exited before the budget was reported");
            return Ok(snapshot);
        }
        thread::sleep(config.poll_interval());
    }
}

/// Takes the snapshot before draining points, so the complete snapshot's poll
/// also delivers every point sent ahead of the final reports.
fn poll_once(
    config: &RunConfig,
    progress: &ProgressHandle,
    observer: &mut impl ProgressObserver,
) -> Result<ProgressSnapshot, RunError> {
    let snapshot = progress.snapshot()?;
    if config.point_batch_size().is_some() {
        let points = progress.take_points()?;
        if !points.is_empty() {
            observer.on_points(&points);
        }
    }
    observer.on_progress(snapshot);
    Ok(snapshot)
}

/// Joins in task order and sums. The first failure aborts the run.
fn collect(handles: Vec<TaskHandle>) -> Result<u64, RunError> {
    let mut inside = 0u64;
    for handle in handles {
        let task_id = handle.task_id();
        inside += handle.join().inspect_err(|err| {
            tracing::error!(task_id = %task_id, error = %err, "sampling task failed, aborting run");
        })?;
    }
    Ok(inside)
}
