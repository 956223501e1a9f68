use std::time::Instant;

use futures::future::try_join_all;
use pi_progress::{
    sampling_task, ProgressObserver, ProgressSnapshot, RunConfig, RunError, RunOutcome,
    TaskError, TaskSpec,
};
use tokio::time::{self, MissedTickBehavior};

use crate::actor::ProgressHandle;
use crate::dispatcher::{dispatch_with, TaskHandle};

pub async fn run(config: &RunConfig, observer: impl ProgressObserver) -> Result<RunOutcome, RunError> {
    run_with(config, observer, |spec, progress| sampling_task(spec, &progress)).await
}

/// Dispatches `body` per task, then polls progress on `config.poll_interval()` while
/// collecting results.
///
/// Polling and result collection race each other: the first task error aborts the
/// run immediately, and once results are in the loop still waits for the aggregate
/// to read complete before returning.
pub async fn run_with<F>(
    config: &RunConfig,
    mut observer: impl ProgressObserver,
    body: F,
) -> Result<RunOutcome, RunError>
where
    F: Fn(TaskSpec, ProgressHandle) -> Result<u64, TaskError> + Send + Sync + 'static,
{
    tracing::info!(
        tasks = config.num_tasks(),
        samples_per_task = config.samples_per_task(),
        "starting run"
    );
    let started = Instant::now();
    let progress = ProgressHandle::spawn_for(config);
    let handles = dispatch_with(config, &progress, body);

    let collect = collect(handles);
    tokio::pin!(collect);

    let mut ticker = time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut inside = None;
    loop {
        tokio::select! {
            result = &mut collect, if inside.is_none() => {
                inside = Some(result?);
            }
            _ = ticker.tick() => {
                let snapshot = poll_once(config, &progress, &mut observer).await?;
                if snapshot.is_complete() {
                    break;
                }
                // Each task's last report precedes its result, so nothing more can arrive.
                if inside.is_some() {
                    return Err(RunError::Incomplete {
                        completed: snapshot.completed,
                        total: snapshot.total,
                    });
                }
            }
        }
    }

    let inside = match inside {
        Some(inside) => inside,
        None => collect.await?,
    };
    let outcome = RunOutcome::new(inside, config.total_samples(), started.elapsed());
    tracing::info!(
        inside,
        pi_estimate = outcome.pi_estimate,
        runtime_secs = outcome.runtime.as_secs_f64(),
        "run finished"
    );
    Ok(outcome)
}

async fn poll_once(
    config: &RunConfig,
    progress: &ProgressHandle,
    observer: &mut impl ProgressObserver,
) -> Result<ProgressSnapshot, RunError> {
    let snapshot = progress.snapshot().await?;
    if config.point_batch_size().is_some() {
        let points = progress.take_points().await?;
        if !points.is_empty() {
            observer.on_points(&points);
        }
    }
    observer.on_progress(snapshot);
    Ok(snapshot)
}

async fn collect(handles: Vec<TaskHandle>) -> Result<u64, RunError> {
    let counts = try_join_all(handles.into_iter().map(TaskHandle::join))
        .await
        .inspect_err(|err| tracing::error!(error = %err, "sampling task failed, aborting run"))?;
    Ok(counts.into_iter().sum())
}
