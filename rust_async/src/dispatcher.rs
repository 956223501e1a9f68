use std::sync::Arc;

use pi_progress::{sampling_task, RunConfig, RunError, TaskError, TaskId, TaskSpec};
use tokio::task::{self, JoinHandle};

use crate::actor::ProgressHandle;

#[derive(Debug)]
pub struct TaskHandle {
    task_id: TaskId,
    handle: JoinHandle<Result<u64, TaskError>>,
}

impl TaskHandle {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub async fn join(self) -> Result<u64, RunError> {
        match self.handle.await {
            Ok(result) => Ok(result?),
            Err(err) if err.is_panic() => Err(RunError::TaskPanicked {
                task_id: self.task_id,
            }),
            Err(_) => Err(RunError::TaskCancelled {
                task_id: self.task_id,
            }),
        }
    }
}

/// Runs the Monte Carlo sampler for every task on the blocking pool.
pub fn dispatch(config: &RunConfig, progress: &ProgressHandle) -> Vec<TaskHandle> {
    dispatch_with(config, progress, |spec, progress| sampling_task(spec, &progress))
}

/// Spawns `body` once per task on the blocking pool, since sampling is CPU-bound
/// and would otherwise stall the runtime's worker threads.
pub fn dispatch_with<F>(config: &RunConfig, progress: &ProgressHandle, body: F) -> Vec<TaskHandle>
where
    F: Fn(TaskSpec, ProgressHandle) -> Result<u64, TaskError> + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let handles: Vec<_> = config
        .task_specs()
        .map(|spec| {
            let body = Arc::clone(&body);
            let progress = progress.clone();
            TaskHandle {
                task_id: spec.task_id,
                handle: task::spawn_blocking(move || body(spec, progress)),
            }
        })
        .collect();

    tracing::debug!(tasks = handles.len(), "dispatched sampling tasks");
    handles
}
