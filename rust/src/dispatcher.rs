use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::actor::ProgressHandle;
use crate::config::{RunConfig, TaskId, TaskSpec};
use crate::error::{RunError, TaskError};
use crate::monte_carlo::sampling_task;

/// Join handle of one dispatched task, yielding its inside-circle count.
#[derive(Debug)]
pub struct TaskHandle {
    task_id: TaskId,
    handle: JoinHandle<Result<u64, TaskError>>,
}

impl TaskHandle {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the task ends. A panic is reported as [`RunError::TaskPanicked`].
    pub fn join(self) -> Result<u64, RunError> {
        match self.handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(RunError::TaskPanicked {
                task_id: self.task_id,
            }),
        }
    }
}

/// Launches one thread per task running the Monte Carlo sampler.
pub fn dispatch(config: &RunConfig, progress: &ProgressHandle) -> Result<Vec<TaskHandle>, RunError> {
    dispatch_with(config, progress, |spec, progress| sampling_task(spec, &progress))
}

/// Launches one thread per task running `body`, each bound to its own clone of `progress`.
///
/// Threads start immediately and run independently; no ordering between them is imposed.
pub fn dispatch_with<F>(
    config: &RunConfig,
    progress: &ProgressHandle,
    body: F,
) -> Result<Vec<TaskHandle>, RunError>
where
    F: Fn(TaskSpec, ProgressHandle) -> Result<u64, TaskError> + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let mut handles = Vec::with_capacity(config.num_tasks());

    for spec in config.task_specs() {
        let body = Arc::clone(&body);
        let progress = progress.clone();
        let handle = thread::Builder::new()
            .name(format!("sampler-{}", spec.task_id))
            .spawn(move || body(spec, progress))
            .map_err(|source| RunError::Spawn {
                what: format!("sampling task {}", spec.task_id),
                source,
            })?;
        handles.push(TaskHandle {
            task_id: spec.task_id,
            handle,
        });
    }

    tracing::debug!(tasks = handles.len(), "dispatched sampling tasks");
    Ok(handles)
}
