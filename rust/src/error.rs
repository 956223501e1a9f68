use std::io;

use thiserror::Error;

use crate::config::TaskId;

/// Rejected run parameters. Raised before any aggregator or task exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("task count must be at least 1")]
    ZeroTasks,
    #[error("samples per task must be at least 1")]
    ZeroSamplesPerTask,
    #[error("checkpoint interval must be at least 1 sample")]
    ZeroCheckpointInterval,
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
    #[error("point batch size must be at least 1")]
    ZeroPointBatch,
    #[error("total sample budget overflows: {num_tasks} tasks x {samples_per_task} samples")]
    BudgetOverflow {
        num_tasks: usize,
        samples_per_task: u64,
    },
}

/// Fatal error local to one sampling task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("task {task_id}: invalid sample count {num_samples}")]
    InvalidSampleCount { task_id: TaskId, num_samples: u64 },
    #[error("task {task_id} failed: {reason}")]
    Failed { task_id: TaskId, reason: String },
}

impl TaskError {
    pub fn task_id(&self) -> TaskId {
        match self {
            TaskError::InvalidSampleCount { task_id, .. } | TaskError::Failed { task_id, .. } => {
                *task_id
            }
        }
    }
}

/// Anything that aborts a whole run. A run never yields an estimate once one of these is raised.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("task {task_id} panicked")]
    TaskPanicked { task_id: TaskId },
    #[error("task {task_id} was cancelled before finishing")]
    TaskCancelled { task_id: TaskId },
    #[error("failed to spawn {what}")]
    Spawn {
        what: String,
        #[source]
        source: io::Error,
    },
    #[error("progress aggregator is no longer running")]
    AggregatorClosed,
    #[error("all tasks returned but only {completed} of {total} samples were reported")]
    Incomplete { completed: u64, total: u64 },
}
