//! Per-task progress bookkeeping shared by both aggregator actors.
//!
//! A [`ProgressRecord`] is owned by exactly one actor; every mutation and every
//! snapshot goes through that owner, so reads never observe a half-applied report.

use std::collections::HashMap;

use crate::config::{RunConfig, TaskId};

/// Consistent view of the aggregate at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub completed: u64,
    pub total: u64,
    pub tasks_reported: usize,
}

impl ProgressSnapshot {
    /// Fraction of the budget reported complete, in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Whole percent, rounded down.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (u128::from(self.completed) * 100 / u128::from(self.total)) as u32
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Why a report was dropped instead of applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    UnknownTask { num_tasks: usize },
    OverTaskBudget { samples_per_task: u64 },
    Regressed { previous: u64 },
    OverBudget { reported: u64 },
}

/// Per-task limits of a run, known when the record is built from a [`RunConfig`].
#[derive(Debug, Clone, Copy)]
struct TaskBounds {
    num_tasks: usize,
    samples_per_task: u64,
}

#[derive(Debug)]
pub struct ProgressRecord {
    total: u64,
    bounds: Option<TaskBounds>,
    per_task: HashMap<TaskId, u64>,
    completed: u64,
}

impl ProgressRecord {
    /// A record that only knows the run's total budget.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            bounds: None,
            per_task: HashMap::new(),
            completed: 0,
        }
    }

    /// A record that also rejects ids outside `0..num_tasks` and counts above
    /// `samples_per_task`, so the aggregate reads complete only once every task
    /// has reported its whole workload.
    pub fn for_run(config: &RunConfig) -> Self {
        Self {
            bounds: Some(TaskBounds {
                num_tasks: config.num_tasks(),
                samples_per_task: config.samples_per_task(),
            }),
            ..Self::new(config.total_samples())
        }
    }

    /// Overwrites the task's count with `completed`.
    ///
    /// Reports from unknown tasks, above the task's own budget, lower than the
    /// recorded value, or that would push the aggregate past the total budget
    /// are rejected and leave the record untouched.
    pub fn apply(&mut self, task_id: TaskId, completed: u64) -> Result<(), Rejected> {
        if let Some(bounds) = self.bounds {
            if task_id.index() >= bounds.num_tasks {
                return Err(Rejected::UnknownTask {
                    num_tasks: bounds.num_tasks,
                });
            }
            if completed > bounds.samples_per_task {
                return Err(Rejected::OverTaskBudget {
                    samples_per_task: bounds.samples_per_task,
                });
            }
        }
        let previous = self.per_task.get(&task_id).copied().unwrap_or(0);
        if completed < previous {
            return Err(Rejected::Regressed { previous });
        }
        let next = (completed - previous)
            .checked_add(self.completed)
            .filter(|next| *next <= self.total)
            .ok_or(Rejected::OverBudget {
                reported: completed,
            })?;
        self.per_task.insert(task_id, completed);
        self.completed = next;
        Ok(())
    }

    /// Like [`ProgressRecord::apply`], logging instead of returning the rejection.
    pub fn record(&mut self, task_id: TaskId, completed: u64) {
        match self.apply(task_id, completed) {
            Ok(()) => {
                tracing::debug!(task_id = %task_id, completed, aggregate = self.completed, "progress")
            }
            Err(reason) => {
                tracing::warn!(task_id = %task_id, completed, ?reason, "progress report rejected")
            }
        }
    }

    pub fn completed_for(&self, task_id: TaskId) -> Option<u64> {
        self.per_task.get(&task_id).copied()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            completed: self.completed,
            total: self.total,
            tasks_reported: self.per_task.len(),
        }
    }
}
