use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1_000_000;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_POINT_BATCH_SIZE: usize = 100;

/// Seed stride between neighbouring tasks when a base seed is given.
const SEED_STRIDE: u64 = 67_890;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parameters of one run. Only constructible through [`RunConfigBuilder::build`],
/// so every value handed to the dispatcher has already been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    num_tasks: usize,
    samples_per_task: u64,
    total_samples: u64,
    checkpoint_interval: u64,
    poll_interval: Duration,
    seed: Option<u64>,
    point_batch_size: Option<usize>,
}

impl RunConfig {
    pub fn builder(num_tasks: usize, samples_per_task: u64) -> RunConfigBuilder {
        RunConfigBuilder {
            num_tasks,
            samples_per_task,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            seed: None,
            point_batch_size: None,
        }
    }

    pub fn num_tasks(&self) -> usize {
        self.num_tasks
    }

    pub fn samples_per_task(&self) -> u64 {
        self.samples_per_task
    }

    /// `num_tasks * samples_per_task`, checked at build time.
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    pub fn checkpoint_interval(&self) -> u64 {
        self.checkpoint_interval
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn point_batch_size(&self) -> Option<usize> {
        self.point_batch_size
    }

    /// The workload handed to task `task_id`.
    pub fn task_spec(&self, task_id: TaskId) -> TaskSpec {
        TaskSpec {
            task_id,
            num_samples: self.samples_per_task,
            checkpoint_interval: self.checkpoint_interval,
            seed: self
                .seed
                .map(|base| base.wrapping_add((task_id.0 as u64).wrapping_mul(SEED_STRIDE))),
            point_batch_size: self.point_batch_size,
        }
    }

    pub fn task_specs(&self) -> impl Iterator<Item = TaskSpec> + '_ {
        (0..self.num_tasks).map(|i| self.task_spec(TaskId(i)))
    }
}

#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    num_tasks: usize,
    samples_per_task: u64,
    checkpoint_interval: u64,
    poll_interval: Duration,
    seed: Option<u64>,
    point_batch_size: Option<usize>,
}

impl RunConfigBuilder {
    pub fn checkpoint_interval(mut self, samples: u64) -> Self {
        self.checkpoint_interval = samples;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Enables the sample point stream, forwarding points in batches of `size`.
    pub fn point_batch_size(mut self, size: Option<usize>) -> Self {
        self.point_batch_size = size;
        self
    }

    pub fn build(self) -> Result<RunConfig, ConfigError> {
        if self.num_tasks == 0 {
            return Err(ConfigError::ZeroTasks);
        }
        if self.samples_per_task == 0 {
            return Err(ConfigError::ZeroSamplesPerTask);
        }
        if self.checkpoint_interval == 0 {
            return Err(ConfigError::ZeroCheckpointInterval);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.point_batch_size == Some(0) {
            return Err(ConfigError::ZeroPointBatch);
        }
        let total_samples = u64::try_from(self.num_tasks)
            .ok()
            .and_then(|n| n.checked_mul(self.samples_per_task))
            .ok_or(ConfigError::BudgetOverflow {
                num_tasks: self.num_tasks,
                samples_per_task: self.samples_per_task,
            })?;

        Ok(RunConfig {
            num_tasks: self.num_tasks,
            samples_per_task: self.samples_per_task,
            total_samples,
            checkpoint_interval: self.checkpoint_interval,
            poll_interval: self.poll_interval,
            seed: self.seed,
            point_batch_size: self.point_batch_size,
        })
    }
}

/// Immutable description of one task's workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub task_id: TaskId,
    pub num_samples: u64,
    pub checkpoint_interval: u64,
    pub seed: Option<u64>,
    pub point_batch_size: Option<usize>,
}
