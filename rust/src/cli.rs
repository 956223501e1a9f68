use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::config::{RunConfig, DEFAULT_CHECKPOINT_INTERVAL};
use crate::error::ConfigError;
use crate::runlog::{RunLog, DEFAULT_RUN_LOG};

/// Run parameters shared by the threaded and tokio binaries.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Number of sampling tasks.
    #[arg(long, env = "PI_TASKS", default_value_t = 10)]
    pub tasks: usize,

    #[arg(long, env = "PI_SAMPLES_PER_TASK", default_value_t = 10_000_000)]
    pub samples_per_task: u64,

    /// Samples between two progress reports of one task.
    #[arg(long, env = "PI_CHECKPOINT_INTERVAL", default_value_t = DEFAULT_CHECKPOINT_INTERVAL)]
    pub checkpoint_interval: u64,

    #[arg(long, env = "PI_POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Base seed for reproducible runs. Seeds from OS entropy when unset.
    #[arg(long, env = "PI_SEED")]
    pub seed: Option<u64>,

    /// Run once per task count 10^1..=10^N instead of once with `--tasks`.
    #[arg(long, env = "PI_SWEEP", value_parser = clap::value_parser!(u32).range(1..=4))]
    pub sweep: Option<u32>,

    #[arg(long, env = "PI_RUN_LOG", default_value = DEFAULT_RUN_LOG)]
    pub run_log: PathBuf,

    #[arg(long, env = "PI_NO_RUN_LOG")]
    pub no_run_log: bool,
}

impl RunArgs {
    /// Task counts to run, in order.
    pub fn task_counts(&self) -> Vec<usize> {
        match self.sweep {
            Some(max) => (1..=max).map(|exp| 10usize.pow(exp)).collect(),
            None => vec![self.tasks],
        }
    }

    /// One validated config per planned run.
    pub fn configs(&self, point_batch_size: Option<usize>) -> Result<Vec<RunConfig>, ConfigError> {
        self.task_counts()
            .into_iter()
            .map(|num_tasks| {
                RunConfig::builder(num_tasks, self.samples_per_task)
                    .checkpoint_interval(self.checkpoint_interval)
                    .poll_interval(Duration::from_millis(self.poll_interval_ms))
                    .seed(self.seed)
                    .point_batch_size(point_batch_size)
                    .build()
            })
            .collect()
    }

    pub fn run_log(&self) -> Option<RunLog> {
        (!self.no_run_log).then(|| RunLog::new(self.run_log.clone()))
    }
}
