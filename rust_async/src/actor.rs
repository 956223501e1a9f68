//! Progress aggregator as a tokio task.
//!
//! Reports and point batches go through an unbounded channel, so samplers on the
//! blocking pool hand them off synchronously and never wait. Queries carry a
//! oneshot for the reply and are answered in channel order, after every message
//! sent before them.

use std::mem;

use pi_progress::{
    ProgressRecord, ProgressReporter, ProgressSnapshot, RunConfig, RunError, SamplePoint, TaskId,
};
use tokio::sync::{mpsc, oneshot};

enum Message {
    Report { task_id: TaskId, completed: u64 },
    Points(Vec<SamplePoint>),
    Snapshot(oneshot::Sender<ProgressSnapshot>),
    TakePoints(oneshot::Sender<Vec<SamplePoint>>),
}

#[derive(Debug, Clone)]
pub struct ProgressHandle {
    tx: mpsc::UnboundedSender<Message>,
}

impl ProgressHandle {
    /// Spawns the actor on the current runtime. It stops once every handle is dropped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(total_num_samples: u64) -> Self {
        Self::spawn_record(ProgressRecord::new(total_num_samples))
    }

    /// Like [`ProgressHandle::spawn`], also enforcing the run's task ids and per-task budget.
    pub fn spawn_for(config: &RunConfig) -> Self {
        Self::spawn_record(ProgressRecord::for_run(config))
    }

    fn spawn_record(record: ProgressRecord) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_actor(record, rx));
        Self { tx }
    }

    pub fn report_progress(&self, task_id: TaskId, completed: u64) {
        if self.tx.send(Message::Report { task_id, completed }).is_err() {
            tracing::debug!(task_id = %task_id, "progress actor gone, report dropped");
        }
    }

    pub fn add_points(&self, points: Vec<SamplePoint>) {
        if self.tx.send(Message::Points(points)).is_err() {
            tracing::debug!("progress actor gone, points dropped");
        }
    }

    pub async fn snapshot(&self) -> Result<ProgressSnapshot, RunError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::Snapshot(reply))
            .map_err(|_| RunError::AggregatorClosed)?;
        rx.await.map_err(|_| RunError::AggregatorClosed)
    }

    pub async fn get_progress(&self) -> Result<f64, RunError> {
        Ok(self.snapshot().await?.ratio())
    }

    /// Drains the points buffered since the previous call.
    pub async fn take_points(&self) -> Result<Vec<SamplePoint>, RunError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Message::TakePoints(reply))
            .map_err(|_| RunError::AggregatorClosed)?;
        rx.await.map_err(|_| RunError::AggregatorClosed)
    }
}

impl ProgressReporter for ProgressHandle {
    fn report_progress(&self, task_id: TaskId, completed: u64) {
        ProgressHandle::report_progress(self, task_id, completed);
    }

    fn forward_points(&self, _task_id: TaskId, batch: Vec<SamplePoint>) {
        self.add_points(batch);
    }
}

async fn run_actor(mut record: ProgressRecord, mut rx: mpsc::UnboundedReceiver<Message>) {
    let mut points = Vec::new();
    while let Some(message) = rx.recv().await {
        match message {
            Message::Report { task_id, completed } => record.record(task_id, completed),
            Message::Points(batch) => points.extend(batch),
            Message::Snapshot(reply) => {
                let _ = reply.send(record.snapshot());
            }
            Message::TakePoints(reply) => {
                let _ = reply.send(mem::take(&mut points));
            }
        }
    }
    tracing::debug!(final_snapshot = ?record.snapshot(), "progress actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interleaved_reports_overwrite_per_task() {
        let progress = ProgressHandle::spawn(1_500_000);
        progress.report_progress(TaskId(0), 500_000);
        progress.report_progress(TaskId(1), 300_000);
        progress.report_progress(TaskId(0), 1_000_000);

        let snapshot = progress.snapshot().await.unwrap();
        assert_eq!(snapshot.completed, 1_300_000);
        assert!((progress.get_progress().await.unwrap() - 0.8667).abs() < 1e-4);
    }

    #[tokio::test]
    async fn re_reporting_leaves_aggregate_unchanged() {
        let progress = ProgressHandle::spawn(100);
        progress.report_progress(TaskId(0), 25);
        let before = progress.snapshot().await.unwrap();
        progress.report_progress(TaskId(0), 25);
        assert_eq!(progress.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn out_of_range_reports_keep_the_actor_alive() {
        let config = RunConfig::builder(2, 1_000).build().unwrap();
        let progress = ProgressHandle::spawn_for(&config);
        progress.report_progress(TaskId(0), u64::MAX);
        progress.report_progress(TaskId(0), 2_000);
        progress.report_progress(TaskId(7), 500);
        assert_eq!(progress.snapshot().await.unwrap().completed, 0);

        progress.report_progress(TaskId(0), 1_000);
        assert!(!progress.snapshot().await.unwrap().is_complete());
        progress.report_progress(TaskId(1), 1_000);
        assert!(progress.snapshot().await.unwrap().is_complete());
    }

    #[tokio::test]
    async fn points_are_drained_once() {
        let progress = ProgressHandle::spawn(10);
        let point = SamplePoint {
            x: 0.5,
            y: -0.5,
            inside: true,
        };
        progress.add_points(vec![point; 3]);
        progress.add_points(vec![point; 2]);

        assert_eq!(progress.take_points().await.unwrap().len(), 5);
        assert!(progress.take_points().await.unwrap().is_empty());
    }

    #[test]
    fn sends_after_shutdown_are_dropped() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let progress = runtime.block_on(async { ProgressHandle::spawn(10) });
        drop(runtime);

        progress.report_progress(TaskId(0), 5);
        progress.add_points(vec![SamplePoint {
            x: 0.0,
            y: 0.0,
            inside: true,
        }]);
        assert!(matches!(
            futures::executor::block_on(progress.snapshot()),
            Err(RunError::AggregatorClosed)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn blocking_writers_are_not_lost() {
        const TASKS: usize = 100;
        const STEPS: u64 = 1_000;

        let progress = ProgressHandle::spawn(TASKS as u64 * STEPS);
        let writers: Vec<_> = (0..TASKS)
            .map(|i| {
                let progress = progress.clone();
                tokio::task::spawn_blocking(move || {
                    for step in 1..=STEPS {
                        progress.report_progress(TaskId(i), step);
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let snapshot = progress.snapshot().await.unwrap();
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.tasks_reported, TASKS);
    }
}
