//! Progress aggregator running on its own thread.
//!
//! Workers hold a cloned [`ProgressHandle`] and push reports into an unbounded
//! channel, so a report never waits on the aggregator. The actor thread is the
//! only owner of the [`ProgressRecord`] and the buffered sample points; it
//! applies messages one at a time in channel order and answers queries between
//! them.

use std::mem;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::config::{RunConfig, TaskId};
use crate::error::RunError;
use crate::monte_carlo::{ProgressReporter, SamplePoint};
use crate::progress::{ProgressRecord, ProgressSnapshot};

enum Message {
    Report { task_id: TaskId, completed: u64 },
    Points(Vec<SamplePoint>),
    Snapshot(Sender<ProgressSnapshot>),
    TakePoints(Sender<Vec<SamplePoint>>),
}

#[derive(Debug, Clone)]
pub struct ProgressHandle {
    tx: Sender<Message>,
}

impl ProgressHandle {
    /// Starts the actor thread. It exits once every handle has been dropped.
    pub fn spawn(total_num_samples: u64) -> Result<Self, RunError> {
        Self::spawn_record(ProgressRecord::new(total_num_samples))
    }

    /// Starts an actor that also enforces the run's task ids and per-task budget.
    pub fn spawn_for(config: &RunConfig) -> Result<Self, RunError> {
        Self::spawn_record(ProgressRecord::for_run(config))
    }

    fn spawn_record(record: ProgressRecord) -> Result<Self, RunError> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("progress-actor".into())
            .spawn(move || run_actor(record, rx))
            .map_err(|source| RunError::Spawn {
                what: "progress actor".into(),
                source,
            })?;
        Ok(Self { tx })
    }

    /// Overwrites `task_id`'s completed count. Never blocks.
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

    /// Consistent snapshot taken after every report sent before this call.
    pub fn snapshot(&self) -> Result<ProgressSnapshot, RunError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Message::Snapshot(reply_tx))
            .map_err(|_| RunError::AggregatorClosed)?;
        reply_rx.recv().map_err(|_| RunError::AggregatorClosed)
    }

    /// Drains the points buffered since the previous call.
    pub fn take_points(&self) -> Result<Vec<SamplePoint>, RunError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Message::TakePoints(reply_tx))
            .map_err(|_| RunError::AggregatorClosed)?;
        reply_rx.recv().map_err(|_| RunError::AggregatorClosed)
    }

    /// Sum of recorded counts over the total budget.
    pub fn get_progress(&self) -> Result<f64, RunError> {
        Ok(self.snapshot()?.ratio())
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

fn run_actor(mut record: ProgressRecord, rx: Receiver<Message>) {
    let mut points = Vec::new();
    for message in rx {
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
