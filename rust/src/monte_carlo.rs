use std::mem;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{TaskId, TaskSpec};
use crate::error::TaskError;

/// One drawn sample, as forwarded on the point stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    pub inside: bool,
}

/// Receiving end of a sampler's reports. Implementations must not block the caller.
pub trait ProgressReporter {
    /// Fire-and-forget: `completed` is the task's cumulative sample count.
    fn report_progress(&self, task_id: TaskId, completed: u64);

    /// Forwards a batch of drawn points. Only called when the task was
    /// configured with a point batch size.
    fn forward_points(&self, _task_id: TaskId, _batch: Vec<SamplePoint>) {}
}

/// Counts how many of `spec.num_samples` uniform points in `[-1, 1]²` fall
/// within the unit circle.
///
/// A checkpoint report goes out every `spec.checkpoint_interval` samples and
/// one final report with the full `num_samples` always goes out last, so even
/// a task smaller than one interval reports exactly once.
pub fn sampling_task<R: ProgressReporter>(spec: TaskSpec, reporter: &R) -> Result<u64, TaskError> {
    if spec.num_samples == 0 {
        return Err(TaskError::InvalidSampleCount {
            task_id: spec.task_id,
            num_samples: spec.num_samples,
        });
    }

    let mut rng = match spec.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let range = Uniform::new_inclusive(-1.0f64, 1.0);
    let interval = spec.checkpoint_interval.max(1);
    let mut batch = spec.point_batch_size.map(Vec::with_capacity);

    let mut inside = 0u64;
    for i in 0..spec.num_samples {
        let x = range.sample(&mut rng);
        let y = range.sample(&mut rng);
        let hit = x.hypot(y) <= 1.0;
        if hit {
            inside += 1;
        }

        if let (Some(points), Some(size)) = (batch.as_mut(), spec.point_batch_size) {
            points.push(SamplePoint { x, y, inside: hit });
            if points.len() == size {
                reporter.forward_points(spec.task_id, mem::replace(points, Vec::with_capacity(size)));
            }
        }

        let done = i + 1;
        if done % interval == 0 && done < spec.num_samples {
            reporter.report_progress(spec.task_id, done);
        }
    }

    if let Some(points) = batch.filter(|points| !points.is_empty()) {
        reporter.forward_points(spec.task_id, points);
    }
    reporter.report_progress(spec.task_id, spec.num_samples);

    tracing::debug!(task_id = %spec.task_id, samples = spec.num_samples, inside, "sampling task finished");
    Ok(inside)
}

/// `4 * inside / total`. Zero when nothing was sampled.
pub fn estimate_pi(inside: u64, total_samples: u64) -> f64 {
    if total_samples == 0 {
        return 0.0;
    }
    4.0 * inside as f64 / total_samples as f64
}
