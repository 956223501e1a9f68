use crate::monte_carlo::SamplePoint;
use crate::progress::ProgressSnapshot;

/// Caller-side sink for what an orchestrator sees while polling.
pub trait ProgressObserver {
    fn on_progress(&mut self, snapshot: ProgressSnapshot);

    fn on_points(&mut self, _points: &[SamplePoint]) {}
}

impl<O: ProgressObserver + ?Sized> ProgressObserver for &mut O {
    fn on_progress(&mut self, snapshot: ProgressSnapshot) {
        (**self).on_progress(snapshot);
    }

    fn on_points(&mut self, points: &[SamplePoint]) {
        (**self).on_points(points);
    }
}

impl<O: ProgressObserver> ProgressObserver for Option<O> {
    fn on_progress(&mut self, snapshot: ProgressSnapshot) {
        if let Some(observer) = self {
            observer.on_progress(snapshot);
        }
    }

    fn on_points(&mut self, points: &[SamplePoint]) {
        if let Some(observer) = self {
            observer.on_points(points);
        }
    }
}

impl<A: ProgressObserver, B: ProgressObserver> ProgressObserver for (A, B) {
    fn on_progress(&mut self, snapshot: ProgressSnapshot) {
        self.0.on_progress(snapshot);
        self.1.on_progress(snapshot);
    }

    fn on_points(&mut self, points: &[SamplePoint]) {
        self.0.on_points(points);
        self.1.on_points(points);
    }
}

/// Prints `Progress: P%` lines to stdout.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&mut self, snapshot: ProgressSnapshot) {
        println!("Progress: {}%", snapshot.percent());
    }
}

/// Keeps every snapshot it is handed.
#[derive(Debug, Default)]
pub struct ProgressHistory {
    pub snapshots: Vec<ProgressSnapshot>,
    pub points_seen: usize,
}

impl ProgressHistory {
    pub fn ratios(&self) -> Vec<f64> {
        self.snapshots.iter().map(ProgressSnapshot::ratio).collect()
    }

    pub fn is_monotonic(&self) -> bool {
        self.snapshots
            .windows(2)
            .all(|pair| pair[0].completed <= pair[1].completed)
    }
}

impl ProgressObserver for ProgressHistory {
    fn on_progress(&mut self, snapshot: ProgressSnapshot) {
        self.snapshots.push(snapshot);
    }

    fn on_points(&mut self, points: &[SamplePoint]) {
        self.points_seen += points.len();
    }
}
