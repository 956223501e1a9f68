use std::time::Duration;

use pi_progress::{
    orchestrator, sampling_task, ConfigError, ProgressHistory, RunConfig, RunError, TaskError,
    TaskId,
};

fn fast_config(num_tasks: usize, samples_per_task: u64) -> RunConfig {
    RunConfig::builder(num_tasks, samples_per_task)
        .checkpoint_interval(10_000)
        .poll_interval(Duration::from_millis(5))
        .seed(Some(42))
        .build()
        .unwrap()
}

#[test]
fn single_task_reaches_exactly_one_and_estimates_pi() {
    let config = RunConfig::builder(1, 1_000_000)
        .poll_interval(Duration::from_millis(10))
        .seed(Some(2024))
        .build()
        .unwrap();
    let mut history = ProgressHistory::default();

    let outcome = orchestrator::run(&config, &mut history).unwrap();

    let last = history.snapshots.last().copied().unwrap();
    assert!(last.is_complete());
    assert_eq!(last.ratio(), 1.0);
    assert_eq!(outcome.total_samples, 1_000_000);
    assert_eq!(outcome.pi_estimate, 4.0 * outcome.inside as f64 / 1_000_000.0);
    assert!(
        (outcome.pi_estimate - std::f64::consts::PI).abs() < 0.05,
        "estimate {} too far from pi",
        outcome.pi_estimate
    );
}

#[test]
fn progress_is_monotonic_and_bounded() {
    let config = fast_config(8, 200_000);
    let mut history = ProgressHistory::default();

    orchestrator::run(&config, &mut history).unwrap();

    assert!(history.is_monotonic(), "ratios went backwards: {:?}", history.ratios());
    assert!(history.ratios().iter().all(|r| (0.0..=1.0).contains(r)));
    let complete: Vec<_> = history.snapshots.iter().filter(|s| s.is_complete()).collect();
    assert_eq!(complete.len(), 1, "loop must stop at the first complete read");
    assert_eq!(complete[0].completed, 8 * 200_000);
}

#[test]
fn many_tasks_reporting_often_sum_to_budget() {
    let config = RunConfig::builder(120, 20_000)
        .checkpoint_interval(100)
        .poll_interval(Duration::from_millis(1))
        .build()
        .unwrap();
    let mut history = ProgressHistory::default();

    let outcome = orchestrator::run(&config, &mut history).unwrap();

    let last = history.snapshots.last().copied().unwrap();
    assert_eq!(last.completed, 120 * 20_000);
    assert_eq!(last.tasks_reported, 120);
    assert!(history.is_monotonic());
    assert!(outcome.inside <= outcome.total_samples);
}

#[test]
fn same_seed_gives_same_estimate() {
    let config = fast_config(4, 50_000);
    let a = orchestrator::run(&config, ProgressHistory::default()).unwrap();
    let b = orchestrator::run(&config, ProgressHistory::default()).unwrap();
    assert_eq!(a.inside, b.inside);
}

#[test]
fn failing_task_aborts_the_run() {
    let config = fast_config(4, 30_000);
    let result = orchestrator::run_with(&config, ProgressHistory::default(), |spec, progress| {
        if spec.task_id == TaskId(2) {
            progress.report_progress(spec.task_id, spec.num_samples / 2);
            return Err(TaskError::Failed {
                task_id: spec.task_id,
                reason: "sensor offline".into(),
            });
        }
        sampling_task(spec, &progress)
    });

    match result {
        Err(RunError::Task(TaskError::Failed { task_id, .. })) => assert_eq!(task_id, TaskId(2)),
        other => panic!("expected task failure, got {other:?}"),
    }
}

#[test]
fn panicking_task_aborts_the_run() {
    let config = fast_config(3, 10_000);
    let result = orchestrator::run_with(&config, ProgressHistory::default(), |spec, progress| {
        if spec.task_id == TaskId(0) {
            panic!("sampler crashed");
        }
        sampling_task(spec, &progress)
    });

    assert!(matches!(
        result,
        Err(RunError::TaskPanicked { task_id: TaskId(0) })
    ));
}

#[test]
fn task_that_skips_its_final_report_is_incomplete() {
    let config = fast_config(2, 10_000);
    let result = orchestrator::run_with(&config, ProgressHistory::default(), |spec, progress| {
        progress.report_progress(spec.task_id, spec.num_samples / 2);
        Ok(0)
    });

    assert!(matches!(
        result,
        Err(RunError::Incomplete { completed: 10_000, total: 20_000 })
    ));
}

#[test]
fn one_task_over_reporting_cannot_finish_the_run() {
    let config = fast_config(2, 20_000);
    let mut history = ProgressHistory::default();
    orchestrator::run_with(&config, &mut history, |spec, progress| {
        if spec.task_id == TaskId(0) {
            progress.report_progress(spec.task_id, spec.num_samples * 2);
        }
        sampling_task(spec, &progress)
    })
    .unwrap();

    let complete: Vec<_> = history.snapshots.iter().filter(|s| s.is_complete()).collect();
    assert_eq!(complete.len(), 1);
    assert_eq!(complete[0].tasks_reported, 2);
    assert!(history.snapshots.iter().all(|s| s.completed <= 40_000));
}

#[test]
fn streamed_points_reach_the_observer() {
    let config = RunConfig::builder(2, 1_000)
        .poll_interval(Duration::from_millis(5))
        .point_batch_size(Some(100))
        .build()
        .unwrap();
    let mut history = ProgressHistory::default();

    orchestrator::run(&config, &mut history).unwrap();

    assert_eq!(history.points_seen, 2_000);
}

#[test]
fn zero_samples_per_task_is_rejected_before_dispatch() {
    assert_eq!(
        RunConfig::builder(4, 0).build(),
        Err(ConfigError::ZeroSamplesPerTask)
    );
}
