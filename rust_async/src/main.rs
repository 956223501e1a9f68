use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use pi_progress::cli::RunArgs;
use pi_progress::config::DEFAULT_POINT_BATCH_SIZE;
use pi_progress::{logging, ConsoleProgress};
use pi_progress_async::{orchestrator, PointCanvas};

/// Monte Carlo π estimation on the tokio runtime.
#[derive(Debug, Parser)]
#[command(name = "pi-progress-async")]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    /// Stream sampled points and save them as a PNG scatter plot.
    #[arg(long, env = "PI_PLOT", conflicts_with = "sweep")]
    plot: Option<PathBuf>,

    #[arg(long, env = "PI_PLOT_SIZE", default_value_t = 800)]
    plot_size: u32,

    /// Points per batch forwarded to the aggregator while plotting.
    #[arg(long, env = "PI_POINT_BATCH_SIZE", default_value_t = DEFAULT_POINT_BATCH_SIZE)]
    point_batch_size: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    let point_batch_size = cli.plot.as_ref().map(|_| cli.point_batch_size);
    let configs = cli
        .run
        .configs(point_batch_size)
        .context("invalid run parameters")?;
    let run_log = cli.run.run_log();

    for config in &configs {
        println!(
            "Starting {} tasks x {} samples using async tasks",
            config.num_tasks(),
            config.samples_per_task()
        );
        let mut canvas = cli.plot.as_ref().map(|_| PointCanvas::new(cli.plot_size));

        let outcome = orchestrator::run(config, (ConsoleProgress, canvas.as_mut()))
            .await
            .with_context(|| format!("run with {} tasks aborted", config.num_tasks()))?;
        outcome.print_summary("Monte Carlo Pi Estimation (Async)");

        if let (Some(canvas), Some(path)) = (&canvas, &cli.plot) {
            canvas
                .save(path)
                .with_context(|| format!("failed to save plot to {}", path.display()))?;
            println!("Plotted {} points to {}", canvas.plotted(), path.display());
        }
        if let Some(log) = &run_log {
            log.append(&outcome.record())
                .with_context(|| format!("failed to append to {}", log.path().display()))?;
        }
    }

    Ok(())
}
