use anyhow::{Context, Result};
use clap::Parser;

use pi_progress::cli::RunArgs;
use pi_progress::{logging, orchestrator, ConsoleProgress};

/// Monte Carlo π estimation, one OS thread per sampling task.
#[derive(Debug, Parser)]
#[command(name = "pi-progress")]
struct Cli {
    #[command(flatten)]
    run: RunArgs,
}

fn main() -> Result<()> {
    logging::init_tracing();
    let cli = Cli::parse();

    let configs = cli.run.configs(None).context("invalid run parameters")?;
    let run_log = cli.run.run_log();

    for config in &configs {
        println!(
            "Starting {} tasks x {} samples using threads",
            config.num_tasks(),
            config.samples_per_task()
        );
        let outcome = orchestrator::run(config, ConsoleProgress)
            .with_context(|| format!("run with {} tasks aborted", config.num_tasks()))?;
        outcome.print_summary("Monte Carlo Pi Estimation");

        if let Some(log) = &run_log {
            log.append(&outcome.record())
                .with_context(|| format!("failed to append to {}", log.path().display()))?;
        }
    }

    Ok(())
}
