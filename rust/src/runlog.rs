use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};

pub const DEFAULT_RUN_LOG: &str = "runtime_data.csv";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One finished run: when it ended, how long it took, and what it estimated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub timestamp: DateTime<Local>,
    pub runtime: Duration,
    pub pi_estimate: f64,
}

impl RunRecord {
    pub fn now(runtime: Duration, pi_estimate: f64) -> Self {
        Self {
            timestamp: Local::now(),
            runtime,
            pi_estimate,
        }
    }

    /// `YYYY-MM-DD HH:MM:SS,<runtime seconds>,<estimate>`
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.runtime.as_secs_f64(),
            self.pi_estimate
        )
    }
}

/// Append-only CSV file of run records, one row per run, no header.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &RunRecord) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_csv_row())?;
        tracing::debug!(path = %self.path.display(), "run record appended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(pi_estimate: f64) -> RunRecord {
        RunRecord {
            timestamp: Local.with_ymd_and_hms(2024, 3, 14, 15, 9, 26).unwrap(),
            runtime: Duration::from_millis(1_500),
            pi_estimate,
        }
    }

    #[test]
    fn row_has_timestamp_runtime_and_estimate() {
        assert_eq!(record(3.1416).to_csv_row(), "2024-03-14 15:09:26,1.5,3.1416");
    }

    #[test]
    fn append_adds_one_row_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let log = RunLog::new(dir.path().join("runs.csv"));
        log.append(&record(3.14)).unwrap();
        log.append(&record(3.15)).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let rows: Vec<_> = contents.lines().collect();
        assert_eq!(
            rows,
            vec!["2024-03-14 15:09:26,1.5,3.14", "2024-03-14 15:09:26,1.5,3.15"]
        );
    }
}
