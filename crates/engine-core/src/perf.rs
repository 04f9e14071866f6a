use std::time::{Duration, Instant};
use tracing::debug;

/// Times one backend operation.
#[derive(Debug)]
pub struct PerfStatus {
    name: String,
    started: Instant,
}

/// Outcome of a [`PerfStatus`] measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfReport {
    pub name: String,
    pub elapsed: Duration,
}

impl PerfStatus {
    pub fn start(name: impl Into<String>) -> Self {
        PerfStatus {
            name: name.into(),
            started: Instant::now(),
        }
    }

    pub fn finish(self) -> PerfReport {
        let report = PerfReport {
            elapsed: self.started.elapsed(),
            name: self.name,
        };
        debug!(operation = %report.name, elapsed_ms = report.elapsed_ms(), "Operation timed");
        report
    }
}

impl PerfReport {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// `"{name}: {ms}ms"`.
    pub fn status_line(&self) -> String {
        format!("{}: {}ms", self.name, self.elapsed_ms())
    }
}
