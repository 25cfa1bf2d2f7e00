//! Phase timing for pack runs.
//!
//! Packing is usually over in milliseconds, so durations are shown at the
//! coarsest unit that still says something: `850ms`, `3.4s`, `2.1m`.

use std::fmt;
use std::time::{Duration, Instant};

/// Console form of a phase duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0.as_secs_f64();
        if secs >= 60.0 {
            write!(f, "{:.1}m", secs / 60.0)
        } else if secs >= 1.0 {
            write!(f, "{:.1}s", secs)
        } else {
            write!(f, "{}ms", self.0.as_millis())
        }
    }
}

/// One measured phase of a pack run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTime {
    pub phase: &'static str,
    pub elapsed: Duration,
}

/// Measures a phase from `start` to `finish`.
pub struct Timer {
    phase: &'static str,
    start: Instant,
}

impl Timer {
    pub fn start(phase: &'static str) -> Self {
        Self {
            phase,
            start: Instant::now(),
        }
    }

    /// Stop the timer, print `  [elapsed] phase` and log it.
    pub fn finish(self) -> PhaseTime {
        let elapsed = self.start.elapsed();
        tracing::info!(
            phase = self.phase,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            "phase finished"
        );
        println!("  [{}] {}", Elapsed(elapsed), self.phase);
        PhaseTime {
            phase: self.phase,
            elapsed,
        }
    }
}
