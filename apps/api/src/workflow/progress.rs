//! Cosmetic progress for the waiting screens. Not tied to real completion.

use std::time::Duration;

use tokio::time::Instant;

const TICK: Duration = Duration::from_millis(600);
const RAMP_PER_TICK: f64 = 2.0;
const SOFT_CAP: f64 = 92.0;
const CREEP_PER_TICK: f64 = 0.1;
/// Pseudo-progress never claims completion on its own.
const HARD_CAP: f64 = 99.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Progress {
    #[default]
    Idle,
    /// Waiting on the inference server since the given instant.
    Waiting { since: Instant },
    Fixed(f64),
}

impl Progress {
    pub fn waiting() -> Self {
        Progress::Waiting {
            since: Instant::now(),
        }
    }

    /// Upload progress after `done` of `total` pages: 20% to 95%.
    pub fn upload_page(done: usize, total: usize) -> Self {
        if total == 0 {
            return Progress::Fixed(95.0);
        }
        Progress::Fixed((20.0 + (done as f64 / total as f64) * 75.0).floor())
    }

    pub fn percent_at(&self, now: Instant) -> f64 {
        match *self {
            Progress::Idle => 0.0,
            Progress::Fixed(value) => value,
            Progress::Waiting { since } => pseudo_percent(now.saturating_duration_since(since)),
        }
    }
}

fn pseudo_percent(elapsed: Duration) -> f64 {
    let ticks = (elapsed.as_millis() / TICK.as_millis()) as f64;
    let ramp = (ticks * RAMP_PER_TICK).min(SOFT_CAP);
    let creep_ticks = (ticks - SOFT_CAP / RAMP_PER_TICK).max(0.0);
    (ramp + creep_ticks * CREEP_PER_TICK).min(HARD_CAP)
}
