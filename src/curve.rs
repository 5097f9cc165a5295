//! Tempo curve: the U-shaped BPM profile of a session.
//!
//! The curve eases out quadratically from the start BPM down to the floor,
//! holds the floor for `hold_fraction` of the session, then eases in
//! quadratically up to the end BPM.

use crate::config::SessionConfig;
use std::time::Duration;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Instantaneous BPM at `progress` (clamped to `[0, 1]`).
pub fn bpm_at(progress: f64, config: &SessionConfig) -> f64 {
    let p = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };

    let min = f64::from(config.min_bpm());
    let start = f64::from(config.start_bpm().max(config.min_bpm()));
    let end = f64::from(config.end_bpm().max(config.min_bpm()));
    let hold = config.hold_fraction().clamp(0.0, 0.5);
    let ramp = ramp_length(hold);

    // Degenerate ramps: both edges become instantaneous jumps.
    if ramp <= f64::EPSILON {
        return if p <= 0.0 {
            start
        } else if p >= 1.0 {
            end
        } else {
            min
        };
    }

    if p < ramp {
        let t = p / ramp;
        let eased = 1.0 - t * t;
        min + (start - min) * eased
    } else if p < ramp + hold {
        min
    } else {
        let t = ((p - ramp - hold) / ramp).min(1.0);
        let eased = t * t;
        min + (end - min) * eased
    }
}

/// Length of each ramp half as a fraction of the session.
pub fn ramp_length(hold_fraction: f64) -> f64 {
    (1.0 - hold_fraction.clamp(0.0, 0.5)) / 2.0
}

/// Time between two ticks at `bpm`.
pub fn interval_for(bpm: f64) -> Duration {
    Duration::from_secs_f64(SECONDS_PER_MINUTE / bpm.max(f64::MIN_POSITIVE))
}

/// Progress window `[start, end)` during which the curve sits on the floor.
pub fn hold_window(config: &SessionConfig) -> (f64, f64) {
    let hold = config.hold_fraction().clamp(0.0, 0.5);
    let ramp = ramp_length(hold);
    (ramp, ramp + hold)
}

/// Evenly spaced samples of a session's curve, used for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct TempoCurve {
    samples: Vec<f64>,
}

impl TempoCurve {
    pub fn sample(config: &SessionConfig, points: usize) -> Self {
        let samples = match points {
            0 => Vec::new(),
            1 => vec![bpm_at(0.0, config)],
            n => (0..n)
                .map(|i| bpm_at(i as f64 / (n - 1) as f64, config))
                .collect(),
        };
        TempoCurve { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Index of the sample closest to `progress`.
    pub fn index_at(&self, progress: f64) -> Option<usize> {
        let last = self.samples.len().checked_sub(1)?;
        let p = progress.clamp(0.0, 1.0);
        Some(((p * last as f64).round() as usize).min(last))
    }
}
