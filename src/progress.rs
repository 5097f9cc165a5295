use std::time::Duration;

/// Snapshot fed to every progress indicator on each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressFrame {
    pub elapsed: Duration,
    pub total: Duration,
    /// `elapsed / total`, clamped to `[0, 1]`.
    pub fraction: f64,
}

impl ProgressFrame {
    pub fn new(elapsed: Duration, total: Duration) -> Self {
        let fraction = if total.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
        };
        ProgressFrame {
            elapsed: elapsed.min(total),
            total,
            fraction,
        }
    }

    pub fn zero(total: Duration) -> Self {
        Self::new(Duration::ZERO, total)
    }

    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    pub fn is_complete(&self) -> bool {
        self.fraction >= 1.0
    }

    /// Filled part of a ring or bar that is `length` cells/units long.
    pub fn fill(&self, length: u64) -> u64 {
        (self.fraction * length as f64).round() as u64
    }
}

/// `mm:ss`, truncating fractional seconds.
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_is_clamped() {
        let total = Duration::from_secs(60);
        assert_eq!(ProgressFrame::new(Duration::from_secs(15), total).fraction, 0.25);
        let over = ProgressFrame::new(Duration::from_secs(90), total);
        assert_eq!(over.fraction, 1.0);
        assert_eq!(over.elapsed, total);
        assert!(over.is_complete());
    }

    #[test]
    fn test_remaining_and_fill() {
        let frame = ProgressFrame::new(Duration::from_secs(45), Duration::from_secs(60));
        assert_eq!(frame.remaining(), Duration::from_secs(15));
        assert_eq!(frame.fill(40), 30);
        assert_eq!(ProgressFrame::zero(Duration::from_secs(60)).fill(40), 0);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(Duration::ZERO), "00:00");
        assert_eq!(format_time(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_time(Duration::from_secs(300)), "05:00");
        assert_eq!(format_time(Duration::from_secs(61 * 60 + 5)), "61:05");
    }
}
