use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Idle,
    Running,
    Paused,
}

/// Wall-clock bookkeeping of one run.
///
/// `elapsed` is the only place active session time is derived from; the
/// scheduler, the resume path and the frame loop all go through it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    transport: TransportState,
    started_at: Option<Instant>,
    paused_total: Duration,
    pause_started_at: Option<Instant>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transport(&self) -> TransportState {
        self.transport
    }

    pub fn is_running(&self) -> bool {
        self.transport == TransportState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.transport == TransportState::Paused
    }

    pub fn is_idle(&self) -> bool {
        self.transport == TransportState::Idle
    }

    pub fn paused_total(&self) -> Duration {
        self.paused_total
    }

    /// Idle -> Running. Returns false if a run is already in progress.
    pub fn start(&mut self, now: Instant) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.transport = TransportState::Running;
        self.started_at = Some(now);
        self.paused_total = Duration::ZERO;
        self.pause_started_at = None;
        true
    }

    /// Running -> Paused.
    pub fn pause(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        self.transport = TransportState::Paused;
        self.pause_started_at = Some(now);
        true
    }

    /// Paused -> Running, adding the pause to the excluded time.
    pub fn resume(&mut self, now: Instant) -> bool {
        if !self.is_paused() {
            return false;
        }
        if let Some(paused_at) = self.pause_started_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
        self.transport = TransportState::Running;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Active session time at `now`: wall time since start minus time spent
    /// paused. Frozen while paused, zero while idle.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let until = match (self.transport, self.pause_started_at) {
            (TransportState::Paused, Some(paused_at)) => paused_at,
            _ => now,
        };
        until
            .saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = RunState::new();
        assert!(state.is_idle());
        assert_eq!(state.elapsed(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_excludes_pauses() {
        let t0 = Instant::now();
        let mut state = RunState::new();
        assert!(state.start(t0));

        assert_eq!(state.elapsed(t0 + Duration::from_secs(10)), Duration::from_secs(10));

        assert!(state.pause(t0 + Duration::from_secs(10)));
        // Frozen while paused
        assert_eq!(state.elapsed(t0 + Duration::from_secs(40)), Duration::from_secs(10));

        assert!(state.resume(t0 + Duration::from_secs(40)));
        assert_eq!(state.paused_total(), Duration::from_secs(30));
        assert_eq!(state.elapsed(t0 + Duration::from_secs(45)), Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        let t0 = Instant::now();
        let mut state = RunState::new();
        assert!(!state.pause(t0));
        assert!(!state.resume(t0));
        assert!(state.start(t0));
        assert!(!state.start(t0));
        assert!(!state.resume(t0));
        assert!(state.pause(t0));
        assert!(!state.pause(t0));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let t0 = Instant::now();
        let mut state = RunState::new();
        state.start(t0);
        state.reset();
        let once = state.clone();
        state.reset();
        assert_eq!(state, once);
        assert_eq!(state, RunState::default());
    }

    #[test]
    fn test_elapsed_never_negative() {
        let t0 = Instant::now() + Duration::from_secs(5);
        let mut state = RunState::new();
        state.start(t0);
        assert_eq!(state.elapsed(t0 - Duration::from_secs(1)), Duration::ZERO);
    }
}
