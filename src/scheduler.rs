//! Pending-timer bookkeeping for the session loop.
//!
//! A session has two timer chains, one for ticks and one for progress frames.
//! Each chain holds at most one pending deadline. Every scheduled deadline gets
//! a fresh token; a firing whose token is no longer the pending one is stale
//! and must be ignored.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Tick,
    Frame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    pub kind: TimerKind,
    pub token: TimerToken,
    pub due: Instant,
}

#[derive(Debug, Default)]
pub struct TimerSlots {
    tick: Option<Deadline>,
    frame: Option<Deadline>,
    next_token: u64,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` at `due`, replacing anything pending on that chain.
    pub fn schedule(&mut self, kind: TimerKind, due: Instant) -> TimerToken {
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        *self.slot_mut(kind) = Some(Deadline { kind, token, due });
        token
    }

    pub fn cancel_all(&mut self) {
        self.tick = None;
        self.frame = None;
    }

    pub fn pending(&self, kind: TimerKind) -> Option<Deadline> {
        match kind {
            TimerKind::Tick => self.tick,
            TimerKind::Frame => self.frame,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tick.is_none() && self.frame.is_none()
    }

    /// Earliest pending deadline. Ticks win ties so audio is never late
    /// because of a redraw.
    pub fn next_deadline(&self) -> Option<Deadline> {
        match (self.tick, self.frame) {
            (Some(tick), Some(frame)) if frame.due < tick.due => Some(frame),
            (Some(tick), _) => Some(tick),
            (None, frame) => frame,
        }
    }

    /// Consumes the pending deadline of `kind` if `token` is still current.
    pub fn claim(&mut self, kind: TimerKind, token: TimerToken) -> bool {
        let slot = self.slot_mut(kind);
        if slot.map(|deadline| deadline.token) == Some(token) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<Deadline> {
        match kind {
            TimerKind::Tick => &mut self.tick,
            TimerKind::Frame => &mut self.frame,
        }
    }
}
