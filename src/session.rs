//! The session: tick scheduler and progress clock around one tempo curve.
//!
//! A `Session` never sleeps or spawns. It keeps at most one pending tick and
//! one pending frame deadline; whoever drives it (the event loop, or a test
//! with a `ManualClock`) waits until `next_deadline` and calls `fire`.

use crate::audio::{SoundId, TickSink};
use crate::clock::Clock;
use crate::config::{frame_interval_for, ConfigError, SessionConfig, DEFAULT_FRAMES_PER_SECOND};
use crate::curve::{bpm_at, interval_for};
use crate::progress::ProgressFrame;
use crate::scheduler::{Deadline, TimerKind, TimerSlots, TimerToken};
use crate::state::{RunState, TransportState};
use log::{debug, info, trace, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_FRAME_INTERVAL: Duration = frame_interval_for(DEFAULT_FRAMES_PER_SECOND);

/// Everything a session reports to its surroundings.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Paused,
    Resumed,
    /// Rounded BPM for display.
    Bpm(u32),
    /// Visual pulse; it should decay over `interval`, the time to the next tick.
    Pulse { interval: Duration },
    Progress(ProgressFrame),
    ConfigChanged(SessionConfig),
    SoundChanged(SoundId),
    Stopped { completed: bool },
}

pub trait SessionHandler: Send + Sync {
    fn handle_event(&self, event: &SessionEvent);
}

pub struct Session<C: Clock> {
    config: SessionConfig,
    sound: SoundId,
    clock: C,
    run: RunState,
    timers: TimerSlots,
    frame_interval: Duration,
    current_bpm: f64,
    tick_count: u64,
    completed_runs: u64,
    sink: Box<dyn TickSink>,
    handlers: Vec<Arc<dyn SessionHandler>>,
}

impl<C: Clock> Session<C> {
    pub fn new(config: SessionConfig, clock: C, sink: Box<dyn TickSink>) -> Self {
        Session {
            current_bpm: f64::from(config.start_bpm()),
            config,
            sound: SoundId::default(),
            clock,
            run: RunState::new(),
            timers: TimerSlots::new(),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            tick_count: 0,
            completed_runs: 0,
            sink,
            handlers: Vec::new(),
        }
    }

    pub fn with_sound(mut self, sound: SoundId) -> Self {
        self.sound = sound;
        self
    }

    pub fn with_frame_interval(mut self, frame_interval: Duration) -> Self {
        // A zero period would make the frame chain fire forever within one poll.
        self.frame_interval = frame_interval.max(Duration::from_millis(1));
        self
    }

    pub fn add_handler(&mut self, handler: Arc<dyn SessionHandler>) {
        self.handlers.push(handler);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sound(&self) -> SoundId {
        self.sound
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn run_state(&self) -> &RunState {
        &self.run
    }

    pub fn transport(&self) -> TransportState {
        self.run.transport()
    }

    pub fn current_bpm(&self) -> f64 {
        self.current_bpm
    }

    pub fn display_bpm(&self) -> u32 {
        self.current_bpm.round() as u32
    }

    /// Ticks played since the last start.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Runs that ended by reaching the end of the curve.
    pub fn completed_runs(&self) -> u64 {
        self.completed_runs
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    pub fn elapsed(&self) -> Duration {
        self.run.elapsed(self.clock.now())
    }

    pub fn progress(&self) -> ProgressFrame {
        ProgressFrame::new(self.elapsed(), self.config.total_duration())
    }

    pub fn next_deadline(&self) -> Option<Deadline> {
        self.timers.next_deadline()
    }

    pub fn pending(&self, kind: TimerKind) -> Option<Deadline> {
        self.timers.pending(kind)
    }

    /// Starts a fresh run, or resumes a paused one. No-op while running.
    pub fn start(&mut self) -> bool {
        match self.run.transport() {
            TransportState::Running => false,
            TransportState::Paused => self.resume(),
            TransportState::Idle => {
                let now = self.clock.now();
                self.run.start(now);
                self.tick_count = 0;
                info!(
                    "Session started: {} -> {} BPM over {} min",
                    self.config.start_bpm(),
                    self.config.end_bpm(),
                    self.config.duration_minutes()
                );
                self.emit(SessionEvent::Started);
                self.tick(now);
                if self.run.is_running() {
                    self.frame(now);
                }
                true
            }
        }
    }

    pub fn pause(&mut self) -> bool {
        let now = self.clock.now();
        if !self.run.pause(now) {
            return false;
        }
        self.timers.cancel_all();
        info!("Session paused at {:?}", self.run.elapsed(now));
        self.emit(SessionEvent::Paused);
        true
    }

    /// Resumes by re-synchronising: the next tick fires now, at the BPM for
    /// the current elapsed time, rather than continuing the cancelled timer.
    pub fn resume(&mut self) -> bool {
        let now = self.clock.now();
        if !self.run.resume(now) {
            return false;
        }
        info!(
            "Session resumed at {:?} (paused {:?} in total)",
            self.run.elapsed(now),
            self.run.paused_total()
        );
        self.emit(SessionEvent::Resumed);
        self.tick(now);
        if self.run.is_running() {
            self.frame(now);
        }
        true
    }

    /// The single start/pause button.
    pub fn toggle_pause(&mut self) -> bool {
        match self.run.transport() {
            TransportState::Running => self.pause(),
            TransportState::Paused => self.resume(),
            TransportState::Idle => self.start(),
        }
    }

    /// Stops and resets. Calling it while idle changes nothing.
    pub fn stop(&mut self) -> bool {
        self.finish(false)
    }

    /// Fires `deadline` if it is still the pending one on its chain.
    pub fn fire(&mut self, deadline: Deadline) -> bool {
        match deadline.kind {
            TimerKind::Tick => self.fire_tick(deadline.token),
            TimerKind::Frame => self.fire_frame(deadline.token),
        }
    }

    pub fn fire_tick(&mut self, token: TimerToken) -> bool {
        if !self.run.is_running() || !self.timers.claim(TimerKind::Tick, token) {
            trace!("Ignoring stale tick timer {:?}", token);
            return false;
        }
        let now = self.clock.now();
        self.tick(now);
        true
    }

    pub fn fire_frame(&mut self, token: TimerToken) -> bool {
        if !self.run.is_running() || !self.timers.claim(TimerKind::Frame, token) {
            trace!("Ignoring stale frame timer {:?}", token);
            return false;
        }
        let now = self.clock.now();
        self.frame(now);
        true
    }

    /// Fires every deadline that is due at the clock's current time, earliest
    /// first. Returns how many fired.
    pub fn fire_due(&mut self) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.timers.next_deadline() {
            if deadline.due > self.clock.now() {
                break;
            }
            if !self.fire(deadline) {
                break;
            }
            fired += 1;
        }
        fired
    }

    pub fn set_start_bpm(&mut self, raw: i64) -> u32 {
        let bpm = self.config.set_start_bpm(raw);
        if self.run.is_idle() {
            self.current_bpm = f64::from(bpm);
            self.emit(SessionEvent::Bpm(bpm));
        }
        debug!("Start BPM set to {}", bpm);
        self.emit(SessionEvent::ConfigChanged(self.config));
        bpm
    }

    /// Takes effect on the next tick, even mid-session.
    pub fn set_end_bpm(&mut self, raw: i64) -> u32 {
        let bpm = self.config.set_end_bpm(raw);
        debug!("End BPM set to {}", bpm);
        self.emit(SessionEvent::ConfigChanged(self.config));
        bpm
    }

    pub fn nudge_start_bpm(&mut self, delta: i64) -> u32 {
        self.set_start_bpm(i64::from(self.config.start_bpm()) + delta)
    }

    pub fn nudge_end_bpm(&mut self, delta: i64) -> u32 {
        self.set_end_bpm(i64::from(self.config.end_bpm()) + delta)
    }

    pub fn set_duration_minutes(&mut self, minutes: f64) -> Result<(), ConfigError> {
        if !self.run.is_idle() {
            warn!("Ignoring duration change to {} min during a session", minutes);
            return Err(ConfigError::SessionActive);
        }
        self.config.set_duration_minutes(minutes)?;
        info!("Session duration set to {} min", minutes);
        self.emit(SessionEvent::ConfigChanged(self.config));
        self.emit(SessionEvent::Progress(ProgressFrame::zero(
            self.config.total_duration(),
        )));
        Ok(())
    }

    pub fn select_sound(&mut self, sound: SoundId) {
        self.sound = sound;
        debug!("Selected {}", sound);
        self.emit(SessionEvent::SoundChanged(sound));
    }

    fn tick(&mut self, now: Instant) {
        let total = self.config.total_duration();
        let elapsed = self.run.elapsed(now);
        if elapsed >= total {
            self.finish(true);
            return;
        }

        let progress = ProgressFrame::new(elapsed, total).fraction;
        let bpm = bpm_at(progress, &self.config);
        let interval = interval_for(bpm);
        self.current_bpm = bpm;
        self.tick_count += 1;
        debug!(
            "Tick #{} at {:.2} BPM (progress {:.3}), next in {:?}",
            self.tick_count, bpm, progress, interval
        );

        self.emit(SessionEvent::Bpm(self.display_bpm()));
        if let Err(e) = self.sink.play_tick(self.sound) {
            debug!("Tick sound skipped: {}", e);
        }
        self.emit(SessionEvent::Pulse { interval });

        if self.run.is_running() {
            self.timers.schedule(TimerKind::Tick, now + interval);
        }
    }

    fn frame(&mut self, now: Instant) {
        let frame = ProgressFrame::new(self.run.elapsed(now), self.config.total_duration());
        trace!("Frame at {:.4}", frame.fraction);
        self.emit(SessionEvent::Progress(frame));

        if frame.is_complete() {
            self.finish(true);
            return;
        }
        self.timers
            .schedule(TimerKind::Frame, now + self.frame_interval);
    }

    fn finish(&mut self, completed: bool) -> bool {
        if self.run.is_idle() {
            return false;
        }
        self.timers.cancel_all();
        self.run.reset();
        self.current_bpm = f64::from(self.config.start_bpm());

        if completed {
            self.completed_runs += 1;
            info!("Session completed after {} ticks", self.tick_count);
        } else {
            info!("Session stopped after {} ticks", self.tick_count);
        }
        self.emit(SessionEvent::Bpm(self.display_bpm()));
        self.emit(SessionEvent::Progress(ProgressFrame::zero(
            self.config.total_duration(),
        )));
        self.emit(SessionEvent::Stopped { completed });
        true
    }

    fn emit(&self, event: SessionEvent) {
        for handler in &self.handlers {
            handler.handle_event(&event);
        }
    }
}
