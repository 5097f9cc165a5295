//! Terminal presentation of a session.
//!
//! `TerminalView` is a [`SessionHandler`] that draws:
//! - a session bar with elapsed/total time and a fill ring
//! - the tempo curve with a cursor at the current progress
//! - the current BPM with a pulse that decays until the next tick
//!
//! Drawing uses indicatif; nothing here feeds back into timing.

pub mod curve;
mod progress;

pub use progress::{
    create_curve_line, create_help_line, create_pulse_spinner, create_session_progress,
    SESSION_BAR_STEPS,
};

use crate::audio::SoundId;
use crate::config::SessionConfig;
use crate::progress::{format_time, ProgressFrame};
use crate::session::{SessionEvent, SessionHandler};
use crate::state::TransportState;
use chrono::Local;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget};
use log::warn;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const CURVE_WIDTH: usize = 48;

struct ViewState {
    config: SessionConfig,
    sound: SoundId,
    bpm: u32,
    transport: TransportState,
    last_pulse: Option<(Instant, Duration)>,
    frame: ProgressFrame,
}

pub struct TerminalView {
    multi_progress: MultiProgress,
    session_pb: ProgressBar,
    curve_pb: ProgressBar,
    pulse_pb: ProgressBar,
    help_pb: ProgressBar,
    state: Mutex<ViewState>,
}

impl TerminalView {
    pub fn new(config: SessionConfig, sound: SoundId) -> Self {
        Self::with_draw_target(config, sound, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(
        config: SessionConfig,
        sound: SoundId,
        target: ProgressDrawTarget,
    ) -> Self {
        let multi_progress = MultiProgress::with_draw_target(target);
        let session_pb = create_session_progress(&multi_progress);
        let curve_pb = create_curve_line(&multi_progress);
        let pulse_pb = create_pulse_spinner(&multi_progress);
        let help_pb = create_help_line(&multi_progress);

        let view = TerminalView {
            multi_progress,
            session_pb,
            curve_pb,
            pulse_pb,
            help_pb,
            state: Mutex::new(ViewState {
                config,
                sound,
                bpm: config.start_bpm(),
                transport: TransportState::Idle,
                last_pulse: None,
                frame: ProgressFrame::zero(config.total_duration()),
            }),
        };
        if let Ok(state) = view.state.lock() {
            view.redraw(&state);
        }
        view
    }

    /// Current text of the BPM/pulse line.
    pub fn pulse_line(&self) -> String {
        self.pulse_pb.message()
    }

    pub fn curve_line(&self) -> String {
        self.curve_pb.message()
    }

    pub fn help_line(&self) -> String {
        self.help_pb.message()
    }

    pub fn session_position(&self) -> u64 {
        self.session_pb.position()
    }

    fn redraw(&self, state: &ViewState) {
        let frame = state.frame;
        self.session_pb
            .set_position(frame.fill(SESSION_BAR_STEPS));
        self.session_pb.set_message(format!(
            "{} {} / {}",
            curve::ring_glyph(frame.fraction),
            format_time(frame.elapsed),
            format_time(frame.total)
        ));

        let cursor = (state.transport != TransportState::Idle).then_some(frame.fraction);
        self.curve_pb.set_message(format!(
            "{:>3} {} {:<3}",
            state.config.start_bpm(),
            curve::render_curve(&state.config, CURVE_WIDTH, cursor),
            state.config.end_bpm()
        ));

        let intensity = state
            .last_pulse
            .map(|(at, interval)| {
                let since = at.elapsed().as_secs_f64();
                1.0 - since / interval.as_secs_f64().max(f64::MIN_POSITIVE)
            })
            .unwrap_or(0.0);
        self.pulse_pb.set_message(format!(
            "{} {:>3} BPM  {}  [{}]",
            curve::pulse_glyph(intensity),
            state.bpm,
            state.sound,
            status_label(state.transport)
        ));
        self.pulse_pb.tick();
        self.help_pb.tick();
    }

    fn announce(&self, line: String) {
        if let Err(e) = self.multi_progress.println(line) {
            warn!("Could not print to terminal: {}", e);
        }
    }
}

impl SessionHandler for TerminalView {
    fn handle_event(&self, event: &SessionEvent) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        match event {
            SessionEvent::Started | SessionEvent::Resumed => {
                state.transport = TransportState::Running
            }
            SessionEvent::Paused => {
                state.transport = TransportState::Paused;
                state.last_pulse = None;
            }
            SessionEvent::Bpm(bpm) => state.bpm = *bpm,
            SessionEvent::Pulse { interval } => {
                state.last_pulse = Some((Instant::now(), *interval));
            }
            SessionEvent::Progress(frame) => state.frame = *frame,
            SessionEvent::ConfigChanged(config) => {
                state.config = *config;
                if state.transport == TransportState::Idle {
                    state.frame = ProgressFrame::zero(config.total_duration());
                }
            }
            SessionEvent::SoundChanged(sound) => state.sound = *sound,
            SessionEvent::Stopped { completed } => {
                state.transport = TransportState::Idle;
                state.last_pulse = None;
                if *completed {
                    self.announce(format!(
                        "Session complete at {}",
                        Local::now().format("%H:%M:%S")
                    ));
                }
            }
        }

        self.redraw(&state);
    }
}

fn status_label(transport: TransportState) -> &'static str {
    match transport {
        TransportState::Idle => "ready",
        TransportState::Running => "running",
        TransportState::Paused => "paused",
    }
}
