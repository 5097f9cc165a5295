// event_loop.rs

use crate::audio::SoundId;
use crate::clock::Clock;
use crate::session::Session;
use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};
use std::thread;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    Start,
    Pause,
    Resume,
    TogglePause,
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    TransportCommand(TransportAction),
    SetStartBpm(i64),
    SetEndBpm(i64),
    NudgeStartBpm(i64),
    NudgeEndBpm(i64),
    SetDuration(f64),
    SelectSound(SoundId),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    Completed,
    Disconnected,
}

/// Owns the session and is the only thread that touches it.
///
/// Each turn waits for a message until the session's next deadline, then
/// either handles the message or fires the due timers.
pub struct EventLoop<C: Clock> {
    session: Session<C>,
    message_rx: Receiver<EngineMessage>,
    exit_on_complete: bool,
    inputs_closed: bool,
}

impl<C: Clock> EventLoop<C> {
    pub fn new(session: Session<C>, message_rx: Receiver<EngineMessage>) -> Self {
        EventLoop {
            session,
            message_rx,
            exit_on_complete: false,
            inputs_closed: false,
        }
    }

    pub fn exit_on_complete(mut self, exit: bool) -> Self {
        self.exit_on_complete = exit;
        self
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn into_session(self) -> Session<C> {
        self.session
    }

    pub fn run(&mut self) -> ExitReason {
        info!("Event loop running");
        loop {
            let completed_before = self.session.completed_runs();

            match self.next_message() {
                Ok(Some(EngineMessage::Quit)) => {
                    info!("Quit requested");
                    self.session.stop();
                    return ExitReason::Quit;
                }
                Ok(Some(message)) => self.handle_message(message),
                Ok(None) => {
                    self.session.fire_due();
                }
                Err(reason) => return reason,
            }

            if self.exit_on_complete && self.session.completed_runs() > completed_before {
                info!("Session complete, leaving event loop");
                return ExitReason::Completed;
            }
        }
    }

    /// `Ok(None)` means a timer is due.
    fn next_message(&mut self) -> Result<Option<EngineMessage>, ExitReason> {
        let deadline = self.session.next_deadline();

        if self.inputs_closed {
            // Nobody can send anymore; keep the session running until it ends.
            return match deadline {
                Some(deadline) => {
                    let wait = deadline
                        .due
                        .saturating_duration_since(self.session.clock().now());
                    thread::sleep(wait);
                    Ok(None)
                }
                None => Err(ExitReason::Disconnected),
            };
        }

        let received = match deadline {
            Some(deadline) => {
                let timeout = deadline
                    .due
                    .saturating_duration_since(self.session.clock().now());
                self.message_rx.recv_timeout(timeout)
            }
            None => self
                .message_rx
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                info!("Message channel closed");
                self.inputs_closed = true;
                Ok(None)
            }
        }
    }

    pub fn handle_message(&mut self, message: EngineMessage) {
        debug!("Handling message: {:?}", message);
        match message {
            EngineMessage::TransportCommand(action) => self.handle_transport(action),
            EngineMessage::SetStartBpm(bpm) => {
                self.session.set_start_bpm(bpm);
            }
            EngineMessage::SetEndBpm(bpm) => {
                self.session.set_end_bpm(bpm);
            }
            EngineMessage::NudgeStartBpm(delta) => {
                self.session.nudge_start_bpm(delta);
            }
            EngineMessage::NudgeEndBpm(delta) => {
                self.session.nudge_end_bpm(delta);
            }
            EngineMessage::SetDuration(minutes) => {
                if let Err(e) = self.session.set_duration_minutes(minutes) {
                    warn!("Duration change rejected: {}", e);
                }
            }
            EngineMessage::SelectSound(sound) => self.session.select_sound(sound),
            EngineMessage::Quit => {
                self.session.stop();
            }
        }
    }

    fn handle_transport(&mut self, action: TransportAction) {
        let changed = match action {
            TransportAction::Start => self.session.start(),
            TransportAction::Pause => self.session.pause(),
            TransportAction::Resume => self.session.resume(),
            TransportAction::TogglePause => self.session.toggle_pause(),
            TransportAction::Stop => self.session.stop(),
        };
        if !changed {
            debug!(
                "{:?} ignored in state {:?}",
                action,
                self.session.transport()
            );
        }
    }
}
