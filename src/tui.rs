mod input;

pub use input::{map_key_event, BPM_STEP};

use crate::event_loop::EngineMessage;
use crossbeam::channel::Sender;
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const INPUT_POLL: Duration = Duration::from_millis(100);

/// Keeps the terminal in raw mode for as long as it lives.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        log::debug!("Terminal raw mode enabled");
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            log::error!("Failed to restore terminal: {}", e);
        } else {
            log::debug!("Terminal raw mode disabled");
        }
    }
}

/// Reads keys on a background thread and forwards them as messages.
///
/// The thread ends after forwarding `Quit`, or on the first key pressed after
/// the event loop has dropped its receiver.
pub fn spawn_input_thread(message_tx: Sender<EngineMessage>) -> JoinHandle<()> {
    thread::spawn(move || {
        log::info!("Keyboard input thread started");
        loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    log::error!("Keyboard polling failed: {}", e);
                    break;
                }
            }

            let key_event = match event::read() {
                Ok(Event::Key(key_event)) => key_event,
                Ok(_) => continue,
                Err(e) => {
                    log::error!("Keyboard read failed: {}", e);
                    break;
                }
            };

            log::debug!("Key event received: {:?}", key_event);
            if let Some(message) = map_key_event(key_event) {
                let quit = message == EngineMessage::Quit;
                if message_tx.send(message).is_err() || quit {
                    break;
                }
            }
        }
        log::info!("Keyboard input thread stopped");
    })
}
