//! Tick playback.
//!
//! The session only knows the [`TickSink`] interface. The concrete sink is a
//! [`FallbackPlayer`]: an ordered list of playback strategies where the first
//! one that succeeds wins.

mod midi;
mod terminal;

pub use midi::{list_output_ports, MidiStrategy};
pub use terminal::{BellStrategy, SilentStrategy};

use log::{debug, trace};
use std::fmt;
use thiserror::Error;

pub const SOUND_COUNT: u8 = 7;
const DEFAULT_SOUND: u8 = 6;
const BASE_VELOCITY: f32 = 40.0;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unknown sound id {0}, expected 1..={}", SOUND_COUNT)]
    UnknownSound(u8),
    #[error("MIDI initialization failed: {0}")]
    MidiInit(#[from] midir::InitError),
    #[error("MIDI port info unavailable: {0}")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("MIDI output device '{0}' not found")]
    DeviceNotFound(String),
    #[error("MIDI connection failed: {0}")]
    Connect(String),
    #[error("MIDI send failed: {0}")]
    Send(#[from] midir::SendError),
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("no playback strategy succeeded")]
    Exhausted,
}

/// One of the selectable tick sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundId(u8);

impl SoundId {
    pub fn new(id: u8) -> Result<Self, AudioError> {
        if (1..=SOUND_COUNT).contains(&id) {
            Ok(SoundId(id))
        } else {
            Err(AudioError::UnknownSound(id))
        }
    }

    pub fn all() -> impl Iterator<Item = SoundId> {
        (1..=SOUND_COUNT).map(SoundId)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Level calibration; the first sound is much quieter than the rest.
    pub fn gain(self) -> f32 {
        match self.0 {
            1 => 3.0,
            _ => 1.0,
        }
    }

    /// General MIDI percussion key for this sound.
    pub fn midi_note(self) -> u8 {
        match self.0 {
            1 => 76, // Hi Wood Block
            2 => 77, // Low Wood Block
            3 => 37, // Side Stick
            4 => 42, // Closed Hi-Hat
            5 => 56, // Cowbell
            6 => 75, // Claves
            _ => 81, // Open Triangle
        }
    }

    pub fn velocity(self) -> u8 {
        (BASE_VELOCITY * self.gain()).min(127.0) as u8
    }
}

impl Default for SoundId {
    fn default() -> Self {
        SoundId(DEFAULT_SOUND)
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sound {}", self.0)
    }
}

/// Receives "play tick" requests from the session.
///
/// Errors are reported but the session never lets them interrupt scheduling.
pub trait TickSink: Send {
    fn play_tick(&mut self, sound: SoundId) -> Result<(), AudioError>;
}

/// A single way of making a tick audible.
pub trait PlaybackStrategy: Send {
    fn name(&self) -> &str;
    fn play(&mut self, sound: SoundId) -> Result<(), AudioError>;
}

#[derive(Default)]
pub struct FallbackPlayer {
    strategies: Vec<Box<dyn PlaybackStrategy>>,
}

impl FallbackPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: Box<dyn PlaybackStrategy>) -> Self {
        self.push(strategy);
        self
    }

    pub fn push(&mut self, strategy: Box<dyn PlaybackStrategy>) {
        debug!("Registered playback strategy: {}", strategy.name());
        self.strategies.push(strategy);
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl TickSink for FallbackPlayer {
    fn play_tick(&mut self, sound: SoundId) -> Result<(), AudioError> {
        for strategy in self.strategies.iter_mut() {
            match strategy.play(sound) {
                Ok(()) => {
                    trace!("Played {} via {}", sound, strategy.name());
                    return Ok(());
                }
                Err(e) => debug!("Playback via {} failed: {}", strategy.name(), e),
            }
        }
        Err(AudioError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Recording {
        name: &'static str,
        fail: bool,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl PlaybackStrategy for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn play(&mut self, _sound: SoundId) -> Result<(), AudioError> {
            self.calls.lock().unwrap().push(self.name);
            if self.fail {
                Err(AudioError::Exhausted)
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_sound_id_range() {
        assert!(SoundId::new(0).is_err());
        assert!(SoundId::new(8).is_err());
        assert_eq!(SoundId::new(3).unwrap().get(), 3);
        assert_eq!(SoundId::default().get(), 6);
        assert_eq!(SoundId::all().count(), 7);
    }

    #[test]
    fn test_velocity_uses_gain() {
        assert_eq!(SoundId::new(1).unwrap().velocity(), 120);
        assert_eq!(SoundId::new(2).unwrap().velocity(), 40);
    }

    #[test]
    fn test_first_success_wins() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut player = FallbackPlayer::new()
            .with_strategy(Box::new(Recording { name: "broken", fail: true, calls: calls.clone() }))
            .with_strategy(Box::new(Recording { name: "working", fail: false, calls: calls.clone() }))
            .with_strategy(Box::new(Recording { name: "unused", fail: false, calls: calls.clone() }));

        assert!(player.play_tick(SoundId::default()).is_ok());
        assert_eq!(*calls.lock().unwrap(), vec!["broken", "working"]);
    }

    #[test]
    fn test_all_failing_reports_exhausted() {
        let mut player = FallbackPlayer::new();
        assert!(matches!(
            player.play_tick(SoundId::default()),
            Err(AudioError::Exhausted)
        ));
    }
}
