// config.rs

use crate::audio::SoundId;
use log::{debug, info, warn};
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const MAX_BPM: u32 = 200;
pub const DEFAULT_MIN_BPM: u32 = 10;
pub const DEFAULT_START_BPM: u32 = 120;
pub const DEFAULT_END_BPM: u32 = 80;
pub const DEFAULT_DURATION_MINUTES: f64 = 5.0;
pub const DEFAULT_HOLD_FRACTION: f64 = 0.15;
pub const MAX_HOLD_FRACTION: f64 = 0.5;
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 30;

/// Environment variables with this prefix override the config file,
/// e.g. `BREATHTICK_START_BPM=90`.
pub const ENV_PREFIX: &str = "BREATHTICK";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("session duration must be a positive number of minutes, got {0}")]
    InvalidDuration(f64),
    #[error("minimum BPM must be between 1 and {}, got {0}", MAX_BPM)]
    InvalidMinBpm(i64),
    #[error("frames per second must be between 1 and 240, got {0}")]
    InvalidFrameRate(i64),
    #[error("invalid sound selection: {0}")]
    InvalidSound(String),
    #[error("session settings cannot change while a session is running")]
    SessionActive,
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
}

/// Tempo curve parameters for one session.
///
/// BPM values are always stored clamped to `[min_bpm, MAX_BPM]` and the hold
/// fraction to `[0, MAX_HOLD_FRACTION]`, so every accessor returns a usable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    duration_minutes: f64,
    start_bpm: u32,
    end_bpm: u32,
    min_bpm: u32,
    hold_fraction: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_DURATION_MINUTES,
            start_bpm: DEFAULT_START_BPM,
            end_bpm: DEFAULT_END_BPM,
            min_bpm: DEFAULT_MIN_BPM,
            hold_fraction: DEFAULT_HOLD_FRACTION,
        }
    }
}

impl SessionConfig {
    pub fn new(duration_minutes: f64, start_bpm: i64, end_bpm: i64) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.set_duration_minutes(duration_minutes)?;
        config.set_start_bpm(start_bpm);
        config.set_end_bpm(end_bpm);
        Ok(config)
    }

    pub fn with_min_bpm(mut self, min_bpm: i64) -> Result<Self, ConfigError> {
        self.set_min_bpm(min_bpm)?;
        Ok(self)
    }

    pub fn with_hold_fraction(mut self, hold_fraction: f64) -> Self {
        self.set_hold_fraction(hold_fraction);
        self
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_minutes
    }

    pub fn total_duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_minutes * 60.0)
    }

    pub fn start_bpm(&self) -> u32 {
        self.start_bpm
    }

    pub fn end_bpm(&self) -> u32 {
        self.end_bpm
    }

    pub fn min_bpm(&self) -> u32 {
        self.min_bpm
    }

    pub fn hold_fraction(&self) -> f64 {
        self.hold_fraction
    }

    /// Clamps a raw BPM value into `[min_bpm, MAX_BPM]`.
    pub fn clamp_bpm(&self, raw: i64) -> u32 {
        raw.clamp(i64::from(self.min_bpm), i64::from(MAX_BPM)) as u32
    }

    /// Parses user-typed BPM text. A leading integer is taken ("96.5" is 96,
    /// "72bpm" is 72); text without one falls back to the minimum BPM.
    pub fn parse_bpm(&self, raw: &str) -> u32 {
        let trimmed = raw.trim();
        let end = trimmed
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map_or(trimmed.len(), |(i, _)| i);

        // Digit runs too long for i64 still clamp to the nearest bound.
        let value = match trimmed[..end].parse::<i64>() {
            Ok(value) => value,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
            Err(e) if *e.kind() == IntErrorKind::NegOverflow => i64::MIN,
            Err(_) => {
                debug!("Unparseable BPM input {:?}, using minimum", raw);
                return self.min_bpm;
            }
        };
        self.clamp_bpm(value)
    }

    pub fn set_start_bpm(&mut self, raw: i64) -> u32 {
        self.start_bpm = self.clamp_bpm(raw);
        self.start_bpm
    }

    pub fn set_end_bpm(&mut self, raw: i64) -> u32 {
        self.end_bpm = self.clamp_bpm(raw);
        self.end_bpm
    }

    pub fn set_duration_minutes(&mut self, minutes: f64) -> Result<(), ConfigError> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(ConfigError::InvalidDuration(minutes));
        }
        // total_duration relies on this conversion succeeding.
        if Duration::try_from_secs_f64(minutes * 60.0).is_err() {
            return Err(ConfigError::InvalidDuration(minutes));
        }
        self.duration_minutes = minutes;
        Ok(())
    }

    /// Changes the floor and re-clamps both endpoints against it.
    pub fn set_min_bpm(&mut self, min_bpm: i64) -> Result<(), ConfigError> {
        if !(1..=i64::from(MAX_BPM)).contains(&min_bpm) {
            return Err(ConfigError::InvalidMinBpm(min_bpm));
        }
        self.min_bpm = min_bpm as u32;
        self.start_bpm = self.clamp_bpm(i64::from(self.start_bpm));
        self.end_bpm = self.clamp_bpm(i64::from(self.end_bpm));
        Ok(())
    }

    pub fn set_hold_fraction(&mut self, hold_fraction: f64) {
        let clamped = if hold_fraction.is_nan() {
            0.0
        } else {
            hold_fraction.clamp(0.0, MAX_HOLD_FRACTION)
        };
        if clamped != hold_fraction {
            warn!(
                "Hold fraction {} out of range, clamped to {}",
                hold_fraction, clamped
            );
        }
        self.hold_fraction = clamped;
    }
}

/// Everything the binary needs to set up a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub session: SessionConfig,
    pub sound: SoundId,
    pub frames_per_second: u32,
    pub midi_output: Option<String>,
    pub bell: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            session: SessionConfig::default(),
            sound: SoundId::default(),
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            midi_output: None,
            bell: false,
        }
    }
}

impl Settings {
    /// Loads defaults, then the config file, then `BREATHTICK_*` variables.
    ///
    /// An explicitly given file must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("duration_minutes", DEFAULT_DURATION_MINUTES)?
            .set_default("start_bpm", i64::from(DEFAULT_START_BPM))?
            .set_default("end_bpm", i64::from(DEFAULT_END_BPM))?
            .set_default("min_bpm", i64::from(DEFAULT_MIN_BPM))?
            .set_default("hold_fraction", DEFAULT_HOLD_FRACTION)?
            .set_default("sound", i64::from(SoundId::default().get()))?
            .set_default("frames_per_second", i64::from(DEFAULT_FRAMES_PER_SECOND))?
            .set_default("bell", false)?;

        match path {
            Some(file) => {
                info!("Loading settings from {}", file.display());
                builder = builder.add_source(config::File::from(file.to_path_buf()).required(true));
            }
            None => {
                if let Some(file) = default_config_path() {
                    debug!("Looking for optional settings at {}", file.display());
                    builder = builder.add_source(config::File::from(file).required(false));
                }
            }
        }

        let raw = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Self::from_raw(&raw)
    }

    fn from_raw(raw: &config::Config) -> Result<Self, ConfigError> {
        let mut session = SessionConfig::default().with_min_bpm(raw.get_int("min_bpm")?)?;
        session.set_duration_minutes(raw.get_float("duration_minutes")?)?;
        session.set_hold_fraction(raw.get_float("hold_fraction")?);

        // BPMs go through the same text clamping as interactive input.
        let start = session.parse_bpm(&raw.get_string("start_bpm")?);
        session.set_start_bpm(i64::from(start));
        let end = session.parse_bpm(&raw.get_string("end_bpm")?);
        session.set_end_bpm(i64::from(end));

        let sound_raw = raw.get_int("sound")?;
        let sound = u8::try_from(sound_raw)
            .ok()
            .and_then(|id| SoundId::new(id).ok())
            .ok_or_else(|| ConfigError::InvalidSound(sound_raw.to_string()))?;

        let fps = raw.get_int("frames_per_second")?;
        if !(1..=240).contains(&fps) {
            return Err(ConfigError::InvalidFrameRate(fps));
        }

        let settings = Settings {
            session,
            sound,
            frames_per_second: fps as u32,
            midi_output: raw.get_string("midi_output").ok(),
            bell: raw.get_bool("bell")?,
        };
        debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn frame_interval(&self) -> Duration {
        frame_interval_for(self.frames_per_second)
    }
}

/// Progress-clock period for a frame rate; zero is treated as one frame per second.
pub const fn frame_interval_for(frames_per_second: u32) -> Duration {
    let fps = if frames_per_second == 0 { 1 } else { frames_per_second };
    Duration::from_nanos(1_000_000_000 / fps as u64)
}

fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("breathtick")
            .join("config.toml"),
    )
}
