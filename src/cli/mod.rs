use crate::audio::SoundId;
use crate::config::{ConfigError, Settings};
use clap::Parser;
use log::debug;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Guided-breathing metronome with a U-shaped tempo curve", long_about = None)]
pub struct Args {
    /// Session length in minutes
    #[arg(short, long, value_name = "MINUTES")]
    pub duration: Option<f64>,

    /// Starting tempo; out-of-range or non-numeric values are clamped
    #[arg(short = 's', long, value_name = "BPM")]
    pub start_bpm: Option<String>,

    /// Final tempo; out-of-range or non-numeric values are clamped
    #[arg(short = 'e', long, value_name = "BPM")]
    pub end_bpm: Option<String>,

    /// Tempo floor the curve descends to
    #[arg(long, value_name = "BPM")]
    pub min_bpm: Option<i64>,

    /// Share of the session spent at the floor (0 to 0.5)
    #[arg(long, value_name = "FRACTION")]
    pub hold_fraction: Option<f64>,

    /// Tick sound, 1 to 7
    #[arg(long, value_name = "ID")]
    pub sound: Option<u8>,

    /// Play ticks on the MIDI output port whose name contains this text
    #[arg(long, value_name = "DEVICE")]
    pub midi_output: Option<String>,

    /// List MIDI output ports and exit
    #[arg(long)]
    pub list_midi_outputs: bool,

    /// Fall back to the terminal bell when no other output works
    #[arg(long)]
    pub bell: bool,

    /// Start the session immediately
    #[arg(long)]
    pub autostart: bool,

    /// Exit once the session reaches its end
    #[arg(long)]
    pub exit_on_complete: bool,

    /// Do not read the keyboard
    #[arg(long)]
    pub no_input: bool,

    /// Ask for the session settings before starting
    #[arg(short, long)]
    pub interactive: bool,

    /// Settings file (TOML); defaults to ~/.config/breathtick/config.toml
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Applies command-line overrides on top of loaded settings.
    pub fn apply(&self, settings: &mut Settings) -> Result<(), ConfigError> {
        if let Some(min_bpm) = self.min_bpm {
            settings.session.set_min_bpm(min_bpm)?;
        }
        if let Some(minutes) = self.duration {
            settings.session.set_duration_minutes(minutes)?;
        }
        if let Some(hold) = self.hold_fraction {
            settings.session.set_hold_fraction(hold);
        }
        if let Some(raw) = &self.start_bpm {
            let bpm = settings.session.parse_bpm(raw);
            settings.session.set_start_bpm(i64::from(bpm));
        }
        if let Some(raw) = &self.end_bpm {
            let bpm = settings.session.parse_bpm(raw);
            settings.session.set_end_bpm(i64::from(bpm));
        }
        if let Some(id) = self.sound {
            settings.sound =
                SoundId::new(id).map_err(|e| ConfigError::InvalidSound(e.to_string()))?;
        }
        if self.midi_output.is_some() {
            settings.midi_output = self.midi_output.clone();
        }
        settings.bell |= self.bell;

        debug!("Settings after command-line overrides: {:?}", settings);
        Ok(())
    }
}

/// Checks a requested MIDI port against the available ones.
pub fn validate_device(device_name: &str, devices: &[String]) -> Result<(), String> {
    if !devices.iter().any(|d| d.contains(device_name)) {
        let mut error_msg = format!(
            "Error: MIDI output '{}' not found in available ports:\n",
            device_name
        );
        for device in devices {
            error_msg.push_str(&format!("  - {}\n", device));
        }
        return Err(error_msg);
    }
    Ok(())
}
