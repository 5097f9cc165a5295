use super::{AudioError, PlaybackStrategy, SoundId};
use log::{debug, error, info};
use midir::{MidiOutput, MidiOutputConnection};

/// General MIDI percussion lives on channel 10.
const PERCUSSION_CHANNEL: u8 = 9;
const CLIENT_NAME: &str = "breathtick-output";

/// Plays ticks as percussion notes on a MIDI output port.
pub struct MidiStrategy {
    connection: MidiOutputConnection,
    port_name: String,
    channel: u8,
}

impl MidiStrategy {
    /// Connects to the first output port whose name contains `device_name`.
    pub fn connect(device_name: &str) -> Result<Self, AudioError> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;

        let out_ports = midi_out.ports();
        let available_ports: Vec<String> = out_ports
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect();
        info!("Available MIDI output ports: {:?}", available_ports);

        let port = out_ports
            .iter()
            .find(|p| {
                midi_out
                    .port_name(p)
                    .unwrap_or_default()
                    .contains(device_name)
            })
            .ok_or_else(|| {
                error!("MIDI output device '{}' not found", device_name);
                AudioError::DeviceNotFound(device_name.to_string())
            })?;

        let port_name = midi_out.port_name(port)?;
        info!("Connecting to MIDI output port: {}", port_name);

        let connection = midi_out
            .connect(port, "breathtick-output-conn")
            .map_err(|e| AudioError::Connect(e.to_string()))?;

        Ok(MidiStrategy {
            connection,
            port_name,
            channel: PERCUSSION_CHANNEL,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl PlaybackStrategy for MidiStrategy {
    fn name(&self) -> &str {
        "midi"
    }

    fn play(&mut self, sound: SoundId) -> Result<(), AudioError> {
        let note = sound.midi_note();
        let velocity = sound.velocity();
        debug!(
            "Sending MIDI tick: ch={}, note={}, vel={}",
            self.channel, note, velocity
        );
        // Percussion voices decay on their own, so the note is released at once.
        self.connection
            .send(&[0x90 | (self.channel & 0x0F), note, velocity])?;
        self.connection
            .send(&[0x80 | (self.channel & 0x0F), note, 0])?;
        Ok(())
    }
}

/// Names of all MIDI output ports on this machine.
pub fn list_output_ports() -> Result<Vec<String>, AudioError> {
    let midi_out = MidiOutput::new("breathtick-port-lister")?;
    let ports = midi_out.ports();
    let port_names = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();
    Ok(port_names)
}
