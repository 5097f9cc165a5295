//! Pre-session prompts for `--interactive`.

use crate::audio::SoundId;
use crate::config::Settings;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use log::info;

/// Asks for duration, start/end BPM and sound, starting from `settings`.
///
/// BPM answers are clamped like any other typed value; an unparseable
/// duration is asked again.
pub fn prompt_settings(settings: &mut Settings) -> Result<(), dialoguer::Error> {
    let theme = ColorfulTheme::default();

    loop {
        let minutes: f64 = Input::with_theme(&theme)
            .with_prompt("Session length (minutes)")
            .default(settings.session.duration_minutes())
            .interact_text()?;
        match settings.session.set_duration_minutes(minutes) {
            Ok(()) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    let start: String = Input::with_theme(&theme)
        .with_prompt("Start BPM")
        .default(settings.session.start_bpm().to_string())
        .interact_text()?;
    let start = settings.session.parse_bpm(&start);
    settings.session.set_start_bpm(i64::from(start));

    let end: String = Input::with_theme(&theme)
        .with_prompt("End BPM")
        .default(settings.session.end_bpm().to_string())
        .interact_text()?;
    let end = settings.session.parse_bpm(&end);
    settings.session.set_end_bpm(i64::from(end));

    let sounds: Vec<SoundId> = SoundId::all().collect();
    let labels: Vec<String> = sounds.iter().map(ToString::to_string).collect();
    let current = sounds
        .iter()
        .position(|s| *s == settings.sound)
        .unwrap_or_default();
    let choice = Select::with_theme(&theme)
        .with_prompt("Tick sound")
        .items(&labels)
        .default(current)
        .interact()?;
    if let Some(sound) = sounds.get(choice) {
        settings.sound = *sound;
    }

    info!("Interactive settings: {:?}", settings);
    Ok(())
}
