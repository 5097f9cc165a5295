use breathtick::cli::{validate_device, Args};
use breathtick::config::{Settings, MAX_BPM};
use clap::Parser;
use std::fs;
use std::time::Duration;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("breathtick").chain(args.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn test_no_arguments_keeps_settings() {
    let args = parse(&[]);
    let mut settings = Settings::default();
    args.apply(&mut settings).unwrap();
    assert_eq!(settings, Settings::default());
    assert!(!args.autostart);
    assert!(!args.list_midi_outputs);
}

#[test]
fn test_bpm_arguments_are_clamped() {
    let args = parse(&["--start-bpm", "999", "--end-bpm", "abc"]);
    let mut settings = Settings::default();
    args.apply(&mut settings).unwrap();
    assert_eq!(settings.session.start_bpm(), MAX_BPM);
    assert_eq!(settings.session.end_bpm(), 10);
}

#[test]
fn test_oversized_bpm_clamps_to_maximum() {
    let args = parse(&[
        "--start-bpm",
        "99999999999999999999",
        "--end-bpm",
        "123456789012345678901",
    ]);
    let mut settings = Settings::default();
    args.apply(&mut settings).unwrap();
    assert_eq!(settings.session.start_bpm(), MAX_BPM);
    assert_eq!(settings.session.end_bpm(), MAX_BPM);
}

#[test]
fn test_oversized_duration_in_file_is_an_error() {
    let dir =
        std::env::temp_dir().join(format!("breathtick-duration-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    fs::write(&path, "duration_minutes = 1e18\n").unwrap();

    assert!(Settings::load(Some(&path)).is_err());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_min_bpm_applies_before_endpoints() {
    let args = parse(&["--min-bpm", "60", "-s", "40", "-e", "90"]);
    let mut settings = Settings::default();
    args.apply(&mut settings).unwrap();
    assert_eq!(settings.session.min_bpm(), 60);
    assert_eq!(settings.session.start_bpm(), 60);
    assert_eq!(settings.session.end_bpm(), 90);
}

#[test]
fn test_session_and_output_flags() {
    let args = parse(&[
        "-d",
        "2.5",
        "--hold-fraction",
        "0.3",
        "--sound",
        "3",
        "--bell",
        "--midi-output",
        "IAC",
        "--autostart",
        "--exit-on-complete",
        "--no-input",
    ]);
    let mut settings = Settings::default();
    args.apply(&mut settings).unwrap();
    assert_eq!(settings.session.total_duration(), Duration::from_secs(150));
    assert_eq!(settings.session.hold_fraction(), 0.3);
    assert_eq!(settings.sound.get(), 3);
    assert!(settings.bell);
    assert_eq!(settings.midi_output.as_deref(), Some("IAC"));
    assert!(args.autostart && args.exit_on_complete && args.no_input);
}

#[test]
fn test_invalid_values_are_errors() {
    let mut settings = Settings::default();
    assert!(parse(&["--sound", "9"]).apply(&mut settings).is_err());
    assert!(parse(&["--duration", "0"]).apply(&mut settings).is_err());
    assert!(parse(&["--min-bpm", "0"]).apply(&mut settings).is_err());
    assert!(parse(&["--duration", "1e18"]).apply(&mut settings).is_err());
    assert!(Args::try_parse_from(["breathtick", "--duration", "soon"]).is_err());
}

#[test]
fn test_settings_file_is_loaded() {
    let dir = std::env::temp_dir().join(format!("breathtick-cli-test-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    fs::write(
        &path,
        "duration_minutes = 10.0\nstart_bpm = 90\nend_bpm = 300\nsound = 1\nbell = true\n",
    )
    .unwrap();

    let args = parse(&["--config", path.to_str().unwrap(), "--end-bpm", "70"]);
    let mut settings = Settings::load(args.config.as_deref()).unwrap();
    assert_eq!(settings.session.total_duration(), Duration::from_secs(600));
    assert_eq!(settings.session.start_bpm(), 90);
    assert_eq!(settings.session.end_bpm(), MAX_BPM);
    assert_eq!(settings.sound.get(), 1);
    assert!(settings.bell);

    args.apply(&mut settings).unwrap();
    assert_eq!(settings.session.end_bpm(), 70);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_settings_file_is_an_error() {
    let path = std::env::temp_dir().join("breathtick-does-not-exist.toml");
    assert!(Settings::load(Some(&path)).is_err());
}

#[test]
fn test_validate_device() {
    let devices = vec!["IAC Driver Bus 1".to_string(), "USB MIDI".to_string()];
    assert!(validate_device("IAC", &devices).is_ok());
    let error_msg = validate_device("Missing", &devices).unwrap_err();
    assert!(error_msg.contains("Missing"));
    assert!(error_msg.contains("USB MIDI"));
}
