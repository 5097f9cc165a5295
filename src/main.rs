use breathtick::{
    audio::{list_output_ports, BellStrategy, FallbackPlayer, MidiStrategy, SilentStrategy},
    cli::{validate_device, Args},
    config::Settings,
    event_loop::{EngineMessage, EventLoop, ExitReason, TransportAction},
    interactive, logging,
    session::Session,
    tui::{spawn_input_thread, RawModeGuard},
    ui::TerminalView,
    SystemClock,
};
use clap::Parser;
use crossbeam::channel;
use std::sync::Arc;

fn main() {
    initialize_logging();
    let args = parse_command_line_arguments();

    if args.list_midi_outputs {
        list_available_devices();
        return;
    }

    let settings = load_settings(&args);
    let player = build_player(&settings);

    match run_session(&args, settings, player) {
        ExitReason::Quit => log::info!("Exited on user request"),
        ExitReason::Completed => log::info!("Exited after completing the session"),
        ExitReason::Disconnected => log::info!("Exited after input closed"),
    }
}

fn initialize_logging() {
    // The metronome still works without a log file.
    if let Err(e) = logging::init_logger() {
        eprintln!("Logging disabled: {}", e);
        return;
    }
    log::info!("Application starting");
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn exit_with_error(error_msg: String) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}

fn list_available_devices() {
    match list_output_ports() {
        Ok(devices) => {
            println!("Available MIDI outputs:");
            for device in devices {
                println!("  - {}", device);
            }
        }
        Err(e) => exit_with_error(format!("Error listing MIDI outputs: {}", e)),
    }
}

fn load_settings(args: &Args) -> Settings {
    let mut settings = Settings::load(args.config.as_deref())
        .unwrap_or_else(|e| exit_with_error(format!("Error loading settings: {}", e)));

    if let Err(e) = args.apply(&mut settings) {
        exit_with_error(format!("Error: {}", e));
    }

    if args.interactive {
        if let Err(e) = interactive::prompt_settings(&mut settings) {
            exit_with_error(format!("Error reading answers: {}", e));
        }
    }

    settings
}

fn build_player(settings: &Settings) -> FallbackPlayer {
    let mut player = FallbackPlayer::new();

    if let Some(device_name) = &settings.midi_output {
        let devices = list_output_ports().unwrap_or_default();
        if let Err(error_msg) = validate_device(device_name, &devices) {
            exit_with_error(error_msg);
        }
        match MidiStrategy::connect(device_name) {
            Ok(strategy) => {
                log::info!("Connected to MIDI output: {}", strategy.port_name());
                player.push(Box::new(strategy));
            }
            Err(e) => log::error!("MIDI output unavailable, continuing without it: {}", e),
        }
    }

    if settings.bell {
        player.push(Box::new(BellStrategy::stderr()));
    }
    player.push(Box::new(SilentStrategy));

    log::info!("Playback strategies: {:?}", player.strategy_names());
    player
}

fn run_session(args: &Args, settings: Settings, player: FallbackPlayer) -> ExitReason {
    let view = Arc::new(TerminalView::new(settings.session, settings.sound));

    let mut session = Session::new(settings.session, SystemClock, Box::new(player))
        .with_sound(settings.sound)
        .with_frame_interval(settings.frame_interval());
    session.add_handler(view);

    let (message_tx, message_rx) = channel::unbounded();

    if args.autostart {
        // Queued before the loop starts, so it is the first message handled.
        let _ = message_tx.send(EngineMessage::TransportCommand(TransportAction::Start));
    }

    let _raw_mode = if args.no_input {
        drop(message_tx);
        None
    } else {
        let guard = RawModeGuard::enable()
            .unwrap_or_else(|e| exit_with_error(format!("Error preparing terminal: {}", e)));
        spawn_input_thread(message_tx);
        Some(guard)
    };

    let mut event_loop = EventLoop::new(session, message_rx).exit_on_complete(args.exit_on_complete);
    log::info!("Application running. Press Q to exit...");
    event_loop.run()
}
