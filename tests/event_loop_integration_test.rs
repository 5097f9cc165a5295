extern crate breathtick;

use breathtick::audio::{AudioError, SoundId, TickSink};
use breathtick::clock::{ManualClock, SystemClock};
use breathtick::config::SessionConfig;
use breathtick::event_loop::{EngineMessage, EventLoop, ExitReason, TransportAction};
use breathtick::session::Session;
use breathtick::state::TransportState;
use crossbeam::channel;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Default)]
struct SharedSink {
    ticks: Arc<Mutex<u64>>,
}

impl TickSink for SharedSink {
    fn play_tick(&mut self, _sound: SoundId) -> Result<(), AudioError> {
        *self.ticks.lock().unwrap() += 1;
        Ok(())
    }
}

fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn short_config() -> SessionConfig {
    // 0.6 s between 100 and 200 BPM.
    SessionConfig::new(0.01, 200, 200)
        .unwrap()
        .with_min_bpm(100)
        .unwrap()
}

#[test]
fn integration_test_session_completes_in_real_time() {
    init_test_logger();
    let sink = SharedSink::default();
    let session = Session::new(short_config(), SystemClock, Box::new(sink.clone()))
        .with_frame_interval(Duration::from_millis(10));

    let (engine_tx, engine_rx) = channel::unbounded();
    let mut event_loop = EventLoop::new(session, engine_rx).exit_on_complete(true);

    let started = Instant::now();
    let handle = thread::spawn(move || {
        let reason = event_loop.run();
        (reason, event_loop.into_session())
    });

    engine_tx
        .send(EngineMessage::TransportCommand(TransportAction::Start))
        .unwrap();

    let (reason, session) = handle.join().expect("Event loop thread panicked");
    let took = started.elapsed();

    assert_eq!(reason, ExitReason::Completed);
    assert_eq!(session.completed_runs(), 1);
    assert_eq!(session.transport(), TransportState::Idle);
    assert!(took >= Duration::from_millis(600), "finished early: {:?}", took);
    assert!(took < Duration::from_secs(5), "finished late: {:?}", took);

    let ticks = *sink.ticks.lock().unwrap();
    assert!((1..=4).contains(&ticks), "unexpected tick count {}", ticks);
    drop(engine_tx);
}

#[test]
fn integration_test_quit_stops_running_session() {
    init_test_logger();
    let session = Session::new(
        SessionConfig::default(),
        SystemClock,
        Box::new(SharedSink::default()),
    );
    let (engine_tx, engine_rx) = channel::unbounded();
    let mut event_loop = EventLoop::new(session, engine_rx);

    engine_tx
        .send(EngineMessage::TransportCommand(TransportAction::Start))
        .unwrap();
    engine_tx.send(EngineMessage::Quit).unwrap();

    assert_eq!(event_loop.run(), ExitReason::Quit);
    assert_eq!(event_loop.session().transport(), TransportState::Idle);
    assert_eq!(event_loop.session().completed_runs(), 0);
}

#[test]
fn integration_test_closed_channel_finishes_session_then_exits() {
    init_test_logger();
    let sink = SharedSink::default();
    let session = Session::new(short_config(), SystemClock, Box::new(sink.clone()));
    let (engine_tx, engine_rx) = channel::unbounded();
    let mut event_loop = EventLoop::new(session, engine_rx);

    engine_tx
        .send(EngineMessage::TransportCommand(TransportAction::Start))
        .unwrap();
    drop(engine_tx);

    assert_eq!(event_loop.run(), ExitReason::Disconnected);
    assert_eq!(event_loop.session().completed_runs(), 1);
    assert!(*sink.ticks.lock().unwrap() >= 1);
}

#[test]
fn integration_test_idle_loop_exits_when_inputs_close() {
    let session = Session::new(
        SessionConfig::default(),
        ManualClock::new(),
        Box::new(SharedSink::default()),
    );
    let (engine_tx, engine_rx) = channel::unbounded::<EngineMessage>();
    drop(engine_tx);

    let mut event_loop = EventLoop::new(session, engine_rx);
    assert_eq!(event_loop.run(), ExitReason::Disconnected);
}

#[test]
fn test_messages_edit_session() {
    let session = Session::new(
        SessionConfig::default(),
        ManualClock::new(),
        Box::new(SharedSink::default()),
    );
    let (_engine_tx, engine_rx) = channel::unbounded();
    let mut event_loop = EventLoop::new(session, engine_rx);

    event_loop.handle_message(EngineMessage::NudgeStartBpm(5));
    event_loop.handle_message(EngineMessage::NudgeEndBpm(-5));
    event_loop.handle_message(EngineMessage::SetDuration(2.0));
    event_loop.handle_message(EngineMessage::SelectSound(SoundId::new(4).unwrap()));

    let session = event_loop.session();
    assert_eq!(session.config().start_bpm(), 125);
    assert_eq!(session.config().end_bpm(), 75);
    assert_eq!(session.config().total_duration(), Duration::from_secs(120));
    assert_eq!(session.sound().get(), 4);
    assert_eq!(session.display_bpm(), 125);

    event_loop.handle_message(EngineMessage::TransportCommand(TransportAction::Start));
    event_loop.handle_message(EngineMessage::SetDuration(9.0));
    assert_eq!(
        event_loop.session().config().total_duration(),
        Duration::from_secs(120)
    );
    event_loop.handle_message(EngineMessage::SetStartBpm(500));
    assert_eq!(event_loop.session().config().start_bpm(), 200);
    assert_eq!(event_loop.session().display_bpm(), 125);
}
