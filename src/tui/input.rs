use crate::audio::SoundId;
use crate::event_loop::{EngineMessage, TransportAction};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// BPM change per arrow-key press.
pub const BPM_STEP: i64 = 5;

pub fn map_key_event(key: KeyEvent) -> Option<EngineMessage> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(EngineMessage::Quit)
        }
        KeyCode::Char(' ') => Some(EngineMessage::TransportCommand(TransportAction::TogglePause)),
        KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(EngineMessage::TransportCommand(TransportAction::Stop))
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(EngineMessage::Quit),
        KeyCode::Left => Some(EngineMessage::NudgeStartBpm(-BPM_STEP)),
        KeyCode::Right => Some(EngineMessage::NudgeStartBpm(BPM_STEP)),
        KeyCode::Down => Some(EngineMessage::NudgeEndBpm(-BPM_STEP)),
        KeyCode::Up => Some(EngineMessage::NudgeEndBpm(BPM_STEP)),
        KeyCode::Char(c) => c
            .to_digit(10)
            .and_then(|d| SoundId::new(d as u8).ok())
            .map(EngineMessage::SelectSound),
        _ => None,
    }
}
