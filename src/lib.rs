pub mod audio;
pub mod cli;
pub mod clock;
pub mod config;
pub mod curve;
pub mod event_loop;
pub mod interactive;
pub mod logging;
pub mod progress;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod tui;
pub mod ui;

pub use audio::{FallbackPlayer, SoundId, TickSink};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{SessionConfig, Settings};
pub use curve::bpm_at;
pub use event_loop::{EngineMessage, EventLoop, ExitReason, TransportAction};
pub use session::{Session, SessionEvent, SessionHandler};
pub use state::TransportState;
