pub mod config;
pub mod controller;
pub mod countdown;
pub mod events;
pub mod phase;

pub use config::{ConfigError, SessionConfig};
pub use controller::{RunState, SessionController, SessionSnapshot, TICK_UNIT, TickOutcome};
pub use countdown::Countdown;
pub use events::{ChannelListener, NoopListener, SessionEvent, SessionListener};
pub use phase::{Phase, format_time};
