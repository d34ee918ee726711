use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use super::phase::{Phase, format_time, serialize_secs};

/// Receives notifications from a [`super::SessionController`].
///
/// Called with the controller locked, so implementations must not block.
pub trait SessionListener: Send {
    fn on_time_updated(&mut self, remaining: Duration, phase: Phase);
    fn on_phase_complete(&mut self, completed: Phase);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    TimeUpdated {
        phase: Phase,
        #[serde(rename = "remaining_secs", serialize_with = "serialize_secs")]
        remaining: Duration,
    },
    PhaseComplete {
        phase: Phase,
    },
}

impl SessionEvent {
    pub fn phase(&self) -> Phase {
        match self {
            SessionEvent::TimeUpdated { phase, .. } | SessionEvent::PhaseComplete { phase } => {
                *phase
            }
        }
    }

    /// Remaining time as `MM:SS`; a completed phase has none left.
    pub fn display(&self) -> String {
        match self {
            SessionEvent::TimeUpdated { remaining, .. } => format_time(*remaining),
            SessionEvent::PhaseComplete { .. } => format_time(Duration::ZERO),
        }
    }
}

/// Listener that drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl SessionListener for NoopListener {
    fn on_time_updated(&mut self, _remaining: Duration, _phase: Phase) {}
    fn on_phase_complete(&mut self, _completed: Phase) {}
}

/// Forwards notifications into an unbounded channel, converted to the receiver's event type.
pub struct ChannelListener<T> {
    tx: UnboundedSender<T>,
}

impl<T> ChannelListener<T> {
    pub fn new(tx: UnboundedSender<T>) -> Self {
        Self { tx }
    }
}

impl<T> SessionListener for ChannelListener<T>
where
    T: From<SessionEvent> + Send,
{
    fn on_time_updated(&mut self, remaining: Duration, phase: Phase) {
        // A closed receiver means the UI is gone; nothing left to update.
        let _ = self
            .tx
            .send(SessionEvent::TimeUpdated { phase, remaining }.into());
    }

    fn on_phase_complete(&mut self, completed: Phase) {
        if self
            .tx
            .send(SessionEvent::PhaseComplete { phase: completed }.into())
            .is_err()
        {
            tracing::debug!(phase = completed.as_str(), "phase completed with no receiver");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_time_updated_serialization() {
        let event = SessionEvent::TimeUpdated {
            phase: Phase::Work,
            remaining: Duration::from_secs(1199),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"time_updated\""));
        assert!(json.contains("\"phase\":\"work\""));
        assert!(json.contains("\"remaining_secs\":1199"));
        assert_eq!(event.display(), "19:59");
    }

    #[test]
    fn test_phase_complete_serialization() {
        let event = SessionEvent::PhaseComplete {
            phase: Phase::LongBreak,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"phase_complete","phase":"long_break"}"#);
        assert_eq!(event.display(), "00:00");
    }

    #[test]
    fn test_channel_listener_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
        let mut listener = ChannelListener::new(tx);
        listener.on_time_updated(Duration::from_secs(3), Phase::ShortBreak);
        listener.on_phase_complete(Phase::ShortBreak);

        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::TimeUpdated {
                phase: Phase::ShortBreak,
                remaining: Duration::from_secs(3)
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::PhaseComplete {
                phase: Phase::ShortBreak
            }
        );
    }

    #[test]
    fn test_channel_listener_survives_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<SessionEvent>();
        drop(rx);
        let mut listener = ChannelListener::new(tx);
        listener.on_time_updated(Duration::from_secs(1), Phase::Work);
        listener.on_phase_complete(Phase::Work);
    }
}
