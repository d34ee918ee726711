use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::notify;
use crate::pomodoro::{
    ChannelListener, Countdown, Phase, SessionConfig, SessionController, SessionEvent,
};

/// One line of headless output.
#[derive(Debug, Serialize)]
pub struct EventLine<'a> {
    pub at: String,
    #[serde(flatten)]
    pub event: &'a SessionEvent,
    pub display: String,
}

impl<'a> EventLine<'a> {
    pub fn new(event: &'a SessionEvent) -> Self {
        Self {
            at: chrono::Local::now().to_rfc3339(),
            event,
            display: event.display(),
        }
    }
}

pub fn write_event(out: &mut impl Write, event: &SessionEvent) -> std::io::Result<()> {
    let json = serde_json::to_string(&EventLine::new(event))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    writeln!(out, "{}", json)?;
    out.flush()
}

/// Resolves once `signal` fires. A signal listener that fails to install never resolves,
/// so the loop keeps running instead of exiting right after startup.
pub async fn shutdown_on(signal: impl Future<Output = std::io::Result<()>>) {
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "cannot listen for shutdown signal; stop with SIGTERM");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HeadlessOptions {
    pub tick_period: Duration,
    pub advance_delay: Duration,
    pub notify: bool,
}

/// Cycles work and breaks forever, writing each session event as a JSON line to `out`.
/// Returns when `shutdown` resolves.
pub async fn run(
    config: SessionConfig,
    options: HeadlessOptions,
    out: &mut impl Write,
    shutdown: impl Future<Output = ()>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<SessionEvent>();
    let mut countdown = Countdown::new(
        SessionController::new(config, ChannelListener::new(tx)),
        options.tick_period,
    );
    countdown.start_work();

    tokio::pin!(shutdown);
    let mut next: Option<(Phase, Instant)> = None;

    loop {
        let deadline = next.map(|(_, at)| at).unwrap_or_else(Instant::now);
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("shutting down");
                break;
            }
            _ = tokio::time::sleep_until(deadline), if next.is_some() => {
                if let Some((completed, _)) = next.take() {
                    if completed.is_break() {
                        countdown.start_work();
                    } else {
                        countdown.start_break();
                    }
                }
            }
            event = rx.recv() => {
                let Some(event) = event else { break };
                write_event(out, &event)?;
                if let SessionEvent::PhaseComplete { phase } = event {
                    if options.notify {
                        notify::notify_phase_complete(phase);
                    }
                    next = Some((phase, Instant::now() + options.advance_delay));
                }
            }
        }
    }

    countdown.cancel();
    Ok(())
}
