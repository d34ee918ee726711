use crossterm::{
    cursor::Show,
    event::{self, Event as CtEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};
use std::io;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app::{App, AppEvent, AppOptions};
use crate::pomodoro::SessionConfig;
use crate::ui;

/// Reads terminal input on a dedicated thread; crossterm's `read` blocks.
fn spawn_input_reader(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || loop {
        let forwarded = match event::read() {
            Ok(CtEvent::Key(key)) => tx.send(AppEvent::Key(key)),
            Ok(CtEvent::Resize(_, _)) => tx.send(AppEvent::Resize),
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "terminal input failed");
                break;
            }
        };
        if forwarded.is_err() {
            break;
        }
    });
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)
}

/// Puts the terminal back on every exit path, early errors and panics included.
struct TerminalGuard {
    restore: fn() -> io::Result<()>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard {
            restore: restore_terminal,
        };
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            previous(info);
        }));
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = (self.restore)() {
            tracing::error!(error = %e, "failed to restore terminal");
        }
    }
}

pub async fn run(
    config: SessionConfig,
    options: AppOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let (tx, rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());
    let mut app = App::new(config, tx, options);

    event_loop(&mut terminal, &mut app, rx).await
}

pub async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: UnboundedReceiver<AppEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    terminal.draw(|f| ui::draw(app, f))?;

    while let Some(event) = events.recv().await {
        app.handle_event(event);
        if app.should_quit {
            tracing::info!(snapshot = ?app.snapshot(), "quitting");
            break;
        }
        terminal.draw(|f| ui::draw(app, f))?;
    }

    Ok(())
}
