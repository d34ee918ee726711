use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::config_form::ConfigForm;
use crate::notify;
use crate::pomodoro::{
    ChannelListener, Countdown, Phase, SessionConfig, SessionController, SessionEvent,
    SessionSnapshot, TICK_UNIT,
};

/// Pause between a phase ending and the next one starting on its own.
pub const AUTO_ADVANCE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Session(SessionEvent),
    /// The auto-advance delay after `completed` has elapsed.
    Advance(Phase),
}

impl From<SessionEvent> for AppEvent {
    fn from(event: SessionEvent) -> Self {
        AppEvent::Session(event)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Timer,
    Config(ConfigForm),
}

/// Which commands the user may issue right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub suspend: bool,
}

impl Controls {
    pub fn for_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            start: !snapshot.is_running(),
            suspend: snapshot.is_running() || snapshot.is_suspended(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub tick_period: Duration,
    pub advance_delay: Duration,
    pub notify: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            tick_period: TICK_UNIT,
            advance_delay: AUTO_ADVANCE_DELAY,
            notify: true,
        }
    }
}

#[derive(Debug)]
pub struct App {
    countdown: Countdown,
    events: UnboundedSender<AppEvent>,
    options: AppOptions,
    pending_advance: Option<JoinHandle<()>>,
    pub screen: Screen,
    /// Prompt shown while waiting to auto-advance.
    pub banner: Option<&'static str>,
    pub should_quit: bool,
}

impl App {
    /// Session notifications and the auto-advance timer report back through `events`.
    pub fn new(
        config: SessionConfig,
        events: UnboundedSender<AppEvent>,
        options: AppOptions,
    ) -> Self {
        let controller = SessionController::new(config, ChannelListener::new(events.clone()));
        Self {
            countdown: Countdown::new(controller, options.tick_period),
            events,
            options,
            pending_advance: None,
            screen: Screen::Timer,
            banner: None,
            should_quit: false,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.countdown.snapshot()
    }

    pub fn controls(&self) -> Controls {
        Controls::for_snapshot(&self.snapshot())
    }

    pub fn has_pending_advance(&self) -> bool {
        self.pending_advance.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::Session(SessionEvent::PhaseComplete { phase }) => {
                self.on_phase_complete(phase)
            }
            AppEvent::Session(SessionEvent::TimeUpdated { .. }) => {}
            AppEvent::Advance(completed) => self.advance(completed),
        }
    }

    pub fn start_work(&mut self) {
        if !self.controls().start {
            return;
        }
        self.cancel_advance();
        self.countdown.start_work();
    }

    pub fn start_break(&mut self) {
        if !self.controls().start {
            return;
        }
        self.cancel_advance();
        self.countdown.start_break();
    }

    pub fn suspend(&mut self) {
        if self.controls().suspend {
            self.countdown.suspend();
        }
    }

    pub fn open_config(&mut self) {
        self.screen = Screen::Config(ConfigForm::from_config(&self.snapshot().config));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Screen::Config(form) = &mut self.screen {
            match key.code {
                KeyCode::Esc => self.screen = Screen::Timer,
                KeyCode::Enter => {
                    if let Some(config) = form.submit() {
                        self.countdown.update_config(config);
                        self.screen = Screen::Timer;
                    }
                }
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.backspace(),
                KeyCode::Char(c) => form.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('w') => self.start_work(),
            KeyCode::Char('b') => self.start_break(),
            KeyCode::Char('s') | KeyCode::Char(' ') => self.suspend(),
            KeyCode::Char('c') => self.open_config(),
            _ => {}
        }
    }

    fn on_phase_complete(&mut self, completed: Phase) {
        tracing::info!(
            phase = completed.as_str(),
            at = %chrono::Local::now().format("%H:%M:%S"),
            "phase complete, advancing shortly"
        );
        if self.options.notify {
            notify::notify_phase_complete(completed);
        }
        self.cancel_advance();
        self.banner = Some(notify::phase_complete_message(completed));

        let events = self.events.clone();
        let delay = self.options.advance_delay;
        self.pending_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(AppEvent::Advance(completed));
        }));
    }

    fn advance(&mut self, completed: Phase) {
        // Sent just before a manual start cancelled it.
        if self.pending_advance.take().is_none() {
            return;
        }
        self.banner = None;
        if completed.is_break() {
            self.countdown.start_work();
        } else {
            self.countdown.start_break();
        }
    }

    fn cancel_advance(&mut self) {
        self.banner = None;
        if let Some(task) = self.pending_advance.take() {
            task.abort();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.cancel_advance();
    }
}
