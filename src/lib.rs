// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod config_form;
pub mod headless;
pub mod logging;
pub mod notify;
pub mod pomodoro;
pub mod tui;
pub mod ui;
