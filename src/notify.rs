use notify_rust::Notification;

use crate::pomodoro::Phase;

/// Prompt shown when `completed` ends; names what comes next.
pub fn phase_complete_message(completed: Phase) -> &'static str {
    if completed.is_work() {
        "Work session complete! Time for a break."
    } else {
        "Break is over! Back to work."
    }
}

pub fn send_notification(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    Notification::new()
        .summary("Pomodoro Timer")
        .body(message)
        .timeout(5000)
        .show()?;
    Ok(())
}

/// Fires the desktop notification off the async runtime; failures are only logged.
pub fn notify_phase_complete(completed: Phase) {
    let message = phase_complete_message(completed);
    tokio::task::spawn_blocking(move || {
        if let Err(e) = send_notification(message) {
            tracing::warn!(error = %e, "failed to send notification");
        }
    });
}
