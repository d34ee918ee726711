use crate::pomodoro::config::{duration_field, parse_count, parse_duration};
use crate::pomodoro::{ConfigError, SessionConfig};

pub const FIELD_LABELS: [&str; 4] = [
    "Work time (minutes)",
    "Short break (minutes)",
    "Long break (minutes)",
    "Short breaks before long",
];

/// Editable copy of a [`SessionConfig`]; nothing reaches the controller until it validates.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigForm {
    pub fields: [String; 4],
    pub focused: usize,
    pub error: Option<String>,
}

impl ConfigForm {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            fields: [
                duration_field(config.work_duration),
                duration_field(config.short_break_duration),
                duration_field(config.long_break_duration),
                config.short_breaks_before_long.to_string(),
            ],
            focused: 0,
            error: None,
        }
    }

    pub fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.fields.len();
    }

    pub fn focus_prev(&mut self) {
        self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
    }

    pub fn push(&mut self, c: char) {
        if c.is_ascii_alphanumeric() {
            self.fields[self.focused].push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        self.fields[self.focused].pop();
        self.error = None;
    }

    /// Parses every field. On failure the offending field gets focus and `error` is set.
    pub fn submit(&mut self) -> Option<SessionConfig> {
        match self.parse() {
            Ok(config) => Some(config),
            Err((index, e)) => {
                self.focused = index;
                self.error = Some(format!("{}: {}", FIELD_LABELS[index], e));
                None
            }
        }
    }

    fn parse(&self) -> Result<SessionConfig, (usize, ConfigError)> {
        let work = parse_duration(&self.fields[0]).map_err(|e| (0, e))?;
        let short = parse_duration(&self.fields[1]).map_err(|e| (1, e))?;
        let long = parse_duration(&self.fields[2]).map_err(|e| (2, e))?;
        let count = parse_count(&self.fields[3]).map_err(|e| (3, e))?;
        SessionConfig::new(work, short, long, count).map_err(|e| (0, e))
    }
}
