use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;

use super::phase::serialize_secs;

pub const DEFAULT_WORK_MINUTES: u64 = 20;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;
pub const DEFAULT_SHORT_BREAKS_BEFORE_LONG: u32 = 4;

// "25" means minutes; otherwise any of h/m/s in that order, e.g. "1h30m" or "90s".
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<plain>\d+)|(?:(?P<h>\d+)h)?(?:(?P<m>\d+)m)?(?:(?P<s>\d+)s)?)$")
        .expect("duration pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("a value is required")]
    Empty,
    #[error("`{0}` is not a valid number of minutes")]
    InvalidDuration(String),
    #[error("duration must be greater than zero")]
    ZeroDuration,
    #[error("`{0}` is not a valid count")]
    InvalidCount(String),
    #[error("count must be greater than zero")]
    ZeroCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionConfig {
    #[serde(serialize_with = "serialize_secs")]
    pub work_duration: Duration,
    #[serde(serialize_with = "serialize_secs")]
    pub short_break_duration: Duration,
    #[serde(serialize_with = "serialize_secs")]
    pub long_break_duration: Duration,
    pub short_breaks_before_long: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration: minutes(DEFAULT_WORK_MINUTES),
            short_break_duration: minutes(DEFAULT_SHORT_BREAK_MINUTES),
            long_break_duration: minutes(DEFAULT_LONG_BREAK_MINUTES),
            short_breaks_before_long: DEFAULT_SHORT_BREAKS_BEFORE_LONG,
        }
    }
}

impl SessionConfig {
    /// Builds a config from already-parsed values, rejecting zero durations and counts.
    pub fn new(
        work_duration: Duration,
        short_break_duration: Duration,
        long_break_duration: Duration,
        short_breaks_before_long: u32,
    ) -> Result<Self, ConfigError> {
        for duration in [work_duration, short_break_duration, long_break_duration] {
            if duration.is_zero() {
                return Err(ConfigError::ZeroDuration);
            }
        }
        if short_breaks_before_long == 0 {
            return Err(ConfigError::ZeroCount);
        }
        Ok(Self {
            work_duration,
            short_break_duration,
            long_break_duration,
            short_breaks_before_long,
        })
    }
}

pub fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

/// Parses a user-entered duration. A bare integer is a number of minutes.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ConfigError::Empty);
    }
    let invalid = || ConfigError::InvalidDuration(text.to_string());
    let captures = DURATION_RE.captures(text).ok_or_else(invalid)?;

    let field = |name: &str, scale: u64| -> Result<u64, ConfigError> {
        match captures.name(name) {
            Some(m) => m
                .as_str()
                .parse::<u64>()
                .ok()
                .and_then(|v| v.checked_mul(scale))
                .ok_or_else(invalid),
            None => Ok(0),
        }
    };

    let secs = [field("plain", 60)?, field("h", 3600)?, field("m", 60)?, field("s", 1)?]
        .into_iter()
        .try_fold(0u64, u64::checked_add)
        .ok_or_else(invalid)?;

    // "" matches the unit branch with nothing captured; already rejected above.
    if secs == 0 {
        return Err(ConfigError::ZeroDuration);
    }
    Ok(Duration::from_secs(secs))
}

pub fn parse_count(input: &str) -> Result<u32, ConfigError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(ConfigError::Empty);
    }
    let count = text
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidCount(text.to_string()))?;
    if count == 0 {
        return Err(ConfigError::ZeroCount);
    }
    Ok(count)
}

/// Inverse of [`parse_duration`] for pre-filling input fields.
pub fn duration_field(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs % 60 == 0 {
        return (secs / 60).to_string();
    }
    let (m, s) = (secs / 60, secs % 60);
    if m == 0 {
        format!("{s}s")
    } else {
        format!("{m}m{s}s")
    }
}
