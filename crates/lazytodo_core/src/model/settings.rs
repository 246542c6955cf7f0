//! User-configurable reminder settings.
//!
//! # Invariants
//! - `delay_minutes` always lies within `[MIN_REMINDER_DELAY_MINUTES, MAX_REMINDER_DELAY_MINUTES]`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_REMINDER_DELAY_MINUTES: u32 = 5;
pub const MIN_REMINDER_DELAY_MINUTES: u32 = 1;
pub const MAX_REMINDER_DELAY_MINUTES: u32 = 1440;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    DelayOutOfRange(u32),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DelayOutOfRange(value) => write!(
                f,
                "reminder delay {value} is outside {MIN_REMINDER_DELAY_MINUTES}..={MAX_REMINDER_DELAY_MINUTES} minutes"
            ),
        }
    }
}

impl Error for SettingsError {}

/// Reminder delay applied when scheduling a new task notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub delay_minutes: u32,
}

impl ReminderSettings {
    /// Builds settings, clamping `delay_minutes` into the supported range.
    pub fn new(delay_minutes: u32) -> Self {
        Self {
            delay_minutes: delay_minutes
                .clamp(MIN_REMINDER_DELAY_MINUTES, MAX_REMINDER_DELAY_MINUTES),
        }
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            delay_minutes: DEFAULT_REMINDER_DELAY_MINUTES,
        }
    }
}

/// Rejects delays outside the supported range.
pub fn validate_delay_minutes(minutes: u32) -> Result<u32, SettingsError> {
    if (MIN_REMINDER_DELAY_MINUTES..=MAX_REMINDER_DELAY_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(SettingsError::DelayOutOfRange(minutes))
    }
}
