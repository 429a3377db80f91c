use crate::error::{ExtenderError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Selector ranges shown in the window.
pub const HOURS_MAX: u32 = 1000;
pub const MINUTES_MAX: u32 = 59;
pub const TIMES_MAX: u32 = 1000;

/// How the output length is chosen. The two modes are mutually exclusive:
/// an explicit repeat count ignores the duration selectors entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    ExplicitRepeat { times: u32 },
    TargetDuration { hours: u32, minutes: u32 },
}

impl Default for LoopMode {
    fn default() -> Self {
        LoopMode::TargetDuration { hours: 1, minutes: 0 }
    }
}

/// A single edit of one of the three selectors.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FormEdit {
    Hours(u32),
    Minutes(u32),
    Times(u32),
}

/// What the window renders for the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopModeView {
    pub hours: u32,
    pub minutes: u32,
    pub times: u32,
    pub duration_enabled: bool,
}

impl LoopMode {
    /// Apply a selector edit and return the resulting mode.
    pub fn apply(self, edit: FormEdit) -> Self {
        match (self, edit) {
            // zero on an already-zero count leaves the duration alone
            (mode @ LoopMode::TargetDuration { .. }, FormEdit::Times(0)) => mode,
            (_, FormEdit::Times(times)) => {
                let times = times.min(TIMES_MAX);
                if times > 0 {
                    LoopMode::ExplicitRepeat { times }
                } else {
                    LoopMode::TargetDuration { hours: 0, minutes: 0 }
                }
            }
            (LoopMode::TargetDuration { minutes, .. }, FormEdit::Hours(hours)) => {
                LoopMode::TargetDuration {
                    hours: hours.min(HOURS_MAX),
                    minutes,
                }
            }
            (LoopMode::TargetDuration { hours, .. }, FormEdit::Minutes(minutes)) => {
                LoopMode::TargetDuration {
                    hours,
                    minutes: minutes.min(MINUTES_MAX),
                }
            }
            (LoopMode::ExplicitRepeat { .. }, FormEdit::Hours(hours)) if hours > 0 => {
                LoopMode::TargetDuration {
                    hours: hours.min(HOURS_MAX),
                    minutes: 0,
                }
            }
            (LoopMode::ExplicitRepeat { .. }, FormEdit::Minutes(minutes)) if minutes > 0 => {
                LoopMode::TargetDuration {
                    hours: 0,
                    minutes: minutes.min(MINUTES_MAX),
                }
            }
            (mode @ LoopMode::ExplicitRepeat { .. }, _) => mode,
        }
    }

    pub fn view(&self) -> LoopModeView {
        match *self {
            LoopMode::ExplicitRepeat { times } => LoopModeView {
                hours: 0,
                minutes: 0,
                times,
                duration_enabled: false,
            },
            LoopMode::TargetDuration { hours, minutes } => LoopModeView {
                hours,
                minutes,
                times: 0,
                duration_enabled: true,
            },
        }
    }

    /// Reject a zero target and values outside the selector ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            LoopMode::ExplicitRepeat { times } => check_range("Times", times, 1, TIMES_MAX),
            LoopMode::TargetDuration { hours, minutes } => {
                check_range("Hours", hours, 0, HOURS_MAX)?;
                check_range("Minutes", minutes, 0, MINUTES_MAX)?;
                if hours == 0 && minutes == 0 {
                    return Err(ExtenderError::EmptyTarget);
                }
                Ok(())
            }
        }
    }

    pub fn target_seconds(&self) -> Option<u64> {
        match *self {
            LoopMode::ExplicitRepeat { .. } => None,
            LoopMode::TargetDuration { hours, minutes } => {
                Some(hours as u64 * 3600 + minutes as u64 * 60)
            }
        }
    }

    /// Number of copies of the input needed. `duration` must be positive.
    pub fn repeat_count(&self, duration: f64) -> u32 {
        match *self {
            LoopMode::ExplicitRepeat { times } => times,
            LoopMode::TargetDuration { .. } => {
                let target = self.target_seconds().unwrap_or(0) as f64;
                // `as` saturates, so a tiny duration cannot wrap around
                (target / duration).ceil() as u32
            }
        }
    }

    /// Suffix appended to the file stem of the output.
    pub fn output_suffix(&self) -> String {
        match *self {
            LoopMode::ExplicitRepeat { times } => format!("{}times", times),
            LoopMode::TargetDuration { hours, minutes } if minutes > 0 => {
                format!("{}h{}m", hours, minutes)
            }
            LoopMode::TargetDuration { hours, .. } => format!("{}h", hours),
        }
    }

    /// Output file next to `input`, keeping its extension.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_name = match input.extension() {
            Some(ext) => format!("{}_{}.{}", stem, self.output_suffix(), ext.to_string_lossy()),
            None => format!("{}_{}", stem, self.output_suffix()),
        };
        input.with_file_name(file_name)
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<()> {
    if value < min || value > max {
        return Err(ExtenderError::OutOfRange { field, value, min, max });
    }
    Ok(())
}
