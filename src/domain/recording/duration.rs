//! Duration value object

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default safety limit for a single recording (10 minutes)
pub const DEFAULT_MAX_DURATION_SECS: u64 = 600;

/// Value object representing a time duration.
/// Immutable and validated on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    milliseconds: u64,
}

impl Duration {
    /// Create a Duration from milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self { milliseconds: ms }
    }

    /// Create a Duration from seconds
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            milliseconds: secs * 1000,
        }
    }

    /// Default recording safety limit
    pub const fn default_max_duration() -> Self {
        Self::from_secs(DEFAULT_MAX_DURATION_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.milliseconds / 1000
    }

    pub const fn as_millis(&self) -> u64 {
        self.milliseconds
    }

    /// Convert to std::time::Duration
    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_millis(self.milliseconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Parse "30s", "1m", "2m30s" or "90s".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let invalid = || DurationParseError {
            input: s.to_string(),
        };

        let mut minutes: Option<u64> = None;
        let mut seconds: Option<u64> = None;
        let mut digits = String::new();

        for ch in input.chars() {
            match ch {
                '0'..='9' => digits.push(ch),
                // minutes must come first and only once
                'm' if !digits.is_empty() && minutes.is_none() && seconds.is_none() => {
                    minutes = Some(digits.parse().map_err(|_| invalid())?);
                    digits.clear();
                }
                's' if !digits.is_empty() && seconds.is_none() => {
                    seconds = Some(digits.parse().map_err(|_| invalid())?);
                    digits.clear();
                }
                _ => return Err(invalid()),
            }
        }

        if !digits.is_empty() || (minutes.is_none() && seconds.is_none()) {
            return Err(invalid());
        }

        let total_secs = minutes
            .unwrap_or(0)
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds.unwrap_or(0)))
            .ok_or_else(invalid)?;

        if total_secs == 0 {
            return Err(invalid());
        }

        Ok(Self::from_secs(total_secs))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;

        if minutes == 0 {
            write!(f, "{}s", seconds)
        } else if seconds == 0 {
            write!(f, "{}m", minutes)
        } else {
            write!(f, "{}m{}s", minutes, seconds)
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_max_duration()
    }
}
