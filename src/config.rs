//! Deprivation and check-in settings, loaded from the environment at startup.
//!
//! A `.env` file in the working directory is honoured outside of tests.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
    #[error("Threshold must be between 0 and 100, got {0}")]
    ThresholdOutOfRange(f64),
    #[error("Total sessions must be greater than zero")]
    NoSessions,
}

/// Administrator-controlled deprivation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeprivationSettings {
    pub threshold_percentage: f64,
    pub total_sessions: u32,
    pub notify_teacher: bool,
    pub notify_student: bool,
    pub require_confirmation: bool,
}

impl Default for DeprivationSettings {
    fn default() -> Self {
        Self {
            threshold_percentage: 25.0,
            total_sessions: 30,
            notify_teacher: true,
            notify_student: true,
            require_confirmation: false,
        }
    }
}

impl DeprivationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.threshold_percentage) {
            return Err(ConfigError::ThresholdOutOfRange(self.threshold_percentage));
        }
        if self.total_sessions == 0 {
            return Err(ConfigError::NoSessions);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckInSettings {
    pub session_start: NaiveTime,
    pub late_grace_minutes: i64,
}

impl CheckInSettings {
    pub fn new(session_start: NaiveTime, late_grace_minutes: i64) -> Self {
        Self {
            session_start,
            late_grace_minutes: late_grace_minutes.max(0),
        }
    }

    /// Cutoff for an on-time arrival, or `None` when the grace period runs
    /// past midnight, in which case the rest of the day counts as on time.
    pub fn late_after(&self) -> Option<NaiveTime> {
        let (cutoff, wrapped) = self
            .session_start
            .overflowing_add_signed(Duration::minutes(self.late_grace_minutes));
        (wrapped == 0).then_some(cutoff)
    }

    pub fn is_late(&self, arrived_at: NaiveTime) -> bool {
        self.late_after().is_some_and(|cutoff| arrived_at > cutoff)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub deprivation: DeprivationSettings,
    pub late_grace_minutes: i64,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let defaults = DeprivationSettings::default();
        let deprivation = DeprivationSettings {
            threshold_percentage: parse_var("ATTENDANCE_THRESHOLD", defaults.threshold_percentage)?,
            total_sessions: parse_var("ATTENDANCE_TOTAL_SESSIONS", defaults.total_sessions)?,
            notify_teacher: parse_var("ATTENDANCE_NOTIFY_TEACHER", defaults.notify_teacher)?,
            notify_student: parse_var("ATTENDANCE_NOTIFY_STUDENT", defaults.notify_student)?,
            require_confirmation: parse_var(
                "ATTENDANCE_REQUIRE_CONFIRMATION",
                defaults.require_confirmation,
            )?,
        };
        deprivation.validate()?;

        let late_grace_minutes = parse_var("ATTENDANCE_LATE_GRACE_MINUTES", 10i64)?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            deprivation,
            late_grace_minutes,
            log_level,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
