//! Error types for slot-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{Minutes, TemplateId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid window #{index} [{time_start}, {time_end}]: {reason}")]
    InvalidWindow {
        index: usize,
        time_start: Minutes,
        time_end: Minutes,
        reason: String,
    },

    #[error("Invalid template {id}: {reason}")]
    InvalidTemplate { id: TemplateId, reason: String },

    #[error("Invalid duration constraints: min {min}, max {max}")]
    InvalidConstraints { min: Minutes, max: Minutes },

    #[error("Unbookable window: {window_minutes} minutes available, {min_duration} required")]
    UnbookableWindow {
        window_minutes: Minutes,
        min_duration: Minutes,
    },

    #[error("No window at or after minute {start}")]
    NoWindow { start: Minutes },

    #[error("Date range {from}..={to} exceeds {max_days} days")]
    RangeTooLong {
        from: NaiveDate,
        to: NaiveDate,
        max_days: i64,
    },

    #[error("Venue closed on {date}")]
    Closed { date: NaiveDate },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
