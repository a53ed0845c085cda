//! Value objects consumed and produced by the engine.
//!
//! Everything here is an immutable snapshot handed in by the template store.
//! The engine never mutates a template; "updates" such as
//! [`ScheduleTemplate::with_rank`] return a new value.
//!
//! The serde shape matches the persisted template record: camelCase keys,
//! ISO `YYYY-MM-DD` dates, `"Active"`/`"Inactive"` status.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Minutes since midnight. Signed because proposed intervals arrive unchecked.
pub type Minutes = i32;

pub type TemplateId = u64;
pub type PlaceId = u64;

/// Last representable minute of a day (23:59).
pub const LAST_MINUTE: Minutes = 1439;

/// Highest (least important) rank a template may carry.
pub const MAX_RANK: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateStatus {
    Active,
    Inactive,
}

/// A contiguous stretch of a day during which booking is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub time_start: Minutes,
    pub time_end: Minutes,
}

impl TimeWindow {
    pub fn new(time_start: Minutes, time_end: Minutes) -> Self {
        Self {
            id: None,
            time_start,
            time_end,
        }
    }

    pub fn duration_minutes(&self) -> Minutes {
        self.time_end - self.time_start
    }

    pub fn contains(&self, interval: &ResolvedInterval) -> bool {
        self.time_start <= interval.start && interval.end <= self.time_end
    }

    /// Check `0 <= timeStart < timeEnd <= 1439`. `index` is reported back in
    /// the error so the manager can find the offending row.
    pub fn validate(&self, index: usize) -> Result<()> {
        let reason = if self.time_start < 0 {
            Some("start before midnight")
        } else if self.time_end > LAST_MINUTE {
            Some("end after 23:59")
        } else if self.time_start >= self.time_end {
            Some("start not before end")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(ScheduleError::InvalidWindow {
                index,
                time_start: self.time_start,
                time_end: self.time_end,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Minimum and maximum booking length, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationConstraints {
    pub min: Minutes,
    pub max: Minutes,
}

impl DurationConstraints {
    pub fn new(min: Minutes, max: Minutes) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<()> {
        if self.min < 0 || self.min > self.max {
            return Err(ScheduleError::InvalidConstraints {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Shortest interval the negotiator will ever return. A zero minimum
    /// still has to yield a non-empty interval.
    pub(crate) fn floor(&self) -> Minutes {
        self.min.max(1)
    }

    /// `false` when the bounds admit no non-empty interval (`max == 0`).
    pub fn admits_booking(&self) -> bool {
        self.max >= self.floor()
    }
}

/// A venue's declared availability for an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTemplate {
    pub id: TemplateId,
    pub place_id: PlaceId,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    pub rank: u32,
    pub status: TemplateStatus,
    pub min_duration_minutes: Minutes,
    pub max_duration_minutes: Minutes,
    pub windows: Vec<TimeWindow>,
}

impl ScheduleTemplate {
    pub fn is_active(&self) -> bool {
        self.status == TemplateStatus::Active
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.valid_from <= date && date <= self.valid_to
    }

    pub fn constraints(&self) -> DurationConstraints {
        DurationConstraints::new(self.min_duration_minutes, self.max_duration_minutes)
    }

    /// Re-rank a template. Returns a new snapshot; the original is untouched.
    pub fn with_rank(&self, rank: u32) -> Result<ScheduleTemplate> {
        let updated = ScheduleTemplate {
            rank,
            ..self.clone()
        };
        validate_template(&updated)?;
        Ok(updated)
    }
}

/// Caller-supplied interval. May be reversed, negative, or past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedInterval {
    pub start: Minutes,
    pub end: Minutes,
}

impl ProposedInterval {
    pub fn new(start: Minutes, end: Minutes) -> Self {
        Self { start, end }
    }
}

/// Negotiated interval: inside one window, duration within the constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedInterval {
    pub start: Minutes,
    pub end: Minutes,
}

impl ResolvedInterval {
    pub fn duration_minutes(&self) -> Minutes {
        self.end - self.start
    }
}

impl From<ResolvedInterval> for ProposedInterval {
    fn from(r: ResolvedInterval) -> Self {
        ProposedInterval::new(r.start, r.end)
    }
}

/// Validate the template-level fields: date range, rank, and duration bounds.
///
/// Windows are checked separately by [`crate::normalize::normalize_windows`],
/// which needs to walk them anyway.
pub fn validate_template(template: &ScheduleTemplate) -> Result<()> {
    let invalid = |reason: String| ScheduleError::InvalidTemplate {
        id: template.id,
        reason,
    };

    if template.valid_from > template.valid_to {
        return Err(invalid(format!(
            "validFrom {} is after validTo {}",
            template.valid_from, template.valid_to
        )));
    }
    if template.rank > MAX_RANK {
        return Err(invalid(format!(
            "rank {} outside 0..={MAX_RANK}",
            template.rank
        )));
    }
    template
        .constraints()
        .validate()
        .map_err(|_| {
            invalid(format!(
                "duration bounds min {} / max {} are inconsistent",
                template.min_duration_minutes, template.max_duration_minutes
            ))
        })
}
