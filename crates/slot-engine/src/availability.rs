//! Availability for a venue on a date: resolve, normalize, negotiate.
//!
//! [`AvailabilityService`] holds no state besides its negotiation options.
//! Every call takes the template snapshot explicitly, so one service can be
//! shared across threads and venues.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, ScheduleError};
use crate::model::{
    validate_template, DurationConstraints, PlaceId, ProposedInterval, ResolvedInterval,
    ScheduleTemplate, TemplateId, TimeWindow,
};
use crate::negotiate::{negotiate_range_with_options, NegotiationOptions};
use crate::normalize::normalize_windows;
use crate::resolver::{
    days_in_range, resolve_effective_template_detailed, AmbiguousPriority, Resolution,
    MAX_RANGE_DAYS,
};

/// The bookable shape of a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum DayAvailability {
    Closed {
        date: NaiveDate,
    },
    #[serde(rename_all = "camelCase")]
    Open {
        date: NaiveDate,
        template_id: TemplateId,
        place_id: PlaceId,
        /// Sorted, disjoint windows.
        windows: Vec<TimeWindow>,
        constraints: DurationConstraints,
        #[serde(skip_serializing_if = "Option::is_none")]
        ambiguity: Option<AmbiguousPriority>,
    },
}

impl DayAvailability {
    pub fn date(&self) -> NaiveDate {
        match self {
            DayAvailability::Closed { date } | DayAvailability::Open { date, .. } => *date,
        }
    }

    pub fn windows(&self) -> &[TimeWindow] {
        match self {
            DayAvailability::Closed { .. } => &[],
            DayAvailability::Open { windows, .. } => windows,
        }
    }

    /// Windows long enough to hold at least one minimum-length booking.
    /// Empty when the duration bounds admit no booking at all.
    pub fn bookable_windows(&self) -> Vec<TimeWindow> {
        match self {
            DayAvailability::Closed { .. } => Vec::new(),
            DayAvailability::Open { constraints, .. } if !constraints.admits_booking() => {
                Vec::new()
            }
            DayAvailability::Open {
                windows,
                constraints,
                ..
            } => windows
                .iter()
                .filter(|w| w.duration_minutes() >= constraints.floor())
                .copied()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityService {
    options: NegotiationOptions,
}

impl AvailabilityService {
    pub fn new(options: NegotiationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NegotiationOptions {
        &self.options
    }

    /// Resolve the governing template for `date` and normalize its windows.
    ///
    /// # Errors
    ///
    /// [`ScheduleError::InvalidTemplate`] or [`ScheduleError::InvalidWindow`]
    /// when the governing template is malformed. A closed day is `Ok`.
    pub fn day_availability(
        &self,
        date: NaiveDate,
        templates: &[ScheduleTemplate],
    ) -> Result<DayAvailability> {
        let (template, ambiguity) = match resolve_effective_template_detailed(date, templates) {
            Resolution::Closed => return Ok(DayAvailability::Closed { date }),
            Resolution::Effective {
                template,
                ambiguity,
            } => (template, ambiguity),
        };

        validate_template(template)?;
        let windows = normalize_windows(template)?;

        Ok(DayAvailability::Open {
            date,
            template_id: template.id,
            place_id: template.place_id,
            windows,
            constraints: template.constraints(),
            ambiguity,
        })
    }

    /// Availability for every day in `from..=to`, at most
    /// [`MAX_RANGE_DAYS`] days.
    pub fn range_availability(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        templates: &[ScheduleTemplate],
    ) -> Result<Vec<DayAvailability>> {
        days_in_range(from, to)?
            .map(|d| self.day_availability(d, templates))
            .collect()
    }

    /// Negotiate `proposed` on `date`.
    ///
    /// The target window is the first one that ends after the proposed start:
    /// the window the start falls in, or the next one when the start sits in
    /// a gap. Only that window is tried. If it is shorter than the minimum
    /// duration the call fails, even when a later window could hold the
    /// booking; callers wanting a fallback should pick from
    /// [`DayAvailability::bookable_windows`] and call
    /// [`negotiate_range_with_options`] themselves.
    ///
    /// # Errors
    ///
    /// - [`ScheduleError::Closed`] if no template governs the date.
    /// - [`ScheduleError::NoWindow`] if the start is past every window.
    /// - [`ScheduleError::UnbookableWindow`] if the target window is too short
    ///   or the template's maximum duration is zero.
    pub fn negotiate_booking(
        &self,
        date: NaiveDate,
        templates: &[ScheduleTemplate],
        proposed: ProposedInterval,
    ) -> Result<ResolvedInterval> {
        let day = self.day_availability(date, templates)?;
        let DayAvailability::Open {
            windows,
            constraints,
            ..
        } = &day
        else {
            return Err(ScheduleError::Closed { date });
        };

        let window = windows
            .iter()
            .find(|w| w.time_end > proposed.start)
            .ok_or(ScheduleError::NoWindow {
                start: proposed.start,
            })?;

        negotiate_range_with_options(proposed, window, constraints, &self.options)
    }
}
