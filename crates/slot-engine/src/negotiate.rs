//! Range negotiation: turn a user-proposed interval into a bookable one.
//!
//! The transform runs in a fixed order:
//!
//! 1. Round the proposed end up to the next granularity boundary (15 min).
//! 2. If the start is before the window: snap to the window start when it is
//!    at most `snap_threshold_minutes` early, otherwise push it forward by
//!    `shift_minutes`. A push that still lands before the window is pulled
//!    up to the window start.
//! 3. Stretch to the minimum duration (end rounded up, capped at the maximum).
//! 4. Trim to the maximum duration.
//! 5. If the end overruns the window, pin it to the window end and derive the
//!    start from the minimum duration.
//!
//! The snap/shift rule and the step-5 re-derivation mirror how the booking UI
//! adjusts a dragged selection. Both are kept as-is; see DESIGN.md.
//!
//! The result always lies inside the window with a duration in
//! `[min, max]`, and feeding it back in returns it unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::model::{DurationConstraints, Minutes, ProposedInterval, ResolvedInterval, TimeWindow};

/// Tunables for [`negotiate_range_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationOptions {
    /// Proposed ends are rounded up to a multiple of this.
    pub granularity_minutes: Minutes,
    /// A start at most this early is snapped onto the window start.
    pub snap_threshold_minutes: Minutes,
    /// A start earlier than the snap threshold is moved forward by this much.
    pub shift_minutes: Minutes,
}

impl Default for NegotiationOptions {
    fn default() -> Self {
        Self {
            granularity_minutes: 15,
            snap_threshold_minutes: 30,
            shift_minutes: 60,
        }
    }
}

/// Negotiate `proposed` against `window` with the default options.
///
/// # Errors
///
/// - [`ScheduleError::UnbookableWindow`] if the window is shorter than the
///   minimum duration, or the maximum duration is zero.
/// - [`ScheduleError::InvalidWindow`] / [`ScheduleError::InvalidConstraints`]
///   for malformed inputs.
///
/// # Examples
///
/// ```
/// use slot_engine::model::{DurationConstraints, ProposedInterval, TimeWindow};
/// use slot_engine::negotiate::negotiate_range;
///
/// let window = TimeWindow::new(540, 1260);
/// let limits = DurationConstraints::new(60, 180);
///
/// let r = negotiate_range(ProposedInterval::new(600, 630), &window, &limits).unwrap();
/// assert_eq!((r.start, r.end), (600, 660));
///
/// let r = negotiate_range(ProposedInterval::new(1150, 1300), &window, &limits).unwrap();
/// assert_eq!((r.start, r.end), (1200, 1260));
/// ```
pub fn negotiate_range(
    proposed: ProposedInterval,
    window: &TimeWindow,
    constraints: &DurationConstraints,
) -> Result<ResolvedInterval> {
    negotiate_range_with_options(proposed, window, constraints, &NegotiationOptions::default())
}

/// Negotiate with explicit [`NegotiationOptions`].
pub fn negotiate_range_with_options(
    proposed: ProposedInterval,
    window: &TimeWindow,
    constraints: &DurationConstraints,
    options: &NegotiationOptions,
) -> Result<ResolvedInterval> {
    window.validate(0)?;
    constraints.validate()?;

    let floor = constraints.floor();
    if window.duration_minutes() < floor || !constraints.admits_booking() {
        return Err(ScheduleError::UnbookableWindow {
            window_minutes: window.duration_minutes(),
            min_duration: constraints.min,
        });
    }

    let granularity = options.granularity_minutes.max(1);

    let mut end = round_up(proposed.end, granularity);

    let mut start = proposed.start;
    let early_by = window.time_start.saturating_sub(start);
    if early_by > 0 {
        start = if early_by <= options.snap_threshold_minutes {
            window.time_start
        } else {
            start.saturating_add(options.shift_minutes).max(window.time_start)
        };
    }

    if end.saturating_sub(start) < floor {
        end = round_up(start.saturating_add(floor), granularity)
            .min(start.saturating_add(constraints.max));
    }

    if end.saturating_sub(start) > constraints.max {
        end = start.saturating_add(constraints.max);
    }

    if end > window.time_end {
        end = window.time_end;
        start = end - floor;
    }

    let resolved = ResolvedInterval { start, end };
    let duration = resolved.duration_minutes();
    if !window.contains(&resolved) || duration < floor || duration > constraints.max {
        return Err(ScheduleError::UnbookableWindow {
            window_minutes: window.duration_minutes(),
            min_duration: constraints.min,
        });
    }

    tracing::debug!(
        proposed_start = proposed.start,
        proposed_end = proposed.end,
        start = resolved.start,
        end = resolved.end,
        "negotiated range"
    );
    Ok(resolved)
}

/// Round `minutes` up to the next multiple of `step` (identity on multiples).
fn round_up(minutes: Minutes, step: Minutes) -> Minutes {
    let rem = minutes.rem_euclid(step);
    if rem == 0 {
        minutes
    } else {
        minutes.saturating_add(step - rem)
    }
}
