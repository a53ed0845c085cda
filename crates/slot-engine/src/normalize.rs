//! Window normalization: authored windows → sorted, disjoint windows.
//!
//! Managers may enter windows in any order and with overlaps. Before any
//! negotiation the windows are validated, sorted by start, and unioned so
//! that `window[i].time_end < window[i + 1].time_start` holds. Touching
//! windows (`[540, 600]` and `[600, 660]`) are merged as well.

use crate::error::Result;
use crate::model::{ScheduleTemplate, TimeWindow};

/// Validate and canonicalize a template's windows.
///
/// # Errors
///
/// Returns [`crate::ScheduleError::InvalidWindow`] naming the first window
/// (in authored order) that violates `0 <= timeStart < timeEnd <= 1439`.
///
/// # Examples
///
/// ```
/// use slot_engine::model::TimeWindow;
/// use slot_engine::normalize::normalize_time_windows;
///
/// let merged = normalize_time_windows(&[TimeWindow::new(0, 100), TimeWindow::new(90, 200)]).unwrap();
/// assert_eq!(merged, vec![TimeWindow::new(0, 200)]);
/// ```
pub fn normalize_windows(template: &ScheduleTemplate) -> Result<Vec<TimeWindow>> {
    let windows = normalize_time_windows(&template.windows)?;
    tracing::debug!(
        template = template.id,
        authored = template.windows.len(),
        normalized = windows.len(),
        "normalized windows"
    );
    Ok(windows)
}

/// Normalize a bare list of windows. See [`normalize_windows`].
pub fn normalize_time_windows(windows: &[TimeWindow]) -> Result<Vec<TimeWindow>> {
    for (index, window) in windows.iter().enumerate() {
        window.validate(index)?;
    }

    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|w| (w.time_start, w.time_end));

    Ok(merge_sorted(&sorted))
}

/// Union already-sorted windows. A merged window keeps the id of the first
/// window it absorbed; ids of absorbed windows are dropped.
fn merge_sorted(sorted: &[TimeWindow]) -> Vec<TimeWindow> {
    let mut merged: Vec<TimeWindow> = Vec::with_capacity(sorted.len());
    for &window in sorted {
        if let Some(last) = merged.last_mut() {
            if window.time_start <= last.time_end {
                last.time_end = last.time_end.max(window.time_end);
                continue;
            }
        }
        merged.push(window);
    }
    merged
}
