//! Range negotiation scenarios and bound/idempotence properties.

use proptest::prelude::*;
use slot_engine::model::{DurationConstraints, ProposedInterval, TimeWindow, LAST_MINUTE};
use slot_engine::negotiate::{negotiate_range, negotiate_range_with_options, NegotiationOptions};
use slot_engine::ScheduleError;

fn evening_window() -> TimeWindow {
    // 09:00-21:00
    TimeWindow::new(540, 1260)
}

fn hour_to_three() -> DurationConstraints {
    DurationConstraints::new(60, 180)
}

#[test]
fn half_hour_request_stretched_to_one_hour() {
    let r = negotiate_range(
        ProposedInterval::new(600, 630),
        &evening_window(),
        &hour_to_three(),
    )
    .unwrap();

    assert_eq!((r.start, r.end), (600, 660));
}

#[test]
fn request_past_closing_pinned_to_last_hour() {
    let r = negotiate_range(
        ProposedInterval::new(1150, 1300),
        &evening_window(),
        &hour_to_three(),
    )
    .unwrap();

    assert_eq!((r.start, r.end), (1200, 1260));
}

#[test]
fn window_too_short_is_unbookable() {
    let err = negotiate_range(
        ProposedInterval::new(540, 580),
        &TimeWindow::new(540, 585),
        &hour_to_three(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        ScheduleError::UnbookableWindow {
            window_minutes: 45,
            min_duration: 60,
        }
    );
}

#[test]
fn malformed_window_rejected() {
    let err = negotiate_range(
        ProposedInterval::new(540, 600),
        &TimeWindow::new(600, 540),
        &hour_to_three(),
    )
    .unwrap_err();

    assert!(matches!(err, ScheduleError::InvalidWindow { .. }));
}

#[test]
fn wide_snap_threshold_always_snaps() {
    let options = NegotiationOptions {
        snap_threshold_minutes: 24 * 60,
        ..NegotiationOptions::default()
    };
    let r = negotiate_range_with_options(
        ProposedInterval::new(0, 600),
        &evening_window(),
        &hour_to_three(),
        &options,
    )
    .unwrap();

    assert_eq!((r.start, r.end), (540, 600));
}

fn arb_window() -> impl Strategy<Value = TimeWindow> {
    (0..LAST_MINUTE, 1..=LAST_MINUTE).prop_map(|(a, len)| {
        let end = (a + len).min(LAST_MINUTE);
        TimeWindow::new(a, end)
    })
}

fn arb_constraints() -> impl Strategy<Value = DurationConstraints> {
    (0..240i32, 0..240i32).prop_map(|(min, extra)| DurationConstraints::new(min, (min + extra).max(1)))
}

fn arb_options() -> impl Strategy<Value = NegotiationOptions> {
    (1..60i32, 0..90i32, 0..120i32).prop_map(|(g, snap, shift)| NegotiationOptions {
        granularity_minutes: g,
        snap_threshold_minutes: snap,
        shift_minutes: shift,
    })
}

proptest! {
    #[test]
    fn result_inside_window_with_valid_duration(
        window in arb_window(),
        limits in arb_constraints(),
        start in -200i32..1700,
        end in -200i32..1700,
    ) {
        let result = negotiate_range(ProposedInterval::new(start, end), &window, &limits);
        if window.duration_minutes() >= limits.min.max(1) {
            let r = result.unwrap();
            prop_assert!(window.time_start <= r.start && r.start < r.end && r.end <= window.time_end,
                "{:?} escapes {:?}", r, window);
            prop_assert!(r.duration_minutes() >= limits.min && r.duration_minutes() <= limits.max,
                "{:?} violates {:?}", r, limits);
        } else {
            let is_unbookable = matches!(result, Err(ScheduleError::UnbookableWindow { .. }));
            prop_assert!(is_unbookable);
        }
    }

    #[test]
    fn negotiation_is_idempotent(
        window in arb_window(),
        limits in arb_constraints(),
        options in arb_options(),
        start in -200i32..1700,
        end in -200i32..1700,
    ) {
        prop_assume!(window.duration_minutes() >= limits.min.max(1));
        let first = negotiate_range_with_options(ProposedInterval::new(start, end), &window, &limits, &options).unwrap();
        let second = negotiate_range_with_options(first.into(), &window, &limits, &options).unwrap();
        prop_assert_eq!(first, second);
    }
}
