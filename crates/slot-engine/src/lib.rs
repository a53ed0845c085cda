//! # slot-engine
//!
//! Deterministic venue availability for booking services.
//!
//! Venues publish date-ranged, rank-ordered schedule templates. The engine
//! decides which template governs a calendar date, reduces its time windows
//! to a canonical disjoint form, and negotiates a user-proposed interval into
//! one that is valid against a window and the template's duration limits.
//!
//! Every function is pure: inputs are immutable snapshots passed in by the
//! caller, there is no global state and no I/O.
//!
//! ## Modules
//!
//! - [`model`] — Templates, windows, intervals, and template validation
//! - [`resolver`] — Pick the effective template for a date (lowest rank, ties by id)
//! - [`normalize`] — Sort and union a template's windows
//! - [`negotiate`] — Clamp a proposed interval into a bookable one
//! - [`availability`] — Compose the three into day availability and booking negotiation
//! - [`error`] — Error types

pub mod availability;
pub mod error;
pub mod model;
pub mod negotiate;
pub mod normalize;
pub mod resolver;

pub use availability::{AvailabilityService, DayAvailability};
pub use error::{Result, ScheduleError};
pub use model::{
    validate_template, DurationConstraints, Minutes, PlaceId, ProposedInterval,
    ResolvedInterval, ScheduleTemplate, TemplateId, TemplateStatus, TimeWindow,
};
pub use negotiate::{negotiate_range, negotiate_range_with_options, NegotiationOptions};
pub use normalize::{normalize_time_windows, normalize_windows};
pub use resolver::{
    resolve_date_range, resolve_effective_template, resolve_effective_template_detailed,
    AmbiguousPriority, Resolution, MAX_RANGE_DAYS,
};
