use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::services::calendar::TimeInterval;

/// Failures surfaced by the scheduling engine. Everything here is
/// per-request and user-correctable except `Persistence`.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Malformed half-open interval (start >= end); rejected before any
    /// storage lookup
    #[error("invalid interval: start must fall before end")]
    InvalidInterval,

    /// The proposed time lies outside the provider's working hours, inside
    /// a break, or on a non-working day. Carries the nearest open interval
    /// of that day when one exists.
    #[error("requested time is outside the provider's availability")]
    OutsideAvailability { nearest: Option<TimeInterval> },

    /// Overlap with an existing non-cancelled appointment. Reports the
    /// conflicting time range only, never the other appointment's id or
    /// client.
    #[error("requested time is already booked ({conflict})")]
    DoubleBooked { conflict: TimeInterval },

    /// One or more expanded occurrences of a recurring booking failed
    /// validation; no instances were created.
    #[error("recurring booking rejected: {} conflicting occurrence(s)", .0.len())]
    RecurrenceConflicts(Vec<DateConflict>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// Storage-layer failure. Callers must not retry writes on this (a
    /// blind retry can double-book).
    #[error("persistence failure: {0}")]
    Persistence(String),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// A single rejected occurrence of a recurring booking request
#[derive(Debug, Clone, Serialize)]
pub struct DateConflict {
    pub date: NaiveDate,
    pub reason: String,
}
