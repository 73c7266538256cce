//! Error types for `rollcall-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::subject::Weekday;

/// An error that can occur when working with the rollcall domain model.
#[derive(Debug, Error)]
pub enum Error {
  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("invalid time {0:?}, expected \"HH:MM\"")]
  InvalidTime(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),
}

/// A user-correctable problem with a submitted subject draft.
///
/// Messages are surfaced verbatim at the input boundary, so they read as
/// instructions rather than diagnostics.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
  #[error("subject name cannot be empty")]
  EmptyName,

  #[error("at least one class day is required")]
  NoDays,

  #[error("missing start or end time for {0}")]
  MissingTime(Weekday),

  #[error("invalid time {text:?} for {day}")]
  InvalidTime { day: Weekday, text: String },

  #[error("end time must be after start time for {0}")]
  EndNotAfterStart(Weekday),

  #[error("more than one slot on {0}")]
  DuplicateDay(Weekday),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
