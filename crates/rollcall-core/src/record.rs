//! Dated attendance outcomes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome recorded for one subject on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
  Present,
  Absent,
  /// The class did not happen; excluded from percentage denominators.
  Cancelled,
}

/// One attendance outcome.
///
/// At most one record exists per `(subject_id, date)` pair; marking the same
/// pair again replaces the status in place and keeps the record id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
  pub id:         Uuid,
  pub subject_id: Uuid,
  pub date:       NaiveDate,
  pub status:     AttendanceStatus,
}
