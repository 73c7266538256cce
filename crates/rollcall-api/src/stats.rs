//! Read-only derivation endpoints: attendance figures and calendar views.
//!
//! Each handler takes one snapshot of the dataset and derives from that, so
//! a response never mixes subjects and records from different instants.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Serialize;

use rollcall_core::{
  record::AttendanceRecord,
  stats::{self, DayStanding, OverallStats, SubjectStats},
  store::AttendanceStore,
};

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
  pub overall:  OverallStats,
  pub subjects: Vec<SubjectStats>,
}

/// `GET /stats`
pub async fn overview<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let roster = store
    .snapshot()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let subjects = roster
    .subjects
    .iter()
    .map(|subject| stats::subject_stats(subject, &roster.records))
    .collect();
  Ok(Json(StatsResponse {
    overall: stats::overall_stats(&roster.records),
    subjects,
  }))
}

#[derive(Debug, Serialize)]
pub struct DayCell {
  pub date:     NaiveDate,
  pub standing: DayStanding,
}

#[derive(Debug, Serialize)]
pub struct MonthResponse {
  pub year:  i32,
  pub month: u32,
  pub days:  Vec<DayCell>,
}

/// `GET /calendar/:year/:month` — a standing for every day of the month.
pub async fn month<S>(
  State(store): State<Arc<S>>,
  Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthResponse>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if !(1..=12).contains(&month) {
    return Err(ApiError::BadRequest(format!("invalid month: {month}")));
  }

  let roster = store
    .snapshot()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let days = stats::month_standings(&roster.records, year, month)
    .into_iter()
    .map(|(date, standing)| DayCell { date, standing })
    .collect();
  Ok(Json(MonthResponse { year, month, days }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
  #[serde(flatten)]
  pub record:       AttendanceRecord,
  pub subject_name: String,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
  pub date:    NaiveDate,
  pub entries: Vec<DayEntry>,
}

/// `GET /calendar/day/:date` — that day's records joined with subject names.
///
/// Records whose subject has vanished are skipped rather than erred on; the
/// delete cascade makes that state unreachable through this store, but a
/// hand-edited dataset should still render.
pub async fn day<S>(
  State(store): State<Arc<S>>,
  Path(date): Path<NaiveDate>,
) -> Result<Json<DayResponse>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let roster = store
    .snapshot()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let entries = roster
    .records
    .iter()
    .filter(|r| r.date == date)
    .filter_map(|r| {
      roster.subject(r.subject_id).map(|subject| DayEntry {
        record:       r.clone(),
        subject_name: subject.name.clone(),
      })
    })
    .collect();
  Ok(Json(DayResponse { date, entries }))
}
