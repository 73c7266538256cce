//! Handlers for `/attendance`: marking outcomes and listing records.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use uuid::Uuid;

use rollcall_core::{
  record::{AttendanceRecord, AttendanceStatus},
  store::AttendanceStore,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
  pub subject_id: Uuid,
  pub status:     AttendanceStatus,
  /// Defaults to today on the server clock when omitted.
  pub date:       Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub date: Option<NaiveDate>,
}

/// `POST /attendance` — body: `{"subjectId": …, "status": "PRESENT"}`.
///
/// An upsert: marking the same subject and date again replaces the stored
/// status rather than adding a second record.
pub async fn mark<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<MarkBody>,
) -> Result<Json<AttendanceRecord>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_subject(body.subject_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("subject {} not found", body.subject_id))
    })?;

  let date = body.date.unwrap_or_else(|| Local::now().date_naive());
  let record = store
    .mark_attendance(body.subject_id, date, body.status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(record))
}

/// `GET /attendance[?date=YYYY-MM-DD]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let mut records = store
    .list_records()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  if let Some(date) = params.date {
    records.retain(|r| r.date == date);
  }
  Ok(Json(records))
}
