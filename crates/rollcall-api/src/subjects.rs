//! Handlers for the `/subjects` endpoints.
//!
//! | Method   | Path            | Notes                                        |
//! |----------|-----------------|----------------------------------------------|
//! | `GET`    | `/subjects`     | All subjects, sorted by name                 |
//! | `POST`   | `/subjects`     | Body: a draft; 400 with the first validation |
//! |          |                 | failure's message                            |
//! | `GET`    | `/subjects/:id` | 404 when unknown                             |
//! | `PUT`    | `/subjects/:id` | Replaces name and schedule, keeps identity   |
//! | `DELETE` | `/subjects/:id` | Removes the subject and all its records      |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use uuid::Uuid;

use rollcall_core::{
  store::AttendanceStore,
  subject::{Subject, SubjectDraft},
};

use crate::error::ApiError;

/// `GET /subjects`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subjects = store
    .list_subjects()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(subjects))
}

/// `POST /subjects` — body:
/// `{"name": "Physics", "schedule": [{"day": "Monday", "startTime": "09:00", "endTime": "10:30"}]}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(draft): Json<SubjectDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  draft
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  let subject = store
    .add_subject(draft)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(subject)))
}

/// `GET /subjects/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Subject>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let subject = store
    .get_subject(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;
  Ok(Json(subject))
}

/// `PUT /subjects/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(draft): Json<SubjectDraft>,
) -> Result<Json<Subject>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  draft
    .validate()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
  store
    .get_subject(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;

  let subject = store
    .update_subject(id, draft)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(subject))
}

/// `DELETE /subjects/:id`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_subject(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("subject {id} not found")))?;

  store
    .delete_subject(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}
