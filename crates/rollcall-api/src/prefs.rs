//! Theme preference endpoints.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use rollcall_core::{prefs::Theme, store::AttendanceStore};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
  pub theme: Theme,
}

/// `GET /theme`
pub async fn get_theme<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<ThemeBody>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let theme = store
    .theme()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ThemeBody { theme }))
}

/// `PUT /theme` — body: `{"theme": "light"}`
pub async fn set_theme<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, ApiError>
where
  S: AttendanceStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .set_theme(body.theme)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(body))
}
