//! JSON REST API for rollcall.
//!
//! This crate exposes an axum [`Router`] over any
//! [`rollcall_core::store::AttendanceStore`] implementation. It owns the
//! resource endpoints only; transport, the offline shell gateway, and the
//! notification bridge live with the caller.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = axum::Router::new()
//!   .nest("/api", rollcall_api::api_router(store.clone()));
//! ```

pub mod attendance;
pub mod error;
pub mod prefs;
pub mod stats;
pub mod subjects;

use std::sync::Arc;

use axum::{Router, routing::get};

use rollcall_core::store::AttendanceStore;

pub use crate::error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Subjects
    .route(
      "/subjects",
      get(subjects::list::<S>).post(subjects::create::<S>),
    )
    .route(
      "/subjects/{id}",
      get(subjects::get_one::<S>)
        .put(subjects::update::<S>)
        .delete(subjects::delete_one::<S>),
    )
    // Attendance
    .route(
      "/attendance",
      get(attendance::list::<S>).post(attendance::mark::<S>),
    )
    // Derived views
    .route("/stats", get(stats::overview::<S>))
    .route("/calendar/{year}/{month}", get(stats::month::<S>))
    .route("/calendar/day/{date}", get(stats::day::<S>))
    // Preferences
    .route("/theme", get(prefs::get_theme::<S>).put(prefs::set_theme::<S>))
    .with_state(store)
}
