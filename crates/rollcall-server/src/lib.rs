//! The rollcall server: JSON API, offline shell gateway, and notification
//! bridge assembled over any [`rollcall_core::store::AttendanceStore`].
//!
//! Route layout:
//!
//! - `/api/…` — the resource API from `rollcall-api`, plus the bridge
//!   endpoints (`/api/alerts`, `/api/notifications/permission`)
//! - `/`, `/index.html` — navigations, served network-first
//! - everything else — assets, served cache-first

pub mod notify;
pub mod shell;
pub mod watch;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Json, Router,
  body::Body,
  extract::{Path, Request, State},
  http::StatusCode,
  response::Response,
  routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use rollcall_api::ApiError;
use rollcall_core::{prefs::AlertPermission, store::AttendanceStore};

use notify::{Alert, AlertReply, NotificationBridge};
use shell::ShellService;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime configuration, read from `rollcall.toml` with `ROLLCALL_*`
/// environment overrides. Every field has a default, so an empty (or
/// missing) file is a valid configuration.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub cache_dir:          PathBuf,
  /// Upstream origin serving the application shell and its assets.
  pub origin_url:         String,
  pub fetch_timeout_secs: u64,
  pub poll_interval_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:               "127.0.0.1".to_owned(),
      port:               5520,
      store_path:         PathBuf::from("rollcall.sqlite"),
      cache_dir:          PathBuf::from("shell-cache"),
      origin_url:         "http://localhost:5173".to_owned(),
      fetch_timeout_secs: 30,
      poll_interval_secs: 60,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through the navigation, asset, and bridge handlers.
#[derive(Clone)]
pub struct AppState<S: AttendanceStore> {
  pub store:  Arc<S>,
  pub shell:  Arc<ShellService>,
  pub bridge: Arc<NotificationBridge>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the complete server router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let api = rollcall_api::api_router(state.store.clone())
    .merge(bridge_router(state.clone()));

  Router::new()
    .route("/", get(navigation::<S>))
    .route("/index.html", get(navigation::<S>))
    .fallback(asset::<S>)
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

fn bridge_router<S>(state: AppState<S>) -> Router<()>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/alerts", get(list_alerts::<S>))
    .route("/alerts/{id}/reply", post(reply_alert::<S>))
    .route(
      "/notifications/permission",
      get(get_permission::<S>).post(resolve_permission::<S>),
    )
    .with_state(state)
}

// ─── Shell handlers ──────────────────────────────────────────────────────────

async fn navigation<S>(
  State(state): State<AppState<S>>,
  request: Request<Body>,
) -> Response
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  state.shell.serve_navigation(request.uri().path()).await
}

async fn asset<S>(
  State(state): State<AppState<S>>,
  request: Request<Body>,
) -> Response
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  let path_query = request
    .uri()
    .path_and_query()
    .map(|pq| pq.as_str().to_owned())
    .unwrap_or_else(|| request.uri().path().to_owned());
  state.shell.serve_asset(request.method(), &path_query).await
}

// ─── Bridge handlers ─────────────────────────────────────────────────────────

/// `GET /api/alerts` — alerts awaiting a quick-action reply.
async fn list_alerts<S>(State(state): State<AppState<S>>) -> Json<Vec<Alert>>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  Json(state.bridge.pending().await)
}

#[derive(Debug, Deserialize)]
struct ReplyBody {
  action: AlertReply,
}

/// `POST /api/alerts/:id/reply` — body: `{"action": "attended"}`.
///
/// Accepted (202) on success: the mark is applied by the relay task, not in
/// this request.
async fn reply_alert<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ReplyBody>,
) -> Result<StatusCode, ApiError>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  state
    .bridge
    .resolve(id, body.action)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("alert {id} not found")))?;
  Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Serialize)]
struct PermissionBody {
  permission: AlertPermission,
}

/// `GET /api/notifications/permission`
async fn get_permission<S>(
  State(state): State<AppState<S>>,
) -> Json<PermissionBody>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
{
  Json(PermissionBody {
    permission: state.bridge.permission(),
  })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PermissionOutcome {
  Granted,
  Denied,
}

#[derive(Debug, Deserialize)]
struct PermissionRequest {
  outcome: PermissionOutcome,
}

/// `POST /api/notifications/permission` — body: `{"outcome": "granted"}`.
///
/// The request is one-shot, like the browser permission prompt it mirrors:
/// only the unrequested state accepts a transition, anything later is 409.
async fn resolve_permission<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<PermissionRequest>,
) -> Result<Json<PermissionBody>, ApiError>
where
  S: AttendanceStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if state.bridge.permission() != AlertPermission::Unrequested {
    return Err(ApiError::Conflict(
      "alert permission already resolved".to_owned(),
    ));
  }

  let permission = match body.outcome {
    PermissionOutcome::Granted => AlertPermission::Granted,
    PermissionOutcome::Denied => AlertPermission::Denied,
  };
  state
    .store
    .set_alert_permission(permission)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  state.bridge.set_permission(permission);

  Ok(Json(PermissionBody { permission }))
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use axum::http::header;
  use serde_json::{Value, json};
  use tokio::sync::mpsc;
  use tower::ServiceExt as _;

  use rollcall_store_sqlite::SqliteStore;

  use super::*;
  use crate::notify::MarkMessage;

  async fn state() -> (AppState<SqliteStore>, mpsc::Receiver<MarkMessage>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let (bridge, relay_rx) = NotificationBridge::new(AlertPermission::Unrequested);
    let cache_root =
      std::env::temp_dir().join(format!("rollcall-router-{}", Uuid::new_v4()));
    // Port 1 never answers; shell behaviour in these tests is offline-only.
    let shell = Arc::new(
      ShellService::new(cache_root, "http://127.0.0.1:1", Duration::from_secs(1))
        .unwrap(),
    );
    (AppState { store, shell, bridge }, relay_rx)
  }

  async fn app() -> Router {
    let (state, _relay_rx) = state().await;
    router(state)
  }

  fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
      .method(method)
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  fn physics_draft() -> Value {
    json!({
      "name": "Physics",
      "schedule": [
        { "day": "Monday", "startTime": "09:00", "endTime": "10:30" },
        { "day": "Thursday", "startTime": "14:00", "endTime": "15:00" },
      ],
    })
  }

  async fn create_subject(app: &Router, body: Value) -> String {
    let (status, created) =
      send(app, json_request("POST", "/api/subjects", body)).await;
    assert_eq!(status, StatusCode::CREATED);
    created["id"].as_str().unwrap().to_owned()
  }

  // ── Subjects ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn subjects_create_list_and_fetch() {
    let app = app().await;

    let id = create_subject(&app, physics_draft()).await;

    let (status, listed) = send(&app, get_request("/api/subjects")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["name"], "Physics");
    assert!(listed[0]["createdAt"].is_i64());
    assert_eq!(listed[0]["schedule"][0]["startTime"], "09:00");

    let (status, fetched) =
      send(&app, get_request(&format!("/api/subjects/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());
  }

  #[tokio::test]
  async fn subject_validation_failures_map_to_400() {
    let app = app().await;

    let (status, body) = send(
      &app,
      json_request("POST", "/api/subjects", json!({ "name": "  ", "schedule": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "subject name cannot be empty");

    let (status, body) = send(
      &app,
      json_request(
        "POST",
        "/api/subjects",
        json!({
          "name": "Physics",
          "schedule": [{ "day": "Monday", "startTime": "11:00", "endTime": "10:00" }],
        }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "end time must be after start time for Monday");

    let (_, listed) = send(&app, get_request("/api/subjects")).await;
    assert!(listed.as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn unknown_subjects_map_to_404() {
    let app = app().await;
    let missing = Uuid::new_v4();

    let (status, body) =
      send(&app, get_request(&format!("/api/subjects/{missing}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));

    let (status, _) = send(
      &app,
      json_request("PUT", &format!("/api/subjects/{missing}"), physics_draft()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let request = Request::builder()
      .method("DELETE")
      .uri(format!("/api/subjects/{missing}"))
      .body(Body::empty())
      .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn updating_keeps_id_and_creation_time() {
    let app = app().await;
    let id = create_subject(&app, physics_draft()).await;

    let (_, before) = send(&app, get_request(&format!("/api/subjects/{id}"))).await;

    let (status, updated) = send(
      &app,
      json_request(
        "PUT",
        &format!("/api/subjects/{id}"),
        json!({
          "name": "Applied Physics",
          "schedule": [{ "day": "Friday", "startTime": "08:00", "endTime": "09:30" }],
        }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["createdAt"], before["createdAt"]);
    assert_eq!(updated["name"], "Applied Physics");
    assert_eq!(updated["schedule"][0]["day"], "Friday");
  }

  // ── Attendance ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn marking_attendance_is_an_upsert() {
    let app = app().await;
    let id = create_subject(&app, physics_draft()).await;

    let mark = |status: &str| {
      json_request(
        "POST",
        "/api/attendance",
        json!({ "subjectId": id, "status": status, "date": "2026-03-02" }),
      )
    };

    let (status, first) = send(&app, mark("PRESENT")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = send(&app, mark("ABSENT")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);

    let (status, records) =
      send(&app, get_request("/api/attendance?date=2026-03-02")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["status"], "ABSENT");
    assert_eq!(records[0]["subjectId"], id.as_str());
  }

  #[tokio::test]
  async fn marking_an_unknown_subject_is_404() {
    let app = app().await;
    let (status, _) = send(
      &app,
      json_request(
        "POST",
        "/api/attendance",
        json!({ "subjectId": Uuid::new_v4(), "status": "PRESENT" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn deleting_a_subject_cascades_over_http() {
    let app = app().await;
    let kept = create_subject(&app, physics_draft()).await;
    let dropped = create_subject(
      &app,
      json!({
        "name": "History",
        "schedule": [{ "day": "Tuesday", "startTime": "10:00", "endTime": "11:00" }],
      }),
    )
    .await;

    for id in [&kept, &dropped] {
      send(
        &app,
        json_request(
          "POST",
          "/api/attendance",
          json!({ "subjectId": id, "status": "PRESENT", "date": "2026-03-03" }),
        ),
      )
      .await;
    }

    let request = Request::builder()
      .method("DELETE")
      .uri(format!("/api/subjects/{dropped}"))
      .body(Body::empty())
      .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, records) = send(&app, get_request("/api/attendance")).await;
    let records = records.as_array().unwrap().clone();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["subjectId"], kept.as_str());
  }

  // ── Derived views ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_derive_percentages_and_bands() {
    let app = app().await;

    let (status, empty) = send(&app, get_request("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["overall"]["percentage"], 100);
    assert_eq!(empty["overall"]["band"], "good");

    let id = create_subject(&app, physics_draft()).await;
    let marks = [
      ("2026-03-02", "PRESENT"),
      ("2026-03-05", "ABSENT"),
      ("2026-03-09", "CANCELLED"),
    ];
    for (date, status) in marks {
      send(
        &app,
        json_request(
          "POST",
          "/api/attendance",
          json!({ "subjectId": id, "status": status, "date": date }),
        ),
      )
      .await;
    }

    let (_, stats) = send(&app, get_request("/api/stats")).await;
    assert_eq!(stats["overall"]["held"], 2);
    assert_eq!(stats["overall"]["attended"], 1);
    assert_eq!(stats["overall"]["percentage"], 50);
    assert_eq!(stats["subjects"][0]["band"], "warning");
    assert_eq!(stats["subjects"][0]["subjectId"], id.as_str());
  }

  #[tokio::test]
  async fn calendar_views_roll_days_up() {
    let app = app().await;
    let id = create_subject(&app, physics_draft()).await;
    send(
      &app,
      json_request(
        "POST",
        "/api/attendance",
        json!({ "subjectId": id, "status": "PRESENT", "date": "2026-02-10" }),
      ),
    )
    .await;

    let (status, month) = send(&app, get_request("/api/calendar/2026/2")).await;
    assert_eq!(status, StatusCode::OK);
    let days = month["days"].as_array().unwrap();
    assert_eq!(days.len(), 28);
    assert_eq!(days[9]["date"], "2026-02-10");
    assert_eq!(days[9]["standing"], "present");
    assert_eq!(days[0]["standing"], "empty");

    let (status, _) = send(&app, get_request("/api/calendar/2026/13")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, day) = send(&app, get_request("/api/calendar/day/2026-02-10")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = day["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["subjectName"], "Physics");
    assert_eq!(entries[0]["status"], "PRESENT");
  }

  // ── Preferences and the bridge ─────────────────────────────────────────────

  #[tokio::test]
  async fn theme_round_trips_over_http() {
    let app = app().await;

    let (status, body) = send(&app, get_request("/api/theme")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");

    let (status, body) = send(
      &app,
      json_request("PUT", "/api/theme", json!({ "theme": "light" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "light");

    let (_, body) = send(&app, get_request("/api/theme")).await;
    assert_eq!(body["theme"], "light");
  }

  #[tokio::test]
  async fn permission_resolves_exactly_once() {
    let (state, _relay_rx) = state().await;
    let app = router(state.clone());

    let (status, body) =
      send(&app, get_request("/api/notifications/permission")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permission"], "unrequested");

    let (status, body) = send(
      &app,
      json_request(
        "POST",
        "/api/notifications/permission",
        json!({ "outcome": "granted" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permission"], "granted");

    // Persisted, not just held in the bridge.
    assert_eq!(
      state.store.alert_permission().await.unwrap(),
      AlertPermission::Granted
    );

    let (status, _) = send(
      &app,
      json_request(
        "POST",
        "/api/notifications/permission",
        json!({ "outcome": "denied" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(state.bridge.permission(), AlertPermission::Granted);
  }

  #[tokio::test]
  async fn alert_replies_relay_into_the_store() {
    let (state, relay_rx) = state().await;
    let app = router(state.clone());
    tokio::spawn(notify::run_relay(state.store.clone(), relay_rx));

    let (status, alerts) = send(&app, get_request("/api/alerts")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(alerts.as_array().unwrap().is_empty());

    let subject_id = create_subject(&app, physics_draft()).await;
    let published = state
      .bridge
      .publish(notify::AlertRequest {
        subject_id:   subject_id.parse().unwrap(),
        subject_name: "Physics".to_owned(),
        date:         chrono::Local::now().date_naive(),
        ends_at:      "15:00".parse().unwrap(),
      })
      .await
      .unwrap();

    let (_, alerts) = send(&app, get_request("/api/alerts")).await;
    assert_eq!(alerts.as_array().unwrap().len(), 1);
    assert_eq!(alerts[0]["body"], "Physics ended at 3:00 PM. Did you attend?");

    let (status, _) = send(
      &app,
      json_request(
        "POST",
        &format!("/api/alerts/{}/reply", Uuid::new_v4()),
        json!({ "action": "attended" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
      &app,
      json_request(
        "POST",
        &format!("/api/alerts/{}/reply", published.id),
        json!({ "action": "attended" }),
      ),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (_, alerts) = send(&app, get_request("/api/alerts")).await;
    assert!(alerts.as_array().unwrap().is_empty());

    // The mark lands asynchronously through the relay task.
    let mut recorded = Vec::new();
    for _ in 0..100 {
      recorded = state.store.list_records().await.unwrap();
      if !recorded.is_empty() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(recorded.len(), 1);
    assert_eq!(
      recorded[0].status,
      rollcall_core::record::AttendanceStatus::Present
    );
    assert_eq!(recorded[0].subject_id.to_string(), subject_id);
  }

  // ── Shell routes ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn navigations_without_upstream_or_cache_read_unavailable() {
    let app = app().await;
    let response = app.clone().oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
  }

  #[tokio::test]
  async fn fallback_routes_reject_non_get_methods() {
    let app = app().await;
    let request = Request::builder()
      .method("POST")
      .uri("/some-asset.js")
      .body(Body::empty())
      .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
  }
}
