//! The notification bridge: pending class-end alerts and the quick-action
//! relay back into attendance marking.
//!
//! The bridge owns the permission flag as a watch channel (the class-end
//! watcher starts and stops on it) and hands resolved alerts to a relay task
//! over an mpsc channel, so alert resolution never blocks on a store write.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, mpsc, watch};
use uuid::Uuid;

use rollcall_core::{
  prefs::AlertPermission,
  record::{AttendanceRecord, AttendanceStatus},
  store::AttendanceStore,
  subject::SlotTime,
};

/// Relay queue depth. Replies past this apply backpressure to the resolver.
const RELAY_BUFFER: usize = 32;

// ─── Messages ────────────────────────────────────────────────────────────────

/// A class end detected by the watcher, not yet surfaced as an alert.
#[derive(Debug, Clone)]
pub struct AlertRequest {
  pub subject_id:   Uuid,
  pub subject_name: String,
  pub date:         NaiveDate,
  pub ends_at:      SlotTime,
}

/// A pending alert awaiting a quick-action reply.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
  pub id:           Uuid,
  pub subject_id:   Uuid,
  pub subject_name: String,
  pub date:         NaiveDate,
  /// Human-readable prompt, ready to display verbatim.
  pub body:         String,
  pub requested_at: DateTime<Utc>,
}

/// The quick action attached to an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertReply {
  Attended,
  Missed,
}

impl AlertReply {
  fn into_status(self) -> AttendanceStatus {
    match self {
      Self::Attended => AttendanceStatus::Present,
      Self::Missed => AttendanceStatus::Absent,
    }
  }
}

/// What the relay applies for one resolved alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkMessage {
  pub subject_id: Uuid,
  pub status:     AttendanceStatus,
}

// ─── Bridge ──────────────────────────────────────────────────────────────────

/// Shared state between the watcher, the alert endpoints, and the relay.
pub struct NotificationBridge {
  pending:       Mutex<Vec<Alert>>,
  relay_tx:      mpsc::Sender<MarkMessage>,
  permission_tx: watch::Sender<AlertPermission>,
}

impl NotificationBridge {
  /// Build a bridge seeded with the persisted permission value. The returned
  /// receiver feeds [`run_relay`].
  pub fn new(
    permission: AlertPermission,
  ) -> (Arc<Self>, mpsc::Receiver<MarkMessage>) {
    let (relay_tx, relay_rx) = mpsc::channel(RELAY_BUFFER);
    let (permission_tx, _) = watch::channel(permission);
    let bridge = Arc::new(Self {
      pending: Mutex::new(Vec::new()),
      relay_tx,
      permission_tx,
    });
    (bridge, relay_rx)
  }

  pub fn permission(&self) -> AlertPermission {
    *self.permission_tx.borrow()
  }

  /// Watch-channel view of the permission flag. The class-end watcher parks
  /// on this while permission is anything but granted.
  pub fn subscribe_permission(&self) -> watch::Receiver<AlertPermission> {
    self.permission_tx.subscribe()
  }

  pub fn set_permission(&self, permission: AlertPermission) {
    self.permission_tx.send_replace(permission);
  }

  /// Queue an alert, unless one is already pending for the same subject and
  /// day. Returns the queued alert, or `None` when deduplicated.
  pub async fn publish(&self, request: AlertRequest) -> Option<Alert> {
    let mut pending = self.pending.lock().await;
    if pending.iter().any(|alert| {
      alert.subject_id == request.subject_id && alert.date == request.date
    }) {
      return None;
    }

    let alert = Alert {
      id:           Uuid::new_v4(),
      subject_id:   request.subject_id,
      date:         request.date,
      body:         format!(
        "{} ended at {}. Did you attend?",
        request.subject_name,
        request.ends_at.format_12h()
      ),
      subject_name: request.subject_name,
      requested_at: Utc::now(),
    };
    pending.push(alert.clone());
    Some(alert)
  }

  /// All alerts currently awaiting a reply, oldest first.
  pub async fn pending(&self) -> Vec<Alert> {
    self.pending.lock().await.clone()
  }

  /// Drop pending alerts whose subject and day already have a record; a
  /// manual mark makes the prompt moot.
  pub async fn prune(&self, records: &[AttendanceRecord]) {
    let mut pending = self.pending.lock().await;
    pending.retain(|alert| {
      !records
        .iter()
        .any(|r| r.subject_id == alert.subject_id && r.date == alert.date)
    });
  }

  /// Resolve a pending alert: remove it and hand the mark to the relay.
  /// Returns `None` when no alert with that id is pending.
  pub async fn resolve(&self, id: Uuid, reply: AlertReply) -> Option<MarkMessage> {
    let mut pending = self.pending.lock().await;
    let position = pending.iter().position(|alert| alert.id == id)?;
    let alert = pending.remove(position);
    drop(pending);

    let message = MarkMessage {
      subject_id: alert.subject_id,
      status:     reply.into_status(),
    };
    if let Err(e) = self.relay_tx.send(message.clone()).await {
      tracing::error!(error = %e, "relay channel closed, mark dropped");
    }
    Some(message)
  }
}

// ─── Relay ───────────────────────────────────────────────────────────────────

/// Apply each resolved alert as an attendance upsert for today. Runs until
/// the bridge is dropped.
pub async fn run_relay<S>(store: Arc<S>, mut rx: mpsc::Receiver<MarkMessage>)
where
  S: AttendanceStore,
{
  while let Some(message) = rx.recv().await {
    let today = Local::now().date_naive();
    match store
      .mark_attendance(message.subject_id, today, message.status)
      .await
    {
      Ok(record) => {
        tracing::info!(
          subject_id = %record.subject_id,
          status = ?record.status,
          "quick action recorded"
        );
      }
      Err(e) => {
        tracing::error!(
          subject_id = %message.subject_id,
          error = %e,
          "quick action failed"
        );
      }
    }
  }
}
