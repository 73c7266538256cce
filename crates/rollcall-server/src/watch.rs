//! The class-end watcher: a permission-gated schedule poller.

use std::{sync::Arc, time::Duration};

use chrono::{Local, NaiveDate, Timelike};

use rollcall_core::{
  prefs::AlertPermission,
  schedule::classes_ending_at,
  store::AttendanceStore,
  subject::SlotTime,
};

use crate::notify::{AlertRequest, NotificationBridge};

/// Polls the schedule once per interval while alert permission is granted,
/// publishing an alert for every class ending at the current minute.
///
/// The poll truncates wall-clock time to the minute, the same granularity
/// the matcher compares at. A tick inside the end minute fires; a cadence
/// that skips the minute misses that slot for the day.
pub struct ClassEndWatcher<S> {
  store:    Arc<S>,
  bridge:   Arc<NotificationBridge>,
  interval: Duration,
}

impl<S> ClassEndWatcher<S>
where
  S: AttendanceStore,
{
  pub fn new(
    store: Arc<S>,
    bridge: Arc<NotificationBridge>,
    interval: Duration,
  ) -> Self {
    Self {
      store,
      bridge,
      interval,
    }
  }

  /// Run forever. Parks on the permission watch channel while permission is
  /// not granted, and returns only if the channel closes.
  pub async fn run(self) {
    let mut permission = self.bridge.subscribe_permission();

    loop {
      while *permission.borrow_and_update() != AlertPermission::Granted {
        if permission.changed().await.is_err() {
          return;
        }
      }
      tracing::info!("class-end watcher started");

      let mut tick = tokio::time::interval(self.interval);
      loop {
        tokio::select! {
          _ = tick.tick() => self.scan().await,
          changed = permission.changed() => {
            if changed.is_err() {
              return;
            }
            if *permission.borrow() != AlertPermission::Granted {
              tracing::info!("class-end watcher stopped");
              break;
            }
          }
        }
      }
    }
  }

  async fn scan(&self) {
    let now = Local::now();
    let at = SlotTime {
      hour:   now.hour() as u8,
      minute: now.minute() as u8,
    };
    self.scan_at(now.date_naive(), at).await;
  }

  /// One poll against an explicit instant.
  async fn scan_at(&self, date: NaiveDate, at: SlotTime) {
    let roster = match self.store.snapshot().await {
      Ok(roster) => roster,
      Err(e) => {
        tracing::error!(error = %e, "snapshot failed, skipping poll");
        return;
      }
    };

    self.bridge.prune(&roster.records).await;

    for end in classes_ending_at(&roster.subjects, &roster.records, date, at) {
      let request = AlertRequest {
        subject_id:   end.subject_id,
        subject_name: end.subject_name,
        date,
        ends_at:      end.ends_at,
      };
      if let Some(alert) = self.bridge.publish(request).await {
        tracing::info!(
          subject = %alert.subject_name,
          date = %alert.date,
          "class ended, alert pending"
        );
      }
    }
  }
}
