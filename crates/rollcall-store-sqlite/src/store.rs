//! [`SqliteStore`]: the SQLite implementation of
//! [`rollcall_core::store::AttendanceStore`].

use std::{path::Path, sync::Arc};

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use tokio::sync::Mutex;
use uuid::Uuid;

use rollcall_core::{
  prefs::{AlertPermission, Theme},
  record::{AttendanceRecord, AttendanceStatus},
  roster::Roster,
  store::AttendanceStore,
  subject::{Subject, SubjectDraft},
};

use crate::{Error, Result, schema::SCHEMA};

// Keys in the kv table. They match the web client's localStorage names so
// an exported dataset loads as-is.
const KEY_SUBJECTS: &str = "subjects";
const KEY_RECORDS: &str = "attendanceRecords";
const KEY_THEME: &str = "theme";
const KEY_ALERT_PERMISSION: &str = "alertPermission";

struct Cached {
  roster:           Roster,
  theme:            Theme,
  alert_permission: AlertPermission,
}

/// The attendance store backed by a single SQLite file.
///
/// Cloning is cheap; the connection and the cached dataset are shared. The
/// mutex around the cache is the serialization point for mutations, and each
/// mutation writes its touched entries back before releasing it.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  cached: Arc<Mutex<Cached>>,
}

impl SqliteStore {
  /// Open (creating if needed) a store at the given path.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::load(tokio_rusqlite::Connection::open(path).await?).await
  }

  /// Open a fresh in-memory store. Useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    Self::load(tokio_rusqlite::Connection::open_in_memory().await?).await
  }

  async fn load(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;

    let subjects: Vec<Subject> =
      read_entry(&conn, KEY_SUBJECTS).await?.unwrap_or_default();
    let records: Vec<AttendanceRecord> =
      read_entry(&conn, KEY_RECORDS).await?.unwrap_or_default();
    let theme: Theme = read_entry(&conn, KEY_THEME).await?.unwrap_or_default();
    let alert_permission: AlertPermission =
      read_entry(&conn, KEY_ALERT_PERMISSION).await?.unwrap_or_default();

    Ok(Self {
      conn,
      cached: Arc::new(Mutex::new(Cached {
        roster: Roster { subjects, records },
        theme,
        alert_permission,
      })),
    })
  }

  async fn write_entry<T: serde::Serialize>(
    &self,
    key: &'static str,
    value: &T,
  ) -> Result<()> {
    let encoded = serde_json::to_string(value)?;
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, encoded],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

async fn read_entry<T: serde::de::DeserializeOwned>(
  conn: &tokio_rusqlite::Connection,
  key: &'static str,
) -> Result<Option<T>> {
  let raw: Option<String> = conn
    .call(move |conn| {
      Ok(
        conn
          .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?,
      )
    })
    .await?;

  raw
    .map(|value| serde_json::from_str(&value))
    .transpose()
    .map_err(Error::from)
}

impl AttendanceStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    Ok(self.cached.lock().await.roster.subjects.clone())
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    Ok(self.cached.lock().await.roster.subject(id).cloned())
  }

  async fn add_subject(&self, draft: SubjectDraft) -> Result<Subject> {
    let schedule = draft.validate().map_err(rollcall_core::Error::from)?;
    let subject = Subject {
      id:         Uuid::new_v4(),
      name:       draft.name.trim().to_owned(),
      created_at: Utc::now(),
      schedule,
    };

    let mut cached = self.cached.lock().await;
    cached.roster.upsert_subject(subject.clone());
    self.write_entry(KEY_SUBJECTS, &cached.roster.subjects).await?;
    Ok(subject)
  }

  async fn update_subject(&self, id: Uuid, draft: SubjectDraft) -> Result<Subject> {
    let schedule = draft.validate().map_err(rollcall_core::Error::from)?;

    let mut cached = self.cached.lock().await;
    let existing = cached
      .roster
      .subject(id)
      .ok_or(rollcall_core::Error::SubjectNotFound(id))?;
    let subject = Subject {
      id,
      name: draft.name.trim().to_owned(),
      created_at: existing.created_at,
      schedule,
    };
    cached.roster.upsert_subject(subject.clone());
    self.write_entry(KEY_SUBJECTS, &cached.roster.subjects).await?;
    Ok(subject)
  }

  async fn delete_subject(&self, id: Uuid) -> Result<Subject> {
    let mut cached = self.cached.lock().await;
    let removed = cached.roster.remove_subject(id)?;
    self.write_entry(KEY_SUBJECTS, &cached.roster.subjects).await?;
    self.write_entry(KEY_RECORDS, &cached.roster.records).await?;
    Ok(removed)
  }

  // ── Attendance ────────────────────────────────────────────────────────────

  async fn mark_attendance(
    &self,
    subject_id: Uuid,
    date: NaiveDate,
    status: AttendanceStatus,
  ) -> Result<AttendanceRecord> {
    let mut cached = self.cached.lock().await;
    let record = cached.roster.mark_attendance(subject_id, date, status)?;
    self.write_entry(KEY_RECORDS, &cached.roster.records).await?;
    Ok(record)
  }

  async fn list_records(&self) -> Result<Vec<AttendanceRecord>> {
    Ok(self.cached.lock().await.roster.records.clone())
  }

  async fn snapshot(&self) -> Result<Roster> {
    Ok(self.cached.lock().await.roster.clone())
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn theme(&self) -> Result<Theme> {
    Ok(self.cached.lock().await.theme)
  }

  async fn set_theme(&self, theme: Theme) -> Result<()> {
    let mut cached = self.cached.lock().await;
    cached.theme = theme;
    self.write_entry(KEY_THEME, &theme).await
  }

  async fn alert_permission(&self) -> Result<AlertPermission> {
    Ok(self.cached.lock().await.alert_permission)
  }

  async fn set_alert_permission(&self, permission: AlertPermission) -> Result<()> {
    let mut cached = self.cached.lock().await;
    cached.alert_permission = permission;
    self.write_entry(KEY_ALERT_PERMISSION, &permission).await
  }
}
