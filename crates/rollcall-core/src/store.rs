//! The [`AttendanceStore`] trait: persistence for subjects, records, and
//! preferences.
//!
//! Implementations own durability and locking; the semantics of every
//! mutation (validation, upsert-on-mark, delete cascade) are fixed here and
//! match the [`crate::roster::Roster`] transitions.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  prefs::{AlertPermission, Theme},
  record::{AttendanceRecord, AttendanceStatus},
  roster::Roster,
  subject::{Subject, SubjectDraft},
};

/// Abstraction over an attendance store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AttendanceStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Subjects ──────────────────────────────────────────────────────────

  /// All subjects, sorted by name (case-insensitive).
  fn list_subjects(
    &self,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Validate a draft and add it as a new subject. The store assigns the id
  /// and creation timestamp and trims the name.
  fn add_subject(
    &self,
    draft: SubjectDraft,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Replace an existing subject's name and schedule from a draft, keeping
  /// its id and creation timestamp.
  fn update_subject(
    &self,
    id: Uuid,
    draft: SubjectDraft,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Remove a subject and, in the same operation, every record that points
  /// at it. Returns the removed subject.
  fn delete_subject(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Record an outcome for a subject on a date, replacing any existing
  /// record for the same pair.
  fn mark_attendance(
    &self,
    subject_id: Uuid,
    date: NaiveDate,
    status: AttendanceStatus,
  ) -> impl Future<Output = Result<AttendanceRecord, Self::Error>> + Send + '_;

  fn list_records(
    &self,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + '_;

  /// A consistent copy of the whole dataset, for derivations that need
  /// subjects and records from the same instant.
  fn snapshot(&self) -> impl Future<Output = Result<Roster, Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  fn theme(&self) -> impl Future<Output = Result<Theme, Self::Error>> + Send + '_;

  fn set_theme(
    &self,
    theme: Theme,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn alert_permission(
    &self,
  ) -> impl Future<Output = Result<AlertPermission, Self::Error>> + Send + '_;

  fn set_alert_permission(
    &self,
    permission: AlertPermission,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
