//! The in-memory dataset: every subject and every attendance record.
//!
//! [`Roster`] carries the whole collection exactly as persisted, and its
//! methods are the only mutation paths. Stores load one at startup, apply
//! these transitions, and write the touched collection back wholesale.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  record::{AttendanceRecord, AttendanceStatus},
  subject::Subject,
};

/// All subjects and records, with subjects kept sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Roster {
  pub subjects: Vec<Subject>,
  pub records:  Vec<AttendanceRecord>,
}

impl Roster {
  pub fn subject(&self, id: Uuid) -> Option<&Subject> {
    self.subjects.iter().find(|s| s.id == id)
  }

  pub fn record_for(&self, subject_id: Uuid, date: NaiveDate) -> Option<&AttendanceRecord> {
    self
      .records
      .iter()
      .find(|r| r.subject_id == subject_id && r.date == date)
  }

  /// Insert or replace a subject by id, keeping the name ordering
  /// (case-insensitive) intact.
  pub fn upsert_subject(&mut self, subject: Subject) {
    match self.subjects.iter_mut().find(|s| s.id == subject.id) {
      Some(existing) => *existing = subject,
      None => self.subjects.push(subject),
    }
    self
      .subjects
      .sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
  }

  /// Remove a subject and every record that points at it.
  pub fn remove_subject(&mut self, id: Uuid) -> Result<Subject> {
    let position = self
      .subjects
      .iter()
      .position(|s| s.id == id)
      .ok_or(Error::SubjectNotFound(id))?;
    let subject = self.subjects.remove(position);
    self.records.retain(|r| r.subject_id != id);
    Ok(subject)
  }

  /// Record an outcome for a subject on a date.
  ///
  /// An existing record for the same `(subject, date)` pair has its status
  /// replaced in place; the record id never changes on re-mark.
  pub fn mark_attendance(
    &mut self,
    subject_id: Uuid,
    date: NaiveDate,
    status: AttendanceStatus,
  ) -> Result<AttendanceRecord> {
    if self.subject(subject_id).is_none() {
      return Err(Error::SubjectNotFound(subject_id));
    }

    if let Some(existing) = self
      .records
      .iter_mut()
      .find(|r| r.subject_id == subject_id && r.date == date)
    {
      existing.status = status;
      return Ok(existing.clone());
    }

    let record = AttendanceRecord {
      id: Uuid::new_v4(),
      subject_id,
      date,
      status,
    };
    self.records.push(record.clone());
    Ok(record)
  }
}
