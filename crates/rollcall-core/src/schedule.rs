//! Schedule matching: which classes end at a given wall-clock minute.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{
  record::AttendanceRecord,
  subject::{SlotTime, Subject, Weekday},
};

/// A schedule slot that ends at the instant passed to [`classes_ending_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEnd {
  pub subject_id:   Uuid,
  pub subject_name: String,
  pub ends_at:      SlotTime,
}

/// True when the subject has at least one slot on `day`.
pub fn has_class_on(subject: &Subject, day: Weekday) -> bool {
  subject.schedule.iter().any(|slot| slot.day == day)
}

/// Every subject with a slot ending exactly at `at` on `date`, excluding
/// subjects that already have a record for `date` (any status).
///
/// The comparison is minute-exact by design: an evaluation cadence that
/// skips the end minute produces no match for that slot that day, rather
/// than a late one.
pub fn classes_ending_at(
  subjects: &[Subject],
  records: &[AttendanceRecord],
  date: NaiveDate,
  at: SlotTime,
) -> Vec<ClassEnd> {
  let day = Weekday::from(date.weekday());
  let mut ended = Vec::new();
  for subject in subjects {
    if records
      .iter()
      .any(|r| r.subject_id == subject.id && r.date == date)
    {
      continue;
    }
    for slot in &subject.schedule {
      if slot.day == day && slot.end_time == at {
        ended.push(ClassEnd {
          subject_id:   subject.id,
          subject_name: subject.name.clone(),
          ends_at:      slot.end_time,
        });
      }
    }
  }
  ended
}
