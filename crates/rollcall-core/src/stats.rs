//! Attendance derivations: percentages, bands, and calendar standings.
//!
//! Everything here is recomputed from the full record set on demand; no
//! counter is stored anywhere. Cancelled classes never count towards a
//! denominator.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  record::{AttendanceRecord, AttendanceStatus},
  subject::Subject,
};

// ─── Percentages and bands ───────────────────────────────────────────────────

/// Traffic-light classification of an attendance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
  Good,
  Warning,
  Critical,
}

impl Band {
  pub fn of(percentage: u8) -> Self {
    if percentage >= 75 {
      Self::Good
    } else if percentage >= 50 {
      Self::Warning
    } else {
      Self::Critical
    }
  }
}

/// Attendance percentage, rounded half away from zero.
///
/// An empty denominator reads as 100, not 0: a subject with no held classes
/// has missed nothing.
pub fn percentage(attended: usize, held: usize) -> u8 {
  if held == 0 {
    return 100;
  }
  (attended as f64 / held as f64 * 100.0).round() as u8
}

/// Per-subject attendance figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
  pub subject_id: Uuid,
  pub name:       String,
  pub attended:   usize,
  pub held:       usize,
  pub percentage: u8,
  pub band:       Band,
}

/// Aggregate figures across every record in the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStats {
  pub attended:   usize,
  pub held:       usize,
  pub percentage: u8,
  pub band:       Band,
}

pub fn subject_stats(subject: &Subject, records: &[AttendanceRecord]) -> SubjectStats {
  let (attended, held) = tally(records.iter().filter(|r| r.subject_id == subject.id));
  let percentage = percentage(attended, held);
  SubjectStats {
    subject_id: subject.id,
    name: subject.name.clone(),
    attended,
    held,
    percentage,
    band: Band::of(percentage),
  }
}

pub fn overall_stats(records: &[AttendanceRecord]) -> OverallStats {
  let (attended, held) = tally(records.iter());
  let percentage = percentage(attended, held);
  OverallStats {
    attended,
    held,
    percentage,
    band: Band::of(percentage),
  }
}

fn tally<'a>(records: impl Iterator<Item = &'a AttendanceRecord>) -> (usize, usize) {
  let mut attended = 0;
  let mut held = 0;
  for record in records {
    match record.status {
      AttendanceStatus::Present => {
        attended += 1;
        held += 1;
      }
      AttendanceStatus::Absent => held += 1,
      AttendanceStatus::Cancelled => {}
    }
  }
  (attended, held)
}

// ─── Calendar standings ──────────────────────────────────────────────────────

/// The rollup of one calendar day across all subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStanding {
  /// No records at all.
  Empty,
  /// At least one present, no absences.
  Present,
  /// At least one absence, no presents.
  Absent,
  /// Both a present and an absence.
  Mixed,
  /// Records exist but none is present or absent (cancellations only).
  Neutral,
}

pub fn day_standing(records: &[AttendanceRecord], date: NaiveDate) -> DayStanding {
  let mut any = false;
  let mut present = false;
  let mut absent = false;
  for record in records.iter().filter(|r| r.date == date) {
    any = true;
    match record.status {
      AttendanceStatus::Present => present = true,
      AttendanceStatus::Absent => absent = true,
      AttendanceStatus::Cancelled => {}
    }
  }
  match (present, absent) {
    (true, true) => DayStanding::Mixed,
    (true, false) => DayStanding::Present,
    (false, true) => DayStanding::Absent,
    (false, false) if any => DayStanding::Neutral,
    (false, false) => DayStanding::Empty,
  }
}

/// Standing of every day in a month, in calendar order.
///
/// An out-of-range month yields an empty list; callers validate earlier if
/// they want to reject instead.
pub fn month_standings(
  records: &[AttendanceRecord],
  year: i32,
  month: u32,
) -> Vec<(NaiveDate, DayStanding)> {
  let mut days = Vec::new();
  let Some(mut day) = NaiveDate::from_ymd_opt(year, month, 1) else {
    return days;
  };
  while day.month() == month {
    days.push((day, day_standing(records, day)));
    day = match day.succ_opt() {
      Some(next) => next,
      None => break,
    };
  }
  days
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn subject(name: &str) -> Subject {
    Subject {
      id:         Uuid::new_v4(),
      name:       name.to_owned(),
      created_at: Utc::now(),
      schedule:   Vec::new(),
    }
  }

  fn record(subject_id: Uuid, date: &str, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
      id: Uuid::new_v4(),
      subject_id,
      date: date.parse().unwrap(),
      status,
    }
  }

  #[test]
  fn empty_denominator_reads_as_full_attendance() {
    assert_eq!(percentage(0, 0), 100);
    assert_eq!(Band::of(percentage(0, 0)), Band::Good);
  }

  #[test]
  fn percentage_rounds_half_away_from_zero() {
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(1, 3), 33);
    assert_eq!(percentage(1, 2), 50);
    assert_eq!(percentage(5, 8), 63);
    assert_eq!(percentage(0, 4), 0);
  }

  #[test]
  fn band_boundaries_sit_at_75_and_50() {
    assert_eq!(Band::of(100), Band::Good);
    assert_eq!(Band::of(75), Band::Good);
    assert_eq!(Band::of(74), Band::Warning);
    assert_eq!(Band::of(50), Band::Warning);
    assert_eq!(Band::of(49), Band::Critical);
    assert_eq!(Band::of(0), Band::Critical);
  }

  #[test]
  fn cancelled_classes_never_count() {
    let s = subject("Physics");
    let records = vec![
      record(s.id, "2026-03-02", AttendanceStatus::Present),
      record(s.id, "2026-03-03", AttendanceStatus::Cancelled),
      record(s.id, "2026-03-04", AttendanceStatus::Cancelled),
    ];
    let stats = subject_stats(&s, &records);
    assert_eq!((stats.attended, stats.held), (1, 1));
    assert_eq!(stats.percentage, 100);
    assert_eq!(stats.band, Band::Good);
  }

  #[test]
  fn subject_stats_ignore_other_subjects() {
    let a = subject("A");
    let b = subject("B");
    let records = vec![
      record(a.id, "2026-03-02", AttendanceStatus::Present),
      record(b.id, "2026-03-02", AttendanceStatus::Absent),
      record(b.id, "2026-03-03", AttendanceStatus::Absent),
    ];

    let stats = subject_stats(&b, &records);
    assert_eq!((stats.attended, stats.held), (0, 2));
    assert_eq!(stats.band, Band::Critical);

    let overall = overall_stats(&records);
    assert_eq!((overall.attended, overall.held), (1, 3));
    assert_eq!(overall.percentage, 33);
  }

  #[test]
  fn day_standing_rollup() {
    let s = subject("Physics");
    let day = "2026-03-02";
    let present = record(s.id, day, AttendanceStatus::Present);
    let absent = record(s.id, day, AttendanceStatus::Absent);
    let cancelled = record(s.id, day, AttendanceStatus::Cancelled);
    let date: NaiveDate = day.parse().unwrap();

    assert_eq!(day_standing(&[], date), DayStanding::Empty);
    assert_eq!(day_standing(&[present.clone()], date), DayStanding::Present);
    assert_eq!(day_standing(&[absent.clone()], date), DayStanding::Absent);
    assert_eq!(
      day_standing(&[present.clone(), absent], date),
      DayStanding::Mixed
    );
    assert_eq!(day_standing(&[cancelled], date), DayStanding::Neutral);
    assert_eq!(
      day_standing(&[present], "2026-03-03".parse().unwrap()),
      DayStanding::Empty
    );
  }

  #[test]
  fn month_standings_cover_every_day_in_order() {
    let s = subject("Physics");
    let records = vec![record(s.id, "2026-02-10", AttendanceStatus::Present)];

    let days = month_standings(&records, 2026, 2);
    assert_eq!(days.len(), 28);
    assert_eq!(days[0].0, "2026-02-01".parse::<NaiveDate>().unwrap());
    assert_eq!(days[0].1, DayStanding::Empty);
    assert_eq!(days[9].0.day(), 10);
    assert_eq!(days[9].1, DayStanding::Present);
    assert_eq!(days[27].0.day(), 28);

    assert!(month_standings(&records, 2026, 13).is_empty());
  }
}
