//! Subjects and their weekly schedules.
//!
//! A subject starts life as a [`SubjectDraft`] — raw user input with
//! unparsed time strings — and is validated into typed [`ClassSlot`]s at the
//! boundary. Wire names (camelCase fields, full weekday names, epoch
//! millisecond timestamps) match the persisted layout exactly, so a dataset
//! exported from the web client's localStorage loads unchanged.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, ValidationError};

// ─── Weekday ─────────────────────────────────────────────────────────────────

/// Day of the week, serialised as the full English name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
  Sunday,
  Monday,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
}

impl Weekday {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Sunday => "Sunday",
      Self::Monday => "Monday",
      Self::Tuesday => "Tuesday",
      Self::Wednesday => "Wednesday",
      Self::Thursday => "Thursday",
      Self::Friday => "Friday",
      Self::Saturday => "Saturday",
    }
  }
}

impl fmt::Display for Weekday {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<chrono::Weekday> for Weekday {
  fn from(day: chrono::Weekday) -> Self {
    match day {
      chrono::Weekday::Sun => Self::Sunday,
      chrono::Weekday::Mon => Self::Monday,
      chrono::Weekday::Tue => Self::Tuesday,
      chrono::Weekday::Wed => Self::Wednesday,
      chrono::Weekday::Thu => Self::Thursday,
      chrono::Weekday::Fri => Self::Friday,
      chrono::Weekday::Sat => Self::Saturday,
    }
  }
}

// ─── SlotTime ────────────────────────────────────────────────────────────────

/// A wall-clock minute in zero-padded `HH:MM` form.
///
/// The derived ordering agrees with lexicographic comparison of the string
/// form, which is what schedule validation compares with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SlotTime {
  pub hour:   u8,
  pub minute: u8,
}

impl SlotTime {
  /// 12-hour display form, e.g. `"2:30 PM"` or `"12:05 AM"`.
  pub fn format_12h(self) -> String {
    let meridiem = if self.hour >= 12 { "PM" } else { "AM" };
    let hour = match self.hour % 12 {
      0 => 12,
      h => h,
    };
    format!("{}:{:02} {}", hour, self.minute, meridiem)
  }
}

impl fmt::Display for SlotTime {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:02}:{:02}", self.hour, self.minute)
  }
}

impl FromStr for SlotTime {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    let parse = || -> Option<SlotTime> {
      let (h, m) = s.split_once(':')?;
      if h.len() != 2 || m.len() != 2 {
        return None;
      }
      let hour: u8 = h.parse().ok()?;
      let minute: u8 = m.parse().ok()?;
      (hour < 24 && minute < 60).then_some(SlotTime { hour, minute })
    };
    parse().ok_or_else(|| Error::InvalidTime(s.to_owned()))
  }
}

impl Serialize for SlotTime {
  fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for SlotTime {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

// ─── Subjects ────────────────────────────────────────────────────────────────

/// One weekly slot: a weekday with start and end times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSlot {
  pub day:        Weekday,
  pub start_time: SlotTime,
  pub end_time:   SlotTime,
}

/// A tracked class with its weekly schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id:   Uuid,
  pub name: String,
  #[serde(with = "chrono::serde::ts_milliseconds")]
  pub created_at: DateTime<Utc>,
  pub schedule:   Vec<ClassSlot>,
}

// ─── Drafts ──────────────────────────────────────────────────────────────────

/// One unvalidated schedule slot as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDraft {
  pub day:        Weekday,
  pub start_time: String,
  pub end_time:   String,
}

/// Raw subject input, before any field has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectDraft {
  pub name:     String,
  pub schedule: Vec<SlotDraft>,
}

impl SubjectDraft {
  /// Validate the draft, producing the typed schedule.
  ///
  /// Checks run in a fixed order and stop at the first failure: empty name,
  /// no days, then per slot a missing time, an unparseable time, an end not
  /// after the start, and a day that already appeared.
  pub fn validate(&self) -> Result<Vec<ClassSlot>, ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::EmptyName);
    }
    if self.schedule.is_empty() {
      return Err(ValidationError::NoDays);
    }

    let mut slots: Vec<ClassSlot> = Vec::with_capacity(self.schedule.len());
    for slot in &self.schedule {
      if slot.start_time.is_empty() || slot.end_time.is_empty() {
        return Err(ValidationError::MissingTime(slot.day));
      }
      let start = parse_slot_time(slot.day, &slot.start_time)?;
      let end = parse_slot_time(slot.day, &slot.end_time)?;
      if start >= end {
        return Err(ValidationError::EndNotAfterStart(slot.day));
      }
      if slots.iter().any(|s| s.day == slot.day) {
        return Err(ValidationError::DuplicateDay(slot.day));
      }
      slots.push(ClassSlot {
        day:        slot.day,
        start_time: start,
        end_time:   end,
      });
    }
    Ok(slots)
  }
}

fn parse_slot_time(day: Weekday, text: &str) -> Result<SlotTime, ValidationError> {
  text.parse().map_err(|_| ValidationError::InvalidTime {
    day,
    text: text.to_owned(),
  })
}
