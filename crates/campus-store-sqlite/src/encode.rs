//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`. Timestamps are stored in the campus zone
//! as RFC 3339 with microsecond precision, so every value has the same width
//! and string comparison orders them chronologically.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};

use campus_core::{
  attendance::{AttendanceMonth, MonthlyAttendance},
  calendar::{normalize, parse_date},
  feedback::{FeedbackEntry, QUESTION_COUNT},
  leave::{LeaveRequest, LeaveType},
  schedule::FeedbackWindow,
  year_level::YearLevel,
};

use crate::{Error, Result};

// ─── Dates and timestamps ────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> { Ok(parse_date(s)?) }

pub fn encode_ts(ts: &DateTime<FixedOffset>) -> String {
  normalize(ts).to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Accepts only the exact layout [`encode_ts`] writes; range queries compare
/// these columns as strings.
pub fn decode_ts(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s)
    .ok()
    .filter(|ts| encode_ts(ts) == s)
    .ok_or_else(|| Error::Decode(format!("malformed timestamp: {s:?}")))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count(column: &str, v: i64) -> Result<u32> {
  u32::try_from(v).map_err(|_| Error::Decode(format!("{column} out of range: {v}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `monthly_attendance` row.
pub struct RawMonthly {
  pub student_id:       i64,
  pub faculty_id:       i64,
  pub subject_id:       i64,
  pub year:             i32,
  pub month:            u32,
  pub academic_year:    String,
  pub classes_attended: i64,
  pub total_classes:    i64,
}

impl RawMonthly {
  pub fn into_monthly(self) -> Result<MonthlyAttendance> {
    Ok(MonthlyAttendance {
      student_id:       self.student_id,
      faculty_id:       self.faculty_id,
      subject_id:       self.subject_id,
      month:            AttendanceMonth::new(self.year, self.month)?,
      academic_year:    self.academic_year,
      classes_attended: decode_count("classes_attended", self.classes_attended)?,
      total_classes:    decode_count("total_classes", self.total_classes)?,
    })
  }
}

/// Raw strings read from a `feedback_schedule` row.
pub struct RawWindow {
  pub start_date: String,
  pub end_date:   String,
}

impl RawWindow {
  /// Stored start/end are not re-validated for order; they were checked on
  /// the way in.
  pub fn into_window(self) -> Result<FeedbackWindow> {
    Ok(FeedbackWindow {
      start: decode_ts(&self.start_date)?,
      end:   decode_ts(&self.end_date)?,
    })
  }
}

/// Raw values read from a `faculty_leaves` row.
pub struct RawLeave {
  pub id:          i64,
  pub faculty_id:  i64,
  pub leave_type:  String,
  pub start_date:  String,
  pub end_date:    String,
  pub is_half_day: bool,
  pub days_count:  f64,
  pub alt_faculty: Option<String>,
  pub created_at:  String,
}

impl RawLeave {
  pub fn into_request(self) -> Result<LeaveRequest> {
    Ok(LeaveRequest {
      id:          self.id,
      faculty_id:  self.faculty_id,
      leave_type:  LeaveType::from_code(&self.leave_type)?,
      start_date:  decode_date(&self.start_date)?,
      end_date:    decode_date(&self.end_date)?,
      is_half_day: self.is_half_day,
      days_count:  self.days_count,
      alt_faculty: self.alt_faculty,
      created_at:  decode_ts(&self.created_at)?,
    })
  }
}

/// Raw values read from a `feedback` row.
pub struct RawFeedback {
  pub id:             i64,
  pub student_name:   String,
  pub faculty_id:     i64,
  pub subject_id:     Option<i64>,
  pub year_level:     Option<String>,
  pub ratings:        [u8; QUESTION_COUNT],
  pub overall_rating: u8,
  pub comments:       Option<String>,
  pub created_at:     String,
}

impl RawFeedback {
  pub fn into_entry(self) -> Result<FeedbackEntry> {
    let year_level = self
      .year_level
      .map(|s| {
        s.parse::<YearLevel>().map_err(|_| Error::Decode(format!("unknown year level: {s:?}")))
      })
      .transpose()?;
    Ok(FeedbackEntry {
      id: self.id,
      student_name: self.student_name,
      faculty_id: self.faculty_id,
      subject_id: self.subject_id,
      year_level,
      ratings: self.ratings,
      overall_rating: self.overall_rating,
      comments: self.comments,
      created_at: decode_ts(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_are_fixed_width_in_campus_zone() {
    let utc = DateTime::parse_from_rfc3339("2025-07-01T00:00:00Z").unwrap();
    assert_eq!(encode_ts(&utc), "2025-07-01T05:30:00.000000+05:30");

    let later = DateTime::parse_from_rfc3339("2025-07-01T05:30:00.25+05:30").unwrap();
    assert!(encode_ts(&utc) < encode_ts(&later));
    assert_eq!(encode_ts(&utc).len(), encode_ts(&later).len());
  }

  #[test]
  fn malformed_columns_are_errors() {
    assert!(matches!(decode_ts("not a time"), Err(Error::Decode(_))));
    assert!(matches!(decode_date("2025/01/01"), Err(Error::Core(_))));
    assert!(matches!(decode_count("total_classes", -1), Err(Error::Decode(_))));
  }

  #[test]
  fn only_the_stored_timestamp_layout_decodes() {
    let stored = "2025-07-01T05:30:00.000000+05:30";
    assert_eq!(encode_ts(&decode_ts(stored).unwrap()), stored);

    for other in [
      "2025-07-01T05:30:00",
      "2025-07-01 05:30:00",
      "2025-07-01T05:30:00+05:30",
      "2025-07-01T00:00:00.000000Z",
    ] {
      assert!(matches!(decode_ts(other), Err(Error::Decode(_))), "{other}");
    }
  }

  #[test]
  fn unknown_year_level_is_a_decode_error() {
    let raw = RawFeedback {
      id:             1,
      student_name:   "Anonymous".into(),
      faculty_id:     2,
      subject_id:     None,
      year_level:     Some("PhD".into()),
      ratings:        [5; QUESTION_COUNT],
      overall_rating: 5,
      comments:       None,
      created_at:     "2025-07-01T05:30:00.000000+05:30".into(),
    };
    assert!(matches!(raw.into_entry(), Err(Error::Decode(_))));
  }
}
