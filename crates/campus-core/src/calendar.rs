//! The academic calendar.
//!
//! An academic year runs from July 1 00:00:00 to June 30 23:59:59 of the
//! following year, in the campus civil time zone (Indian Standard Time). It is
//! never stored; it is derived from a date and attached as a label to monthly
//! attendance rows and leave-usage queries.
//!
//! Every timestamp that enters the crate passes through [`parse_timestamp`] or
//! [`normalize`], so naive and zone-aware inputs are compared in one zone.

use chrono::{
  DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Serialize, Serializer, ser::SerializeStruct as _};

use crate::{Error, Result};

// ─── Time zone ───────────────────────────────────────────────────────────────

/// UTC+05:30. IST observes no daylight saving, so a fixed offset is exact.
pub const CAMPUS_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

pub const CAMPUS_OFFSET: FixedOffset = match FixedOffset::east_opt(CAMPUS_UTC_OFFSET_SECS) {
  Some(offset) => offset,
  None => panic!("campus offset out of range"),
};

/// The first month of the academic year.
pub const ACADEMIC_YEAR_START_MONTH: u32 = 7;

pub fn campus_offset() -> FixedOffset { CAMPUS_OFFSET }

/// The current instant, expressed in the campus zone.
pub fn now_in_campus_tz() -> DateTime<FixedOffset> { normalize(&Utc::now()) }

/// Re-express any zone-aware timestamp in the campus zone.
pub fn normalize<Tz: TimeZone>(ts: &DateTime<Tz>) -> DateTime<FixedOffset> {
  ts.with_timezone(&CAMPUS_OFFSET)
}

/// Attach the campus offset to a civil (wall-clock) date-time. `None` when
/// the matching UTC instant falls outside chrono's range.
fn at_campus_time(civil: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
  let utc = civil.checked_sub_offset(CAMPUS_OFFSET)?;
  Some(DateTime::from_naive_utc_and_offset(utc, CAMPUS_OFFSET))
}

fn july_first(year: i32) -> Option<DateTime<FixedOffset>> {
  let date = NaiveDate::from_ymd_opt(year, ACADEMIC_YEAR_START_MONTH, 1)?;
  at_campus_time(date.and_time(NaiveTime::MIN))
}

// ─── Academic year ───────────────────────────────────────────────────────────

/// The academic year `[July 1 of start_year, June 30 23:59:59 of start_year+1]`.
///
/// Serialises with its `label`, e.g. `"2025-2026"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicYear {
  pub start_year: i32,
  pub start:      DateTime<FixedOffset>,
  pub end:        DateTime<FixedOffset>,
  next_start:     DateTime<FixedOffset>,
}

impl AcademicYear {
  /// Fails with [`Error::YearOutOfRange`] when either July 1 falls outside
  /// the dates chrono can represent.
  pub fn starting(start_year: i32) -> Result<Self> {
    let out_of_range = || Error::YearOutOfRange(start_year);
    let start = july_first(start_year).ok_or_else(out_of_range)?;
    let next_start =
      start_year.checked_add(1).and_then(july_first).ok_or_else(out_of_range)?;
    let end = next_start.checked_sub_signed(Duration::seconds(1)).ok_or_else(out_of_range)?;
    Ok(Self { start_year, start, end, next_start })
  }

  /// The academic year a calendar month belongs to. `month` is 1-based;
  /// July through December start a new year.
  pub fn for_month(year: i32, month: u32) -> Result<Self> {
    if month >= ACADEMIC_YEAR_START_MONTH {
      Self::starting(year)
    } else {
      Self::starting(year.checked_sub(1).ok_or(Error::YearOutOfRange(year))?)
    }
  }

  /// Parse a label of the form `"2025-2026"`.
  pub fn from_label(label: &str) -> Result<Self> {
    let invalid = || Error::InvalidAcademicYear(label.to_owned());
    let (first, second) = label.trim().split_once('-').ok_or_else(invalid)?;
    let first: i32 = first.trim().parse().map_err(|_| invalid())?;
    let second: i32 = second.trim().parse().map_err(|_| invalid())?;
    if first.checked_add(1) != Some(second) {
      return Err(invalid());
    }
    Self::starting(first).map_err(|_| invalid())
  }

  /// The academic year containing the current campus-zone date.
  pub fn current() -> Result<Self> { academic_year_at(&now_in_campus_tz()) }

  /// `"{start_year}-{start_year + 1}"`.
  pub fn label(&self) -> String { format!("{}-{}", self.start_year, self.next_start.year()) }

  /// July 1 00:00:00 of the following academic year.
  pub fn next_start(&self) -> DateTime<FixedOffset> { self.next_start }

  /// Whether `ts` falls inside the year. The upper bound is the next year's
  /// start (exclusive), so instants within the last second of June 30 count.
  pub fn contains<Tz: TimeZone>(&self, ts: &DateTime<Tz>) -> bool {
    let ts = normalize(ts);
    ts >= self.start && ts < self.next_start
  }
}

impl Serialize for AcademicYear {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut s = serializer.serialize_struct("AcademicYear", 4)?;
    s.serialize_field("start_year", &self.start_year)?;
    s.serialize_field("start", &self.start)?;
    s.serialize_field("end", &self.end)?;
    s.serialize_field("label", &self.label())?;
    s.end()
  }
}

/// The academic year containing a civil date.
pub fn academic_year_for(date: NaiveDate) -> Result<AcademicYear> {
  AcademicYear::for_month(date.year(), date.month())
}

/// The academic year containing an instant, judged by its campus-zone date.
pub fn academic_year_at<Tz: TimeZone>(ts: &DateTime<Tz>) -> Result<AcademicYear> {
  academic_year_for(normalize(ts).date_naive())
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Offset-bearing layouts besides strict RFC 3339.
const AWARE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Naive layouts; interpreted as campus-zone wall-clock time.
const NAIVE_FORMATS: &[&str] = &[
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M",
];

/// Parse a timestamp and normalise it into the campus zone.
///
/// Accepts RFC 3339 with any offset, ISO-8601 date-times without an offset
/// (taken as campus-zone civil time), and bare `YYYY-MM-DD` dates (campus
/// midnight). Anything else is [`Error::InvalidTimestamp`].
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>> {
  let s = input.trim();
  if s.is_empty() {
    return Err(Error::InvalidTimestamp(input.to_owned()));
  }

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(normalize(&dt));
  }
  for fmt in AWARE_FORMATS {
    if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
      return Ok(normalize(&dt));
    }
  }
  for fmt in NAIVE_FORMATS {
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
      return at_campus_time(ndt).ok_or_else(|| Error::InvalidTimestamp(input.to_owned()));
    }
  }
  if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
    return at_campus_time(date.and_time(NaiveTime::MIN))
      .ok_or_else(|| Error::InvalidTimestamp(input.to_owned()));
  }

  Err(Error::InvalidTimestamp(input.to_owned()))
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
    .map_err(|_| Error::InvalidDate(input.to_owned()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
