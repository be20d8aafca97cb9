//! Daily attendance, monthly rollups, and attendance eligibility.
//!
//! Daily marks are written one row per (student, faculty, subject, date).
//! After each save the month is re-rolled into one [`MonthlyAttendance`] row
//! per student, which overwrites the previous rollup for the same key.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, calendar::AcademicYear};

pub type StudentId = i64;
pub type FacultyId = i64;
pub type SubjectId = i64;

// ─── Daily records ───────────────────────────────────────────────────────────

/// One student's mark for one scheduled class on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub student_id: StudentId,
  pub faculty_id: FacultyId,
  pub subject_id: SubjectId,
  pub date:       NaiveDate,
  pub present:    bool,
}

/// The projection of an [`AttendanceRecord`] that the rollup consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMark {
  pub student_id: StudentId,
  pub present:    bool,
  pub date:       NaiveDate,
}

/// One student's line on a class-day sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMark {
  pub student_id: StudentId,
  pub present:    bool,
}

/// A faculty member's attendance sheet for one class day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSheet {
  pub faculty_id: FacultyId,
  pub subject_id: SubjectId,
  pub date:       NaiveDate,
  pub marks:      Vec<SheetMark>,
}

impl ClassSheet {
  /// The month this sheet rolls up into.
  pub fn month(&self) -> Result<AttendanceMonth> { AttendanceMonth::of(self.date) }

  pub fn records(&self) -> impl Iterator<Item = AttendanceRecord> + '_ {
    self.marks.iter().map(|m| AttendanceRecord {
      student_id: m.student_id,
      faculty_id: self.faculty_id,
      subject_id: self.subject_id,
      date:       self.date,
      present:    m.present,
    })
  }
}

// ─── Month key ───────────────────────────────────────────────────────────────

/// A validated calendar month whose dates and academic year are all
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AttendanceMonth {
  year:           i32,
  month:          u32,
  #[serde(skip)]
  first_day:      NaiveDate,
  #[serde(skip)]
  next_first_day: NaiveDate,
  #[serde(skip)]
  academic_year:  AcademicYear,
}

impl AttendanceMonth {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::InvalidMonth(month));
    }
    let out_of_range = || Error::YearOutOfRange(year);
    let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let next_first_day =
      first_day.checked_add_months(Months::new(1)).ok_or_else(out_of_range)?;
    let academic_year = AcademicYear::for_month(year, month)?;
    Ok(Self { year, month, first_day, next_first_day, academic_year })
  }

  pub fn of(date: NaiveDate) -> Result<Self> { Self::new(date.year(), date.month()) }

  pub fn year(&self) -> i32 { self.year }

  pub fn month(&self) -> u32 { self.month }

  pub fn first_day(&self) -> NaiveDate { self.first_day }

  pub fn next_first_day(&self) -> NaiveDate { self.next_first_day }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date >= self.first_day && date < self.next_first_day
  }

  pub fn academic_year(&self) -> AcademicYear { self.academic_year }
}

impl fmt::Display for AttendanceMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

// ─── Rollup ──────────────────────────────────────────────────────────────────

/// Attended / held class counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupCounts {
  pub attended: u32,
  pub total:    u32,
}

impl RollupCounts {
  pub fn percentage(&self) -> f64 { attendance_percentage(self.attended, self.total) }
}

impl std::ops::Add for RollupCounts {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    Self {
      attended: self.attended.saturating_add(rhs.attended),
      total:    self.total.saturating_add(rhs.total),
    }
  }
}

/// The persisted monthly rollup. Unique on
/// `(student_id, faculty_id, subject_id, month, academic_year)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyAttendance {
  pub student_id:       StudentId,
  pub faculty_id:       FacultyId,
  pub subject_id:       SubjectId,
  pub month:            AttendanceMonth,
  pub academic_year:    String,
  pub classes_attended: u32,
  pub total_classes:    u32,
}

impl MonthlyAttendance {
  pub fn counts(&self) -> RollupCounts {
    RollupCounts { attended: self.classes_attended, total: self.total_classes }
  }
}

/// Roll a month of daily marks for one faculty/subject into per-student
/// counts.
///
/// `total` is the number of distinct class dates in the whole input, so a
/// student who was absent on a recorded day still has that day in `total`.
/// `attended` is the number of distinct dates the student was marked present.
pub fn monthly_rollup(marks: &[DailyMark]) -> BTreeMap<StudentId, RollupCounts> {
  let sessions: BTreeSet<NaiveDate> = marks.iter().map(|m| m.date).collect();
  let total = sessions.len() as u32;

  let mut present_days: BTreeMap<StudentId, BTreeSet<NaiveDate>> = BTreeMap::new();
  for mark in marks {
    let days = present_days.entry(mark.student_id).or_default();
    if mark.present {
      days.insert(mark.date);
    }
  }

  present_days
    .into_iter()
    .map(|(student, days)| (student, RollupCounts { attended: days.len() as u32, total }))
    .collect()
}

/// [`monthly_rollup`] materialised as rows ready to upsert.
pub fn rollup_rows(
  faculty_id: FacultyId,
  subject_id: SubjectId,
  month: AttendanceMonth,
  marks: &[DailyMark],
) -> Vec<MonthlyAttendance> {
  let academic_year = month.academic_year().label();
  monthly_rollup(marks)
    .into_iter()
    .map(|(student_id, counts)| MonthlyAttendance {
      student_id,
      faculty_id,
      subject_id,
      month,
      academic_year: academic_year.clone(),
      classes_attended: counts.attended,
      total_classes: counts.total,
    })
    .collect()
}

// ─── Percentages and eligibility ─────────────────────────────────────────────

/// `attended / total * 100`, rounded to two decimals; `0.0` when nothing was
/// held.
pub fn attendance_percentage(attended: u32, total: u32) -> f64 {
  if total == 0 {
    return 0.0;
  }
  let pct = f64::from(attended) / f64::from(total) * 100.0;
  (pct * 100.0).round() / 100.0
}

pub fn is_attendance_eligible(percentage: f64, threshold: f64) -> bool { percentage >= threshold }

/// A student's attendance with the eligibility verdict applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
  pub attended:   u32,
  pub total:      u32,
  pub percentage: f64,
  pub eligible:   bool,
}

pub fn summarize(counts: RollupCounts, threshold: f64) -> AttendanceSummary {
  let percentage = counts.percentage();
  AttendanceSummary {
    attended: counts.attended,
    total: counts.total,
    percentage,
    eligible: is_attendance_eligible(percentage, threshold),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
