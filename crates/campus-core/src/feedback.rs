//! Student feedback on faculty: submissions, validation, and per-faculty
//! statistics.
//!
//! Each submission rates ten fixed questions plus an overall score, all on a
//! 1 to 10 scale. Submissions are accepted only while the feedback window is
//! open and only from students whose attendance meets the policy threshold.

use std::ops::RangeInclusive;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  attendance::{AttendanceSummary, FacultyId, SubjectId},
  year_level::YearLevel,
};

pub const QUESTION_COUNT: usize = 10;

pub const RATING_SCALE: RangeInclusive<u8> = 1..=10;

/// Stored in place of a blank student name.
pub const ANONYMOUS: &str = "Anonymous";

// ─── Submissions ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
  /// `None` or blank is stored as [`ANONYMOUS`].
  pub student_name:   Option<String>,
  pub faculty_id:     FacultyId,
  pub subject_id:     Option<SubjectId>,
  pub year_level:     Option<YearLevel>,
  pub ratings:        [u8; QUESTION_COUNT],
  pub overall_rating: u8,
  pub comments:       Option<String>,
  pub submitted_at:   DateTime<FixedOffset>,
}

impl NewFeedback {
  /// Every rating, overall included, must be on [`RATING_SCALE`].
  pub fn validate(&self) -> Result<()> {
    for (i, &value) in self.ratings.iter().enumerate() {
      check_rating(format!("q{}", i + 1), value)?;
    }
    check_rating("overall".to_owned(), self.overall_rating)
  }

  pub fn display_name(&self) -> &str {
    match self.student_name.as_deref().map(str::trim) {
      Some(name) if !name.is_empty() => name,
      _ => ANONYMOUS,
    }
  }
}

fn check_rating(field: String, value: u8) -> Result<()> {
  if RATING_SCALE.contains(&value) {
    Ok(())
  } else {
    Err(Error::InvalidRating { field, value })
  }
}

/// A stored feedback submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEntry {
  pub id:             i64,
  pub student_name:   String,
  pub faculty_id:     FacultyId,
  pub subject_id:     Option<SubjectId>,
  pub year_level:     Option<YearLevel>,
  pub ratings:        [u8; QUESTION_COUNT],
  pub overall_rating: u8,
  pub comments:       Option<String>,
  pub created_at:     DateTime<FixedOffset>,
}

/// Submission count and mean overall rating for one faculty member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FacultyFeedbackStats {
  pub faculty_id:     FacultyId,
  pub count:          u32,
  /// `None` until the first submission.
  pub average_rating: Option<f64>,
}

// ─── Access ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAccess {
  Granted,
  WindowClosed,
  AttendanceTooLow,
}

impl FeedbackAccess {
  pub fn is_granted(&self) -> bool { matches!(self, Self::Granted) }
}

/// A closed window takes precedence over low attendance. `attendance` is
/// `None` when no student is in question.
pub fn feedback_access(open: bool, attendance: Option<&AttendanceSummary>) -> FeedbackAccess {
  if !open {
    FeedbackAccess::WindowClosed
  } else if attendance.is_some_and(|a| !a.eligible) {
    FeedbackAccess::AttendanceTooLow
  } else {
    FeedbackAccess::Granted
  }
}
