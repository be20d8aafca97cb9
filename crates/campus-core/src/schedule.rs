//! Admin-set time windows: feedback collection and online tests.

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  calendar::{normalize, parse_timestamp},
};

// ─── Feedback window ─────────────────────────────────────────────────────────

/// The period during which students may submit faculty feedback. Both bounds
/// are held in the campus zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackWindow {
  pub start: DateTime<FixedOffset>,
  pub end:   DateTime<FixedOffset>,
}

impl FeedbackWindow {
  pub fn new<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self> {
    let (start, end) = (normalize(&start), normalize(&end));
    if end < start {
      return Err(Error::InvertedWindow);
    }
    Ok(Self { start, end })
  }

  /// Build a window from form input; naive values are read as campus time.
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
  }

  pub fn contains<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
    let now = normalize(now);
    self.start <= now && now <= self.end
  }
}

/// `false` when no window is configured; otherwise whether `now` lies within
/// `[start, end]`, inclusive at both ends.
pub fn is_feedback_open<Tz: TimeZone>(window: Option<&FeedbackWindow>, now: &DateTime<Tz>) -> bool {
  window.is_some_and(|w| w.contains(now))
}

// ─── Online tests ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestAvailability {
  /// No start time has been set.
  Unscheduled,
  NotStarted,
  Open,
  Closed,
}

impl TestAvailability {
  pub fn can_attempt(&self) -> bool { matches!(self, Self::Open) }
}

/// Whether a test can be taken at `now`. A test with a start but no end stays
/// open indefinitely once started.
pub fn test_availability<Tz: TimeZone>(
  start: Option<&DateTime<FixedOffset>>,
  end: Option<&DateTime<FixedOffset>>,
  now: &DateTime<Tz>,
) -> TestAvailability {
  let now = normalize(now);
  let Some(start) = start else {
    return TestAvailability::Unscheduled;
  };
  if now < *start {
    return TestAvailability::NotStarted;
  }
  match end {
    Some(end) if now > *end => TestAvailability::Closed,
    _ => TestAvailability::Open,
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn ts(s: &str) -> DateTime<FixedOffset> { DateTime::parse_from_rfc3339(s).unwrap() }

  fn window() -> FeedbackWindow {
    FeedbackWindow::new(ts("2025-01-01T09:00:00+05:30"), ts("2025-01-01T17:00:00+05:30"))
      .unwrap()
  }

  #[test]
  fn no_window_means_closed() {
    assert!(!is_feedback_open(None, &ts("2025-01-01T12:00:00+05:30")));
    assert!(!is_feedback_open(None, &Utc::now()));
  }

  #[test]
  fn inside_and_outside_the_window() {
    let w = window();
    assert!(is_feedback_open(Some(&w), &ts("2025-01-01T12:00:00+05:30")));
    assert!(!is_feedback_open(Some(&w), &ts("2025-01-01T18:00:00+05:30")));
    assert!(!is_feedback_open(Some(&w), &ts("2025-01-01T08:59:59+05:30")));
  }

  #[test]
  fn bounds_are_inclusive() {
    let w = window();
    assert!(is_feedback_open(Some(&w), &w.start));
    assert!(is_feedback_open(Some(&w), &w.end));
  }

  #[test]
  fn comparison_is_by_instant_not_wall_clock() {
    let w = window();
    // 06:30 UTC is 12:00 IST.
    assert!(is_feedback_open(Some(&w), &ts("2025-01-01T06:30:00Z")));
    // 12:00 UTC is 17:30 IST.
    assert!(!is_feedback_open(Some(&w), &ts("2025-01-01T12:00:00Z")));
  }

  #[test]
  fn naive_form_input_is_read_as_campus_time() {
    let w = FeedbackWindow::parse("2025-01-01 09:00", "2025-01-01T17:00:00").unwrap();
    assert_eq!(w, window());
  }

  #[test]
  fn inverted_and_malformed_windows_are_errors() {
    assert!(matches!(
      FeedbackWindow::parse("2025-01-02", "2025-01-01"),
      Err(Error::InvertedWindow)
    ));
    assert!(matches!(
      FeedbackWindow::parse("soon", "2025-01-01"),
      Err(Error::InvalidTimestamp(_))
    ));
  }

  #[test]
  fn test_availability_states() {
    let start = ts("2025-03-01T10:00:00+05:30");
    let end = ts("2025-03-01T11:00:00+05:30");
    let at = |s| test_availability(Some(&start), Some(&end), &ts(s));

    assert_eq!(at("2025-03-01T09:59:59+05:30"), TestAvailability::NotStarted);
    assert_eq!(at("2025-03-01T10:00:00+05:30"), TestAvailability::Open);
    assert_eq!(at("2025-03-01T11:00:00+05:30"), TestAvailability::Open);
    assert_eq!(at("2025-03-01T11:00:01+05:30"), TestAvailability::Closed);

    assert_eq!(
      test_availability(None, Some(&end), &start),
      TestAvailability::Unscheduled
    );
    assert_eq!(
      test_availability(Some(&start), None, &ts("2030-01-01T00:00:00+05:30")),
      TestAvailability::Open
    );
    assert!(TestAvailability::Open.can_attempt());
    assert!(!TestAvailability::Closed.can_attempt());
  }
}
