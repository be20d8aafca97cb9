//! Faculty leave requests and per-academic-year balances.
//!
//! Balances are never stored. Usage is summed over requests created inside
//! the current academic year, so allowances reset implicitly every July 1.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator as _};

use crate::{Error, Result, attendance::FacultyId, policy::PortalPolicy};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
  Display, EnumString, AsRefStr, EnumIter,
)]
pub enum LeaveType {
  #[serde(rename = "CL")]
  #[strum(serialize = "CL")]
  Casual,
  #[serde(rename = "SL")]
  #[strum(serialize = "SL")]
  Sick,
  #[serde(rename = "CO")]
  #[strum(serialize = "CO")]
  CompensatoryOff,
  #[serde(rename = "DL")]
  #[strum(serialize = "DL")]
  Duty,
}

impl LeaveType {
  pub fn from_code(code: &str) -> Result<Self> {
    code.trim().parse().map_err(|_| Error::UnknownLeaveType(code.to_owned()))
  }

  /// Days allowed per academic year; `None` for unlimited types.
  pub fn annual_limit(&self, policy: &PortalPolicy) -> Option<f64> {
    match self {
      Self::Casual => Some(policy.casual_leave_days),
      Self::Sick => Some(policy.sick_leave_days),
      Self::CompensatoryOff | Self::Duty => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveDuration {
  HalfDay,
  FullDay,
  TwoDays,
  ThreeDays,
}

impl LeaveDuration {
  pub fn days(&self) -> f64 {
    match self {
      Self::HalfDay => 0.5,
      Self::FullDay => 1.0,
      Self::TwoDays => 2.0,
      Self::ThreeDays => 3.0,
    }
  }

  pub fn is_half_day(&self) -> bool { matches!(self, Self::HalfDay) }
}

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLeaveRequest {
  pub faculty_id:   FacultyId,
  pub leave_type:   LeaveType,
  pub start_date:   NaiveDate,
  pub end_date:     NaiveDate,
  pub duration:     LeaveDuration,
  /// Name of the colleague covering classes, if any.
  pub alt_faculty:  Option<String>,
  /// Creation time; decides which academic year the request counts against.
  pub requested_at: DateTime<FixedOffset>,
}

impl NewLeaveRequest {
  pub fn validate(&self) -> Result<()> {
    if self.end_date < self.start_date {
      return Err(Error::InvalidLeaveRange { start: self.start_date, end: self.end_date });
    }
    Ok(())
  }
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
  pub id:          i64,
  pub faculty_id:  FacultyId,
  pub leave_type:  LeaveType,
  pub start_date:  NaiveDate,
  pub end_date:    NaiveDate,
  pub is_half_day: bool,
  pub days_count:  f64,
  pub alt_faculty: Option<String>,
  pub created_at:  DateTime<FixedOffset>,
}

// ─── Usage and balances ──────────────────────────────────────────────────────

/// Days used per leave type within one academic year.
pub type LeaveUsage = BTreeMap<LeaveType, f64>;

/// `max(limit - used, 0)`.
pub fn leave_balance(used_days: f64, annual_limit: f64) -> f64 { (annual_limit - used_days).max(0.0) }

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeaveBalance {
  pub leave_type: LeaveType,
  pub limit:      f64,
  pub used:       f64,
  pub remaining:  f64,
}

/// Balances for every leave type that has an annual limit.
pub fn leave_balances(usage: &LeaveUsage, policy: &PortalPolicy) -> Vec<LeaveBalance> {
  LeaveType::iter()
    .filter_map(|leave_type| {
      let limit = leave_type.annual_limit(policy)?;
      let used = usage.get(&leave_type).copied().unwrap_or(0.0);
      Some(LeaveBalance { leave_type, limit, used, remaining: leave_balance(used, limit) })
    })
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn d(s: &str) -> NaiveDate { NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap() }

  fn ts(s: &str) -> DateTime<FixedOffset> { DateTime::parse_from_rfc3339(s).unwrap() }

  #[test]
  fn balance_never_goes_negative() {
    assert_eq!(leave_balance(3.0, 12.0), 9.0);
    assert_eq!(leave_balance(12.0, 12.0), 0.0);
    assert_eq!(leave_balance(14.5, 12.0), 0.0);
    assert_eq!(leave_balance(0.5, 6.0), 5.5);
  }

  #[test]
  fn codes_round_trip() {
    assert_eq!(LeaveType::from_code("CL").unwrap(), LeaveType::Casual);
    assert_eq!(LeaveType::Duty.to_string(), "DL");
    assert!(matches!(LeaveType::from_code("XL"), Err(Error::UnknownLeaveType(_))));
  }

  #[test]
  fn only_casual_and_sick_are_limited() {
    let policy = PortalPolicy::default();
    assert_eq!(LeaveType::Casual.annual_limit(&policy), Some(12.0));
    assert_eq!(LeaveType::Sick.annual_limit(&policy), Some(6.0));
    assert_eq!(LeaveType::CompensatoryOff.annual_limit(&policy), None);
    assert_eq!(LeaveType::Duty.annual_limit(&policy), None);
  }

  #[test]
  fn balances_cover_only_limited_types() {
    let usage = LeaveUsage::from([
      (LeaveType::Casual, 2.5),
      (LeaveType::Duty, 1.0),
    ]);
    let balances = leave_balances(&usage, &PortalPolicy::default());
    assert_eq!(balances.len(), 2);
    assert_eq!(balances[0].leave_type, LeaveType::Casual);
    assert_eq!(balances[0].used, 2.5);
    assert_eq!(balances[0].remaining, 9.5);
    assert_eq!(balances[1].leave_type, LeaveType::Sick);
    assert_eq!(balances[1].used, 0.0);
    assert_eq!(balances[1].remaining, 6.0);
  }

  #[test]
  fn durations() {
    assert_eq!(LeaveDuration::HalfDay.days(), 0.5);
    assert!(LeaveDuration::HalfDay.is_half_day());
    assert_eq!(LeaveDuration::ThreeDays.days(), 3.0);
    assert!(!LeaveDuration::TwoDays.is_half_day());
  }

  #[test]
  fn reversed_range_is_rejected() {
    let req = NewLeaveRequest {
      faculty_id:   1,
      leave_type:   LeaveType::Sick,
      start_date:   d("2025-08-05"),
      end_date:     d("2025-08-04"),
      duration:     LeaveDuration::FullDay,
      alt_faculty:  None,
      requested_at: ts("2025-08-01T10:00:00+05:30"),
    };
    assert!(matches!(req.validate(), Err(Error::InvalidLeaveRange { .. })));
  }
}
