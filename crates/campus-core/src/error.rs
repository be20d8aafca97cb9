//! Error types for `campus-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A timestamp string that none of the accepted formats could parse.
  #[error("invalid timestamp: {0:?}")]
  InvalidTimestamp(String),

  #[error("invalid date: {0:?}")]
  InvalidDate(String),

  #[error("invalid month: {0}")]
  InvalidMonth(u32),

  #[error("invalid academic year label: {0:?}")]
  InvalidAcademicYear(String),

  /// A year whose academic calendar cannot be represented.
  #[error("year out of supported range: {0}")]
  YearOutOfRange(i32),

  #[error("window ends before it starts")]
  InvertedWindow,

  #[error("leave ends ({end}) before it starts ({start})")]
  InvalidLeaveRange { start: NaiveDate, end: NaiveDate },

  #[error("unknown leave type: {0:?}")]
  UnknownLeaveType(String),

  #[error("{field} rating must be between 1 and 10, got {value}")]
  InvalidRating { field: String, value: u8 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
