//! Institution-wide thresholds and leave allowances.

use serde::{Deserialize, Serialize};

/// Tunable business rules. Every field has a default, so a partial config
/// section is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalPolicy {
  /// Minimum attendance percentage for feedback submission access.
  #[serde(default = "default_feedback_attendance_threshold")]
  pub feedback_attendance_threshold: f64,
  /// Casual leave (CL) days per academic year.
  #[serde(default = "default_casual_leave_days")]
  pub casual_leave_days:             f64,
  /// Sick leave (SL) days per academic year.
  #[serde(default = "default_sick_leave_days")]
  pub sick_leave_days:               f64,
}

fn default_feedback_attendance_threshold() -> f64 { 60.0 }
fn default_casual_leave_days() -> f64 { 12.0 }
fn default_sick_leave_days() -> f64 { 6.0 }

impl Default for PortalPolicy {
  fn default() -> Self {
    Self {
      feedback_attendance_threshold: default_feedback_attendance_threshold(),
      casual_leave_days:             default_casual_leave_days(),
      sick_leave_days:               default_sick_leave_days(),
    }
  }
}
