//! The `PortalStore` trait.
//!
//! Storage backends (e.g. `campus-store-sqlite`) implement the trait; the API
//! layer depends only on this abstraction.

use std::future::Future;

use crate::{
  attendance::{
    AttendanceMonth, AttendanceRecord, ClassSheet, DailyMark, FacultyId, MonthlyAttendance,
    RollupCounts, StudentId, SubjectId,
  },
  calendar::AcademicYear,
  feedback::{FacultyFeedbackStats, FeedbackEntry, NewFeedback},
  leave::{LeaveRequest, LeaveUsage, NewLeaveRequest},
  schedule::FeedbackWindow,
};

/// Abstraction over a portal storage backend.
///
/// Attendance writes are upserts: re-marking a daily record or re-saving a
/// monthly rollup with the same key replaces the previous row.
///
/// The rollup methods ([`record_class_day`](PortalStore::record_class_day)
/// and [`refresh_monthly_rollup`](PortalStore::refresh_monthly_rollup)) read
/// the month and write its rows as one atomic unit, so concurrent sheets for
/// the same class never leave counts computed from an older read.
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Attendance ────────────────────────────────────────────────────────

  /// Insert or overwrite the mark for (student, faculty, subject, date).
  fn mark_attendance(
    &self,
    record: AttendanceRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every daily mark for a faculty/subject in `month`, ordered by date then
  /// student.
  fn daily_marks(
    &self,
    faculty_id: FacultyId,
    subject_id: SubjectId,
    month: AttendanceMonth,
  ) -> impl Future<Output = Result<Vec<DailyMark>, Self::Error>> + Send + '_;

  /// Upsert keyed on (student, faculty, subject, month, academic_year).
  fn save_monthly_attendance(
    &self,
    row: MonthlyAttendance,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Recompute a faculty/subject month from its daily marks with
  /// [`rollup_rows`](crate::attendance::rollup_rows) and upsert one row per
  /// student. Returns the rows written, ordered by student.
  fn refresh_monthly_rollup(
    &self,
    faculty_id: FacultyId,
    subject_id: SubjectId,
    month: AttendanceMonth,
  ) -> impl Future<Output = Result<Vec<MonthlyAttendance>, Self::Error>> + Send + '_;

  /// Upsert every mark on the sheet, then refresh that month's rollup. The
  /// marks and the refreshed rows commit together or not at all.
  fn record_class_day(
    &self,
    sheet: ClassSheet,
  ) -> impl Future<Output = Result<Vec<MonthlyAttendance>, Self::Error>> + Send + '_;

  /// Stored rollup rows for a faculty/subject month, ordered by student.
  fn monthly_attendance(
    &self,
    faculty_id: FacultyId,
    subject_id: SubjectId,
    month: AttendanceMonth,
  ) -> impl Future<Output = Result<Vec<MonthlyAttendance>, Self::Error>> + Send + '_;

  /// Sum of a student's monthly rows, optionally limited to one academic
  /// year label. `(0, 0)` when the student has no rows.
  fn student_attendance_totals<'a>(
    &'a self,
    student_id: StudentId,
    academic_year: Option<&'a str>,
  ) -> impl Future<Output = Result<RollupCounts, Self::Error>> + Send + 'a;

  // ── Feedback ──────────────────────────────────────────────────────────

  /// Record a new schedule. The most recently recorded one is current.
  fn schedule_feedback(
    &self,
    window: FeedbackWindow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The current schedule, or `None` if none was ever configured.
  fn current_feedback_window(
    &self,
  ) -> impl Future<Output = Result<Option<FeedbackWindow>, Self::Error>> + Send + '_;

  /// Validate and persist a submission. Window and attendance checks are the
  /// caller's.
  fn submit_feedback(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<FeedbackEntry, Self::Error>> + Send + '_;

  /// Submissions newest first; all faculty when `faculty_id` is `None`.
  fn feedback_entries(
    &self,
    faculty_id: Option<FacultyId>,
  ) -> impl Future<Output = Result<Vec<FeedbackEntry>, Self::Error>> + Send + '_;

  fn faculty_feedback_stats(
    &self,
    faculty_id: FacultyId,
  ) -> impl Future<Output = Result<FacultyFeedbackStats, Self::Error>> + Send + '_;

  // ── Leave ─────────────────────────────────────────────────────────────

  /// Validate and persist a leave request.
  fn submit_leave(
    &self,
    input: NewLeaveRequest,
  ) -> impl Future<Output = Result<LeaveRequest, Self::Error>> + Send + '_;

  /// Leave history, newest first; all faculty when `faculty_id` is `None`.
  fn leave_requests(
    &self,
    faculty_id: Option<FacultyId>,
  ) -> impl Future<Output = Result<Vec<LeaveRequest>, Self::Error>> + Send + '_;

  /// Days used per leave type by requests created within `year`.
  fn leave_usage<'a>(
    &'a self,
    faculty_id: FacultyId,
    year: &'a AcademicYear,
  ) -> impl Future<Output = Result<LeaveUsage, Self::Error>> + Send + 'a;
}
