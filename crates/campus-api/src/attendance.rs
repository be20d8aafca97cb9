//! Handlers for attendance endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/attendance/daily` | Body: [`DailySheetBody`]; returns the refreshed monthly rows |
//! | `GET`  | `/attendance/monthly` | `?faculty_id&subject_id&year&month` |
//! | `GET`  | `/students/{id}/attendance` | Optional `?academic_year=2025-2026` |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use campus_core::{
  attendance::{
    AttendanceMonth, AttendanceSummary, ClassSheet, FacultyId, MonthlyAttendance, SheetMark,
    StudentId, SubjectId, summarize,
  },
  calendar::{AcademicYear, parse_date},
  store::PortalStore,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

// ─── Daily sheet ─────────────────────────────────────────────────────────────

/// One class day's attendance as submitted by the faculty member.
#[derive(Debug, Deserialize)]
pub struct DailySheetBody {
  pub faculty_id: FacultyId,
  pub subject_id: SubjectId,
  pub date:       String,
  pub marks:      Vec<SheetMark>,
}

/// `POST /attendance/daily`
pub async fn save_daily<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<DailySheetBody>,
) -> Result<Json<Vec<MonthlyAttendance>>, ApiError> {
  let sheet = ClassSheet {
    faculty_id: body.faculty_id,
    subject_id: body.subject_id,
    date:       parse_date(&body.date)?,
    marks:      body.marks,
  };
  // Surface an unrepresentable month as a 400 before touching the store.
  sheet.month()?;
  let (faculty_id, subject_id, date, marks) =
    (sheet.faculty_id, sheet.subject_id, sheet.date, sheet.marks.len());

  let rows = state.store.record_class_day(sheet).await.map_err(ApiError::store)?;

  tracing::info!(faculty_id, subject_id, %date, marks, "daily attendance saved");
  Ok(Json(rows))
}

// ─── Monthly rows ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MonthlyParams {
  pub faculty_id: FacultyId,
  pub subject_id: SubjectId,
  pub year:       i32,
  pub month:      u32,
}

/// `GET /attendance/monthly?faculty_id=&subject_id=&year=&month=`
pub async fn monthly<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<MonthlyParams>,
) -> Result<Json<Vec<MonthlyAttendance>>, ApiError> {
  let month = AttendanceMonth::new(params.year, params.month)?;
  let rows = state
    .store
    .monthly_attendance(params.faculty_id, params.subject_id, month)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}

// ─── Student summary ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub academic_year: Option<String>,
}

/// `GET /students/{id}/attendance[?academic_year=...]`
///
/// Eligibility uses the configured feedback attendance threshold.
pub async fn student_summary<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Path(student_id): Path<StudentId>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<AttendanceSummary>, ApiError> {
  let label = params
    .academic_year
    .as_deref()
    .map(AcademicYear::from_label)
    .transpose()?
    .map(|y| y.label());
  let counts = state
    .store
    .student_attendance_totals(student_id, label.as_deref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summarize(counts, state.policy.feedback_attendance_threshold)))
}
