//! Handlers for the feedback window and student feedback.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `PUT`  | `/feedback/window` | Body: `{"start":"...","end":"..."}`; 204 |
//! | `GET`  | `/feedback/window` | 404 if no window was ever set |
//! | `GET`  | `/feedback/status` | Optional `?now=...&student_id=...` |
//! | `POST` | `/feedback` | Body: [`FeedbackBody`]; 201, or 403 when closed or ineligible |
//! | `GET`  | `/faculty/{id}/feedback` | Newest first |
//! | `GET`  | `/faculty/{id}/feedback-stats` | Count and mean overall rating |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  attendance::{AttendanceSummary, FacultyId, StudentId, SubjectId, summarize},
  calendar::{academic_year_at, now_in_campus_tz, parse_timestamp},
  feedback::{
    FacultyFeedbackStats, FeedbackAccess, FeedbackEntry, NewFeedback, QUESTION_COUNT,
    feedback_access,
  },
  schedule::{FeedbackWindow, is_feedback_open},
  store::PortalStore,
  year_level::YearLevel,
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct WindowBody {
  pub start: String,
  pub end:   String,
}

/// `PUT /feedback/window`
pub async fn set_window<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<WindowBody>,
) -> Result<StatusCode, ApiError> {
  let window = FeedbackWindow::parse(&body.start, &body.end)?;
  tracing::info!(start = %window.start, end = %window.end, "feedback window set");
  state.store.schedule_feedback(window).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /feedback/window`
pub async fn get_window<S: PortalStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<FeedbackWindow>, ApiError> {
  let window = state
    .store
    .current_feedback_window()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound("no feedback window configured".into()))?;
  Ok(Json(window))
}

/// The student's attendance for the academic year containing `at`.
async fn attendance_at<S: PortalStore>(
  state: &ApiState<S>,
  student_id: StudentId,
  at: &DateTime<FixedOffset>,
) -> Result<AttendanceSummary, ApiError> {
  let label = academic_year_at(at)?.label();
  let counts = state
    .store
    .student_attendance_totals(student_id, Some(label.as_str()))
    .await
    .map_err(ApiError::store)?;
  Ok(summarize(counts, state.policy.feedback_attendance_threshold))
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusParams {
  /// Instant to evaluate at; defaults to now.
  pub now:        Option<String>,
  /// When set, also check the student's attendance for that academic year.
  pub student_id: Option<StudentId>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackStatus {
  pub open:       bool,
  pub window:     Option<FeedbackWindow>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub attendance: Option<AttendanceSummary>,
  pub access:     FeedbackAccess,
  pub can_submit: bool,
}

/// `GET /feedback/status[?now=...][&student_id=...]`
pub async fn status<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<StatusParams>,
) -> Result<Json<FeedbackStatus>, ApiError> {
  let now = match params.now.as_deref() {
    Some(s) => parse_timestamp(s)?,
    None => now_in_campus_tz(),
  };
  let window = state.store.current_feedback_window().await.map_err(ApiError::store)?;
  let open = is_feedback_open(window.as_ref(), &now);

  let attendance = match params.student_id {
    Some(student_id) => Some(attendance_at(&state, student_id, &now).await?),
    None => None,
  };
  let access = feedback_access(open, attendance.as_ref());

  Ok(Json(FeedbackStatus { open, window, attendance, access, can_submit: access.is_granted() }))
}

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedbackBody {
  pub student_id:     StudentId,
  /// Blank or absent submits anonymously.
  pub student_name:   Option<String>,
  pub faculty_id:     FacultyId,
  pub subject_id:     Option<SubjectId>,
  /// Enrollment class, e.g. `"SY"` or `"2A"`.
  pub class:          Option<String>,
  pub ratings:        [u8; QUESTION_COUNT],
  pub overall_rating: u8,
  pub comments:       Option<String>,
}

/// `POST /feedback`
pub async fn submit<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<FeedbackBody>,
) -> Result<impl IntoResponse, ApiError> {
  let year_level = body
    .class
    .as_deref()
    .map(|class| {
      YearLevel::from_class(class)
        .ok_or_else(|| ApiError::BadRequest(format!("unrecognised class {class:?}")))
    })
    .transpose()?;

  let input = NewFeedback {
    student_name: body.student_name,
    faculty_id: body.faculty_id,
    subject_id: body.subject_id,
    year_level,
    ratings: body.ratings,
    overall_rating: body.overall_rating,
    comments: body.comments,
    submitted_at: now_in_campus_tz(),
  };
  input.validate()?;

  let window = state.store.current_feedback_window().await.map_err(ApiError::store)?;
  let open = is_feedback_open(window.as_ref(), &input.submitted_at);
  let attendance = attendance_at(&state, body.student_id, &input.submitted_at).await?;

  match feedback_access(open, Some(&attendance)) {
    FeedbackAccess::Granted => {}
    FeedbackAccess::WindowClosed => {
      return Err(ApiError::Forbidden("feedback window is closed".into()));
    }
    FeedbackAccess::AttendanceTooLow => {
      return Err(ApiError::Forbidden(format!(
        "attendance {:.2}% is below the {}% required for feedback",
        attendance.percentage, state.policy.feedback_attendance_threshold
      )));
    }
  }

  let entry = state.store.submit_feedback(input).await.map_err(ApiError::store)?;
  tracing::info!(
    id = entry.id,
    faculty_id = entry.faculty_id,
    overall = entry.overall_rating,
    "feedback submitted"
  );
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Faculty views ───────────────────────────────────────────────────────────

/// `GET /faculty/{id}/feedback`
pub async fn entries<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Path(faculty_id): Path<FacultyId>,
) -> Result<Json<Vec<FeedbackEntry>>, ApiError> {
  let entries = state.store.feedback_entries(Some(faculty_id)).await.map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `GET /faculty/{id}/feedback-stats`
pub async fn stats<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Path(faculty_id): Path<FacultyId>,
) -> Result<Json<FacultyFeedbackStats>, ApiError> {
  let stats = state.store.faculty_feedback_stats(faculty_id).await.map_err(ApiError::store)?;
  Ok(Json(stats))
}
