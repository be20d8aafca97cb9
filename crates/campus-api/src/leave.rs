//! Handlers for faculty leave.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/leaves` | Body: [`LeaveBody`]; returns 201 + stored request |
//! | `GET`  | `/faculty/{id}/leaves` | Newest first |
//! | `GET`  | `/faculty/{id}/leave-balance` | Optional `?date=YYYY-MM-DD` picks the academic year |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  attendance::FacultyId,
  calendar::{AcademicYear, academic_year_for, now_in_campus_tz, parse_date},
  leave::{
    LeaveBalance, LeaveDuration, LeaveRequest, LeaveType, LeaveUsage, NewLeaveRequest,
    leave_balances,
  },
  store::PortalStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

// ─── Submit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LeaveBody {
  pub faculty_id:  FacultyId,
  pub leave_type:  LeaveType,
  pub start_date:  String,
  pub end_date:    String,
  pub duration:    LeaveDuration,
  pub alt_faculty: Option<String>,
}

/// `POST /leaves`
pub async fn submit<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<LeaveBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = NewLeaveRequest {
    faculty_id:   body.faculty_id,
    leave_type:   body.leave_type,
    start_date:   parse_date(&body.start_date)?,
    end_date:     parse_date(&body.end_date)?,
    duration:     body.duration,
    alt_faculty:  body.alt_faculty.filter(|s| !s.trim().is_empty()),
    requested_at: now_in_campus_tz(),
  };
  input.validate()?;

  let stored = state.store.submit_leave(input).await.map_err(ApiError::store)?;
  tracing::info!(
    id = stored.id,
    faculty_id = stored.faculty_id,
    leave_type = %stored.leave_type,
    days = stored.days_count,
    "leave submitted"
  );
  Ok((StatusCode::CREATED, Json(stored)))
}

// ─── History ─────────────────────────────────────────────────────────────────

/// `GET /faculty/{id}/leaves`
pub async fn history<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Path(faculty_id): Path<FacultyId>,
) -> Result<Json<Vec<LeaveRequest>>, ApiError> {
  let requests = state.store.leave_requests(Some(faculty_id)).await.map_err(ApiError::store)?;
  Ok(Json(requests))
}

// ─── Balance ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BalanceParams {
  pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
  pub academic_year: String,
  pub balances:      Vec<LeaveBalance>,
  pub usage:         LeaveUsage,
}

/// `GET /faculty/{id}/leave-balance[?date=YYYY-MM-DD]`
pub async fn balance<S: PortalStore>(
  State(state): State<ApiState<S>>,
  Path(faculty_id): Path<FacultyId>,
  Query(params): Query<BalanceParams>,
) -> Result<Json<BalanceResponse>, ApiError> {
  let year = match params.date.as_deref() {
    Some(d) => academic_year_for(parse_date(d)?)?,
    None => AcademicYear::current()?,
  };
  let usage = state.store.leave_usage(faculty_id, &year).await.map_err(ApiError::store)?;
  let balances = leave_balances(&usage, &state.policy);
  Ok(Json(BalanceResponse { academic_year: year.label(), balances, usage }))
}
