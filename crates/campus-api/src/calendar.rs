//! Handlers for calendar lookups.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/academic-year` | Optional `?date=YYYY-MM-DD`; defaults to today on campus |
//! | `GET`  | `/year-level` | `?class=SY`; 400 if the class is not recognised |

use axum::{Json, extract::Query};
use campus_core::{
  calendar::{AcademicYear, academic_year_for, parse_date},
  year_level::YearLevel,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AcademicYearParams {
  pub date: Option<String>,
}

/// `GET /academic-year[?date=YYYY-MM-DD]`
pub async fn academic_year(
  Query(params): Query<AcademicYearParams>,
) -> Result<Json<AcademicYear>, ApiError> {
  let year = match params.date.as_deref() {
    Some(d) => academic_year_for(parse_date(d)?)?,
    None => AcademicYear::current()?,
  };
  Ok(Json(year))
}

#[derive(Debug, Deserialize)]
pub struct YearLevelParams {
  pub class: String,
}

#[derive(Debug, Serialize)]
pub struct YearLevelResponse {
  pub class:      String,
  pub year_level: YearLevel,
}

/// `GET /year-level?class=<class>`
pub async fn year_level(
  Query(params): Query<YearLevelParams>,
) -> Result<Json<YearLevelResponse>, ApiError> {
  let year_level = YearLevel::from_class(&params.class)
    .ok_or_else(|| ApiError::BadRequest(format!("unrecognised class {:?}", params.class)))?;
  Ok(Json(YearLevelResponse { class: params.class, year_level }))
}
