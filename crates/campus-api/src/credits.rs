//! Handlers for credit progress and promotion checks.

use axum::{Json, extract::Query};
use campus_core::credits::{
  CreditProgress, EntryRoute, PromotionOutcome, PromotionRule, PromotionTarget, SemesterCredits,
  credit_progress,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ProgressParams {
  pub completed: f64,
  pub semester:  f64,
  pub required:  f64,
}

/// `GET /credits/progress?completed=&semester=&required=`
pub async fn progress(Query(p): Query<ProgressParams>) -> Json<CreditProgress> {
  Json(credit_progress(p.completed, p.semester, p.required))
}

#[derive(Debug, Deserialize)]
pub struct PromotionBody {
  pub target:    PromotionTarget,
  pub route:     EntryRoute,
  #[serde(default)]
  pub semesters: Vec<SemesterCredits>,
}

/// `POST /credits/promotion`
pub async fn promotion(
  Json(body): Json<PromotionBody>,
) -> Result<Json<PromotionOutcome>, ApiError> {
  let rule = PromotionRule::lookup(body.target, body.route).ok_or_else(|| {
    ApiError::BadRequest(format!(
      "no promotion rule for {:?} via {:?}",
      body.target, body.route
    ))
  })?;
  Ok(Json(rule.evaluate(&body.semesters)))
}
