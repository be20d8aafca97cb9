//! Handlers for online tests.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/tests/availability` | Body: `{"start"?, "end"?, "now"?}` |
//! | `POST` | `/tests/score` | Body: `{"questions":[...], "answers":{"<id>": choice}}` |

use std::collections::HashMap;

use axum::Json;
use campus_core::{
  assessment::{AttemptScore, Question, QuestionId, score_attempt},
  calendar::{now_in_campus_tz, parse_timestamp},
  schedule::{TestAvailability, test_availability},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AvailabilityBody {
  pub start: Option<String>,
  pub end:   Option<String>,
  pub now:   Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
  pub availability: TestAvailability,
  pub can_attempt:  bool,
}

/// `POST /tests/availability`
pub async fn availability(
  Json(body): Json<AvailabilityBody>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
  let start = body.start.as_deref().map(parse_timestamp).transpose()?;
  let end = body.end.as_deref().map(parse_timestamp).transpose()?;
  let now = match body.now.as_deref() {
    Some(s) => parse_timestamp(s)?,
    None => now_in_campus_tz(),
  };

  let availability = test_availability(start.as_ref(), end.as_ref(), &now);
  Ok(Json(AvailabilityResponse { availability, can_attempt: availability.can_attempt() }))
}

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
  pub questions: Vec<Question>,
  #[serde(default)]
  pub answers:   HashMap<QuestionId, u32>,
}

/// `POST /tests/score`
pub async fn score(Json(body): Json<ScoreBody>) -> Json<AttemptScore> {
  Json(score_attempt(&body.questions, &body.answers))
}
