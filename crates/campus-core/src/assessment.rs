//! Scoring of multiple-choice test attempts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub type QuestionId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
  pub question_id:    QuestionId,
  /// Zero-based index of the correct choice.
  pub correct_choice: u32,
  #[serde(default = "default_marks")]
  pub marks:          f64,
}

fn default_marks() -> f64 { 1.0 }

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttemptScore {
  pub score:     f64,
  pub max_score: f64,
  /// Questions with an answer on record, right or wrong.
  pub answered:  usize,
}

/// Award each question's marks when the chosen option matches. Unanswered
/// questions score nothing; answers to unknown question ids are ignored.
pub fn score_attempt(questions: &[Question], answers: &HashMap<QuestionId, u32>) -> AttemptScore {
  let mut result = AttemptScore { score: 0.0, max_score: 0.0, answered: 0 };
  for q in questions {
    result.max_score += q.marks;
    if let Some(&chosen) = answers.get(&q.question_id) {
      result.answered += 1;
      if chosen == q.correct_choice {
        result.score += q.marks;
      }
    }
  }
  result
}
