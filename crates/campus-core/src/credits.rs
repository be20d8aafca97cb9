//! Credit progress and year-end promotion checks.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CreditProgress {
  /// Credits completed so far plus this semester's.
  pub total_after: f64,
  /// `total_after` as a percentage of the requirement; 0 when none is set.
  pub percent:     f64,
}

pub fn credit_progress(completed: f64, semester: f64, required: f64) -> CreditProgress {
  let total_after = completed + semester;
  let percent = if required > 0.0 { total_after / required * 100.0 } else { 0.0 };
  CreditProgress { total_after, percent }
}

// ─── Promotion ───────────────────────────────────────────────────────────────

/// The class a student is being promoted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromotionTarget {
  #[serde(rename = "FY")]
  FirstYear,
  #[serde(rename = "SY")]
  SecondYear,
  #[serde(rename = "TY")]
  ThirdYear,
  #[serde(rename = "B.Tech")]
  BTech,
}

/// How the student entered the programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRoute {
  FirstYear,
  /// Lateral entry straight into second year.
  DirectSecondYear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionRule {
  pub semesters: Vec<u8>,
  /// Fraction of the semesters' credits that must be earned.
  pub factor:    f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterCredits {
  pub semester: u8,
  pub total:    u32,
  pub earned:   u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PromotionOutcome {
  pub total:      u64,
  pub earned:     u64,
  pub threshold:  f64,
  pub percentage: f64,
  pub promoted:   bool,
  /// Credits still needed to reach the threshold.
  pub shortfall:  f64,
}

impl PromotionRule {
  /// The rule for a target class and entry route; `None` for combinations the
  /// institution does not define (e.g. lateral entry into FY).
  pub fn lookup(target: PromotionTarget, route: EntryRoute) -> Option<Self> {
    use self::EntryRoute as R;
    use self::PromotionTarget as T;

    let (semesters, factor): (&[u8], f64) = match (target, route) {
      (T::ThirdYear, R::DirectSecondYear) => (&[3, 4], 0.60),
      (T::ThirdYear, R::FirstYear) => (&[1, 2, 3, 4], 0.80),
      (T::BTech, R::DirectSecondYear) => (&[3, 4, 5, 6], 0.80),
      (T::BTech, R::FirstYear) => (&[1, 2, 3, 4, 5, 6], 0.86),
      (T::SecondYear, R::FirstYear) => (&[1, 2], 0.60),
      (T::FirstYear, R::FirstYear) => (&[1, 2], 0.60),
      _ => return None,
    };
    Some(Self { semesters: semesters.to_vec(), factor })
  }

  /// Sum the rule's semesters (others are ignored) and compare against the
  /// threshold.
  pub fn evaluate(&self, credits: &[SemesterCredits]) -> PromotionOutcome {
    let relevant = credits.iter().filter(|c| self.semesters.contains(&c.semester));
    let (total, earned) = relevant.fold((0u64, 0u64), |(t, e), c| {
      (t.saturating_add(u64::from(c.total)), e.saturating_add(u64::from(c.earned)))
    });

    let (total_f, earned_f) = (total as f64, earned as f64);
    let threshold = total_f * self.factor;
    let percentage = if total > 0 { earned_f / total_f * 100.0 } else { 0.0 };

    PromotionOutcome {
      total,
      earned,
      threshold,
      percentage,
      promoted: earned_f >= threshold,
      shortfall: (threshold - earned_f).max(0.0),
    }
  }
}
