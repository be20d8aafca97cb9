//! Year level (FY / SY / TY / Final Year) derived from a student's class.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
  Display, EnumString,
)]
pub enum YearLevel {
  #[serde(rename = "FY")]
  #[strum(serialize = "FY")]
  FirstYear,
  #[serde(rename = "SY")]
  #[strum(serialize = "SY")]
  SecondYear,
  #[serde(rename = "TY")]
  #[strum(serialize = "TY")]
  ThirdYear,
  #[serde(rename = "Final Year")]
  #[strum(serialize = "Final Year")]
  FinalYear,
}

impl YearLevel {
  pub const ALL: [YearLevel; 4] =
    [Self::FirstYear, Self::SecondYear, Self::ThirdYear, Self::FinalYear];

  /// Map a free-form enrollment class (`"SY"`, `"second year"`, `"2"`,
  /// `"2A"`, ...) to its year level. Returns `None` when nothing matches.
  pub fn from_class(class: &str) -> Option<Self> {
    let class = class.trim().to_uppercase();
    let level = match class.as_str() {
      "FY" | "FIRST YEAR" | "1" => Self::FirstYear,
      "SY" | "SECOND YEAR" | "2" => Self::SecondYear,
      "TY" | "THIRD YEAR" | "3" => Self::ThirdYear,
      "FINAL YEAR" | "FYR" | "FOURTH YEAR" | "4" => Self::FinalYear,
      other => return other.chars().next().and_then(Self::from_digit),
    };
    Some(level)
  }

  /// `'1'` through `'4'`, in [`YearLevel::ALL`] order.
  fn from_digit(c: char) -> Option<Self> {
    let index = c.to_digit(10)?.checked_sub(1)?;
    Self::ALL.get(usize::try_from(index).ok()?).copied()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn named_classes() {
    assert_eq!(YearLevel::from_class("fy"), Some(YearLevel::FirstYear));
    assert_eq!(YearLevel::from_class(" Second Year "), Some(YearLevel::SecondYear));
    assert_eq!(YearLevel::from_class("TY"), Some(YearLevel::ThirdYear));
    assert_eq!(YearLevel::from_class("final year"), Some(YearLevel::FinalYear));
    assert_eq!(YearLevel::from_class("FYR"), Some(YearLevel::FinalYear));
  }

  #[test]
  fn numeric_and_prefixed_classes() {
    assert_eq!(YearLevel::from_class("1"), Some(YearLevel::FirstYear));
    assert_eq!(YearLevel::from_class("4"), Some(YearLevel::FinalYear));
    assert_eq!(YearLevel::from_class("2A"), Some(YearLevel::SecondYear));
    assert_eq!(YearLevel::from_class("3-CSE"), Some(YearLevel::ThirdYear));
  }

  #[test]
  fn unrecognised_classes() {
    assert_eq!(YearLevel::from_class(""), None);
    assert_eq!(YearLevel::from_class("5"), None);
    assert_eq!(YearLevel::from_class("0"), None);
    assert_eq!(YearLevel::from_class("B.Tech"), None);
  }

  #[test]
  fn labels() {
    assert_eq!(YearLevel::FinalYear.to_string(), "Final Year");
    assert_eq!("SY".parse::<YearLevel>().unwrap(), YearLevel::SecondYear);
    assert_eq!(
      serde_json::to_string(&YearLevel::FinalYear).unwrap(),
      "\"Final Year\""
    );
  }
}
