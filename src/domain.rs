//! Domain models: the fixed category/difficulty enumeration, a single problem,
//! and the complete daily problem set.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Separator between the components of a problem id (`int-e-4`).
pub const ID_SEPARATOR: char = '-';

/// Problem category. Declaration order is the canonical enumeration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
  #[serde(rename = "Integration")]
  Integration,
  #[serde(rename = "Differentiation")]
  Differentiation,
  #[serde(rename = "Further Math (9231)")]
  FurtherMath,
  #[serde(rename = "Mathematics (9709)")]
  Mathematics,
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::Integration,
    Category::Differentiation,
    Category::FurtherMath,
    Category::Mathematics,
  ];

  /// Canonical display name, identical to the serialized key.
  pub fn name(self) -> &'static str {
    match self {
      Category::Integration => "Integration",
      Category::Differentiation => "Differentiation",
      Category::FurtherMath => "Further Math (9231)",
      Category::Mathematics => "Mathematics (9709)",
    }
  }

  /// Id prefix component for this category.
  pub fn prefix(self) -> &'static str {
    match self {
      Category::Integration => "int",
      Category::Differentiation => "diff",
      Category::FurtherMath => "fm",
      Category::Mathematics => "math",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn name(self) -> &'static str {
    match self {
      Difficulty::Easy => "Easy",
      Difficulty::Medium => "Medium",
      Difficulty::Hard => "Hard",
    }
  }

  pub fn prefix(self) -> &'static str {
    match self {
      Difficulty::Easy => "e",
      Difficulty::Medium => "m",
      Difficulty::Hard => "h",
    }
  }
}

/// Id prefix shared by every problem of one category+difficulty slot, e.g. `int-e`.
pub fn id_prefix(category: Category, difficulty: Difficulty) -> String {
  format!("{}{}{}", category.prefix(), ID_SEPARATOR, difficulty.prefix())
}

/// One practice item, serialized in the camelCase form the frontend reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub id: String,
  pub date: String,
  pub problem_latex: String,
  pub possible_answers: Vec<String>,
  pub full_solution_latex: String,
  #[serde(default)]
  pub hints_latex: Vec<String>,
  #[serde(default)]
  pub topics_covered: Vec<String>,
  pub difficulty_level: Difficulty,
  pub problem_type: Category,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fun_fact: Option<String>,
}

/// Category -> difficulty -> problem. Map ordering follows the enum declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemSet(pub BTreeMap<Category, BTreeMap<Difficulty, Problem>>);

impl ProblemSet {
  pub fn get(&self, category: Category, difficulty: Difficulty) -> Option<&Problem> {
    self.0.get(&category).and_then(|m| m.get(&difficulty))
  }

  pub fn insert(&mut self, problem: Problem) {
    self.0
      .entry(problem.problem_type)
      .or_default()
      .insert(problem.difficulty_level, problem);
  }

  /// All problems in category order, then difficulty order.
  pub fn problems(&self) -> impl Iterator<Item = &Problem> {
    self.0.values().flat_map(|m| m.values())
  }

  pub fn find(&self, id: &str) -> Option<&Problem> {
    self.problems().find(|p| p.id == id)
  }

  pub fn len(&self) -> usize {
    self.0.values().map(|m| m.len()).sum()
  }

  /// True when every category x difficulty slot holds a problem placed at its own position.
  pub fn is_complete(&self) -> bool {
    Category::ALL.iter().all(|&c| {
      Difficulty::ALL.iter().all(|&d| {
        self.get(c, d)
          .map(|p| p.problem_type == c && p.difficulty_level == d)
          .unwrap_or(false)
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn problem(category: Category, difficulty: Difficulty, id: &str) -> Problem {
    Problem {
      id: id.into(),
      date: "2026-10-19T00:00:00Z".into(),
      problem_latex: "$$1+1$$".into(),
      possible_answers: vec!["2".into()],
      full_solution_latex: "Add.".into(),
      hints_latex: vec![],
      topics_covered: vec!["Quadratics".into()],
      difficulty_level: difficulty,
      problem_type: category,
      fun_fact: None,
    }
  }

  #[test]
  fn prefixes_match_id_scheme() {
    assert_eq!(id_prefix(Category::Integration, Difficulty::Easy), "int-e");
    assert_eq!(id_prefix(Category::FurtherMath, Difficulty::Hard), "fm-h");
    assert_eq!(id_prefix(Category::Mathematics, Difficulty::Medium), "math-m");
  }

  #[test]
  fn serializes_with_canonical_keys() {
    let mut set = ProblemSet::default();
    set.insert(problem(Category::FurtherMath, Difficulty::Easy, "fm-e-1"));
    let v = serde_json::to_value(&set).unwrap();
    let p = &v["Further Math (9231)"]["Easy"];
    assert_eq!(p["id"], "fm-e-1");
    assert_eq!(p["problemType"], "Further Math (9231)");
    assert_eq!(p["difficultyLevel"], "Easy");
    assert!(p.get("funFact").is_none());

    let back: ProblemSet = serde_json::from_value(v).unwrap();
    assert_eq!(back, set);
  }

  #[test]
  fn completeness_requires_every_slot() {
    let mut set = ProblemSet::default();
    for c in Category::ALL {
      for d in Difficulty::ALL {
        set.insert(problem(c, d, "x-1"));
      }
    }
    assert!(set.is_complete());
    assert_eq!(set.len(), 12);

    set.0.get_mut(&Category::Differentiation).unwrap().remove(&Difficulty::Hard);
    assert!(!set.is_complete());
  }
}
