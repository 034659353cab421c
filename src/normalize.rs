//! Response normalizer: maps the generator's loosely keyed JSON onto the strict
//! `ProblemSet` schema.
//!
//! The raw payload only ever enters through `RawProblem`, an untrusted bag of
//! fields. Conversion out of it is total: every field that is missing, empty or
//! wrong-typed is replaced by the default listed in `FIELD_RULES`, so every
//! category x difficulty slot is always populated.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::domain::{id_prefix, Category, Difficulty, Problem, ProblemSet, ID_SEPARATOR};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
  ProblemLatex,
  PossibleAnswers,
  FullSolutionLatex,
  HintsLatex,
  TopicsCovered,
  FunFact,
}

#[derive(Clone, Copy, Debug)]
pub enum FieldDefault {
  Text(&'static str),
  List(&'static [&'static str]),
  /// Single-element list holding the canonical category name.
  CategoryName,
}

pub struct FieldRule {
  pub field: Field,
  /// Canonical camelCase key.
  pub key: &'static str,
  /// Other spellings the generator has been seen to use, tried in order.
  pub aliases: &'static [&'static str],
  pub default: FieldDefault,
  /// Whether an empty list (or blank string) is an acceptable value.
  pub allow_empty: bool,
}

pub const FIELD_RULES: &[FieldRule] = &[
  FieldRule {
    field: Field::ProblemLatex,
    key: "problemLatex",
    aliases: &["problem", "question", "questionLatex"],
    default: FieldDefault::Text("Error generating problem."),
    allow_empty: false,
  },
  FieldRule {
    field: Field::PossibleAnswers,
    key: "possibleAnswers",
    aliases: &["answers", "answer", "correctAnswers"],
    default: FieldDefault::List(&["Error"]),
    allow_empty: false,
  },
  FieldRule {
    field: Field::FullSolutionLatex,
    key: "fullSolutionLatex",
    aliases: &["solutionLatex", "solution", "fullSolution"],
    default: FieldDefault::Text("Solution unavailable."),
    allow_empty: false,
  },
  FieldRule {
    field: Field::HintsLatex,
    key: "hintsLatex",
    aliases: &["hints"],
    default: FieldDefault::List(&[]),
    allow_empty: true,
  },
  FieldRule {
    field: Field::TopicsCovered,
    key: "topicsCovered",
    aliases: &["topics", "topic"],
    default: FieldDefault::CategoryName,
    allow_empty: false,
  },
  FieldRule {
    field: Field::FunFact,
    key: "funFact",
    aliases: &["fact"],
    default: FieldDefault::Text("Math is fun!"),
    allow_empty: false,
  },
];

fn rule(field: Field) -> &'static FieldRule {
  // FIELD_RULES lists every Field variant exactly once.
  FIELD_RULES.iter().find(|r| r.field == field).unwrap_or(&FIELD_RULES[0])
}

/// Lowercase and drop everything but letters and digits: `problem_latex` == `ProblemLatex`.
fn fold_key(k: &str) -> String {
  k.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

fn first_word(category: Category) -> String {
  let canonical = category.name().to_lowercase();
  canonical.split_whitespace().next().unwrap_or_default().to_string()
}

fn is_exact(key: &str, category: Category) -> bool {
  key.trim().to_lowercase() == category.name().to_lowercase()
}

/// The category whose first word appears earliest in `key`, if any.
/// "Further Mathematics" belongs to Further Math, not Mathematics.
fn first_word_owner(key: &str) -> Option<Category> {
  let key = key.to_lowercase();
  Category::ALL
    .iter()
    .filter_map(|&c| key.find(first_word(c).as_str()).map(|pos| (pos, c)))
    .min()
    .map(|(_, c)| c)
}

/// Resolve the payload key for `category`: exact case-insensitive match first,
/// then a key that mentions the category's first word and is not claimed by
/// another category. Keys starting with that word beat keys merely containing
/// it; remaining ties go to the lexicographically smallest key.
pub fn resolve_category_key(raw: &Map<String, Value>, category: Category) -> Option<&str> {
  if let Some(k) = smallest_key(raw, |k| is_exact(k, category)) {
    return Some(k);
  }
  let word = first_word(category);
  raw
    .keys()
    .map(String::as_str)
    .filter(|k| !Category::ALL.iter().any(|&other| other != category && is_exact(k, other)))
    .filter(|k| first_word_owner(k) == Some(category))
    .min_by_key(|k| (!k.trim().to_lowercase().starts_with(word.as_str()), *k))
}

/// Resolve the difficulty key by exact case-insensitive match.
pub fn resolve_difficulty_key(category_data: &Map<String, Value>, difficulty: Difficulty) -> Option<&str> {
  smallest_key(category_data, |k| k.trim().eq_ignore_ascii_case(difficulty.name()))
}

fn smallest_key<'a>(map: &'a Map<String, Value>, pred: impl Fn(&str) -> bool) -> Option<&'a str> {
  map.keys().map(String::as_str).filter(|k| pred(k)).min()
}

/// Untrusted generator output for one slot. Empty when the slot could not be resolved.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawProblem<'a> {
  fields: Option<&'a Map<String, Value>>,
}

impl<'a> RawProblem<'a> {
  /// Locate the slot for `category`/`difficulty`; any miss yields an empty bag.
  pub fn locate(raw: &'a Map<String, Value>, category: Category, difficulty: Difficulty) -> Self {
    let fields = resolve_category_key(raw, category)
      .and_then(|k| raw.get(k))
      .and_then(Value::as_object)
      .and_then(|cat| resolve_difficulty_key(cat, difficulty).and_then(|k| cat.get(k)))
      .and_then(Value::as_object);
    Self { fields }
  }

  pub fn is_empty(&self) -> bool {
    self.fields.map(|f| f.is_empty()).unwrap_or(true)
  }

  fn lookup(&self, rule: &FieldRule) -> Option<&'a Value> {
    let fields = self.fields?;
    std::iter::once(rule.key)
      .chain(rule.aliases.iter().copied())
      .map(fold_key)
      .find_map(|wanted| fields.iter().find(|(k, _)| fold_key(k) == wanted).map(|(_, v)| v))
  }

  fn text(&self, field: Field) -> Option<String> {
    let rule = rule(field);
    let s = self.lookup(rule)?.as_str()?.trim();
    (rule.allow_empty || !s.is_empty()).then(|| s.to_string())
  }

  fn list(&self, field: Field) -> Option<Vec<String>> {
    let rule = rule(field);
    let value = self.lookup(rule)?;
    let items: Vec<String> = match value {
      Value::Array(values) => values.iter().filter_map(list_item).collect(),
      // A lone string where a list was expected.
      Value::String(_) => list_item(value).into_iter().collect(),
      _ => return None,
    };
    (rule.allow_empty || !items.is_empty()).then_some(items)
  }
}

fn list_item(v: &Value) -> Option<String> {
  match v {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

fn default_text(field: Field) -> String {
  match rule(field).default {
    FieldDefault::Text(s) => s.to_string(),
    FieldDefault::List(items) => items.join(", "),
    FieldDefault::CategoryName => String::new(),
  }
}

fn default_list(field: Field, category: Category) -> Vec<String> {
  match rule(field).default {
    FieldDefault::Text(s) => vec![s.to_string()],
    FieldDefault::List(items) => items.iter().map(|s| s.to_string()).collect(),
    FieldDefault::CategoryName => vec![category.name().to_string()],
  }
}

fn dedup(items: Vec<String>) -> Vec<String> {
  let mut seen = HashSet::new();
  items.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// Allocate the next sequence number for `prefix`, recording it in `last_indices`.
///
/// `split_id` never yields `u64::MAX`, so a context built from stored ids can
/// always be incremented. A hand-built map at the ceiling restarts at 1.
pub fn next_id(last_indices: &mut HashMap<String, u64>, prefix: &str) -> String {
  let slot = last_indices.entry(prefix.to_string()).or_insert(0);
  *slot = slot.checked_add(1).unwrap_or_else(|| {
    warn!(target: "generation", prefix, "Sequence exhausted; restarting at 1");
    1
  });
  format!("{prefix}{ID_SEPARATOR}{slot}")
}

/// Build the strict problem for one slot. Never fails.
pub fn to_problem(raw: RawProblem<'_>, category: Category, difficulty: Difficulty, id: String, date: &str) -> Problem {
  let text = |f: Field| raw.text(f).unwrap_or_else(|| default_text(f));
  let list = |f: Field| raw.list(f).unwrap_or_else(|| default_list(f, category));

  Problem {
    id,
    date: date.to_string(),
    problem_latex: text(Field::ProblemLatex),
    possible_answers: list(Field::PossibleAnswers),
    full_solution_latex: text(Field::FullSolutionLatex),
    hints_latex: list(Field::HintsLatex),
    topics_covered: dedup(list(Field::TopicsCovered)),
    difficulty_level: difficulty,
    problem_type: category,
    fun_fact: Some(text(Field::FunFact)),
  }
}

/// Reconcile the raw payload against the schema, assigning fresh ids from `last_indices`.
#[instrument(level = "info", skip_all, fields(raw_keys = raw.len()))]
pub fn normalize(raw: &Map<String, Value>, last_indices: &mut HashMap<String, u64>, date: &str) -> ProblemSet {
  let mut set = ProblemSet::default();
  let mut defaulted = 0usize;

  for category in Category::ALL {
    for difficulty in Difficulty::ALL {
      let slot = RawProblem::locate(raw, category, difficulty);
      if slot.is_empty() {
        defaulted += 1;
        debug!(target: "generation", category = category.name(), difficulty = difficulty.name(), "Slot missing from payload; using defaults");
      }
      let id = next_id(last_indices, &id_prefix(category, difficulty));
      set.insert(to_problem(slot, category, difficulty, id, date));
    }
  }

  if defaulted > 0 {
    warn!(target: "generation", defaulted, total = set.len(), "Some slots were filled with defaults");
  }
  set
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const DATE: &str = "2026-10-19T06:00:00Z";

  fn obj(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap()
  }

  #[test]
  fn assigns_next_sequence_after_previous() {
    let raw = obj(json!({
      "Integration": { "Easy": {
        "problemLatex": "$$\\int 2x \\, dx$$",
        "possibleAnswers": ["x^2 + C", "x^2"],
        "fullSolutionLatex": "Power rule.",
        "hintsLatex": ["Raise the power."],
        "topicsCovered": ["Power Rule"],
        "funFact": "Leibniz introduced the integral sign."
      }}
    }));
    let mut last = HashMap::from([("int-e".to_string(), 3)]);
    let set = normalize(&raw, &mut last, DATE);

    let p = set.get(Category::Integration, Difficulty::Easy).unwrap();
    assert_eq!(p.id, "int-e-4");
    assert_eq!(p.possible_answers, vec!["x^2 + C", "x^2"]);
    assert_eq!(p.topics_covered, vec!["Power Rule"]);
    assert_eq!(last["int-e"], 4);
    assert_eq!(set.get(Category::Integration, Difficulty::Medium).unwrap().id, "int-m-1");
  }

  #[test]
  fn missing_category_is_filled_with_defaults() {
    let raw = obj(json!({ "Integration": {}, "Differentiation": {} }));
    let mut last = HashMap::new();
    let set = normalize(&raw, &mut last, DATE);

    assert!(set.is_complete());
    let p = set.get(Category::FurtherMath, Difficulty::Hard).unwrap();
    assert_eq!(p.id, "fm-h-1");
    assert_eq!(p.problem_latex, "Error generating problem.");
    assert_eq!(p.possible_answers, vec!["Error"]);
    assert_eq!(p.full_solution_latex, "Solution unavailable.");
    assert!(p.hints_latex.is_empty());
    assert_eq!(p.topics_covered, vec!["Further Math (9231)"]);
    assert_eq!(p.fun_fact.as_deref(), Some("Math is fun!"));
    assert_eq!(p.date, DATE);
  }

  #[test]
  fn empty_payload_still_yields_full_set() {
    let mut last = HashMap::new();
    let set = normalize(&Map::new(), &mut last, DATE);
    assert!(set.is_complete());
    assert_eq!(set.len(), 12);
    assert_eq!(last.len(), 12);
  }

  #[test]
  fn difficulty_keys_match_case_insensitively() {
    let raw = obj(json!({
      "differentiation": { "EASY": { "problemLatex": "d/dx x^2" }, "hard ": { "problemLatex": "d/dx e^x" } }
    }));
    let set = normalize(&raw, &mut HashMap::new(), DATE);
    assert_eq!(set.get(Category::Differentiation, Difficulty::Easy).unwrap().problem_latex, "d/dx x^2");
    assert_eq!(set.get(Category::Differentiation, Difficulty::Hard).unwrap().problem_latex, "d/dx e^x");
    assert_eq!(
      set.get(Category::Differentiation, Difficulty::Medium).unwrap().problem_latex,
      "Error generating problem."
    );
  }

  #[test]
  fn category_resolution_prefers_exact_then_first_word() {
    let raw = obj(json!({ "Further Math": {}, "Mathematics (9709)": {}, "Pure Mathematics Extra": {} }));
    assert_eq!(resolve_category_key(&raw, Category::FurtherMath), Some("Further Math"));
    assert_eq!(resolve_category_key(&raw, Category::Mathematics), Some("Mathematics (9709)"));
    assert_eq!(resolve_category_key(&raw, Category::Integration), None);

    // Without an exact key, the smallest containing key wins.
    let raw = obj(json!({ "B mathematics": {}, "A Mathematics": {} }));
    assert_eq!(resolve_category_key(&raw, Category::Mathematics), Some("A Mathematics"));

    // An exact match beats an earlier-sorting substring match.
    let raw = obj(json!({ "A integration practice": {}, "INTEGRATION": {} }));
    assert_eq!(resolve_category_key(&raw, Category::Integration), Some("INTEGRATION"));
  }

  #[test]
  fn further_mathematics_key_stays_out_of_mathematics_slot() {
    let raw = obj(json!({
      "Further Mathematics (9231)": { "Easy": { "problemLatex": "FM question" } },
      "Mathematics": { "Easy": { "problemLatex": "MATH question" } }
    }));
    assert_eq!(resolve_category_key(&raw, Category::Mathematics), Some("Mathematics"));
    assert_eq!(resolve_category_key(&raw, Category::FurtherMath), Some("Further Mathematics (9231)"));

    let set = normalize(&raw, &mut HashMap::new(), DATE);
    assert_eq!(set.get(Category::Mathematics, Difficulty::Easy).unwrap().problem_latex, "MATH question");
    assert_eq!(set.get(Category::FurtherMath, Difficulty::Easy).unwrap().problem_latex, "FM question");

    // A lone Further Mathematics key never fills the Mathematics slot.
    let raw = obj(json!({ "Further Mathematics (9231)": {} }));
    assert_eq!(resolve_category_key(&raw, Category::Mathematics), None);

    // Keys starting with the first word beat keys merely containing it.
    let raw = obj(json!({ "A-level mathematics": {}, "Mathematics 9709": {} }));
    assert_eq!(resolve_category_key(&raw, Category::Mathematics), Some("Mathematics 9709"));
  }

  #[test]
  fn next_id_at_ceiling_does_not_overflow() {
    let mut last = HashMap::from([("int-e".to_string(), u64::MAX)]);
    assert_eq!(next_id(&mut last, "int-e"), "int-e-1");
    assert_eq!(last["int-e"], 1);

    let mut last = HashMap::from([("int-e".to_string(), u64::MAX - 1)]);
    assert_eq!(next_id(&mut last, "int-e"), format!("int-e-{}", u64::MAX));
  }

  #[test]
  fn repairs_miskeyed_and_wrong_typed_fields() {
    let raw = obj(json!({
      "Mathematics (9709)": { "Medium": {
        "problem_latex": "Find the vertex of $y = x^2 - 2x$",
        "Answers": "(1, -1)",
        "fullSolutionLatex": 42,
        "hints": ["", "Complete the square", 7],
        "topics": ["Quadratics", "Quadratics"],
        "funFact": null
      }}
    }));
    let set = normalize(&raw, &mut HashMap::new(), DATE);
    let p = set.get(Category::Mathematics, Difficulty::Medium).unwrap();
    assert_eq!(p.problem_latex, "Find the vertex of $y = x^2 - 2x$");
    assert_eq!(p.possible_answers, vec!["(1, -1)"]);
    assert_eq!(p.full_solution_latex, "Solution unavailable.");
    assert_eq!(p.hints_latex, vec!["Complete the square", "7"]);
    assert_eq!(p.topics_covered, vec!["Quadratics"]);
    assert_eq!(p.fun_fact.as_deref(), Some("Math is fun!"));
  }

  #[test]
  fn empty_answer_list_falls_back() {
    let raw = obj(json!({ "Integration": { "Hard": { "possibleAnswers": [], "hintsLatex": [] } } }));
    let set = normalize(&raw, &mut HashMap::new(), DATE);
    let p = set.get(Category::Integration, Difficulty::Hard).unwrap();
    assert_eq!(p.possible_answers, vec!["Error"]);
    assert!(p.hints_latex.is_empty());
  }

  #[test]
  fn positions_always_match_slot() {
    // Generator mislabels the payload; placement still follows the slot.
    let raw = obj(json!({ "Integration": { "Easy": { "difficultyLevel": "Hard", "problemType": "Differentiation" } } }));
    let set = normalize(&raw, &mut HashMap::new(), DATE);
    let p = set.get(Category::Integration, Difficulty::Easy).unwrap();
    assert_eq!(p.difficulty_level, Difficulty::Easy);
    assert_eq!(p.problem_type, Category::Integration);
    assert!(set.is_complete());
  }

  #[test]
  fn every_field_has_exactly_one_rule() {
    for f in [
      Field::ProblemLatex,
      Field::PossibleAnswers,
      Field::FullSolutionLatex,
      Field::HintsLatex,
      Field::TopicsCovered,
      Field::FunFact,
    ] {
      assert_eq!(FIELD_RULES.iter().filter(|r| r.field == f).count(), 1, "{f:?}");
    }
  }
}
