//! Generation context derived from the previous day's problem set:
//! the highest sequence number per id prefix, and the topics not to repeat.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{ProblemSet, ID_SEPARATOR};
use crate::themes::valid_topics;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationContext {
  /// id prefix (`int-e`) -> highest sequence number seen.
  pub last_indices: HashMap<String, u64>,
  /// Registry topics used yesterday, in first-seen order, without duplicates.
  pub banned_topics: Vec<String>,
}

/// Split `int-e-3` into (`int-e`, 3). Ids without a separator, with a
/// non-numeric tail, or with a sequence that has no successor yield `None`.
pub fn split_id(id: &str) -> Option<(&str, u64)> {
  let (prefix, tail) = id.rsplit_once(ID_SEPARATOR)?;
  let seq = tail.trim().parse::<u64>().ok().filter(|&s| s < u64::MAX)?;
  Some((prefix, seq))
}

impl GenerationContext {
  pub fn from_previous(previous: Option<&ProblemSet>) -> Self {
    let mut ctx = Self::default();
    let Some(set) = previous else { return ctx };

    let registry = valid_topics();
    let mut seen = HashSet::new();

    for problem in set.problems() {
      match split_id(&problem.id) {
        Some((prefix, seq)) => {
          let slot = ctx.last_indices.entry(prefix.to_string()).or_insert(seq);
          *slot = (*slot).max(seq);
        }
        None => debug!(target: "generation", id = %problem.id, "Skipping id without numeric sequence"),
      }

      for topic in &problem.topics_covered {
        if registry.contains(topic.as_str()) && seen.insert(topic.clone()) {
          ctx.banned_topics.push(topic.clone());
        }
      }
    }

    debug!(
      target: "generation",
      prefixes = ctx.last_indices.len(),
      banned = ctx.banned_topics.len(),
      "Derived generation context"
    );
    ctx
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Category, Difficulty, Problem};

  fn problem(category: Category, difficulty: Difficulty, id: &str, topics: &[&str]) -> Problem {
    Problem {
      id: id.into(),
      date: "2026-10-18T06:00:00Z".into(),
      problem_latex: "p".into(),
      possible_answers: vec!["a".into()],
      full_solution_latex: "s".into(),
      hints_latex: vec![],
      topics_covered: topics.iter().map(|s| s.to_string()).collect(),
      difficulty_level: difficulty,
      problem_type: category,
      fun_fact: None,
    }
  }

  #[test]
  fn no_previous_set_gives_empty_context() {
    let ctx = GenerationContext::from_previous(None);
    assert!(ctx.last_indices.is_empty());
    assert!(ctx.banned_topics.is_empty());
  }

  #[test]
  fn tracks_highest_sequence_per_prefix() {
    let mut set = ProblemSet::default();
    set.insert(problem(Category::Integration, Difficulty::Easy, "int-e-3", &[]));
    set.insert(problem(Category::Integration, Difficulty::Medium, "int-m-12", &[]));
    // Manually placed id sharing a prefix with another slot.
    set.insert(problem(Category::Integration, Difficulty::Hard, "int-e-9", &[]));
    set.insert(problem(Category::Differentiation, Difficulty::Easy, "diff-e-2", &[]));

    let ctx = GenerationContext::from_previous(Some(&set));
    assert_eq!(ctx.last_indices.get("int-e"), Some(&9));
    assert_eq!(ctx.last_indices.get("int-m"), Some(&12));
    assert_eq!(ctx.last_indices.get("diff-e"), Some(&2));
  }

  #[test]
  fn ignores_ids_without_numeric_tail() {
    let mut set = ProblemSet::default();
    set.insert(problem(Category::Integration, Difficulty::Easy, "int-e-abc", &[]));
    set.insert(problem(Category::Integration, Difficulty::Medium, "legacy", &[]));
    set.insert(problem(Category::Integration, Difficulty::Hard, "int-h-7", &[]));

    let ctx = GenerationContext::from_previous(Some(&set));
    assert_eq!(ctx.last_indices.len(), 1);
    assert_eq!(ctx.last_indices.get("int-h"), Some(&7));
  }

  #[test]
  fn bans_only_registry_topics_once() {
    let mut set = ProblemSet::default();
    set.insert(problem(Category::Integration, Difficulty::Easy, "int-e-1", &["Power Rule", "Made Up Topic"]));
    set.insert(problem(Category::Integration, Difficulty::Hard, "int-h-1", &["Partial Fractions", "Power Rule"]));
    set.insert(problem(Category::Mathematics, Difficulty::Easy, "math-e-1", &["Integration"]));

    let ctx = GenerationContext::from_previous(Some(&set));
    assert_eq!(ctx.banned_topics, vec!["Power Rule".to_string(), "Partial Fractions".to_string()]);
    let registry = valid_topics();
    assert!(ctx.banned_topics.iter().all(|t| registry.contains(t.as_str())));
  }

  #[test]
  fn split_id_handles_multi_part_prefixes() {
    assert_eq!(split_id("int-e-4"), Some(("int-e", 4)));
    assert_eq!(split_id("a-b-c-10"), Some(("a-b-c", 10)));
    assert_eq!(split_id("int-e-"), None);
    assert_eq!(split_id("42"), None);
  }

  #[test]
  fn sequence_at_ceiling_is_not_tracked() {
    assert_eq!(split_id("int-e-18446744073709551615"), None);
    assert_eq!(split_id("int-e-18446744073709551614"), Some(("int-e", u64::MAX - 1)));

    let mut set = ProblemSet::default();
    set.insert(problem(Category::Integration, Difficulty::Easy, "int-e-18446744073709551615", &[]));
    set.insert(problem(Category::Integration, Difficulty::Hard, "int-h-2", &[]));

    let ctx = GenerationContext::from_previous(Some(&set));
    assert_eq!(ctx.last_indices.get("int-e"), None);
    assert_eq!(ctx.last_indices.get("int-h"), Some(&2));
  }
}
