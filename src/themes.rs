//! Theme registry: the static catalogue of topics the generator may pick from.

use std::collections::HashSet;

use crate::domain::Category;

const INTEGRATION: &[&str] = &[
  "Power Rule",
  "Substitution",
  "Integration by Parts",
  "Partial Fractions",
  "Trigonometric Integrals",
  "Exponential and Logarithmic Integrals",
  "Definite Integrals",
  "Area Under a Curve",
  "Volumes of Revolution",
  "Numerical Integration (Trapezium Rule)",
];

const DIFFERENTIATION: &[&str] = &[
  "Basic Derivatives",
  "Chain Rule",
  "Product Rule",
  "Quotient Rule",
  "Implicit Differentiation",
  "Parametric Differentiation",
  "Stationary Points",
  "Tangents and Normals",
  "Rates of Change",
  "Derivatives of Trigonometric Functions",
];

const FURTHER_MATH: &[&str] = &[
  "Complex Numbers",
  "Series",
  "Method of Differences",
  "Proof by Induction",
  "Matrices",
  "Polar Coordinates",
  "Hyperbolic Functions",
  "Roots of Polynomial Equations",
  "Differential Equations",
  "Vectors (Planes and Lines)",
];

const MATHEMATICS: &[&str] = &[
  "Coordinate Geometry",
  "Quadratics",
  "Functions",
  "Circular Measure",
  "Trigonometry",
  "Sequences and Series",
  "Binomial Expansion",
  "Logarithms and Exponentials",
  "Vectors",
  "Numerical Solutions of Equations",
];

/// Topic choices offered to the generator for one category.
pub fn themes_for(category: Category) -> &'static [&'static str] {
  match category {
    Category::Integration => INTEGRATION,
    Category::Differentiation => DIFFERENTIATION,
    Category::FurtherMath => FURTHER_MATH,
    Category::Mathematics => MATHEMATICS,
  }
}

/// Every topic across all categories.
pub fn valid_topics() -> HashSet<&'static str> {
  Category::ALL.iter().flat_map(|&c| themes_for(c).iter().copied()).collect()
}
