// ********* Input data structures ***********

use chrono::{DateTime, Utc};
use snafu::prelude::*;
use std::fmt::Display;

use crate::matrix::Matrix;

/// A criterion used to judge the areas (traffic volume, number of reports, ...).
///
/// Identity is by `id`. Criteria should not change once comparisons have been entered.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Criterion {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Criterion {
    pub fn new(id: &str, name: &str) -> Criterion {
        Criterion {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
        }
    }
}

/// The two families of pairwise judgments.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum ComparisonKind {
    /// How much more important criterion A is than criterion B.
    Criteria,
    /// How much the priority of criterion A is influenced by criterion B.
    Interdependency,
}

impl Display for ComparisonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparisonKind::Criteria => write!(f, "criteria"),
            ComparisonKind::Interdependency => write!(f, "interdependency"),
        }
    }
}

/// Which side of a comparison dominates.
///
/// Values are always positive ratios on the 1-9 scale. The direction is carried
/// by this flag instead of by the sign of the value.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Preference {
    AOverB,
    BOverA,
}

/// One judgment entered by a user for an unordered pair of criteria.
#[derive(PartialEq, Debug, Clone)]
pub struct PairwiseComparison {
    pub criterion_a: String,
    pub criterion_b: String,
    pub kind: ComparisonKind,
    pub value: f64,
    pub preference: Preference,
}

impl PairwiseComparison {
    /// A judgment where `a` dominates `b` by `value`.
    pub fn new(a: &str, b: &str, kind: ComparisonKind, value: f64) -> PairwiseComparison {
        PairwiseComparison {
            criterion_a: a.to_string(),
            criterion_b: b.to_string(),
            kind,
            value,
            preference: Preference::AOverB,
        }
    }

    pub fn with_preference(self, preference: Preference) -> PairwiseComparison {
        PairwiseComparison { preference, ..self }
    }

    /// The ratio of A over B implied by this judgment.
    pub fn ratio(&self) -> f64 {
        match self.preference {
            Preference::AOverB => self.value,
            Preference::BOverA => 1.0 / self.value,
        }
    }
}

// ******** Output data structures *********

/// An unordered pair of criteria, reported in criteria order.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct CriterionPair {
    pub first: String,
    pub second: String,
}

/// The outcome of checking that every pair of criteria received a judgment.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CompletenessReport {
    pub kind: ComparisonKind,
    pub complete: bool,
    pub expected: usize,
    pub missing: Vec<CriterionPair>,
    /// Pairs for which more than one judgment was entered.
    pub duplicates: Vec<CriterionPair>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct PriorityVector {
    pub weights: Vec<f64>,
    pub principal_eigenvalue: f64,
    pub iterations: u32,
    /// False when the iteration ceiling was reached before the tolerance.
    pub converged: bool,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ConsistencyResult {
    pub principal_eigenvalue: f64,
    pub consistency_ratio: f64,
    pub is_consistent: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct NetworkWeights {
    pub weights: Vec<f64>,
    pub supermatrix: Option<Matrix>,
    /// Column-normalized limit of the supermatrix.
    pub limit_matrix: Option<Matrix>,
    pub squarings: u32,
    pub converged: bool,
}

#[derive(PartialEq, Debug, Clone)]
pub struct WeightEntry {
    pub criterion_id: String,
    pub weight: f64,
    pub limit_weight: Option<f64>,
    /// 1-based
    pub rank: u32,
}

/// A completed analysis. Weights are listed in criteria order.
#[derive(PartialEq, Debug, Clone)]
pub struct AnpResult {
    pub criteria: Vec<Criterion>,
    pub weights: Vec<WeightEntry>,
    pub consistency: ConsistencyResult,
    pub has_interdependencies: bool,
    pub supermatrix: Option<Matrix>,
    pub limit_matrix: Option<Matrix>,
    /// Both the eigenvector iteration and the limit matrix reached their tolerance.
    pub converged: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

impl AnpResult {
    pub fn consistency_ratio(&self) -> f64 {
        self.consistency.consistency_ratio
    }

    pub fn is_consistent(&self) -> bool {
        self.consistency.is_consistent
    }

    /// The weights that feed the ranking: limit weights when interdependencies were modeled.
    pub fn final_weights(&self) -> Vec<f64> {
        self.weights
            .iter()
            .map(|w| w.limit_weight.unwrap_or(w.weight))
            .collect()
    }
}

/// The score of one alternative, in input order.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct TopsisScore {
    pub alternative: usize,
    pub score: f64,
    pub rank: u32,
}

#[derive(PartialEq, Debug, Clone)]
pub struct TopsisResult {
    pub alternative_id: String,
    pub score: f64,
    pub rank: u32,
}

/// Errors that prevent the engine from producing an answer.
///
/// Numerically degenerate inputs (zero columns, a single alternative) are not errors.
#[derive(PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PriorityErrors {
    #[snafu(display("invalid input: {reason}"))]
    InvalidInput { reason: String },
    #[snafu(display("{} {} comparison(s) missing", missing.len(), kind))]
    IncompleteComparisons {
        kind: ComparisonKind,
        missing: Vec<CriterionPair>,
    },
}

impl PriorityErrors {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PriorityErrors::InvalidInput { .. })
    }
}

pub type PriorityResult<T> = Result<T, PriorityErrors>;

// ********* Configuration **********

/// Iteration limits and thresholds of the solvers.
#[derive(PartialEq, Debug, Clone)]
pub struct SolverRules {
    /// Ceiling for the eigenvector power iteration.
    pub max_iterations: u32,
    /// L1 change between two iterates under which the eigenvector is accepted.
    pub tolerance: f64,
    /// Number of times the supermatrix is squared before convergence is checked.
    pub limit_squarings: u32,
    pub limit_tolerance: f64,
    pub consistency_threshold: f64,
}

impl SolverRules {
    pub const MIN_LIMIT_SQUARINGS: u32 = 20;

    pub const DEFAULT_RULES: SolverRules = SolverRules {
        max_iterations: 100,
        tolerance: 1e-10,
        limit_squarings: SolverRules::MIN_LIMIT_SQUARINGS,
        limit_tolerance: 1e-9,
        consistency_threshold: 0.10,
    };

    pub fn validate(&self) -> PriorityResult<()> {
        ensure!(
            self.max_iterations >= 1,
            InvalidInputSnafu {
                reason: "max_iterations must be at least 1"
            }
        );
        ensure!(
            self.tolerance > 0.0 && self.limit_tolerance > 0.0,
            InvalidInputSnafu {
                reason: "tolerances must be strictly positive"
            }
        );
        ensure!(
            self.limit_squarings >= SolverRules::MIN_LIMIT_SQUARINGS,
            InvalidInputSnafu {
                reason: format!(
                    "limit_squarings must be at least {}, got {}",
                    SolverRules::MIN_LIMIT_SQUARINGS,
                    self.limit_squarings
                )
            }
        );
        ensure!(
            self.consistency_threshold > 0.0 && self.consistency_threshold < 1.0,
            InvalidInputSnafu {
                reason: format!(
                    "consistency_threshold must be in (0, 1), got {}",
                    self.consistency_threshold
                )
            }
        );
        Ok(())
    }
}

impl Default for SolverRules {
    fn default() -> Self {
        SolverRules::DEFAULT_RULES
    }
}
