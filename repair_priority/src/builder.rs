use chrono::{DateTime, Utc};
use log::debug;
use snafu::prelude::*;
use std::collections::{HashMap, HashSet};

pub use crate::config::*;
use crate::matrix::Matrix;

/// A builder for collecting criteria and judgments before running an analysis.
///
/// ```
/// use repair_priority::builder::Builder;
/// use repair_priority::{Criterion, SolverRules};
/// use chrono::Utc;
/// # use repair_priority::PriorityErrors;
///
/// let mut builder = Builder::new(&SolverRules::DEFAULT_RULES)?
///     .criteria(&[Criterion::new("traffic", "Traffic"), Criterion::new("reports", "Reports")])?;
///
/// builder.compare("traffic", "reports", 3.0)?;
///
/// let res = builder.run("admin", Utc::now())?;
/// assert_eq!(res.weights[0].rank, 1);
/// # Ok::<(), PriorityErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: SolverRules,
    pub(crate) _criteria: Vec<Criterion>,
    pub(crate) _comparisons: Vec<PairwiseComparison>,
}

impl Builder {
    pub fn new(rules: &SolverRules) -> PriorityResult<Builder> {
        rules.validate()?;
        Ok(Builder {
            _rules: rules.clone(),
            _criteria: Vec::new(),
            _comparisons: Vec::new(),
        })
    }

    /// Sets the criteria. Previously entered comparisons are dropped.
    pub fn criteria(self, crits: &[Criterion]) -> PriorityResult<Builder> {
        index_criteria(crits)?;
        Ok(Builder {
            _rules: self._rules,
            _criteria: crits.to_vec(),
            _comparisons: Vec::new(),
        })
    }

    /// Records that criterion `a` is `value` times as important as criterion `b`.
    pub fn compare(&mut self, a: &str, b: &str, value: f64) -> PriorityResult<()> {
        self.add_comparison(&PairwiseComparison::new(
            a,
            b,
            ComparisonKind::Criteria,
            value,
        ))
    }

    /// Records that the priority of criterion `a` is influenced `value` times as much by `b`.
    pub fn influence(&mut self, a: &str, b: &str, value: f64) -> PriorityResult<()> {
        self.add_comparison(&PairwiseComparison::new(
            a,
            b,
            ComparisonKind::Interdependency,
            value,
        ))
    }

    pub fn add_comparison(&mut self, comparison: &PairwiseComparison) -> PriorityResult<()> {
        let index = index_criteria(&self._criteria)?;
        locate(&index, comparison)?;
        self._comparisons.push(comparison.clone());
        Ok(())
    }

    pub fn completeness(&self, kind: ComparisonKind) -> CompletenessReport {
        validate_completeness(&self._criteria, &self._comparisons, kind)
    }

    pub fn run(&self, created_by: &str, created_at: DateTime<Utc>) -> PriorityResult<AnpResult> {
        crate::run_network_analysis(
            &self._criteria,
            &self._comparisons,
            &self._rules,
            created_by,
            created_at,
        )
    }
}

/// Builds the reciprocal comparison matrix for one kind of judgments.
///
/// Each record fills both `M[i][j]` and `M[j][i] = 1 / M[i][j]`. Pairs without a
/// judgment are left at 1 (equal importance): use [validate_completeness] first
/// when this is not acceptable.
pub fn build_comparison_matrix(
    criteria: &[Criterion],
    comparisons: &[PairwiseComparison],
    kind: ComparisonKind,
) -> PriorityResult<Matrix> {
    let index = index_criteria(criteria)?;
    let mut m = Matrix::filled(criteria.len(), criteria.len(), 1.0);
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for c in comparisons.iter().filter(|c| c.kind == kind) {
        let (i, j) = locate(&index, c)?;
        let key = (i.min(j), i.max(j));
        ensure!(
            seen.insert(key),
            InvalidInputSnafu {
                reason: format!(
                    "more than one {} comparison for the pair ({}, {})",
                    kind, c.criterion_a, c.criterion_b
                )
            }
        );
        let ratio = c.ratio();
        m.set(i, j, ratio);
        m.set(j, i, 1.0 / ratio);
    }
    debug!(
        "build_comparison_matrix: kind: {} size: {} judgments: {}",
        kind,
        criteria.len(),
        seen.len()
    );
    Ok(m)
}

/// Checks that each unordered pair of criteria received exactly one judgment of the given kind.
///
/// This never fails: the report lists what is missing so that the user can be asked for it.
/// Judgments naming unknown criteria are ignored here.
pub fn validate_completeness(
    criteria: &[Criterion],
    comparisons: &[PairwiseComparison],
    kind: ComparisonKind,
) -> CompletenessReport {
    let positions: HashMap<&str, usize> = criteria
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.id.as_str(), idx))
        .collect();

    let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
    for c in comparisons.iter().filter(|c| c.kind == kind) {
        if let (Some(&i), Some(&j)) = (
            positions.get(c.criterion_a.as_str()),
            positions.get(c.criterion_b.as_str()),
        ) {
            if i != j {
                *counts.entry((i.min(j), i.max(j))).or_insert(0) += 1;
            }
        }
    }

    let n = criteria.len();
    let mut missing: Vec<CriterionPair> = Vec::new();
    let mut duplicates: Vec<CriterionPair> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let pair = CriterionPair {
                first: criteria[i].id.clone(),
                second: criteria[j].id.clone(),
            };
            match counts.get(&(i, j)) {
                None => missing.push(pair),
                Some(&count) if count > 1 => duplicates.push(pair),
                Some(_) => {}
            }
        }
    }

    CompletenessReport {
        kind,
        complete: missing.is_empty() && duplicates.is_empty(),
        expected: n * n.saturating_sub(1) / 2,
        missing,
        duplicates,
    }
}

fn index_criteria(criteria: &[Criterion]) -> PriorityResult<HashMap<&str, usize>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (idx, c) in criteria.iter().enumerate() {
        ensure!(
            index.insert(c.id.as_str(), idx).is_none(),
            InvalidInputSnafu {
                reason: format!("duplicate criterion id {:?}", c.id)
            }
        );
    }
    Ok(index)
}

// Positions of both criteria of a judgment, after checking the judgment itself.
fn locate(
    index: &HashMap<&str, usize>,
    comparison: &PairwiseComparison,
) -> PriorityResult<(usize, usize)> {
    let find = |id: &String| {
        index.get(id.as_str()).copied().context(InvalidInputSnafu {
            reason: format!("unknown criterion {:?}", id),
        })
    };
    let i = find(&comparison.criterion_a)?;
    let j = find(&comparison.criterion_b)?;
    ensure!(
        i != j,
        InvalidInputSnafu {
            reason: format!("criterion {:?} compared with itself", comparison.criterion_a)
        }
    );
    ensure!(
        comparison.value.is_finite() && comparison.value > 0.0,
        InvalidInputSnafu {
            reason: format!(
                "comparison value must be strictly positive, got {} for ({}, {})",
                comparison.value, comparison.criterion_a, comparison.criterion_b
            )
        }
    );
    Ok((i, j))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_criteria() -> Vec<Criterion> {
        vec![
            Criterion::new("traffic", "Traffic volume"),
            Criterion::new("reports", "Report count"),
            Criterion::new("width", "Road width"),
        ]
    }

    fn criteria_cmp(a: &str, b: &str, value: f64) -> PairwiseComparison {
        PairwiseComparison::new(a, b, ComparisonKind::Criteria, value)
    }

    #[test]
    fn matrix_is_reciprocal() {
        let comparisons = vec![
            criteria_cmp("traffic", "reports", 3.0),
            criteria_cmp("traffic", "width", 5.0),
            criteria_cmp("reports", "width", 2.0).with_preference(Preference::BOverA),
        ];
        let m = build_comparison_matrix(&three_criteria(), &comparisons, ComparisonKind::Criteria)
            .unwrap();
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                if i != j {
                    assert!((m.get(i, j) * m.get(j, i) - 1.0).abs() < 1e-12);
                }
            }
        }
        assert_eq!(m.get(0, 1), 3.0);
        assert_eq!(m.get(1, 2), 0.5);
        assert_eq!(m.get(2, 1), 2.0);
    }

    #[test]
    fn missing_judgments_default_to_one() {
        let comparisons = vec![criteria_cmp("width", "traffic", 4.0)];
        let m = build_comparison_matrix(&three_criteria(), &comparisons, ComparisonKind::Criteria)
            .unwrap();
        assert_eq!(m.get(2, 0), 4.0);
        assert_eq!(m.get(0, 2), 0.25);
        assert_eq!(m.get(0, 1), 1.0);
        assert_eq!(m.get(1, 2), 1.0);
    }

    #[test]
    fn other_kinds_are_ignored() {
        let comparisons = vec![PairwiseComparison::new(
            "traffic",
            "reports",
            ComparisonKind::Interdependency,
            7.0,
        )];
        let m = build_comparison_matrix(&three_criteria(), &comparisons, ComparisonKind::Criteria)
            .unwrap();
        assert_eq!(m, Matrix::filled(3, 3, 1.0));
    }

    #[test]
    fn invalid_judgments_are_rejected() {
        let crits = three_criteria();
        let kind = ComparisonKind::Criteria;
        for bad in [
            criteria_cmp("traffic", "reports", 0.0),
            criteria_cmp("traffic", "reports", -3.0),
            criteria_cmp("traffic", "reports", f64::INFINITY),
            criteria_cmp("traffic", "nowhere", 3.0),
            criteria_cmp("traffic", "traffic", 3.0),
        ] {
            let res = build_comparison_matrix(&crits, &[bad], kind);
            assert!(res.unwrap_err().is_invalid_input());
        }
    }

    #[test]
    fn duplicate_pairs_are_rejected() {
        let comparisons = vec![
            criteria_cmp("traffic", "reports", 3.0),
            criteria_cmp("reports", "traffic", 3.0),
        ];
        let res =
            build_comparison_matrix(&three_criteria(), &comparisons, ComparisonKind::Criteria);
        assert!(res.unwrap_err().is_invalid_input());
    }

    #[test]
    fn duplicate_criteria_are_rejected() {
        let crits = vec![Criterion::new("a", "A"), Criterion::new("a", "A again")];
        assert!(build_comparison_matrix(&crits, &[], ComparisonKind::Criteria).is_err());
    }

    #[test]
    fn completeness_reports_the_missing_pair() {
        let comparisons = vec![
            criteria_cmp("traffic", "reports", 3.0),
            criteria_cmp("width", "traffic", 2.0),
        ];
        let report =
            validate_completeness(&three_criteria(), &comparisons, ComparisonKind::Criteria);
        assert!(!report.complete);
        assert_eq!(report.expected, 3);
        assert_eq!(
            report.missing,
            vec![CriterionPair {
                first: "reports".to_string(),
                second: "width".to_string()
            }]
        );
        assert!(report.duplicates.is_empty());
    }

    #[test]
    fn completeness_per_kind() {
        let comparisons = vec![
            criteria_cmp("traffic", "reports", 3.0),
            criteria_cmp("traffic", "width", 3.0),
            criteria_cmp("reports", "width", 3.0),
        ];
        let crits = three_criteria();
        assert!(validate_completeness(&crits, &comparisons, ComparisonKind::Criteria).complete);
        let inter = validate_completeness(&crits, &comparisons, ComparisonKind::Interdependency);
        assert!(!inter.complete);
        assert_eq!(inter.missing.len(), 3);
    }

    #[test]
    fn completeness_flags_duplicates() {
        let crits = vec![Criterion::new("a", "A"), Criterion::new("b", "B")];
        let comparisons = vec![criteria_cmp("a", "b", 3.0), criteria_cmp("b", "a", 2.0)];
        let report = validate_completeness(&crits, &comparisons, ComparisonKind::Criteria);
        assert!(!report.complete);
        assert!(report.missing.is_empty());
        assert_eq!(report.duplicates.len(), 1);
    }

    #[test]
    fn builder_checks_eagerly() {
        let mut builder = Builder::new(&SolverRules::DEFAULT_RULES)
            .unwrap()
            .criteria(&three_criteria())
            .unwrap();
        assert!(builder.compare("traffic", "bridges", 2.0).is_err());
        assert!(builder.compare("traffic", "reports", -1.0).is_err());
        builder.compare("traffic", "reports", 2.0).unwrap();
        let report = builder.completeness(ComparisonKind::Criteria);
        assert_eq!(report.missing.len(), 2);
    }

    #[test]
    fn builder_rejects_bad_rules() {
        let rules = SolverRules {
            limit_squarings: 5,
            ..SolverRules::DEFAULT_RULES
        };
        assert!(Builder::new(&rules).is_err());
    }
}
