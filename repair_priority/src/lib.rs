mod config;
mod consistency;
mod labels;
mod matrix;
mod network;
mod priority;
mod topsis;

pub mod builder;
pub mod manual;

use chrono::{DateTime, Utc};
use log::{debug, info};
use snafu::prelude::*;
use std::collections::HashSet;

pub use crate::builder::{build_comparison_matrix, validate_completeness};
pub use crate::config::*;
pub use crate::consistency::{check_consistency, consistency_ratio, random_index, RANDOM_INDEX};
pub use crate::labels::{rank_detection_labels, DetectionLabel, LabelRanking, LABEL_WEIGHTS};
pub use crate::matrix::Matrix;
pub use crate::network::{rank_by_weight, synthesize_network_weights};
pub use crate::priority::solve_priority_vector;
pub use crate::topsis::{rank_alternatives, rank_by_topsis};

/// Runs the complete weighting of the criteria.
///
/// Arguments:
/// * `criteria` the criteria, in the order in which the weights are reported
/// * `comparisons` the judgments of both kinds. Interdependencies are modeled as soon as one
///   judgment of the `Interdependency` kind is present, in which case they must be complete too.
/// * `rules` iteration limits and thresholds
/// * `created_by`, `created_at` stamped on the result as they are
///
/// A consistency ratio above the threshold is not an error: the result says so and the
/// caller decides what to do with it.
pub fn run_network_analysis(
    criteria: &[Criterion],
    comparisons: &[PairwiseComparison],
    rules: &SolverRules,
    created_by: &str,
    created_at: DateTime<Utc>,
) -> PriorityResult<AnpResult> {
    info!(
        "Processing {:?} criteria and {:?} comparisons",
        criteria.len(),
        comparisons.len()
    );
    rules.validate()?;
    ensure!(
        !criteria.is_empty(),
        InvalidInputSnafu {
            reason: "no criteria"
        }
    );
    let unique_ids: HashSet<&str> = criteria.iter().map(|c| c.id.as_str()).collect();
    ensure!(
        unique_ids.len() == criteria.len(),
        InvalidInputSnafu {
            reason: "criterion ids are not unique"
        }
    );

    ensure_complete(criteria, comparisons, ComparisonKind::Criteria)?;
    let criteria_matrix = build_comparison_matrix(criteria, comparisons, ComparisonKind::Criteria)?;
    let pv = solve_priority_vector(&criteria_matrix, rules)?;
    let consistency = check_consistency(
        pv.principal_eigenvalue,
        criteria.len(),
        rules.consistency_threshold,
    );
    info!(
        "Criteria weights: {:?} (consistency ratio: {:.4})",
        pv.weights, consistency.consistency_ratio
    );

    let has_interdependencies = comparisons
        .iter()
        .any(|c| c.kind == ComparisonKind::Interdependency);
    let interdependency_matrix = if has_interdependencies {
        ensure_complete(criteria, comparisons, ComparisonKind::Interdependency)?;
        Some(build_comparison_matrix(
            criteria,
            comparisons,
            ComparisonKind::Interdependency,
        )?)
    } else {
        None
    };
    let nw = synthesize_network_weights(&pv.weights, interdependency_matrix.as_ref(), rules)?;
    debug!("run_network_analysis: network weights: {:?}", nw);

    let final_weights: Vec<f64> = if has_interdependencies {
        nw.weights.clone()
    } else {
        pv.weights.clone()
    };
    let ranks = rank_by_weight(&final_weights);
    let weights: Vec<WeightEntry> = criteria
        .iter()
        .enumerate()
        .map(|(idx, c)| WeightEntry {
            criterion_id: c.id.clone(),
            weight: pv.weights[idx],
            limit_weight: if has_interdependencies {
                Some(nw.weights[idx])
            } else {
                None
            },
            rank: ranks[idx],
        })
        .collect();
    for w in weights.iter() {
        info!("Criterion {}: {:.4} (rank {})", w.criterion_id, w.weight, w.rank);
    }

    Ok(AnpResult {
        criteria: criteria.to_vec(),
        weights,
        consistency,
        has_interdependencies,
        supermatrix: nw.supermatrix,
        limit_matrix: nw.limit_matrix,
        converged: pv.converged && nw.converged,
        created_at,
        created_by: created_by.to_string(),
    })
}

fn ensure_complete(
    criteria: &[Criterion],
    comparisons: &[PairwiseComparison],
    kind: ComparisonKind,
) -> PriorityResult<()> {
    let report = validate_completeness(criteria, comparisons, kind);
    ensure!(
        report.duplicates.is_empty(),
        InvalidInputSnafu {
            reason: format!("duplicate {} comparisons: {:?}", kind, report.duplicates)
        }
    );
    ensure!(
        report.complete,
        IncompleteComparisonsSnafu {
            kind,
            missing: report.missing
        }
    );
    Ok(())
}
