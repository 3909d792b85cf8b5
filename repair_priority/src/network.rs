//! Interdependency-adjusted weights (ANP).
//!
//! The supermatrix scales the influence of criterion `j` on criterion `i` by the weight
//! of `j`: `S[i][j] = interdependency[i][j] * w[j]`. The limit weights are the normalized
//! first column of its limiting power.
//!
//! The limit is approximated by repeated squaring. This is an empirical bound, not a
//! convergence proof: a fixed number of squarings is always applied, after which squaring
//! continues until the column-normalized matrix stabilizes or the budget runs out.

use log::{debug, warn};
use snafu::prelude::*;
use std::cmp::Ordering;

use crate::config::*;
use crate::matrix::Matrix;

/// Folds an optional interdependency matrix into the criteria weights.
///
/// Without interdependencies, the weights are returned unchanged.
pub fn synthesize_network_weights(
    criteria_weights: &[f64],
    interdependency: Option<&Matrix>,
    rules: &SolverRules,
) -> PriorityResult<NetworkWeights> {
    ensure!(
        !criteria_weights.is_empty(),
        InvalidInputSnafu {
            reason: "criteria weights are empty"
        }
    );
    ensure!(
        criteria_weights.iter().all(|w| w.is_finite() && *w >= 0.0),
        InvalidInputSnafu {
            reason: format!(
                "criteria weights must be finite and non-negative: {:?}",
                criteria_weights
            )
        }
    );
    let inter = match interdependency {
        None => {
            return Ok(NetworkWeights {
                weights: criteria_weights.to_vec(),
                supermatrix: None,
                limit_matrix: None,
                squarings: 0,
                converged: true,
            });
        }
        Some(m) => m,
    };

    let n = criteria_weights.len();
    ensure!(
        inter.rows() == n && inter.cols() == n,
        InvalidInputSnafu {
            reason: format!(
                "interdependency matrix is {}x{} but there are {} weights",
                inter.rows(),
                inter.cols(),
                n
            )
        }
    );
    inter.ensure_positive()?;

    let mut supermatrix = Matrix::filled(n, n, 0.0);
    for i in 0..n {
        for (j, w) in criteria_weights.iter().enumerate() {
            supermatrix.set(i, j, inter.get(i, j) * w);
        }
    }
    debug!("synthesize_network_weights: supermatrix: {:?}", supermatrix);

    let (limit_matrix, squarings, converged) = limit_of(&supermatrix, rules)?;
    if !converged {
        warn!(
            "synthesize_network_weights: limit matrix did not stabilize after {} squarings",
            squarings
        );
    }

    let raw = limit_matrix.column(0);
    let total: f64 = raw.iter().sum();
    let weights = if total > 0.0 && total.is_finite() {
        raw.iter().map(|x| x / total).collect()
    } else {
        debug!("synthesize_network_weights: degenerate limit column, keeping criteria weights");
        criteria_weights.to_vec()
    };
    debug!("synthesize_network_weights: limit weights: {:?}", weights);

    Ok(NetworkWeights {
        weights,
        supermatrix: Some(supermatrix),
        limit_matrix: Some(limit_matrix),
        squarings,
        converged,
    })
}

// Returns the column-normalized limit, the number of squarings and the convergence flag.
// The power is rescaled by its largest entry after each squaring so that it neither
// overflows nor vanishes; a positive factor does not change the normalized columns.
fn limit_of(supermatrix: &Matrix, rules: &SolverRules) -> PriorityResult<(Matrix, u32, bool)> {
    let budget = rules.limit_squarings * 2;
    let mut power = supermatrix.clone();
    let mut normalized = power.column_normalized();
    let mut squarings: u32 = 0;
    while squarings < budget {
        squarings += 1;
        power = power.multiply(&power)?;
        let peak = power.max_abs();
        if peak > 0.0 && peak.is_finite() {
            power = power.scaled(1.0 / peak);
        }
        let next = power.column_normalized();
        let change = next.max_abs_difference(&normalized);
        normalized = next;
        if squarings >= rules.limit_squarings && change < rules.limit_tolerance {
            return Ok((normalized, squarings, true));
        }
    }
    Ok((normalized, squarings, false))
}

/// 1-based ranks, by decreasing weight. Equal weights keep their input order.
pub fn rank_by_weight(weights: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| {
        weights[b]
            .partial_cmp(&weights[a])
            .unwrap_or(Ordering::Equal)
    });
    let mut ranks = vec![0; weights.len()];
    for (pos, idx) in order.iter().enumerate() {
        ranks[*idx] = (pos + 1) as u32;
    }
    ranks
}
