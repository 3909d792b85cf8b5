use log::debug;
use snafu::prelude::*;
use std::cmp::Ordering;

use crate::config::*;

/// Scores the alternatives (rows) of a decision matrix with vector-normalization TOPSIS.
///
/// All the criteria are of the benefit type: a larger value is always better.
/// Results are returned in input order; `rank` is 1-based by decreasing score and equal
/// scores keep their input order.
///
/// Degenerate cases are not errors: a column with only zeros contributes nothing, and an
/// alternative at distance 0 from both ideals (only possible with a single alternative)
/// scores 0.5.
pub fn rank_by_topsis(decision: &[Vec<f64>], weights: &[f64]) -> PriorityResult<Vec<TopsisScore>> {
    check_inputs(decision, weights)?;
    let num_criteria = weights.len();

    let norms: Vec<f64> = (0..num_criteria)
        .map(|j| decision.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt())
        .collect();

    let weighted: Vec<Vec<f64>> = decision
        .iter()
        .map(|row| {
            row.iter()
                .zip(norms.iter())
                .zip(weights.iter())
                .map(|((x, norm), w)| if *norm == 0.0 { 0.0 } else { x / norm * w })
                .collect()
        })
        .collect();

    let ideal_best: Vec<f64> = (0..num_criteria)
        .map(|j| weighted.iter().map(|v| v[j]).fold(f64::NEG_INFINITY, f64::max))
        .collect();
    let ideal_worst: Vec<f64> = (0..num_criteria)
        .map(|j| weighted.iter().map(|v| v[j]).fold(f64::INFINITY, f64::min))
        .collect();
    debug!(
        "rank_by_topsis: ideal best: {:?} ideal worst: {:?}",
        ideal_best, ideal_worst
    );

    let scores: Vec<f64> = weighted
        .iter()
        .map(|v| {
            let to_best = distance(v, &ideal_best);
            let to_worst = distance(v, &ideal_worst);
            if to_best + to_worst == 0.0 {
                0.5
            } else {
                to_worst / (to_worst + to_best)
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal));
    let mut res: Vec<TopsisScore> = scores
        .iter()
        .enumerate()
        .map(|(alternative, score)| TopsisScore {
            alternative,
            score: *score,
            rank: 0,
        })
        .collect();
    for (pos, idx) in order.iter().enumerate() {
        res[*idx].rank = (pos + 1) as u32;
    }
    debug!("rank_by_topsis: {:?}", res);
    Ok(res)
}

/// Same as [rank_by_topsis] with named alternatives. The results are sorted by rank.
pub fn rank_alternatives(
    alternative_ids: &[String],
    decision: &[Vec<f64>],
    weights: &[f64],
) -> PriorityResult<Vec<TopsisResult>> {
    ensure!(
        alternative_ids.len() == decision.len(),
        InvalidInputSnafu {
            reason: format!(
                "{} alternative ids for {} rows",
                alternative_ids.len(),
                decision.len()
            )
        }
    );
    let mut res: Vec<TopsisResult> = rank_by_topsis(decision, weights)?
        .iter()
        .map(|ts| TopsisResult {
            alternative_id: alternative_ids[ts.alternative].clone(),
            score: ts.score,
            rank: ts.rank,
        })
        .collect();
    res.sort_by_key(|r| r.rank);
    Ok(res)
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn check_inputs(decision: &[Vec<f64>], weights: &[f64]) -> PriorityResult<()> {
    ensure!(
        !weights.is_empty(),
        InvalidInputSnafu {
            reason: "weight vector is empty"
        }
    );
    ensure!(
        weights.iter().all(|w| w.is_finite() && *w >= 0.0),
        InvalidInputSnafu {
            reason: format!("weights must be non-negative: {:?}", weights)
        }
    );
    ensure!(
        !decision.is_empty(),
        InvalidInputSnafu {
            reason: "decision matrix has no alternative"
        }
    );
    for (idx, row) in decision.iter().enumerate() {
        ensure!(
            row.len() == weights.len(),
            InvalidInputSnafu {
                reason: format!(
                    "alternative {} has {} values but there are {} weights",
                    idx,
                    row.len(),
                    weights.len()
                )
            }
        );
        ensure!(
            row.iter().all(|x| x.is_finite() && *x >= 0.0),
            InvalidInputSnafu {
                reason: format!("alternative {} has negative or missing values", idx)
            }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranks(res: &[TopsisScore]) -> Vec<u32> {
        res.iter().map(|r| r.rank).collect()
    }

    #[test]
    fn dominant_alternative_wins() {
        let decision = vec![
            vec![3.0, 2.0, 3.0],
            vec![2.0, 2.0, 2.0],
            vec![1.0, 1.0, 1.0],
        ];
        let res = rank_by_topsis(&decision, &[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(ranks(&res), vec![1, 2, 3]);
        assert_eq!(res[0].score, 1.0);
        assert_eq!(res[2].score, 0.0);
        assert!(res[1].score > 0.0 && res[1].score < 1.0);
    }

    #[test]
    fn single_alternative() {
        let res = rank_by_topsis(&[vec![4.0, 0.0]], &[0.5, 0.5]).unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].score, 0.5);
        assert_eq!(res[0].rank, 1);
    }

    #[test]
    fn column_scale_does_not_change_ranks() {
        let decision = vec![
            vec![7.0, 1.0, 120.0],
            vec![3.0, 9.0, 80.0],
            vec![5.0, 4.0, 200.0],
            vec![1.0, 6.0, 150.0],
        ];
        let weights = [0.5, 0.3, 0.2];
        let base = rank_by_topsis(&decision, &weights).unwrap();
        let scaled: Vec<Vec<f64>> = decision
            .iter()
            .map(|row| vec![row[0], row[1], row[2] * 1000.0])
            .collect();
        let other = rank_by_topsis(&scaled, &weights).unwrap();
        assert_eq!(ranks(&base), ranks(&other));
        for (a, b) in base.iter().zip(other.iter()) {
            assert!((a.score - b.score).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_column_is_ignored() {
        let decision = vec![vec![2.0, 0.0], vec![1.0, 0.0]];
        let res = rank_by_topsis(&decision, &[0.5, 0.5]).unwrap();
        assert_eq!(ranks(&res), vec![1, 2]);
        assert!(res.iter().all(|r| r.score.is_finite()));
    }

    #[test]
    fn ties_keep_input_order() {
        let decision = vec![vec![1.0, 1.0], vec![1.0, 1.0], vec![2.0, 2.0]];
        let res = rank_by_topsis(&decision, &[0.5, 0.5]).unwrap();
        assert_eq!(ranks(&res), vec![2, 3, 1]);
    }

    #[test]
    fn invalid_inputs() {
        let decision = vec![vec![1.0, 2.0]];
        assert!(rank_by_topsis(&decision, &[]).unwrap_err().is_invalid_input());
        assert!(rank_by_topsis(&decision, &[1.0]).is_err());
        assert!(rank_by_topsis(&[], &[1.0]).is_err());
        assert!(rank_by_topsis(&[vec![-1.0]], &[1.0]).is_err());
        assert!(rank_by_topsis(&[vec![f64::NAN]], &[1.0]).is_err());
        assert!(rank_by_topsis(&decision, &[0.5, -0.5]).is_err());
    }

    #[test]
    fn named_alternatives_sorted_by_rank() {
        let ids = vec!["north".to_string(), "south".to_string()];
        let res = rank_alternatives(&ids, &[vec![1.0], vec![5.0]], &[1.0]).unwrap();
        assert_eq!(res[0].alternative_id, "south");
        assert_eq!(res[0].rank, 1);
        assert_eq!(res[1].alternative_id, "north");
        assert!(rank_alternatives(&ids[..1], &[vec![1.0], vec![5.0]], &[1.0]).is_err());
    }
}
