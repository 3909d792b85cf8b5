use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::matrix::Matrix;

/// Derives the priority weights and the principal eigenvalue of a positive reciprocal matrix.
///
/// Power iteration starting from the uniform vector. The iterate is renormalized to sum to 1
/// after each product. The loop stops when the L1 change falls under `rules.tolerance` or
/// after `rules.max_iterations` products. In the latter case `converged` is false and the
/// last iterate is returned.
///
/// The principal eigenvalue is the mean of `(M w)_i / w_i`. Terms with `w_i == 0` contribute 0.
pub fn solve_priority_vector(matrix: &Matrix, rules: &SolverRules) -> PriorityResult<PriorityVector> {
    ensure!(
        matrix.is_square(),
        InvalidInputSnafu {
            reason: format!(
                "comparison matrix must be square, got {}x{}",
                matrix.rows(),
                matrix.cols()
            )
        }
    );
    let n = matrix.rows();
    ensure!(
        n > 0,
        InvalidInputSnafu {
            reason: "comparison matrix is empty"
        }
    );
    matrix.ensure_positive()?;

    if n == 1 {
        return Ok(PriorityVector {
            weights: vec![1.0],
            principal_eigenvalue: 1.0,
            iterations: 0,
            converged: true,
        });
    }

    let mut weights: Vec<f64> = vec![1.0 / n as f64; n];
    let mut iterations: u32 = 0;
    let mut converged = false;
    while iterations < rules.max_iterations {
        iterations += 1;
        let product = matrix.apply(&weights)?;
        let total: f64 = product.iter().sum();
        let next: Vec<f64> = product.iter().map(|x| x / total).collect();
        let change: f64 = next
            .iter()
            .zip(weights.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        weights = next;
        if change < rules.tolerance {
            converged = true;
            break;
        }
    }
    debug!(
        "solve_priority_vector: size: {} iterations: {} converged: {}",
        n, iterations, converged
    );

    let product = matrix.apply(&weights)?;
    let ratios: f64 = product
        .iter()
        .zip(weights.iter())
        .map(|(mw, w)| if *w == 0.0 { 0.0 } else { mw / w })
        .sum();
    let principal_eigenvalue = ratios / n as f64;
    debug!(
        "solve_priority_vector: weights: {:?} eigenvalue: {}",
        weights, principal_eigenvalue
    );

    Ok(PriorityVector {
        weights,
        principal_eigenvalue,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn indifference_gives_uniform_weights() {
        let m = Matrix::filled(3, 3, 1.0);
        let pv = solve_priority_vector(&m, &SolverRules::DEFAULT_RULES).unwrap();
        assert!(pv.converged);
        for w in pv.weights.iter() {
            assert_close(*w, 1.0 / 3.0);
        }
        assert_close(pv.principal_eigenvalue, 3.0);
    }

    #[test]
    fn two_criteria() {
        let m = Matrix::from_rows(&[vec![1.0, 3.0], vec![1.0 / 3.0, 1.0]]).unwrap();
        let pv = solve_priority_vector(&m, &SolverRules::DEFAULT_RULES).unwrap();
        assert_close(pv.weights[0], 0.75);
        assert_close(pv.weights[1], 0.25);
        assert_close(pv.principal_eigenvalue, 2.0);
    }

    #[test]
    fn weights_sum_to_one() {
        // Saaty's textbook example, slightly inconsistent.
        let m = Matrix::from_rows(&[
            vec![1.0, 5.0, 3.0, 7.0],
            vec![1.0 / 5.0, 1.0, 1.0 / 3.0, 3.0],
            vec![1.0 / 3.0, 3.0, 1.0, 5.0],
            vec![1.0 / 7.0, 1.0 / 3.0, 1.0 / 5.0, 1.0],
        ])
        .unwrap();
        let pv = solve_priority_vector(&m, &SolverRules::DEFAULT_RULES).unwrap();
        assert_close(pv.weights.iter().sum::<f64>(), 1.0);
        assert!(pv.converged);
        assert!(pv.principal_eigenvalue > 4.0);
        assert!(pv.weights[0] > pv.weights[2]);
        assert!(pv.weights[2] > pv.weights[1]);
        assert!(pv.weights[1] > pv.weights[3]);
    }

    #[test]
    fn consistent_matrix_recovers_ratios() {
        // w = [0.5, 0.3, 0.2], M[i][j] = w_i / w_j
        let w = [0.5, 0.3, 0.2];
        let rows: Vec<Vec<f64>> = w
            .iter()
            .map(|wi| w.iter().map(|wj| wi / wj).collect())
            .collect();
        let m = Matrix::from_rows(&rows).unwrap();
        let pv = solve_priority_vector(&m, &SolverRules::DEFAULT_RULES).unwrap();
        for (a, b) in pv.weights.iter().zip(w.iter()) {
            assert_close(*a, *b);
        }
        assert_close(pv.principal_eigenvalue, 3.0);
    }

    #[test]
    fn iteration_ceiling_is_reported() {
        let m = Matrix::from_rows(&[
            vec![1.0, 9.0, 5.0],
            vec![1.0 / 9.0, 1.0, 1.0 / 3.0],
            vec![1.0 / 5.0, 3.0, 1.0],
        ])
        .unwrap();
        let rules = SolverRules {
            max_iterations: 1,
            ..SolverRules::DEFAULT_RULES
        };
        let pv = solve_priority_vector(&m, &rules).unwrap();
        assert_eq!(pv.iterations, 1);
        assert!(!pv.converged);
        assert_close(pv.weights.iter().sum::<f64>(), 1.0);

        let pv = solve_priority_vector(&m, &SolverRules::DEFAULT_RULES).unwrap();
        assert!(pv.converged);
        assert!(pv.iterations > 1);
    }

    #[test]
    fn single_criterion() {
        let pv = solve_priority_vector(&Matrix::identity(1), &SolverRules::DEFAULT_RULES).unwrap();
        assert_eq!(pv.weights, vec![1.0]);
        assert_eq!(pv.principal_eigenvalue, 1.0);
    }

    #[test]
    fn malformed_matrices() {
        let rules = SolverRules::DEFAULT_RULES;
        assert!(solve_priority_vector(&Matrix::filled(0, 0, 1.0), &rules).is_err());
        assert!(solve_priority_vector(&Matrix::filled(2, 3, 1.0), &rules).is_err());
        let negative = Matrix::from_rows(&[vec![1.0, -2.0], vec![-0.5, 1.0]]).unwrap();
        assert!(solve_priority_vector(&negative, &rules)
            .unwrap_err()
            .is_invalid_input());
    }
}
