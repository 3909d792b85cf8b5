use crate::config::*;

/// Saaty's random consistency index, indexed by matrix size (0 to 10).
pub const RANDOM_INDEX: [f64; 11] = [
    0.0, 0.0, 0.0, 0.58, 0.90, 1.12, 1.24, 1.32, 1.41, 1.45, 1.49,
];

const ROUNDING_TOLERANCE: f64 = 1e-9;

/// Random index for a matrix of the given size. Sizes above 10 use the value for 10.
pub fn random_index(size: usize) -> f64 {
    RANDOM_INDEX[size.min(RANDOM_INDEX.len() - 1)]
}

/// `CR = CI / RI` with `CI = (eigenvalue - size) / (size - 1)`.
///
/// Matrices of size 2 or less are always consistent (ratio 0).
pub fn consistency_ratio(eigenvalue: f64, size: usize) -> f64 {
    if size <= 2 {
        return 0.0;
    }
    let n = size as f64;
    // Eigenvalues a hair under the size are rounding noise of a consistent matrix.
    if eigenvalue < n && eigenvalue > n - ROUNDING_TOLERANCE {
        return 0.0;
    }
    (eigenvalue - n) / (n - 1.0) / random_index(size)
}

pub fn check_consistency(eigenvalue: f64, size: usize, threshold: f64) -> ConsistencyResult {
    let consistency_ratio = consistency_ratio(eigenvalue, size);
    ConsistencyResult {
        principal_eigenvalue: eigenvalue,
        consistency_ratio,
        is_consistent: consistency_ratio < threshold,
    }
}
