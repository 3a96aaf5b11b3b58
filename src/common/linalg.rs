//! Linear algebra utilities
//!
//! Small numerical helpers for keeping covariance matrices well-behaved
//! across long predict/update recursions.

use nalgebra::SMatrix;

/// Make a matrix symmetric
///
/// Averages a matrix with its transpose. Covariance matrices drift away
/// from exact symmetry under repeated floating-point products; the filter
/// re-symmetrizes after every predict and update step.
///
/// # Arguments
/// * `matrix` - Matrix to symmetrize
///
/// # Returns
/// Symmetric matrix
pub fn symmetrize<const N: usize>(matrix: &SMatrix<f64, N, N>) -> SMatrix<f64, N, N> {
    0.5 * (matrix + matrix.transpose())
}

/// Check if a matrix is positive definite
///
/// # Arguments
/// * `matrix` - Matrix to check
///
/// # Returns
/// true if a Cholesky factorization exists
pub fn is_positive_definite<const N: usize>(matrix: &SMatrix<f64, N, N>) -> bool {
    nalgebra::Cholesky::new(*matrix).is_some()
}

/// Maximum absolute asymmetry `max_ij |M - Mᵀ|`
///
/// Used by tests to bound symmetry drift.
pub fn asymmetry<const N: usize>(matrix: &SMatrix<f64, N, N>) -> f64 {
    (matrix - matrix.transpose()).abs().max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix4;

    #[test]
    fn test_symmetrize() {
        let m = Matrix4::from_fn(|i, j| (i * 4 + j) as f64);
        let s = symmetrize(&m);
        assert!(asymmetry(&s) < 1e-15);
        // Diagonal is untouched
        for i in 0..4 {
            assert_eq!(s[(i, i)], m[(i, i)]);
        }
    }

    #[test]
    fn test_is_positive_definite() {
        assert!(is_positive_definite(&(Matrix4::identity() * 2.0)));
        assert!(!is_positive_definite(&(Matrix4::identity() * -1.0)));
        assert!(!is_positive_definite(&Matrix4::zeros()));
    }
}
