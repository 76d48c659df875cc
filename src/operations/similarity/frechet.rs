use crate::error::{OperationError, Result};
use crate::math::Point3;

/// Discrete Fréchet distance between two polylines.
///
/// The smallest leash length that lets two walkers traverse `a` and `b`
/// from start to end, each only moving forward from sample to sample.
/// Uses `O(|b|)` memory by keeping a single row of the coupling table.
///
/// # Errors
///
/// Returns `OperationError::EmptySequence` if either polyline is empty.
pub fn frechet_dist(a: &[Point3], b: &[Point3]) -> Result<f64> {
    if a.is_empty() || b.is_empty() {
        return Err(OperationError::EmptySequence.into());
    }

    // row[j] holds the coupling distance for (i - 1, j) until overwritten.
    let mut row = Vec::with_capacity(b.len());
    let mut left = 0.0_f64;
    for (j, q) in b.iter().enumerate() {
        let d = nalgebra::distance(&a[0], q);
        left = if j == 0 { d } else { d.max(left) };
        row.push(left);
    }

    for p in &a[1..] {
        let mut diagonal = row[0];
        row[0] = row[0].max(nalgebra::distance(p, &b[0]));
        for j in 1..b.len() {
            let up = row[j];
            let reach = diagonal.min(up).min(row[j - 1]);
            row[j] = reach.max(nalgebra::distance(p, &b[j]));
            diagonal = up;
        }
    }

    Ok(row[b.len() - 1])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::error::SketchError;

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    #[test]
    fn identical_curves_are_zero_apart() {
        let a = vec![p(0.0, 0.0), p(1.0, 2.0), p(3.0, -1.0)];
        assert_relative_eq!(frechet_dist(&a, &a).unwrap(), 0.0);
        assert_relative_eq!(frechet_dist(&a[..1], &a[..1]).unwrap(), 0.0);
    }

    #[test]
    fn parallel_lines() {
        let a = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)];
        let b = vec![p(0.0, 1.0), p(1.0, 1.0), p(2.0, 1.0)];
        assert_relative_eq!(frechet_dist(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn walkers_may_wait() {
        // The denser curve is covered without growing the leash.
        let a = vec![p(0.0, 0.0), p(2.0, 0.0)];
        let b = vec![p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0), p(1.5, 0.0), p(2.0, 0.0)];
        assert_relative_eq!(frechet_dist(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn order_matters() {
        let a = vec![p(0.0, 0.0), p(1.0, 0.0)];
        let b = vec![p(1.0, 0.0), p(0.0, 0.0)];
        assert_relative_eq!(frechet_dist(&a, &b).unwrap(), 1.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = vec![p(0.0, 0.0), p(1.0, 3.0), p(2.5, 1.0), p(4.0, 4.0), p(6.0, 0.5)];
        let b = vec![p(0.5, -1.0), p(2.0, 2.0), p(3.0, 0.0), p(5.5, 1.5)];
        let ab = frechet_dist(&a, &b).unwrap();
        let ba = frechet_dist(&b, &a).unwrap();
        assert_relative_eq!(ab, ba);
        assert!(ab > 0.0);
    }

    #[test]
    fn bounded_by_endpoint_distance() {
        let a = vec![p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0)];
        let b = vec![p(0.0, 3.0), p(1.0, 1.0), p(2.0, 0.0)];
        assert_relative_eq!(frechet_dist(&a, &b).unwrap(), 3.0);
    }

    #[test]
    fn empty_input_is_rejected() {
        let a = vec![p(0.0, 0.0)];
        assert_eq!(
            frechet_dist(&a, &[]).unwrap_err(),
            SketchError::Operation(OperationError::EmptySequence)
        );
        assert!(frechet_dist(&[], &a).is_err());
    }
}
