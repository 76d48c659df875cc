use crate::error::{OperationError, Result};
use crate::math::{Point3, VectorExt, TOLERANCE};

/// Total polyline length: the sum of distances between consecutive points.
///
/// Zero for sequences with fewer than two points.
#[must_use]
pub fn curve_length(points: &[Point3]) -> f64 {
    points
        .windows(2)
        .map(|w| nalgebra::distance(&w[0], &w[1]))
        .sum()
}

/// The point `dist` beyond `v2` on the ray from `v1` through `v2`.
///
/// A negative `dist` walks back from `v2` toward `v1`.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateVector` if `v1` and `v2` coincide.
pub fn extend_point_on_line(v1: &Point3, v2: &Point3, dist: f64) -> Result<Point3> {
    let dir = (v2 - v1).checked_normalize()?;
    Ok(v2 + dir * dist)
}

/// Inserts evenly spaced points into every gap longer than `max_len`.
///
/// All input points are kept, in order; afterwards no two consecutive points
/// are farther apart than `max_len`.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if `max_len` is not a positive,
/// finite length.
pub fn subdivide_curve(points: &[Point3], max_len: f64) -> Result<Vec<Point3>> {
    if !max_len.is_finite() || max_len <= 0.0 {
        return Err(OperationError::InvalidInput(format!(
            "subdivision length must be positive and finite, got {max_len}"
        ))
        .into());
    }

    let Some((first, rest)) = points.split_first() else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(points.len());
    out.push(*first);
    let mut prev = *first;
    for point in rest {
        let seg_len = nalgebra::distance(&prev, point);
        if seg_len > max_len {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let pieces = (seg_len / max_len).ceil() as usize;
            #[allow(clippy::cast_precision_loss)]
            let step = seg_len / pieces as f64;
            for i in 1..pieces {
                #[allow(clippy::cast_precision_loss)]
                let back = seg_len - step * i as f64;
                out.push(extend_point_on_line(&prev, point, -back)?);
            }
        }
        out.push(*point);
        prev = *point;
    }
    Ok(out)
}

/// Resamples a polyline to `n` points evenly spaced by arc length.
///
/// The first and last points are kept exactly.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if `n < 2`, and
/// `OperationError::InsufficientPoints` if the polyline has fewer than two
/// distinct points.
pub fn rebalance_curve(points: &[Point3], n: usize) -> Result<Vec<Point3>> {
    if n < 2 {
        return Err(OperationError::InvalidInput(format!(
            "rebalancing needs at least 2 output points, got {n}"
        ))
        .into());
    }
    let total = curve_length(points);
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Err(OperationError::InsufficientPoints {
            required: 2,
            found: 0,
        }
        .into());
    };
    if total < TOLERANCE {
        return Err(OperationError::InsufficientPoints {
            required: 2,
            found: 1,
        }
        .into());
    }

    #[allow(clippy::cast_precision_loss)]
    let step = total / (n - 1) as f64;
    let mut out = Vec::with_capacity(n);
    out.push(first);

    // `walked` is the arc length up to points[seg].
    let mut seg = 0;
    let mut walked = 0.0;
    for k in 1..n - 1 {
        #[allow(clippy::cast_precision_loss)]
        let target = step * k as f64;
        let mut seg_len = nalgebra::distance(&points[seg], &points[seg + 1]);
        while walked + seg_len < target && seg + 2 < points.len() {
            walked += seg_len;
            seg += 1;
            seg_len = nalgebra::distance(&points[seg], &points[seg + 1]);
        }
        if seg_len < TOLERANCE {
            out.push(points[seg + 1]);
            continue;
        }
        let overshoot = (walked + seg_len - target).clamp(0.0, seg_len);
        out.push(extend_point_on_line(&points[seg], &points[seg + 1], -overshoot)?);
    }

    out.push(last);
    Ok(out)
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

    fn square() -> Vec<Point3> {
        vec![p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0), p(0.0, 0.0)]
    }

    #[test]
    fn length_of_polyline() {
        assert_relative_eq!(curve_length(&square()), 4.0);
        assert_relative_eq!(curve_length(&[p(0.0, 0.0), p(3.0, 4.0)]), 5.0);
        assert_relative_eq!(curve_length(&[p(2.0, 2.0)]), 0.0);
        assert_relative_eq!(curve_length(&[]), 0.0);
    }

    #[test]
    fn extend_beyond_and_back() {
        let a = p(0.0, 0.0);
        let b = p(2.0, 0.0);
        assert_relative_eq!(extend_point_on_line(&a, &b, 3.0).unwrap(), p(5.0, 0.0));
        assert_relative_eq!(extend_point_on_line(&a, &b, -0.5).unwrap(), p(1.5, 0.0));
        assert!(extend_point_on_line(&a, &a, 1.0).is_err());
    }

    #[test]
    fn subdivide_caps_gap_length() {
        let pts = vec![p(0.0, 0.0), p(1.0, 0.0), p(1.05, 0.0), p(1.05, 2.5)];
        let max_len = 0.3;
        let out = subdivide_curve(&pts, max_len).unwrap();
        for w in out.windows(2) {
            assert!(nalgebra::distance(&w[0], &w[1]) <= max_len + 1e-12);
        }
        // Originals survive in order.
        let mut cursor = out.iter();
        for original in &pts {
            assert!(cursor.any(|q| q == original), "missing {original}");
        }
        assert_relative_eq!(curve_length(&out), curve_length(&pts), epsilon = 1e-12);
    }

    #[test]
    fn subdivide_leaves_short_gaps_alone() {
        let out = subdivide_curve(&square(), 2.0).unwrap();
        assert_eq!(out, square());
        assert!(subdivide_curve(&[], 1.0).unwrap().is_empty());
    }

    #[test]
    fn subdivide_rejects_bad_length() {
        assert!(subdivide_curve(&square(), 0.0).is_err());
        assert!(subdivide_curve(&square(), f64::INFINITY).is_err());
    }

    #[test]
    fn rebalance_uneven_line() {
        let pts = vec![p(0.0, 0.0), p(0.1, 0.0), p(0.2, 0.0), p(7.0, 0.0), p(10.0, 0.0)];
        let out = rebalance_curve(&pts, 11).unwrap();
        assert_eq!(out.len(), 11);
        assert_eq!(out[0], pts[0]);
        assert_eq!(out[10], pts[4]);
        for w in out.windows(2) {
            assert_relative_eq!(nalgebra::distance(&w[0], &w[1]), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn rebalance_square_walks_corners() {
        let out = rebalance_curve(&square(), 9).unwrap();
        assert_eq!(out.len(), 9);
        // Every half unit of the perimeter, so corners land on samples.
        assert_relative_eq!(out[2], p(0.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(out[3], p(0.5, 1.0), epsilon = 1e-12);
        assert_relative_eq!(out[6], p(1.0, 0.0), epsilon = 1e-12);
        assert_eq!(out[8], p(0.0, 0.0));
    }

    #[test]
    fn rebalance_skips_repeated_points() {
        let pts = vec![p(0.0, 0.0), p(0.0, 0.0), p(2.0, 0.0), p(2.0, 0.0), p(4.0, 0.0)];
        let out = rebalance_curve(&pts, 5).unwrap();
        for (i, q) in out.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = p(i as f64, 0.0);
            assert_relative_eq!(*q, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn rebalance_two_points_keeps_ends() {
        let pts = vec![p(1.0, 1.0), p(3.0, 5.0)];
        let out = rebalance_curve(&pts, 2).unwrap();
        assert_eq!(out, pts);
    }

    #[test]
    fn rebalance_needs_distinct_points() {
        let err = rebalance_curve(&[p(1.0, 1.0), p(1.0, 1.0)], 10).unwrap_err();
        assert!(matches!(
            err,
            SketchError::Operation(OperationError::InsufficientPoints { required: 2, .. })
        ));
        assert!(rebalance_curve(&[], 10).is_err());
        assert!(rebalance_curve(&square(), 1).is_err());
    }
}
