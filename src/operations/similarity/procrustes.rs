use std::f64::consts::PI;

use super::resample::rebalance_curve;
use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3, VectorExt, TOLERANCE};

/// Moves the centroid to the origin and scales so the root-mean-square
/// distance of the points from it is 1.
///
/// With `rebalance = Some(n)` the polyline is first resampled to `n` points
/// evenly spaced by arc length, so the centroid is that of the curve rather
/// than of its sampling density.
///
/// # Errors
///
/// Returns `OperationError::InsufficientPoints` if the points are empty or all
/// coincide, and any error of [`rebalance_curve`].
pub fn procrustes_normalize_curve(
    points: &[Point3],
    rebalance: Option<usize>,
) -> Result<Vec<Point3>> {
    let resampled;
    let points = match rebalance {
        Some(n) => {
            resampled = rebalance_curve(points, n)?;
            resampled.as_slice()
        }
        None => points,
    };
    if points.is_empty() {
        return Err(OperationError::InsufficientPoints {
            required: 1,
            found: 0,
        }
        .into());
    }

    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    let centroid = points.iter().map(|p| p.coords).sum::<Vector3>() / count;
    let spread = points
        .iter()
        .map(|p| (p.coords - centroid).norm_squared())
        .sum::<f64>();
    let scale = (spread / count).sqrt();
    if scale < TOLERANCE {
        return Err(OperationError::InsufficientPoints {
            required: 2,
            found: 1,
        }
        .into());
    }

    Ok(points
        .iter()
        .map(|p| Point3::from((p.coords - centroid) / scale))
        .collect())
}

/// The angle that rotates `curve` about the origin onto `relative` with the
/// least total squared distance between corresponding points.
///
/// Both curves are expected to be centered already. The result is in
/// `(-π, π]`; counter-clockwise is positive.
///
/// # Errors
///
/// Returns `OperationError::LengthMismatch` if the curves differ in length and
/// `OperationError::EmptySequence` if they are empty.
pub fn find_procrustes_rotation_angle(curve: &[Point3], relative: &[Point3]) -> Result<f64> {
    if curve.len() != relative.len() {
        return Err(OperationError::LengthMismatch {
            left: curve.len(),
            right: relative.len(),
        }
        .into());
    }
    if curve.is_empty() {
        return Err(OperationError::EmptySequence.into());
    }

    let (cross, dot) = curve
        .iter()
        .zip(relative)
        .fold((0.0, 0.0), |(cross, dot), (a, b)| {
            (cross + a.x * b.y - a.y * b.x, dot + a.x * b.x + a.y * b.y)
        });
    let angle = cross.atan2(dot);
    Ok(if angle <= -PI { PI } else { angle })
}

/// Rotates every point about the origin in the XY plane.
#[must_use]
pub fn rotate_curve(points: &[Point3], theta: f64) -> Vec<Point3> {
    points
        .iter()
        .map(|p| Point3::from(p.coords.rotated_by(theta)))
        .collect()
}

/// Rotates `curve` onto `relative` by their Procrustes angle.
///
/// # Errors
///
/// Same as [`find_procrustes_rotation_angle`].
pub fn procrustes_normalize_rotation(curve: &[Point3], relative: &[Point3]) -> Result<Vec<Point3>> {
    let theta = find_procrustes_rotation_angle(curve, relative)?;
    Ok(rotate_curve(curve, theta))
}
