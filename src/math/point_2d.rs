//! Planar point arithmetic.
//!
//! These treat a [`Point2`] as a position vector from the origin, which is how
//! raw stroke samples and Bezier control points are handled in the fitter.

use super::{Point2, VectorExt};
use crate::error::Result;

/// Euclidean distance between two points.
#[must_use]
pub fn distance_between_points(a: &Point2, b: &Point2) -> f64 {
    nalgebra::distance(a, b)
}

/// Perpendicular distance from `point` to the infinite line through
/// `line_start` and `line_end`.
///
/// If the two line points coincide the line is undefined and the distance to
/// `line_start` is returned instead.
#[must_use]
pub fn distance_point_to_line(point: &Point2, line_start: &Point2, line_end: &Point2) -> f64 {
    let dir = line_end - line_start;
    let len = dir.norm();
    if len < super::TOLERANCE {
        return distance_between_points(point, line_start);
    }
    dir.perp(&(point - line_start)).abs() / len
}

/// Componentwise sum of two points.
#[must_use]
pub fn add_points(a: &Point2, b: &Point2) -> Point2 {
    Point2::from(a.coords + b.coords)
}

/// Componentwise difference `a - b`.
#[must_use]
pub fn subtract_points(a: &Point2, b: &Point2) -> Point2 {
    Point2::from(a.coords - b.coords)
}

/// Scales a point about the origin.
#[must_use]
pub fn scale_point(point: &Point2, scale: f64) -> Point2 {
    Point2::from(point.coords * scale)
}

/// Rescales a point so that its distance from the origin equals `scale`.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateVector` if `point` is the origin.
pub fn unit_scale_point(point: &Point2, scale: f64) -> Result<Point2> {
    Ok(Point2::from(point.coords.with_length(scale)?))
}

/// Dot product of two position vectors.
#[must_use]
pub fn dot_points(a: &Point2, b: &Point2) -> f64 {
    a.coords.dot(&b.coords)
}

/// Distance of a point from the origin.
#[must_use]
pub fn point_length(point: &Point2) -> f64 {
    point.coords.norm()
}

/// Squared distance of a point from the origin.
#[must_use]
pub fn point_squared_length(point: &Point2) -> f64 {
    point.coords.norm_squared()
}

/// Projects a point onto the unit circle.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateVector` if `point` is the origin.
pub fn normalize_point(point: &Point2) -> Result<Point2> {
    Ok(Point2::from(point.coords.checked_normalize()?))
}

/// Reflects a point through the origin.
#[must_use]
pub fn negate_point(point: &Point2) -> Point2 {
    Point2::from(-point.coords)
}
