use crate::error::Result;
use crate::math::{Point2, Vector2, VectorExt};

/// Unit tangent at the first sample, pointing into the stroke.
///
/// Averages the directions toward the next `neighbors` samples so a single
/// jittery sample does not dominate. Falls back to the first chord when the
/// neighbors cancel out.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateVector` if the first two samples coincide.
pub(crate) fn start_tangent(points: &[Point2], neighbors: usize) -> Result<Vector2> {
    averaged_direction(points[0], points.iter().skip(1).take(neighbors.max(1)))
        .or_else(|_| (points[1] - points[0]).checked_normalize())
}

/// Unit tangent at the last sample, pointing back into the stroke.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateVector` if the last two samples coincide.
pub(crate) fn end_tangent(points: &[Point2], neighbors: usize) -> Result<Vector2> {
    let n = points.len();
    averaged_direction(points[n - 1], points.iter().rev().skip(1).take(neighbors.max(1)))
        .or_else(|_| (points[n - 2] - points[n - 1]).checked_normalize())
}

/// Unit tangent at an interior split sample, pointing toward the samples
/// before it. The left range ends with this tangent and the right range
/// starts with its negation, so the two fitted pieces join smoothly.
///
/// When the neighbors on both sides coincide the stroke reverses at the
/// split, and the perpendicular of the incoming chord is used instead.
///
/// # Errors
///
/// Returns `GeometryError::DegenerateVector` if `split` sits on a repeated sample.
pub(crate) fn center_tangent(points: &[Point2], split: usize) -> Result<Vector2> {
    (points[split - 1] - points[split + 1])
        .checked_normalize()
        .or_else(|_| {
            let incoming = points[split - 1] - points[split];
            Vector2::new(-incoming.y, incoming.x).checked_normalize()
        })
}

/// Start tangent re-estimated from a previous fit: averages the directions
/// toward every sample that the fit placed within the first third of the
/// segment. `None` if those directions cancel.
pub(crate) fn refit_start_tangent(points: &[Point2], params: &[f64]) -> Option<Vector2> {
    let near = points
        .iter()
        .zip(params)
        .skip(1)
        .take_while(|(_, u)| **u <= 1.0 / 3.0)
        .map(|(p, _)| p);
    averaged_direction(points[0], near).ok()
}

/// End tangent re-estimated from a previous fit, mirror of [`refit_start_tangent`].
pub(crate) fn refit_end_tangent(points: &[Point2], params: &[f64]) -> Option<Vector2> {
    let n = points.len();
    let near = points
        .iter()
        .zip(params)
        .rev()
        .skip(1)
        .take_while(|(_, u)| **u >= 2.0 / 3.0)
        .map(|(p, _)| p);
    averaged_direction(points[n - 1], near).ok()
}

fn averaged_direction<'a>(
    origin: Point2,
    samples: impl Iterator<Item = &'a Point2>,
) -> Result<Vector2> {
    samples
        .filter_map(|p| (p - origin).checked_normalize().ok())
        .fold(Vector2::zeros(), |acc, d| acc + d)
        .checked_normalize()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn straight_stroke_tangents() {
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(3.0, 0.0)];
        assert_relative_eq!(start_tangent(&pts, 3).unwrap(), Vector2::new(1.0, 0.0));
        assert_relative_eq!(end_tangent(&pts, 3).unwrap(), Vector2::new(-1.0, 0.0));
    }

    #[test]
    fn neighbors_smooth_out_jitter() {
        let pts = [p(0.0, 0.0), p(1.0, 0.5), p(2.0, -0.5), p(3.0, 0.0)];
        let t = start_tangent(&pts, 3).unwrap();
        let first_chord = (pts[1] - pts[0]).normalize();
        assert!(t.y.abs() < first_chord.y.abs());
    }

    #[test]
    fn cancelled_neighbors_fall_back_to_first_chord() {
        // Directions toward (1,0) and (-1,0) cancel out.
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(-1.0, 0.0)];
        assert_relative_eq!(start_tangent(&pts, 2).unwrap(), Vector2::new(1.0, 0.0));
    }

    #[test]
    fn center_tangent_points_backwards() {
        let pts = [p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)];
        let t = center_tangent(&pts, 1).unwrap();
        assert!(t.on_same_direction(&Vector2::new(-1.0, -1.0)));
    }

    #[test]
    fn center_tangent_at_reversal_uses_perpendicular() {
        let pts = [p(0.0, 0.0), p(1.0, 0.0), p(0.0, 0.0)];
        let t = center_tangent(&pts, 1).unwrap();
        assert_relative_eq!(t.dot(&Vector2::new(1.0, 0.0)), 0.0);
        assert_relative_eq!(t.norm(), 1.0);
    }

    #[test]
    fn refit_uses_first_third_of_parameters() {
        let pts = [p(0.0, 0.0), p(1.0, 1.0), p(2.0, 0.0), p(3.0, 0.0)];
        let params = [0.0, 0.3, 0.7, 1.0];
        let t = refit_start_tangent(&pts, &params).unwrap();
        assert!(t.on_same_direction(&Vector2::new(1.0, 1.0)));

        let e = refit_end_tangent(&pts, &params).unwrap();
        assert!(e.on_same_direction(&Vector2::new(-1.0, 0.0)));

        // Nothing inside the first third.
        assert!(refit_start_tangent(&pts, &[0.0, 0.5, 0.7, 1.0]).is_none());
    }
}
