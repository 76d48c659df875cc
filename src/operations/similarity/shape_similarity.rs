use std::f64::consts::{PI, SQRT_2};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use super::frechet::frechet_dist;
use super::procrustes::{find_procrustes_rotation_angle, procrustes_normalize_curve, rotate_curve};
use super::resample::curve_length;
use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};

/// Parameters controlling shape comparison.
#[derive(Debug, Clone, Copy)]
pub struct SimilarityParams {
    /// Points each curve is resampled to before comparison.
    pub estimation_points: usize,
    /// Whether to search for the rotation that best aligns the curves.
    pub check_rotations: bool,
    /// Evenly spaced rotations tried around the best-fit angle.
    pub rotations: usize,
    /// Half-width, in radians within `[0, π]`, of the search window around
    /// the best-fit angle. It bounds the offsets tried from that angle, not
    /// the total rotation: with 0 only the best-fit angle itself is used.
    pub restrict_rotation_angle: f64,
}

impl Default for SimilarityParams {
    fn default() -> Self {
        Self {
            estimation_points: 50,
            check_rotations: true,
            rotations: 10,
            restrict_rotation_angle: PI,
        }
    }
}

impl SimilarityParams {
    fn validate(&self) -> Result<()> {
        if self.estimation_points < 2 {
            return Err(OperationError::InvalidInput(format!(
                "estimation needs at least 2 points, got {}",
                self.estimation_points
            ))
            .into());
        }
        let max = self.restrict_rotation_angle;
        if !max.is_finite() || !(0.0..=PI).contains(&max) {
            return Err(OperationError::InvalidInput(format!(
                "rotation limit must lie in [0, π], got {max}"
            ))
            .into());
        }
        Ok(())
    }
}

/// Outcome of comparing two strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeMatch {
    /// Fréchet distance between the normalized curves; 0 for identical shapes.
    pub distance: f64,
    /// `distance` mapped into `[0, 1]`, where 1 is identical.
    pub similarity: f64,
    /// Rotation applied to the second curve, in radians.
    pub rotation: f64,
}

/// Compares two strokes independently of position and size, and optionally
/// of orientation.
///
/// Both curves are resampled to the same number of points, centered and
/// scaled to unit spread. The second curve is then rotated by each candidate
/// angle and the smallest discrete Fréchet distance wins.
#[derive(Debug)]
pub struct ShapeSimilarity<'a> {
    a: &'a [Point3],
    b: &'a [Point3],
    params: SimilarityParams,
}

impl<'a> ShapeSimilarity<'a> {
    #[must_use]
    pub fn new(a: &'a [Point3], b: &'a [Point3], params: SimilarityParams) -> Self {
        Self { a, b, params }
    }

    /// Executes the comparison.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` for out-of-range parameters and
    /// `OperationError::InsufficientPoints` if either curve has fewer than
    /// two distinct points.
    pub fn execute(&self) -> Result<ShapeMatch> {
        self.params.validate()?;
        let na = normalize(self.a, &self.params)?;
        let nb = normalize(self.b, &self.params)?;
        compare(&na, &nb, &self.params)
    }

    /// Compares `query` against every curve of `library`, in order.
    ///
    /// The query is normalized once. With the `parallel` feature the library
    /// is processed on the rayon thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`ShapeSimilarity::execute`]; the first failing curve aborts
    /// the batch.
    pub fn match_all(
        query: &[Point3],
        library: &[Vec<Point3>],
        params: &SimilarityParams,
    ) -> Result<Vec<ShapeMatch>> {
        params.validate()?;
        let nq = normalize(query, params)?;
        match_library(&nq, library, params)
    }

    /// Index and match of the library curve closest to `query`, or `None`
    /// for an empty library.
    ///
    /// # Errors
    ///
    /// Same as [`ShapeSimilarity::match_all`].
    pub fn best_match(
        query: &[Point3],
        library: &[Vec<Point3>],
        params: &SimilarityParams,
    ) -> Result<Option<(usize, ShapeMatch)>> {
        let matches = Self::match_all(query, library, params)?;
        Ok(matches
            .into_iter()
            .enumerate()
            .min_by(|(_, x), (_, y)| x.distance.total_cmp(&y.distance)))
    }
}

/// Fréchet distance between `a` and `b` after normalization; 0 means the
/// same shape.
///
/// # Errors
///
/// Same as [`ShapeSimilarity::execute`].
pub fn shape_similarity(a: &[Point3], b: &[Point3], params: &SimilarityParams) -> Result<f64> {
    ShapeSimilarity::new(a, b, *params)
        .execute()
        .map(|m| m.distance)
}

fn normalize(points: &[Point3], params: &SimilarityParams) -> Result<Vec<Point3>> {
    procrustes_normalize_curve(points, Some(params.estimation_points))
}

#[cfg(feature = "parallel")]
fn match_library(
    query: &[Point3],
    library: &[Vec<Point3>],
    params: &SimilarityParams,
) -> Result<Vec<ShapeMatch>> {
    library
        .par_iter()
        .map(|reference| compare(query, &normalize(reference, params)?, params))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn match_library(
    query: &[Point3],
    library: &[Vec<Point3>],
    params: &SimilarityParams,
) -> Result<Vec<ShapeMatch>> {
    library
        .iter()
        .map(|reference| compare(query, &normalize(reference, params)?, params))
        .collect()
}

fn compare(na: &[Point3], nb: &[Point3], params: &SimilarityParams) -> Result<ShapeMatch> {
    let angles = if params.check_rotations {
        let procrustes = find_procrustes_rotation_angle(nb, na)?;
        candidate_angles(procrustes, params)
    } else {
        vec![0.0]
    };

    let mut best = (f64::INFINITY, 0.0);
    for &theta in &angles {
        let distance = frechet_dist(na, &rotate_curve(nb, theta))?;
        if distance < best.0 {
            best = (distance, theta);
        }
    }
    let (distance, rotation) = best;

    let scale = (curve_length(na) * curve_length(nb)).sqrt() / SQRT_2;
    let similarity = if scale < TOLERANCE {
        0.0
    } else {
        (1.0 - distance / scale).max(0.0)
    };

    debug!(
        candidates = angles.len(),
        rotation, distance, similarity, "matched shapes"
    );
    Ok(ShapeMatch {
        distance,
        similarity,
        rotation,
    })
}

/// The best-fit angle followed by `rotations` evenly spaced offsets from it
/// spanning `[-max, max]`. A zero offset is not repeated.
fn candidate_angles(procrustes: f64, params: &SimilarityParams) -> Vec<f64> {
    let max = params.restrict_rotation_angle;
    let mut angles = vec![procrustes];
    if params.rotations < 2 || max < TOLERANCE {
        return angles;
    }
    #[allow(clippy::cast_precision_loss)]
    let step = 2.0 * max / (params.rotations - 1) as f64;
    for i in 0..params.rotations {
        #[allow(clippy::cast_precision_loss)]
        let offset = -max + step * i as f64;
        if offset.abs() > TOLERANCE {
            angles.push(procrustes + offset);
        }
    }
    angles
}
