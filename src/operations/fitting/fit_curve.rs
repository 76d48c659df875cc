use tracing::{debug, trace, warn};

use super::tangent;
use crate::error::{OperationError, Result};
use crate::geometry::{CubicBez, FitWarning, FittedCurve};
use crate::math::point_2d::{distance_between_points, distance_point_to_line};
use crate::math::{Point2, Vector2, VectorExt, TOLERANCE};

/// Below this the least-squares system for the control-point distances is
/// treated as singular.
const DEGENERATE_DETERMINANT: f64 = 1e-12;

/// Longest allowed control arm, as a multiple of the segment chord.
const MAX_HANDLE_RATIO: f64 = 2.0;

/// Parameters controlling curve fitting.
#[derive(Debug, Clone, Copy)]
pub struct FitParams {
    /// Maximum allowed distance between a sample and the fitted curve, in
    /// the units of the input points.
    pub tolerance: f64,
    /// Maximum number of nested splits before a range is accepted as-is.
    pub max_depth: usize,
    /// Newton-Raphson reparameterization rounds per fitting attempt.
    pub newton_iterations: usize,
    /// Ranges nested deeper than this many splits miss out on the
    /// tangent-refit retry and are split as soon as they miss the tolerance.
    pub retry_budget: usize,
    /// Samples averaged when estimating the tangent at a stroke end.
    pub tangent_neighbors: usize,
}

impl Default for FitParams {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            max_depth: 32,
            newton_iterations: 4,
            retry_budget: 4,
            tangent_neighbors: 3,
        }
    }
}

/// Fits a sequence of stroke samples with a minimal chain of cubic Beziers.
///
/// Classic least-squares fitting with recursive splitting: a single cubic is
/// fitted to the whole range with fixed end tangents, its sample parameters
/// are refined by Newton-Raphson, and a range whose worst sample still lies
/// farther than the tolerance is split at that sample. Split joins share one
/// tangent, so the result is smooth across segments.
#[derive(Debug)]
pub struct FitCurve {
    points: Vec<Point2>,
    params: FitParams,
}

impl FitCurve {
    /// Creates a fit with the given tolerance and default parameters otherwise.
    #[must_use]
    pub fn new(points: Vec<Point2>, tolerance: f64) -> Self {
        Self::with_params(
            points,
            FitParams {
                tolerance,
                ..FitParams::default()
            },
        )
    }

    /// Creates a fit with explicit parameters.
    #[must_use]
    pub fn with_params(points: Vec<Point2>, params: FitParams) -> Self {
        Self { points, params }
    }

    /// Executes the fit.
    ///
    /// Consecutive duplicate samples are ignored. Ranges that cannot meet the
    /// tolerance within `max_depth` splits are kept as the best segment found
    /// and reported through [`FittedCurve::warnings`].
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InsufficientPoints` if fewer than 2 distinct
    /// samples are given, and `OperationError::InvalidInput` if the tolerance
    /// is negative or not finite.
    pub fn execute(&self) -> Result<FittedCurve> {
        let tolerance = self.params.tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "fit tolerance must be finite and non-negative, got {tolerance}"
            ))
            .into());
        }

        let points = dedup_consecutive(&self.points);
        if points.len() < 2 {
            return Err(OperationError::InsufficientPoints {
                required: 2,
                found: points.len(),
            }
            .into());
        }

        let start = tangent::start_tangent(&points, self.params.tangent_neighbors)?;
        let end = tangent::end_tangent(&points, self.params.tangent_neighbors)?;

        let mut fitter = Fitter {
            points: &points,
            params: &self.params,
            splits: 0,
            curves: Vec::new(),
            warnings: Vec::new(),
        };
        fitter.run(start, end)?;

        debug!(
            samples = points.len(),
            curves = fitter.curves.len(),
            splits = fitter.splits,
            tolerance,
            "fitted stroke"
        );
        Ok(FittedCurve::from_beziers(
            points[0],
            &fitter.curves,
            fitter.warnings,
        ))
    }
}

/// A contiguous range of samples awaiting a fit.
struct Span {
    first: usize,
    last: usize,
    /// Unit tangent at `first`, pointing into the range.
    start_tangent: Vector2,
    /// Unit tangent at `last`, pointing back into the range.
    end_tangent: Vector2,
    depth: usize,
    /// `true` when `first` is the stroke start, so its tangent is not shared
    /// with a neighboring segment.
    free_start: bool,
    /// `true` when `last` is the stroke end.
    free_end: bool,
}

/// One least-squares fit of a range and how well it did.
struct Attempt {
    curve: CubicBez,
    max_error: f64,
    /// Range-relative index of the worst sample.
    split: usize,
    /// Refined parameter of every sample.
    params: Vec<f64>,
}

enum Outcome {
    Accept(CubicBez),
    Split(usize),
}

struct Fitter<'a> {
    points: &'a [Point2],
    params: &'a FitParams,
    splits: usize,
    curves: Vec<CubicBez>,
    warnings: Vec<FitWarning>,
}

impl Fitter<'_> {
    /// Works through the ranges depth-first, left before right, so curves
    /// come out in stroke order without recursion.
    fn run(&mut self, start_tangent: Vector2, end_tangent: Vector2) -> Result<()> {
        let mut pending = vec![Span {
            first: 0,
            last: self.points.len() - 1,
            start_tangent,
            end_tangent,
            depth: 0,
            free_start: true,
            free_end: true,
        }];

        while let Some(span) = pending.pop() {
            match self.fit_span(&span) {
                Outcome::Accept(curve) => self.curves.push(curve),
                Outcome::Split(split) => {
                    let center = tangent::center_tangent(self.points, split)?;
                    self.splits += 1;
                    trace!(first = span.first, last = span.last, split, "splitting range");
                    pending.push(Span {
                        first: split,
                        last: span.last,
                        start_tangent: -center,
                        end_tangent: span.end_tangent,
                        depth: span.depth + 1,
                        free_start: false,
                        free_end: span.free_end,
                    });
                    pending.push(Span {
                        first: span.first,
                        last: split,
                        start_tangent: span.start_tangent,
                        end_tangent: center,
                        depth: span.depth + 1,
                        free_start: span.free_start,
                        free_end: false,
                    });
                }
            }
        }
        Ok(())
    }

    fn fit_span(&mut self, span: &Span) -> Outcome {
        let points = self.points;
        let pts = &points[span.first..=span.last];
        let tolerance = self.params.tolerance;

        if pts.len() == 2 {
            return Outcome::Accept(two_point_curve(
                pts[0],
                pts[1],
                span.start_tangent,
                span.end_tangent,
            ));
        }
        if follows_chord(span, pts, tolerance) {
            return Outcome::Accept(CubicBez::line(pts[0], pts[pts.len() - 1]));
        }

        let mut best = self.attempt(
            pts,
            span.start_tangent,
            span.end_tangent,
            chord_length_parameterize(pts),
        );
        if best.max_error <= tolerance {
            return Outcome::Accept(best.curve);
        }

        if span.depth <= self.params.retry_budget {
            // Shared join tangents stay fixed; only free stroke ends move.
            let start = if span.free_start {
                tangent::refit_start_tangent(pts, &best.params).unwrap_or(span.start_tangent)
            } else {
                span.start_tangent
            };
            let end = if span.free_end {
                tangent::refit_end_tangent(pts, &best.params).unwrap_or(span.end_tangent)
            } else {
                span.end_tangent
            };
            let retry = self.attempt(pts, start, end, best.params.clone());
            if retry.max_error <= tolerance {
                return Outcome::Accept(retry.curve);
            }
            if retry.max_error < best.max_error {
                best = retry;
            }
        }

        if span.depth >= self.params.max_depth {
            warn!(
                first = span.first,
                last = span.last,
                max_error = best.max_error,
                tolerance,
                "tolerance unsatisfiable, keeping best segment"
            );
            self.warnings.push(FitWarning::ToleranceUnsatisfiable {
                first: span.first,
                last: span.last,
                max_error: best.max_error,
                tolerance,
            });
            return Outcome::Accept(best.curve);
        }

        Outcome::Split(span.first + best.split)
    }

    /// Fits one cubic, then alternates Newton-Raphson reparameterization and
    /// refitting while the error keeps dropping.
    fn attempt(&self, pts: &[Point2], start: Vector2, end: Vector2, params: Vec<f64>) -> Attempt {
        let tolerance = self.params.tolerance;
        let mut curve = generate_bezier(pts, &params, start, end);
        let mut params = reparameterize(&curve, pts, &params);
        let (mut max_error, mut split) = compute_max_error(pts, &curve, &params);

        for _ in 0..self.params.newton_iterations {
            if max_error <= tolerance {
                break;
            }
            let candidate = generate_bezier(pts, &params, start, end);
            let candidate_params = reparameterize(&candidate, pts, &params);
            let (err, idx) = compute_max_error(pts, &candidate, &candidate_params);
            if err >= max_error {
                break;
            }
            curve = candidate;
            params = candidate_params;
            max_error = err;
            split = idx;
        }

        Attempt {
            curve,
            max_error,
            split,
            params,
        }
    }
}

fn dedup_consecutive(points: &[Point2]) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out
            .last()
            .is_none_or(|prev| distance_between_points(prev, p) >= TOLERANCE)
        {
            out.push(*p);
        }
    }
    out
}

/// Segment for a range of two samples: control points a third of the chord
/// along each tangent.
fn two_point_curve(p0: Point2, p3: Point2, start: Vector2, end: Vector2) -> CubicBez {
    let dist = distance_between_points(&p0, &p3) / 3.0;
    CubicBez::new(p0, p0 + start * dist, p3 + end * dist, p3)
}

/// Whether the range is a straight run within tolerance: every sample lies
/// within `tolerance` of the chord, samples advance monotonically along it,
/// and any shared end tangent already follows the chord.
fn follows_chord(span: &Span, pts: &[Point2], tolerance: f64) -> bool {
    let first = pts[0];
    let last = pts[pts.len() - 1];
    let chord = last - first;
    let Ok(dir) = chord.checked_normalize() else {
        return false;
    };
    let aligned = (span.free_start || span.start_tangent.on_same_direction(&dir))
        && (span.free_end || span.end_tangent.on_same_direction(&-dir));
    if !aligned {
        return false;
    }

    let len_sq = chord.norm_squared();
    let mut prev_t = 0.0;
    for p in &pts[1..pts.len() - 1] {
        if distance_point_to_line(p, &first, &last) > tolerance {
            return false;
        }
        let t = (p - first).dot(&chord) / len_sq;
        if t < prev_t || t > 1.0 {
            return false;
        }
        prev_t = t;
    }
    true
}

/// Assigns each sample its fraction of the cumulative polyline length.
fn chord_length_parameterize(pts: &[Point2]) -> Vec<f64> {
    let mut params = Vec::with_capacity(pts.len());
    let mut acc = 0.0;
    params.push(0.0);
    for w in pts.windows(2) {
        acc += distance_between_points(&w[0], &w[1]);
        params.push(acc);
    }
    if acc > 0.0 {
        for u in &mut params {
            *u /= acc;
        }
    }
    params
}

/// Least-squares control points for fixed end tangents.
///
/// Solves the 2x2 normal equations for the distances `alpha_l`, `alpha_r`
/// of the inner control points along `start` and `end`. Falls back to a
/// third of the chord when the system is singular or yields an arm that is
/// non-positive or longer than [`MAX_HANDLE_RATIO`] chords.
fn generate_bezier(pts: &[Point2], params: &[f64], start: Vector2, end: Vector2) -> CubicBez {
    let first = pts[0];
    let last = pts[pts.len() - 1];
    let endpoints_only = CubicBez::new(first, first, last, last);

    let (mut c00, mut c01, mut c11) = (0.0, 0.0, 0.0);
    let (mut x0, mut x1) = (0.0, 0.0);
    for (p, &u) in pts.iter().zip(params) {
        let mu = 1.0 - u;
        let a0 = start * (3.0 * mu * mu * u);
        let a1 = end * (3.0 * mu * u * u);
        c00 += a0.dot(&a0);
        c01 += a0.dot(&a1);
        c11 += a1.dot(&a1);
        let residual = p - endpoints_only.eval(u);
        x0 += a0.dot(&residual);
        x1 += a1.dot(&residual);
    }

    let det = c00 * c11 - c01 * c01;
    let (alpha_l, alpha_r) = if det.abs() > DEGENERATE_DETERMINANT {
        ((x0 * c11 - x1 * c01) / det, (c00 * x1 - c01 * x0) / det)
    } else {
        (0.0, 0.0)
    };

    let seg_len = distance_between_points(&first, &last);
    let min_alpha = 1e-6 * seg_len;
    let max_alpha = MAX_HANDLE_RATIO * seg_len;
    let out_of_range = |alpha: f64| alpha < min_alpha || alpha > max_alpha;
    let (alpha_l, alpha_r) = if out_of_range(alpha_l) || out_of_range(alpha_r) {
        (seg_len / 3.0, seg_len / 3.0)
    } else {
        (alpha_l, alpha_r)
    };

    CubicBez::new(first, first + start * alpha_l, last + end * alpha_r, last)
}

/// One Newton-Raphson step per interior sample; the ends stay pinned at 0 and 1.
fn reparameterize(curve: &CubicBez, pts: &[Point2], params: &[f64]) -> Vec<f64> {
    let last = pts.len() - 1;
    pts.iter()
        .zip(params)
        .enumerate()
        .map(|(i, (p, &u))| match i {
            0 => 0.0,
            i if i == last => 1.0,
            _ => curve.refine_parameter(p, u),
        })
        .collect()
}

/// Largest sample-to-curve distance over the interior samples, and where it
/// occurs. Defaults to the middle sample when every distance is zero.
fn compute_max_error(pts: &[Point2], curve: &CubicBez, params: &[f64]) -> (f64, usize) {
    let mut worst = (0.0, pts.len() / 2);
    for i in 1..pts.len() - 1 {
        let d = distance_between_points(&pts[i], &curve.eval(params[i]));
        if d > worst.0 {
            worst = (d, i);
        }
    }
    worst
}
