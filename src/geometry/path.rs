use super::bezier::CubicBez;
use crate::math::Point2;

/// One drawing command of a fitted stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Starts a new subpath at the point.
    MoveTo(Point2),
    /// Straight line from the current point.
    LineTo(Point2),
    /// Cubic Bezier from the current point to `end`.
    CurveTo {
        end: Point2,
        control1: Point2,
        control2: Point2,
    },
    /// Closes the current subpath back to its start.
    Close,
}

impl PathSegment {
    /// The point the pen rests on after this command, if it names one.
    #[must_use]
    pub fn end_point(&self) -> Option<Point2> {
        match self {
            Self::MoveTo(p) | Self::LineTo(p) | Self::CurveTo { end: p, .. } => Some(*p),
            Self::Close => None,
        }
    }
}

/// A non-fatal quality note attached to a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FitWarning {
    /// The range of input samples `first..=last` could not be brought within
    /// `tolerance` before the split depth ran out; the best segment found,
    /// with deviation `max_error`, was kept.
    ToleranceUnsatisfiable {
        first: usize,
        last: usize,
        max_error: f64,
        tolerance: f64,
    },
}

/// An ordered, immutable sequence of path commands describing one stroke.
///
/// Always starts with a [`PathSegment::MoveTo`]; each following command
/// starts where the previous one ended.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    elements: Vec<PathSegment>,
    warnings: Vec<FitWarning>,
}

impl FittedCurve {
    /// Assembles a curve from consecutive Bezier segments starting at `start`.
    pub(crate) fn from_beziers(start: Point2, curves: &[CubicBez], warnings: Vec<FitWarning>) -> Self {
        let mut elements = Vec::with_capacity(curves.len() + 1);
        elements.push(PathSegment::MoveTo(start));
        elements.extend(curves.iter().map(|c| PathSegment::CurveTo {
            end: c.p3,
            control1: c.p1,
            control2: c.p2,
        }));
        Self { elements, warnings }
    }

    /// The path commands, in drawing order.
    #[must_use]
    pub fn elements(&self) -> &[PathSegment] {
        &self.elements
    }

    /// Number of `CurveTo` commands.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, PathSegment::CurveTo { .. }))
            .count()
    }

    /// Quality warnings raised while fitting.
    #[must_use]
    pub fn warnings(&self) -> &[FitWarning] {
        &self.warnings
    }

    /// Whether every segment met the requested tolerance.
    #[must_use]
    pub fn is_within_tolerance(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Drawable segments as cubics. Lines and closing lines become straight cubics.
    pub fn segments(&self) -> impl Iterator<Item = CubicBez> + '_ {
        let mut current = None;
        let mut subpath_start = None;
        self.elements.iter().filter_map(move |el| match *el {
            PathSegment::MoveTo(p) => {
                current = Some(p);
                subpath_start = Some(p);
                None
            }
            PathSegment::LineTo(p) => {
                let from = current.replace(p)?;
                Some(CubicBez::line(from, p))
            }
            PathSegment::CurveTo {
                end,
                control1,
                control2,
            } => {
                let from = current.replace(end)?;
                Some(CubicBez::new(from, control1, control2, end))
            }
            PathSegment::Close => {
                let start = subpath_start?;
                let from = current.replace(start)?;
                (from != start).then(|| CubicBez::line(from, start))
            }
        })
    }

    /// On-curve points: the start point and every command's end point.
    #[must_use]
    pub fn anchor_points(&self) -> Vec<Point2> {
        self.elements.iter().filter_map(PathSegment::end_point).collect()
    }

    /// Off-curve control points, two per `CurveTo`.
    #[must_use]
    pub fn control_points(&self) -> Vec<Point2> {
        self.elements
            .iter()
            .filter_map(|el| match el {
                PathSegment::CurveTo {
                    control1, control2, ..
                } => Some([*control1, *control2]),
                _ => None,
            })
            .flatten()
            .collect()
    }
}
