use crate::math::{Point2, Vector2};

/// A planar cubic Bezier segment.
///
/// The parametric form is
/// `B(t) = (1-t)^3 p0 + 3(1-t)^2 t p1 + 3(1-t) t^2 p2 + t^3 p3`, `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBez {
    /// Start anchor.
    pub p0: Point2,
    /// Control point leaving `p0`.
    pub p1: Point2,
    /// Control point entering `p3`.
    pub p2: Point2,
    /// End anchor.
    pub p3: Point2,
}

impl CubicBez {
    /// Creates a segment from its four control points.
    #[must_use]
    pub fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// A straight segment with control points at the chord thirds, so that
    /// `B(t)` moves along the chord at constant speed.
    #[must_use]
    pub fn line(p0: Point2, p3: Point2) -> Self {
        let d = (p3 - p0) / 3.0;
        Self::new(p0, p0 + d, p3 - d, p3)
    }

    /// Evaluates the curve at parameter `t`.
    #[must_use]
    pub fn eval(&self, t: f64) -> Point2 {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point2::from(self.p0.coords * a + self.p1.coords * b + self.p2.coords * c + self.p3.coords * d)
    }

    /// First derivative `B'(t)`.
    #[must_use]
    pub fn deriv(&self, t: f64) -> Vector2 {
        let mt = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * mt * mt)
            + (self.p2 - self.p1) * (6.0 * mt * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Second derivative `B''(t)`.
    #[must_use]
    pub fn deriv2(&self, t: f64) -> Vector2 {
        let a = self.p2.coords - self.p1.coords * 2.0 + self.p0.coords;
        let b = self.p3.coords - self.p2.coords * 2.0 + self.p1.coords;
        a * (6.0 * (1.0 - t)) + b * (6.0 * t)
    }

    /// One Newton-Raphson step moving `t` toward the parameter of the curve
    /// point closest to `point`, clamped to `[0, 1]`.
    ///
    /// Minimizes `|B(t) - point|^2`; the step is skipped when the second
    /// derivative of that objective vanishes.
    #[must_use]
    pub fn refine_parameter(&self, point: &Point2, t: f64) -> f64 {
        let d = self.eval(t) - point;
        let d1 = self.deriv(t);
        let d2 = self.deriv2(t);
        let numerator = d.dot(&d1);
        let denominator = d1.norm_squared() + d.dot(&d2);
        if denominator.abs() < f64::EPSILON {
            return t;
        }
        (t - numerator / denominator).clamp(0.0, 1.0)
    }
}
