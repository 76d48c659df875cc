use nalgebra::SVector;

use super::{EQUALITY_EPSILON, TOLERANCE};
use crate::error::{GeometryError, Result};

/// Normalized dot product above which two directions count as the same.
const SAME_DIRECTION_THRESHOLD: f64 = 1.0 - 1e-6;

/// Checked vector operations on top of nalgebra's fixed-size vectors.
///
/// Plain arithmetic (`+`, `-`, scalar `*`, `dot`, `cross`, `norm`,
/// `norm_squared`, `component_mul`, `add_scalar`, `inf`/`sup`, `map`) comes
/// from nalgebra. This trait adds the operations that can fail or that need
/// a tolerance: division reports [`GeometryError::DivideByZero`] instead of
/// producing infinities, and anything that needs a direction reports
/// [`GeometryError::DegenerateVector`] for zero-length input.
pub trait VectorExt: Sized {
    /// Componentwise division.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DivideByZero`] if any component of `other` is zero.
    fn checked_div(&self, other: &Self) -> Result<Self>;

    /// Division by a scalar.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DivideByZero`] if `scalar` is zero.
    fn checked_div_scalar(&self, scalar: f64) -> Result<Self>;

    /// Euclidean distance between the tips of two vectors.
    fn distance_to(&self, other: &Self) -> f64;

    /// Squared Euclidean distance between the tips of two vectors.
    fn distance_to_sq(&self, other: &Self) -> f64;

    /// Returns the unit vector pointing in the same direction.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateVector`] for a zero-length vector.
    fn checked_normalize(&self) -> Result<Self>;

    /// Returns a vector with the same direction and the given length.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateVector`] for a zero-length vector.
    fn with_length(&self, length: f64) -> Result<Self>;

    /// Projection of `self` onto `onto`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateVector`] if `onto` has zero length.
    fn project_on(&self, onto: &Self) -> Result<Self>;

    /// Rotates about the origin in the XY plane, counter-clockwise for
    /// positive `angle` (radians). Other components are left untouched.
    #[must_use]
    fn rotated_by(&self, angle: f64) -> Self;

    /// Componentwise equality within [`EQUALITY_EPSILON`].
    fn approx_eq(&self, other: &Self) -> bool;

    /// Whether both vectors point the same way. Zero vectors have no direction.
    fn on_same_direction(&self, other: &Self) -> bool;

    /// Whether the vectors point in opposite directions. Zero vectors have no direction.
    fn on_opposite_direction(&self, other: &Self) -> bool;
}

impl<const D: usize> VectorExt for SVector<f64, D> {
    fn checked_div(&self, other: &Self) -> Result<Self> {
        if other.iter().any(|c| *c == 0.0) {
            return Err(GeometryError::DivideByZero.into());
        }
        Ok(self.component_div(other))
    }

    fn checked_div_scalar(&self, scalar: f64) -> Result<Self> {
        if scalar == 0.0 {
            return Err(GeometryError::DivideByZero.into());
        }
        Ok(self / scalar)
    }

    fn distance_to(&self, other: &Self) -> f64 {
        (self - other).norm()
    }

    fn distance_to_sq(&self, other: &Self) -> f64 {
        (self - other).norm_squared()
    }

    fn checked_normalize(&self) -> Result<Self> {
        let len = self.norm();
        if len < TOLERANCE {
            return Err(GeometryError::DegenerateVector.into());
        }
        Ok(self / len)
    }

    fn with_length(&self, length: f64) -> Result<Self> {
        Ok(self.checked_normalize()? * length)
    }

    fn project_on(&self, onto: &Self) -> Result<Self> {
        let denom = onto.norm_squared();
        if denom < TOLERANCE * TOLERANCE {
            return Err(GeometryError::DegenerateVector.into());
        }
        Ok(onto * (self.dot(onto) / denom))
    }

    fn rotated_by(&self, angle: f64) -> Self {
        let mut out = *self;
        if D >= 2 {
            let (sin, cos) = angle.sin_cos();
            out[0] = self[0] * cos - self[1] * sin;
            out[1] = self[0] * sin + self[1] * cos;
        }
        out
    }

    fn approx_eq(&self, other: &Self) -> bool {
        self.iter()
            .zip(other.iter())
            .all(|(a, b)| (a - b).abs() < EQUALITY_EPSILON)
    }

    fn on_same_direction(&self, other: &Self) -> bool {
        match (self.checked_normalize(), other.checked_normalize()) {
            (Ok(a), Ok(b)) => a.dot(&b) > SAME_DIRECTION_THRESHOLD,
            _ => false,
        }
    }

    fn on_opposite_direction(&self, other: &Self) -> bool {
        match (self.checked_normalize(), other.checked_normalize()) {
            (Ok(a), Ok(b)) => a.dot(&b) < -SAME_DIRECTION_THRESHOLD,
            _ => false,
        }
    }
}
