use super::{Matrix3, Point2, Vector2, EQUALITY_EPSILON, TOLERANCE};
use crate::error::{GeometryError, OperationError, Result};

/// A 3x3 homogeneous transform of the plane.
///
/// Coefficients are addressed in row-major order, index `0..9`, so index 2 and
/// 5 hold the translation. The bottom row is `(0, 0, 1)` for every matrix
/// built by this type's constructors; coefficient edits through
/// [`Affine2::add_at`] / [`Affine2::multiply_at`] can break that, which is
/// left to the caller.
///
/// `translate`, `scale` and `rotate` compose the new transform *after* the
/// existing one (they premultiply), so
/// `Affine2::identity().scale(2.0, 2.0).translate(1.0, 0.0)` scales first,
/// then translates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    matrix: Matrix3,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Builds a transform from nine row-major coefficients.
    #[must_use]
    pub fn from_row_major(elements: [f64; 9]) -> Self {
        Self {
            matrix: Matrix3::from_row_slice(&elements),
        }
    }

    /// Builds a transform from an existing nalgebra matrix.
    #[must_use]
    pub fn from_matrix(matrix: Matrix3) -> Self {
        Self { matrix }
    }

    /// Builds a transform that maps texture-style coordinates: scale by
    /// `(sx, sy)` and rotate by `rotation` about the center `(cx, cy)`, then
    /// translate by `(tx, ty)`.
    #[must_use]
    #[allow(clippy::too_many_arguments, clippy::many_single_char_names)]
    pub fn set_uv_transform(
        tx: f64,
        ty: f64,
        sx: f64,
        sy: f64,
        rotation: f64,
        cx: f64,
        cy: f64,
    ) -> Self {
        let to_origin = Matrix3::new_translation(&Vector2::new(-cx, -cy));
        let scale = Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy));
        let rotate = Matrix3::new_rotation(rotation);
        let back = Matrix3::new_translation(&Vector2::new(cx + tx, cy + ty));
        Self {
            matrix: back * rotate * scale * to_origin,
        }
    }

    /// The underlying nalgebra matrix.
    #[must_use]
    pub fn matrix(&self) -> &Matrix3 {
        &self.matrix
    }

    /// The nine coefficients in row-major order.
    #[must_use]
    pub fn elements(&self) -> [f64; 9] {
        let m = &self.matrix;
        [
            m[(0, 0)], m[(0, 1)], m[(0, 2)],
            m[(1, 0)], m[(1, 1)], m[(1, 2)],
            m[(2, 0)], m[(2, 1)], m[(2, 2)],
        ]
    }

    /// Coefficient at row-major `index`, or `None` past the end.
    #[must_use]
    pub fn element(&self, index: usize) -> Option<f64> {
        (index < 9).then(|| self.matrix[(index / 3, index % 3)])
    }

    /// `self * other`: applies `other` first, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// `other * self`: applies `self` first, then `other`.
    #[must_use]
    pub fn premultiply(&self, other: &Self) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    /// Scales every coefficient.
    #[must_use]
    pub fn multiply_scalar(&self, s: f64) -> Self {
        Self {
            matrix: self.matrix * s,
        }
    }

    /// Determinant of the full 3x3 matrix.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Inverse transform.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SingularMatrix`] if the determinant is within
    /// tolerance of zero.
    pub fn invert(&self) -> Result<Self> {
        let determinant = self.determinant();
        if determinant.abs() < TOLERANCE {
            return Err(GeometryError::SingularMatrix { determinant }.into());
        }
        let matrix = self
            .matrix
            .try_inverse()
            .ok_or(GeometryError::SingularMatrix { determinant })?;
        Ok(Self { matrix })
    }

    /// Transposed matrix.
    #[must_use]
    pub fn transpose(&self) -> Self {
        Self {
            matrix: self.matrix.transpose(),
        }
    }

    /// Follows this transform with a translation.
    #[must_use]
    pub fn translate(&self, tx: f64, ty: f64) -> Self {
        self.premultiply(&Self::from_matrix(Matrix3::new_translation(&Vector2::new(
            tx, ty,
        ))))
    }

    /// Follows this transform with a scale about the origin.
    #[must_use]
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        self.premultiply(&Self::from_matrix(Matrix3::new_nonuniform_scaling(
            &Vector2::new(sx, sy),
        )))
    }

    /// Follows this transform with a counter-clockwise rotation about the origin.
    #[must_use]
    pub fn rotate(&self, theta: f64) -> Self {
        self.premultiply(&Self::from_matrix(Matrix3::new_rotation(theta)))
    }

    /// Adds `value` to the coefficient at row-major `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `index >= 9`.
    pub fn add_at(&mut self, index: usize, value: f64) -> Result<()> {
        *self.coefficient_mut(index)? += value;
        Ok(())
    }

    /// Multiplies the coefficient at row-major `index` by `value`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if `index >= 9`.
    pub fn multiply_at(&mut self, index: usize, value: f64) -> Result<()> {
        *self.coefficient_mut(index)? *= value;
        Ok(())
    }

    /// Whether all nine coefficients agree within [`EQUALITY_EPSILON`].
    #[must_use]
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() < EQUALITY_EPSILON)
    }

    /// Applies the transform to a point (the homogeneous row is ignored).
    #[must_use]
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let m = &self.matrix;
        Point2::new(
            m[(0, 0)] * point.x + m[(0, 1)] * point.y + m[(0, 2)],
            m[(1, 0)] * point.x + m[(1, 1)] * point.y + m[(1, 2)],
        )
    }

    fn coefficient_mut(&mut self, index: usize) -> Result<&mut f64> {
        if index >= 9 {
            return Err(OperationError::InvalidInput(format!(
                "matrix coefficient index {index} out of range 0..9"
            ))
            .into());
        }
        Ok(&mut self.matrix[(index / 3, index % 3)])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;
    use crate::error::SketchError;

    #[test]
    fn identity_elements() {
        let m = Affine2::identity();
        assert_eq!(
            m.elements(),
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(m, Affine2::default());
        assert_relative_eq!(m.determinant(), 1.0);
    }

    #[test]
    fn row_major_layout() {
        let m = Affine2::from_row_major([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(m.element(2), Some(3.0));
        assert_eq!(m.element(3), Some(4.0));
        assert_eq!(m.element(9), None);
        assert_eq!(m.transpose().element(2), Some(7.0));
    }

    #[test]
    fn translate_then_scale_order() {
        let m = Affine2::identity().translate(1.0, 0.0).scale(2.0, 2.0);
        // translate first: (1,1) -> (2,1), then scale -> (4,2)
        let q = m.transform_point(&Point2::new(1.0, 1.0));
        assert_relative_eq!(q, Point2::new(4.0, 2.0));
    }

    #[test]
    fn rotate_is_counter_clockwise() {
        let m = Affine2::identity().rotate(FRAC_PI_2);
        let q = m.transform_point(&Point2::new(1.0, 0.0));
        assert_relative_eq!(q, Point2::new(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn multiply_and_premultiply() {
        let a = Affine2::identity().translate(3.0, 0.0);
        let b = Affine2::identity().scale(2.0, 2.0);
        let p = Point2::new(1.0, 1.0);
        // a * b: scale then translate.
        assert_relative_eq!(a.multiply(&b).transform_point(&p), Point2::new(5.0, 2.0));
        // b premultiplied onto a: translate then scale.
        assert_relative_eq!(a.premultiply(&b).transform_point(&p), Point2::new(8.0, 2.0));
    }

    #[test]
    fn invert_round_trips_points() {
        let m = Affine2::identity().scale(2.0, 0.5).rotate(0.3).translate(-4.0, 7.0);
        let inv = m.invert().unwrap();
        assert!(m.multiply(&inv).approx_eq(&Affine2::identity()));

        let p = Point2::new(1.25, -3.5);
        assert_relative_eq!(
            inv.transform_point(&m.transform_point(&p)),
            p,
            epsilon = 1e-12
        );
    }

    #[test]
    fn singular_matrix_cannot_invert() {
        let m = Affine2::identity().scale(0.0, 1.0);
        let err = m.invert().unwrap_err();
        assert!(matches!(
            err,
            SketchError::Geometry(GeometryError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn uv_transform_keeps_center_fixed() {
        let m = Affine2::set_uv_transform(0.0, 0.0, 3.0, 2.0, 0.7, 5.0, 5.0);
        assert_relative_eq!(
            m.transform_point(&Point2::new(5.0, 5.0)),
            Point2::new(5.0, 5.0),
            epsilon = 1e-12
        );

        let shifted = Affine2::set_uv_transform(1.0, -2.0, 3.0, 2.0, 0.7, 5.0, 5.0);
        assert_relative_eq!(
            shifted.transform_point(&Point2::new(5.0, 5.0)),
            Point2::new(6.0, 3.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn uv_transform_matches_composition() {
        let (tx, ty, sx, sy, rot, cx, cy) = (1.0, 2.0, 1.5, 0.5, 0.4, -1.0, 3.0);
        let composed = Affine2::identity()
            .translate(-cx, -cy)
            .scale(sx, sy)
            .rotate(rot)
            .translate(cx + tx, cy + ty);
        assert!(Affine2::set_uv_transform(tx, ty, sx, sy, rot, cx, cy).approx_eq(&composed));
    }

    #[test]
    fn coefficient_edits() {
        let mut m = Affine2::identity();
        m.add_at(2, 4.0).unwrap();
        m.multiply_at(0, 3.0).unwrap();
        assert_eq!(m.element(2), Some(4.0));
        assert_eq!(m.element(0), Some(3.0));
        assert!(m.add_at(9, 1.0).is_err());
        assert!(m.multiply_at(12, 1.0).is_err());
    }

    #[test]
    fn multiply_scalar_scales_determinant() {
        let m = Affine2::identity().multiply_scalar(2.0);
        assert_relative_eq!(m.determinant(), 8.0);
    }

    #[test]
    fn approx_eq_tolerance() {
        let a = Affine2::identity();
        let mut b = a;
        b.add_at(4, 1e-12).unwrap();
        assert!(a.approx_eq(&b));
        b.add_at(4, 1e-3).unwrap();
        assert!(!a.approx_eq(&b));
    }
}
