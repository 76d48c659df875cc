pub mod affine;
pub mod point_2d;
pub mod vector;

pub use affine::Affine2;
pub use vector::VectorExt;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 homogeneous 2D transformation matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// Global geometric tolerance for degeneracy checks.
pub const TOLERANCE: f64 = 1e-10;

/// Per-component tolerance for approximate equality of vectors and matrices.
pub const EQUALITY_EPSILON: f64 = 1e-9;
