use thiserror::Error;

/// Top-level error type for stroke fitting and shape matching.
#[derive(Debug, Error, PartialEq)]
pub enum SketchError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors raised by vector and matrix arithmetic.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("degenerate vector: zero length where a direction is required")]
    DegenerateVector,

    #[error("division by zero")]
    DivideByZero,

    #[error("singular matrix (determinant = {determinant})")]
    SingularMatrix { determinant: f64 },
}

/// Errors raised by fitting and matching operations.
#[derive(Debug, Error, PartialEq)]
pub enum OperationError {
    #[error("insufficient points: {required} required, {found} found")]
    InsufficientPoints { required: usize, found: usize },

    #[error("empty point sequence")]
    EmptySequence,

    #[error("point sequences differ in length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`SketchError`].
pub type Result<T> = std::result::Result<T, SketchError>;
