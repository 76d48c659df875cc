pub mod bezier;
pub mod path;

pub use bezier::CubicBez;
pub use path::{FitWarning, FittedCurve, PathSegment};
