mod fit_curve;
mod tangent;

pub use fit_curve::{FitCurve, FitParams};
