mod frechet;
mod procrustes;
mod resample;
mod shape_similarity;

pub use frechet::frechet_dist;
pub use procrustes::{
    find_procrustes_rotation_angle, procrustes_normalize_curve, procrustes_normalize_rotation,
    rotate_curve,
};
pub use resample::{curve_length, extend_point_on_line, rebalance_curve, subdivide_curve};
pub use shape_similarity::{shape_similarity, ShapeMatch, ShapeSimilarity, SimilarityParams};
