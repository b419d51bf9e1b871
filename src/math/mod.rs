pub mod intersect_2d;
pub mod line_2d;
pub mod polygon_2d;
pub mod solve;

pub use line_2d::{Line2, Segment2};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Default geometric tolerance for floating-point comparisons.
///
/// The engine threads one tolerance value through every predicate; this is
/// the value used when none is configured.
pub const TOLERANCE: f64 = 1e-9;

/// 2D cross product (z component of the 3D cross product).
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}
