use std::f64::consts::PI;

use super::{cross, Point2, Vector2};

/// Classification of the turn at a polygon vertex.
///
/// Polygons are stored clockwise, so a right turn is convex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Interior angle below π.
    Convex,
    /// Interior angle above π.
    Reflex,
    /// Interior angle of 0, π or 2π: the vertex is redundant.
    Degenerate,
}

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Change in shoelace area when an open chain is replaced by another with the
/// same first and last point.
///
/// `old` and `new` are the chains `first, .., last`; only their edges
/// contribute, the rest of the polygon cancels out.
#[must_use]
pub fn chain_area_delta(old: &[Point2], new: &[Point2]) -> f64 {
    chain_shoelace(new) - chain_shoelace(old)
}

fn chain_shoelace(chain: &[Point2]) -> f64 {
    chain
        .windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        * 0.5
}

/// Unsigned area of the triangle `a b c`.
#[must_use]
pub fn triangle_area(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    0.5 * cross(&(b - a), &(c - a)).abs()
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Clockwise angle in `[0, 2π)` that rotates `from` onto `to`.
#[must_use]
pub fn clockwise_angle(from: &Vector2, to: &Vector2) -> f64 {
    let ccw = cross(from, to).atan2(from.dot(to));
    let cw = -ccw;
    if cw < 0.0 {
        cw + 2.0 * PI
    } else {
        cw
    }
}

/// Interior angle at a vertex of a clockwise polygon, given the directions of
/// the incoming and outgoing edges.
#[must_use]
pub fn interior_angle(incoming: &Vector2, outgoing: &Vector2) -> f64 {
    clockwise_angle(outgoing, &-incoming)
}

/// Classifies the turn between two unit edge directions of a clockwise polygon.
#[must_use]
pub fn classify_turn(incoming: &Vector2, outgoing: &Vector2, eps: f64) -> Turn {
    let c = cross(incoming, outgoing);
    if c < -eps {
        Turn::Convex
    } else if c > eps {
        Turn::Reflex
    } else {
        Turn::Degenerate
    }
}
