use super::intersect_2d::line_line_intersect_2d;
use super::{Point2, Vector2, TOLERANCE};

/// A directed line segment, stored by value.
///
/// Segments are snapshots: they never follow later mutation of the polygon
/// vertices they were read from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2 {
    pub start: Point2,
    pub end: Point2,
}

impl Segment2 {
    /// Creates a new segment.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Returns the vector from `start` to `end`.
    #[must_use]
    pub fn vector(&self) -> Vector2 {
        self.end - self.start
    }

    /// Returns the length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Returns the unit direction, or `None` for a zero-length segment.
    #[must_use]
    pub fn direction(&self) -> Option<Vector2> {
        let v = self.vector();
        let len = v.norm();
        if len < TOLERANCE {
            return None;
        }
        Some(v / len)
    }
}

/// An infinite line `P(t) = origin + t * direction` with unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line2 {
    pub origin: Point2,
    pub direction: Vector2,
}

impl Line2 {
    /// Creates a line; `direction` is expected to be a unit vector.
    #[must_use]
    pub fn new(origin: Point2, direction: Vector2) -> Self {
        Self { origin, direction }
    }

    /// Evaluates the line at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.origin + self.direction * t
    }

    /// Returns this line shifted by `offset`.
    #[must_use]
    pub fn translated(&self, offset: Vector2) -> Self {
        Self::new(self.origin + offset, self.direction)
    }

    /// Intersection point with another line, or `None` if (nearly) parallel.
    #[must_use]
    pub fn intersect(&self, other: &Line2) -> Option<Point2> {
        line_line_intersect_2d(&self.origin, &self.direction, &other.origin, &other.direction)
            .map(|(t, _)| self.point_at(t))
    }
}
