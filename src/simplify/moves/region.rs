use crate::math::polygon_2d::{left_normal, signed_area_2d};
use crate::math::{Point2, Segment2, Vector2};
use crate::topology::{Edge, Polygon};

/// A convex region swept by a candidate move.
///
/// Corners are stored counter-clockwise with consecutive duplicates removed.
/// A region that collapsed to a point or a line has no interior and blocks
/// nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SweptRegion {
    corners: Vec<Point2>,
}

impl SweptRegion {
    /// Builds a region from the corners of a convex polygon in either winding.
    #[must_use]
    pub fn new(corners: &[Point2], eps: f64) -> Self {
        let mut unique: Vec<Point2> = Vec::with_capacity(corners.len());
        for c in corners {
            if unique.last().is_none_or(|last| (last - c).norm() > eps) {
                unique.push(*c);
            }
        }
        while unique.len() > 1 && unique.first().zip(unique.last()).is_some_and(|(a, b)| (a - b).norm() <= eps) {
            unique.pop();
        }
        if signed_area_2d(&unique) < 0.0 {
            unique.reverse();
        }
        Self { corners: unique }
    }

    /// The corners, counter-clockwise.
    #[must_use]
    pub fn corners(&self) -> &[Point2] {
        &self.corners
    }

    /// Area of the region.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area_2d(&self.corners).abs()
    }

    /// Returns `true` if the region has no interior.
    #[must_use]
    pub fn is_flat(&self, eps: f64) -> bool {
        self.corners.len() < 3 || self.area() <= eps
    }

    /// Axis-aligned bounds as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> (Point2, Point2) {
        bounds_of(&self.corners)
    }

    /// Returns `true` if part of `segment` lies in the interior of the region.
    ///
    /// Touching a corner or running along a side does not count.
    #[must_use]
    pub fn crosses_interior(&self, segment: &Segment2, eps: f64) -> bool {
        if self.is_flat(eps) {
            return false;
        }
        let Some((t0, t1)) = self.clip(segment, eps) else {
            return false;
        };
        let d = segment.vector();
        if (t1 - t0) * d.norm() <= eps {
            return false;
        }
        let mid = segment.start + d * (0.5 * (t0 + t1));
        self.sides().all(|(origin, normal)| normal.dot(&(mid - origin)) > eps)
    }

    /// Returns `true` if the interiors of the two regions overlap.
    #[must_use]
    pub fn overlaps(&self, other: &SweptRegion, eps: f64) -> bool {
        if self.is_flat(eps) || other.is_flat(eps) {
            return false;
        }
        let (amin, amax) = self.bounds();
        let (bmin, bmax) = other.bounds();
        if amax.x < bmin.x - eps || bmax.x < amin.x - eps || amax.y < bmin.y - eps || bmax.y < amin.y - eps {
            return false;
        }
        other.boundary().any(|s| self.crosses_interior(&s, eps))
            || self.boundary().any(|s| other.crosses_interior(&s, eps))
            || self.contains_strictly(&other.centroid(), eps)
            || other.contains_strictly(&self.centroid(), eps)
    }

    fn centroid(&self) -> Point2 {
        #[allow(clippy::cast_precision_loss)]
        let k = self.corners.len().max(1) as f64;
        let sum = self.corners.iter().fold(Vector2::zeros(), |acc, c| acc + c.coords);
        Point2::from(sum / k)
    }

    fn contains_strictly(&self, p: &Point2, eps: f64) -> bool {
        self.sides().all(|(origin, normal)| normal.dot(&(p - origin)) > eps)
    }

    fn boundary(&self) -> impl Iterator<Item = Segment2> + '_ {
        let n = self.corners.len();
        (0..n).map(move |i| Segment2::new(self.corners[i], self.corners[(i + 1) % n]))
    }

    /// Sides as `(point on side, unit inward normal)`.
    fn sides(&self) -> impl Iterator<Item = (Point2, Vector2)> + '_ {
        self.boundary().filter_map(|s| s.direction().map(|d| (s.start, left_normal(&d))))
    }

    /// Cyrus–Beck clip of a segment against the closed region, widened by `eps`.
    fn clip(&self, segment: &Segment2, eps: f64) -> Option<(f64, f64)> {
        let d = segment.vector();
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for (origin, normal) in self.sides() {
            let num = normal.dot(&(segment.start - origin)) + eps;
            let den = normal.dot(&d);
            if den.abs() < 1e-15 {
                if num < 0.0 {
                    return None;
                }
                continue;
            }
            let t = -num / den;
            if den > 0.0 {
                t0 = t0.max(t);
            } else {
                t1 = t1.min(t);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((t0, t1))
    }
}

/// Axis-aligned bounds of a point set as `(min, max)`.
#[must_use]
pub fn bounds_of(points: &[Point2]) -> (Point2, Point2) {
    let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Returns every polygon edge, other than `excluded`, that crosses the
/// interior of one of `regions`.
#[must_use]
pub fn find_blocking(regions: &[SweptRegion], polygon: &Polygon, excluded: &[Edge], eps: f64) -> Vec<Edge> {
    let live: Vec<&SweptRegion> = regions.iter().filter(|r| !r.is_flat(eps)).collect();
    if live.is_empty() {
        return Vec::new();
    }
    polygon
        .edges()
        .enumerate()
        .filter(|(_, e)| !excluded.iter().any(|x| x.same_undirected(e)))
        .filter(|(i, _)| {
            let segment = polygon.segment_at(*i);
            live.iter().any(|r| r.crosses_interior(&segment, eps))
        })
        .map(|(_, e)| e)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment2 {
        Segment2::new(p(ax, ay), p(bx, by))
    }

    fn unit_box() -> SweptRegion {
        // Clockwise on purpose; the region normalises the winding.
        SweptRegion::new(&[p(0.0, 0.0), p(0.0, 4.0), p(4.0, 4.0), p(4.0, 0.0)], TOLERANCE)
    }

    #[test]
    fn crossing_segment_blocks() {
        assert!(unit_box().crosses_interior(&seg(-1.0, 2.0, 5.0, 2.0), TOLERANCE));
        assert!(unit_box().crosses_interior(&seg(1.0, 1.0, 2.0, 2.0), TOLERANCE));
    }

    #[test]
    fn boundary_contact_does_not_block() {
        let r = unit_box();
        assert!(!r.crosses_interior(&seg(-2.0, 4.0, 2.0, 4.0), TOLERANCE));
        assert!(!r.crosses_interior(&seg(4.0, 4.0, 6.0, 6.0), TOLERANCE));
        assert!(!r.crosses_interior(&seg(0.0, 0.0, 0.0, -3.0), TOLERANCE));
        assert!(!r.crosses_interior(&seg(5.0, 0.0, 5.0, 4.0), TOLERANCE));
    }

    #[test]
    fn flat_region_blocks_nothing() {
        let r = SweptRegion::new(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 0.0), p(0.0, 0.0)], TOLERANCE);
        assert!(r.is_flat(TOLERANCE));
        assert!(!r.crosses_interior(&seg(2.0, -1.0, 2.0, 1.0), TOLERANCE));
    }

    #[test]
    fn triangle_region() {
        let r = SweptRegion::new(&[p(0.0, 0.0), p(4.0, 0.0), p(2.0, 2.0)], TOLERANCE);
        assert!((r.area() - 4.0).abs() < TOLERANCE);
        assert!(r.crosses_interior(&seg(2.0, -1.0, 2.0, 1.0), TOLERANCE));
        assert!(!r.crosses_interior(&seg(3.5, 1.5, 5.0, 1.5), TOLERANCE));
    }

    #[test]
    fn region_overlap() {
        let a = unit_box();
        let b = SweptRegion::new(&[p(2.0, 2.0), p(6.0, 2.0), p(6.0, 6.0), p(2.0, 6.0)], TOLERANCE);
        let c = SweptRegion::new(&[p(4.0, 0.0), p(8.0, 0.0), p(8.0, 4.0), p(4.0, 4.0)], TOLERANCE);
        let inner = SweptRegion::new(&[p(1.0, 1.0), p(2.0, 1.0), p(2.0, 2.0), p(1.0, 2.0)], TOLERANCE);
        assert!(a.overlaps(&b, TOLERANCE));
        assert!(!a.overlaps(&c, TOLERANCE));
        assert!(a.overlaps(&inner, TOLERANCE));
        assert!(inner.overlaps(&a, TOLERANCE));
    }

    #[test]
    fn blocking_skips_excluded_edges() {
        let poly = Polygon::new(&[p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)]).unwrap();
        let region = SweptRegion::new(&[p(-1.0, 4.0), p(11.0, 4.0), p(11.0, 6.0), p(-1.0, 6.0)], TOLERANCE);
        let all = find_blocking(std::slice::from_ref(&region), &poly, &[], TOLERANCE);
        assert_eq!(all.len(), 2);
        let some = find_blocking(&[region], &poly, &[poly.edge(0)], TOLERANCE);
        assert_eq!(some, vec![poly.edge(2)]);
    }
}
