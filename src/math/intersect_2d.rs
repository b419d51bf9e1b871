use super::{cross, Point2, Segment2, Vector2, TOLERANCE};

/// Result of intersecting two bounded segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection {
    /// The segments do not meet.
    None,
    /// The segments meet in a single point.
    Point(Point2),
    /// The segments are collinear and share a sub-segment of positive length.
    Overlap(Segment2),
}

impl SegmentIntersection {
    /// Returns `true` unless the segments are disjoint.
    #[must_use]
    pub fn is_some(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let denom = cross(d1, d2);
    if denom.abs() < TOLERANCE {
        return None;
    }
    let dp = p2 - p1;
    let t = cross(&dp, d2) / denom;
    let u = cross(&dp, d1) / denom;
    Some((t, u))
}

/// Bounded segment-segment intersection in 2D.
///
/// Collinear segments report their shared part as [`SegmentIntersection::Overlap`]
/// (or a point when they only touch end to end).
#[must_use]
pub fn segment_segment_intersect_2d(a: &Segment2, b: &Segment2, eps: f64) -> SegmentIntersection {
    let da = a.vector();
    let db = b.vector();
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < eps || len_b < eps {
        return degenerate_intersection(a, b, eps);
    }

    let denom = cross(&da, &db);
    let dp = b.start - a.start;

    if (denom / (len_a * len_b)).abs() < eps {
        // Parallel: only collinear segments can meet.
        if (cross(&dp, &da) / len_a).abs() > eps {
            return SegmentIntersection::None;
        }
        let dir = da / len_a;
        let t0 = dp.dot(&dir);
        let t1 = (b.end - a.start).dot(&dir);
        let lo = t0.min(t1).max(0.0);
        let hi = t0.max(t1).min(len_a);
        if hi < lo - eps {
            return SegmentIntersection::None;
        }
        if hi - lo <= eps {
            return SegmentIntersection::Point(a.start + dir * lo.clamp(0.0, len_a));
        }
        return SegmentIntersection::Overlap(Segment2::new(a.start + dir * lo, a.start + dir * hi));
    }

    let t = cross(&dp, &db) / denom;
    let u = cross(&dp, &da) / denom;

    // Tolerance in parameter space, scaled so endpoints are included.
    let ta = eps / len_a;
    let tb = eps / len_b;
    if t >= -ta && t <= 1.0 + ta && u >= -tb && u <= 1.0 + tb {
        let t_clamped = t.clamp(0.0, 1.0);
        SegmentIntersection::Point(a.start + da * t_clamped)
    } else {
        SegmentIntersection::None
    }
}

/// Handles segments where at least one has zero length.
fn degenerate_intersection(a: &Segment2, b: &Segment2, eps: f64) -> SegmentIntersection {
    let (point, other) = if a.length() < eps { (a.start, b) } else { (b.start, a) };
    if point_segment_distance(&point, other) <= eps {
        SegmentIntersection::Point(point)
    } else {
        SegmentIntersection::None
    }
}

/// Returns the minimum distance from `p` to the segment `s`.
#[must_use]
pub fn point_segment_distance(p: &Point2, s: &Segment2) -> f64 {
    let d = s.vector();
    let len_sq = d.norm_squared();
    if len_sq < 1e-20 {
        return (p - s.start).norm();
    }
    let t = ((p - s.start).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (s.start + d * t)).norm()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment2 {
        Segment2::new(Point2::new(ax, ay), Point2::new(bx, by))
    }

    #[test]
    fn line_line_perpendicular() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.5, -1.0);
        let d2 = Vector2::new(0.0, 1.0);
        let (t, u) = line_line_intersect_2d(&p1, &d1, &p2, &d2).unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn line_line_parallel_returns_none() {
        let p1 = Point2::new(0.0, 0.0);
        let d1 = Vector2::new(1.0, 0.0);
        let p2 = Point2::new(0.0, 1.0);
        assert!(line_line_intersect_2d(&p1, &d1, &p2, &d1).is_none());
    }

    #[test]
    fn segment_segment_crossing() {
        let r = segment_segment_intersect_2d(&seg(0.0, 0.0, 2.0, 2.0), &seg(0.0, 2.0, 2.0, 0.0), TOLERANCE);
        let SegmentIntersection::Point(p) = r else {
            panic!("expected a point, got {r:?}");
        };
        assert!((p.x - 1.0).abs() < TOLERANCE);
        assert!((p.y - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_no_crossing() {
        let r = segment_segment_intersect_2d(&seg(0.0, 0.0, 1.0, 0.0), &seg(0.0, 1.0, 1.0, 1.0), TOLERANCE);
        assert_eq!(r, SegmentIntersection::None);
    }

    #[test]
    fn segment_segment_touching_endpoints() {
        let r = segment_segment_intersect_2d(&seg(0.0, 0.0, 1.0, 0.0), &seg(1.0, 0.0, 1.0, 1.0), TOLERANCE);
        assert!(matches!(r, SegmentIntersection::Point(_)));
    }

    #[test]
    fn segment_segment_collinear_overlap() {
        let r = segment_segment_intersect_2d(&seg(0.0, 0.0, 4.0, 0.0), &seg(3.0, 0.0, 1.0, 0.0), TOLERANCE);
        let SegmentIntersection::Overlap(s) = r else {
            panic!("expected an overlap, got {r:?}");
        };
        assert!((s.start.x - 1.0).abs() < TOLERANCE);
        assert!((s.end.x - 3.0).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_collinear_disjoint() {
        let r = segment_segment_intersect_2d(&seg(0.0, 0.0, 1.0, 0.0), &seg(2.0, 0.0, 3.0, 0.0), TOLERANCE);
        assert_eq!(r, SegmentIntersection::None);
    }

    #[test]
    fn point_segment_distance_cases() {
        let s = seg(0.0, 0.0, 2.0, 0.0);
        assert!((point_segment_distance(&Point2::new(1.0, 1.0), &s) - 1.0).abs() < TOLERANCE);
        assert!((point_segment_distance(&Point2::new(-1.0, 0.0), &s) - 1.0).abs() < TOLERANCE);
        assert!(point_segment_distance(&Point2::new(1.0, 0.0), &s).abs() < TOLERANCE);
    }
}
