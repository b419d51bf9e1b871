use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::{left_normal, Turn};
use crate::math::{Line2, Point2, Segment2, Vector2};
use crate::simplify::configuration::{Configuration, Window};
use crate::topology::{Edge, Polygon, VertexId};

use super::region::{find_blocking, SweptRegion};

/// Direction of a normal move relative to the polygon interior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalSign {
    /// Outward: the polygon grows.
    Positive,
    /// Inward: the polygon shrinks.
    Negative,
}

impl NormalSign {
    /// The complementary sign.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// `+1` for area added, `-1` for area removed.
    #[must_use]
    pub fn area_sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }
}

/// Rigid translation of a configuration's inner edge along its normal.
///
/// The edge slides until one of its endpoints reaches the far vertex of a
/// neighbouring edge, or until the two neighbour lines meet, whichever comes
/// first. The moved endpoints stay on the supporting lines of `previous` and
/// `next`, so the neighbours stretch or shrink with it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalMove {
    sign: NormalSign,
    window: Window,
    inner_direction: Vector2,
    direction: Vector2,
    distance: f64,
    contraction: Segment2,
    area: f64,
    previous_line: Line2,
    next_line: Line2,
    merges: usize,
    blocking: Vec<Edge>,
}

impl NormalMove {
    /// Computes the maximal move of the given sign, or `None` if the
    /// configuration admits no contraction in that direction.
    #[must_use]
    pub fn compute(
        configuration: &Configuration,
        polygon: &Polygon,
        sign: NormalSign,
        eps: f64,
    ) -> Option<Self> {
        let start_turn = configuration.start_turn(polygon, eps);
        let end_turn = configuration.end_turn(polygon, eps);
        if start_turn == Turn::Degenerate || end_turn == Turn::Degenerate {
            return None;
        }
        let applicable = match sign {
            NormalSign::Positive => start_turn == Turn::Reflex || end_turn == Turn::Reflex,
            NormalSign::Negative => start_turn == Turn::Convex || end_turn == Turn::Convex,
        };
        if !applicable {
            return None;
        }

        let window = configuration.window(polygon).ok()?;
        let [far_prev, s, e, far_next] = window.points;
        let inner_dir = window.inner().direction()?;
        let outward = left_normal(&inner_dir);
        let direction = match sign {
            NormalSign::Positive => outward,
            NormalSign::Negative => -outward,
        };
        let previous_line = Line2::new(s, window.previous().direction()?);
        let next_line = Line2::new(e, window.next().direction()?);

        // Heights of the far vertices above the inner edge, on the move side.
        let h_prev = (far_prev - s).dot(&direction);
        let h_next = (far_next - e).dot(&direction);
        let bound = |h: f64| if h > eps { h } else { f64::INFINITY };
        let reach = bound(h_prev).min(bound(h_next));
        if !reach.is_finite() {
            return None;
        }

        let crossing = previous_line
            .intersect(&next_line)
            .map(|x| (x, (x - s).dot(&direction)))
            .filter(|(_, hx)| *hx > eps && *hx < reach - eps);

        let (distance, contraction, merges) = if let Some((x, hx)) = crossing {
            (hx, Segment2::new(x, x), 1)
        } else {
            let translated = Line2::new(s, inner_dir).translated(direction * reach);
            let snap_prev = (h_prev - reach).abs() <= eps;
            let snap_next = (h_next - reach).abs() <= eps;
            let start = if snap_prev {
                far_prev
            } else {
                translated.intersect(&previous_line)?
            };
            let end = if snap_next {
                far_next
            } else {
                translated.intersect(&next_line)?
            };
            (reach, Segment2::new(start, end), usize::from(snap_prev) + usize::from(snap_next))
        };

        if contraction.vector().dot(&inner_dir) < -eps {
            return None;
        }

        let area = 0.5 * distance * (window.inner().length() + contraction.length());
        if area <= eps {
            return None;
        }

        let mut mv = Self {
            sign,
            window,
            inner_direction: inner_dir,
            direction,
            distance,
            contraction,
            area,
            previous_line,
            next_line,
            merges,
            blocking: Vec::new(),
        };
        mv.refresh_blocking(polygon, eps);
        Some(mv)
    }

    /// Recomputes the blocking set against the current polygon.
    pub fn refresh_blocking(&mut self, polygon: &Polygon, eps: f64) {
        self.blocking = find_blocking(&[self.region(eps)], polygon, &self.window.edges(), eps);
    }

    /// Moves the snapshot to a new ring position after vertices before it
    /// were removed.
    pub(crate) fn reindex(&mut self, index: usize) {
        self.window.index = index;
    }

    /// Region swept by the full move.
    #[must_use]
    pub fn region(&self, eps: f64) -> SweptRegion {
        let [_, s, e, _] = self.window.points;
        SweptRegion::new(&[s, e, self.contraction.end, self.contraction.start], eps)
    }

    #[must_use]
    pub fn sign(&self) -> NormalSign {
        self.sign
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Ring position of the configuration this move belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        self.window.index
    }

    /// Unit move direction.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        self.direction
    }

    /// Maximal feasible translation distance.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Position of the inner edge after the full move.
    #[must_use]
    pub fn contraction(&self) -> Segment2 {
        self.contraction
    }

    /// Area added (positive) or removed (negative) by the full move, unsigned.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Length of the inner edge before the move.
    #[must_use]
    pub fn inner_length(&self) -> f64 {
        self.window.inner().length()
    }

    /// Rate at which the inner edge grows per unit distance.
    #[must_use]
    pub fn growth(&self) -> f64 {
        (self.contraction.length() - self.inner_length()) / self.distance
    }

    /// Closed-form area swept after distance `d` (trapezoid).
    #[must_use]
    pub fn area_function(&self, d: f64) -> f64 {
        self.inner_length() * d + 0.5 * self.growth() * d * d
    }

    /// Number of window vertices the full move merges into a neighbour.
    #[must_use]
    pub fn merges(&self) -> usize {
        self.merges
    }

    /// Polygon edges crossing the swept region.
    #[must_use]
    pub fn blocking(&self) -> &[Edge] {
        &self.blocking
    }

    /// Valid when no polygon edge crosses the swept region.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.blocking.is_empty()
    }

    /// Position of the inner edge after translating it by `d`.
    ///
    /// The endpoints are re-anchored on the neighbour lines at `d`, not
    /// interpolated.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `d` is outside
    /// `[0, distance]`.
    pub fn contraction_at(&self, d: f64, eps: f64) -> Result<Segment2> {
        if !(-eps..=self.distance + eps).contains(&d) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "distance",
                value: d,
                min: 0.0,
                max: self.distance,
            }
            .into());
        }
        if d >= self.distance - eps {
            return Ok(self.contraction);
        }
        let [_, s, _, _] = self.window.points;
        let translated = Line2::new(s, self.inner_direction).translated(self.direction * d.max(0.0));
        let start = translated.intersect(&self.previous_line);
        let end = translated.intersect(&self.next_line);
        match (start, end) {
            (Some(a), Some(b)) => Ok(Segment2::new(a, b)),
            _ => Err(GeometryError::Degenerate("neighbour line parallel to inner edge".to_owned()).into()),
        }
    }

    /// Area swept after translating by `d`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `d` is outside
    /// `[0, distance]`.
    pub fn area_at_distance(&self, d: f64, eps: f64) -> Result<f64> {
        let moved = self.contraction_at(d, eps)?;
        Ok(0.5 * d.max(0.0) * (self.inner_length() + moved.length()))
    }

    /// Distance that sweeps exactly `target` area.
    ///
    /// Inverts the trapezoid relation through the length of the moved edge:
    /// `mid = sqrt((2·outer·A + inner·(inner·d − 2A)) / d)` and
    /// `d' = 2A / (mid + inner)`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `target` is outside
    /// `[0, area]`.
    pub fn distance_for_area(&self, target: f64, eps: f64) -> Result<f64> {
        if !(-eps..=self.area + eps).contains(&target) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "area",
                value: target,
                min: 0.0,
                max: self.area,
            }
            .into());
        }
        if target >= self.area - eps {
            return Ok(self.distance);
        }
        if target <= 0.0 {
            return Ok(0.0);
        }
        let inner = self.inner_length();
        let outer = self.contraction.length();
        let radicand = (2.0 * outer * target + inner * (inner * self.distance - 2.0 * target)) / self.distance;
        let mid = radicand.max(0.0).sqrt();
        Ok((2.0 * target / (mid + inner)).min(self.distance))
    }

    /// Vertex writes that apply the move for `target` area.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `target` is outside
    /// `[0, area]`.
    pub fn targets(&self, target: f64, eps: f64) -> Result<Vec<(VertexId, Point2)>> {
        let d = self.distance_for_area(target, eps)?;
        let moved = self.contraction_at(d, eps)?;
        Ok(vec![(self.window.ids[1], moved.start), (self.window.ids[2], moved.end)])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::TOLERANCE;
    use approx::assert_abs_diff_eq;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn l_shape() -> Polygon {
        Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(5.0, 10.0),
            p(5.0, 5.0),
            p(10.0, 5.0),
            p(10.0, 0.0),
        ])
        .unwrap()
    }

    fn normal(poly: &Polygon, index: usize, sign: NormalSign) -> Option<NormalMove> {
        NormalMove::compute(&Configuration::new(poly, index), poly, sign, TOLERANCE)
    }

    #[test]
    fn square_has_no_contraction() {
        let poly = Polygon::new(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]).unwrap();
        for i in 0..4 {
            assert!(normal(&poly, i, NormalSign::Positive).is_none());
            // Negative contractions exist geometrically but would leave two
            // vertices; the orchestrator filters those.
            if let Some(m) = normal(&poly, i, NormalSign::Negative) {
                assert_eq!(m.merges(), 2);
            }
        }
    }

    #[test]
    fn l_shape_positive_fills_notch() {
        let poly = l_shape();
        let m = normal(&poly, 3, NormalSign::Positive).unwrap();
        assert!(m.is_valid());
        assert_abs_diff_eq!(m.distance(), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.area(), 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.contraction().start.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.contraction().start.y, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.contraction().end.x, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.contraction().end.y, 10.0, epsilon = 1e-9);
        assert_eq!(m.merges(), 1);
    }

    #[test]
    fn fully_convex_edge_has_no_positive_move() {
        assert!(normal(&l_shape(), 0, NormalSign::Positive).is_none());
    }

    #[test]
    fn negative_move_on_convex_edge() {
        let m = normal(&l_shape(), 0, NormalSign::Negative).unwrap();
        assert!(m.is_valid());
        assert_abs_diff_eq!(m.distance(), 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.area(), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.direction().x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn notch_limited_by_shorter_wall() {
        let poly = Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(4.0, 10.0),
            p(4.0, 6.0),
            p(6.0, 6.0),
            p(6.0, 8.0),
            p(10.0, 8.0),
            p(10.0, 0.0),
        ])
        .unwrap();
        let m = normal(&poly, 3, NormalSign::Positive).unwrap();
        assert_abs_diff_eq!(m.distance(), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.area(), 4.0, epsilon = 1e-9);
        assert_eq!(m.merges(), 1);
        assert!(normal(&poly, 3, NormalSign::Negative).is_none());
    }

    /// Ring with a reflex corner at (0, 0) whose `next` edge leans back so
    /// the neighbour lines meet at (0, 4).
    fn leaning_corner() -> Polygon {
        Polygon::new(&[
            p(-4.0, 6.0),
            p(0.0, 6.0),
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(8.0, -4.0),
            p(-4.0, -4.0),
        ])
        .unwrap()
    }

    #[test]
    fn converging_neighbours_clamp_the_move() {
        let poly = leaning_corner();
        let m = normal(&poly, 2, NormalSign::Positive).unwrap();
        assert!(m.is_valid());
        assert_abs_diff_eq!(m.distance(), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.area(), 8.0, epsilon = 1e-9);
        assert!(m.contraction().length() < 1e-9);
        assert_abs_diff_eq!(m.contraction().start.y, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn partial_area_inverts_trapezoid() {
        let poly = l_shape();
        let m = normal(&poly, 3, NormalSign::Positive).unwrap();
        assert_abs_diff_eq!(m.distance_for_area(10.0, TOLERANCE).unwrap(), 2.0, epsilon = 1e-9);

        let clamped = normal(&leaning_corner(), 2, NormalSign::Positive).unwrap();
        let d = clamped.distance_for_area(6.0, TOLERANCE).unwrap();
        assert_abs_diff_eq!(d, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(clamped.area_at_distance(d, TOLERANCE).unwrap(), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(clamped.area_function(d), 6.0, epsilon = 1e-9);
        let moved = clamped.contraction_at(d, TOLERANCE).unwrap();
        assert_abs_diff_eq!(moved.length(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn out_of_range_requests_rejected() {
        let m = normal(&l_shape(), 3, NormalSign::Positive).unwrap();
        assert!(m.distance_for_area(26.0, TOLERANCE).is_err());
        assert!(m.distance_for_area(-1.0, TOLERANCE).is_err());
        assert!(m.contraction_at(6.0, TOLERANCE).is_err());
        assert!(m.targets(30.0, TOLERANCE).is_err());
    }

    #[test]
    fn targets_write_inner_vertices() {
        let poly = l_shape();
        let m = normal(&poly, 3, NormalSign::Positive).unwrap();
        let writes = m.targets(10.0, TOLERANCE).unwrap();
        assert_eq!(writes[0].0, poly.vertex_id(3));
        assert_eq!(writes[1].0, poly.vertex_id(4));
        assert_abs_diff_eq!(writes[0].1.y, 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(writes[1].1.y, 7.0, epsilon = 1e-9);
    }

    #[test]
    fn overhang_blocks_contraction() {
        let poly = Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 9.0),
            p(4.0, 9.0),
            p(4.0, 4.0),
            p(6.0, 4.0),
            p(9.0, 10.0),
            p(6.0, 10.0),
            p(6.0, 8.0),
            p(5.0, 8.0),
            p(5.0, 11.0),
            p(13.0, 11.0),
            p(13.0, 0.0),
        ])
        .unwrap();
        let m = normal(&poly, 3, NormalSign::Positive).unwrap();
        assert!(!m.is_valid());
        assert_eq!(m.blocking().len(), 3);
    }
}
