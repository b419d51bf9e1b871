use crate::error::{GeometryError, Result};
use crate::math::polygon_2d::Turn;
use crate::math::solve::smallest_root_in;
use crate::math::{cross, Point2};
use crate::simplify::configuration::Configuration;
use crate::topology::{Edge, Polygon, VertexId};

use super::normal::{NormalMove, NormalSign};
use super::region::SweptRegion;

/// Two normal moves of opposite sign sliding towards each other along a
/// shared hinge edge until their swept areas balance.
///
/// Configuration `a` sits two positions before `b`; `a.next` and
/// `b.previous` are the same hinge edge `S`. One end of `S` is convex and the
/// other reflex, so one side shrinks the polygon while the other grows it.
#[derive(Debug, Clone, PartialEq)]
pub struct PairNormalMove {
    first: NormalMove,
    second: NormalMove,
    split: Point2,
    first_distance: f64,
    second_distance: f64,
    component_area: f64,
    collapses: bool,
}

impl PairNormalMove {
    /// Builds the pair whose later configuration is `b`, or `None` when the
    /// hinge is not mixed or no balanced split exists.
    #[must_use]
    pub fn compute(a: &Configuration, b: &Configuration, polygon: &Polygon, eps: f64) -> Option<Self> {
        let hinge = a.next();
        if !hinge.same_undirected(&b.previous()) || a.inner().same_undirected(&b.inner()) {
            return None;
        }

        // Step 1: pick the sign of each side from the hinge turns.
        let (sign_a, sign_b) = match (a.end_turn(polygon, eps), b.start_turn(polygon, eps)) {
            (Turn::Convex, Turn::Reflex) => (NormalSign::Negative, NormalSign::Positive),
            (Turn::Reflex, Turn::Convex) => (NormalSign::Positive, NormalSign::Negative),
            _ => return None,
        };
        let first = NormalMove::compute(a, polygon, sign_a, eps)?;
        let second = NormalMove::compute(b, polygon, sign_b, eps)?;

        // Step 2: rates at which each side's hinge endpoint travels along S.
        let segment = polygon.segment(hinge).ok()?;
        let length = segment.length();
        let s_dir = segment.direction()?;
        let a_dir = first.window().inner().direction()?;
        let b_dir = second.window().inner().direction()?;
        let c_a = cross(&s_dir, &a_dir).abs();
        let c_b = cross(&s_dir, &b_dir).abs();
        if c_a <= eps || c_b <= eps {
            return None;
        }

        // Step 3: restrict t to splits both sides can reach. On that interval
        // each area function is increasing, so the balance has one root.
        let lo = (length - second.distance() / c_b).max(0.0);
        let hi = (first.distance() / c_a).min(length);
        let (inner_a, k_a) = (first.inner_length(), first.growth());
        let (inner_b, k_b) = (second.inner_length(), second.growth());
        let alpha = 0.5 * k_a * c_a * c_a - 0.5 * k_b * c_b * c_b;
        let beta = inner_a * c_a + inner_b * c_b + k_b * c_b * c_b * length;
        let gamma = -(inner_b * c_b * length + 0.5 * k_b * c_b * c_b * length * length);
        let root = if lo <= hi + eps {
            smallest_root_in(alpha, beta, gamma, lo, hi.max(lo), eps)
        } else {
            None
        };

        // Step 4: without a reachable balance the smaller side runs in full
        // and caps the other.
        let (t, first_distance, second_distance, component_area, collapses) = if let Some(t) = root {
            let da = (t * c_a).min(first.distance());
            let db = ((length - t) * c_b).min(second.distance());
            let area = first
                .area_function(da)
                .min(second.area_function(db))
                .clamp(0.0, first.area().min(second.area()));
            (t, da, db, area, true)
        } else {
            let area = first.area().min(second.area());
            let da = first.distance_for_area(area, eps).ok()?;
            let db = second.distance_for_area(area, eps).ok()?;
            ((da / c_a).min(length), da, db, area, false)
        };
        if component_area <= eps {
            return None;
        }

        Some(Self {
            first,
            second,
            split: segment.start + s_dir * t,
            first_distance,
            second_distance,
            component_area,
            collapses,
        })
    }

    /// The earlier side (`a = i − 2`).
    #[must_use]
    pub fn first(&self) -> &NormalMove {
        &self.first
    }

    /// The later side (`b = i`).
    #[must_use]
    pub fn second(&self) -> &NormalMove {
        &self.second
    }

    /// Ring position of the later configuration.
    #[must_use]
    pub fn index(&self) -> usize {
        self.second.index()
    }

    /// Point on the hinge where the two moved edges meet.
    #[must_use]
    pub fn split(&self) -> Point2 {
        self.split
    }

    /// Distances travelled by each side.
    #[must_use]
    pub fn distances(&self) -> (f64, f64) {
        (self.first_distance, self.second_distance)
    }

    /// Total area touched: twice the balanced component area.
    #[must_use]
    pub fn area(&self) -> f64 {
        2.0 * self.component_area
    }

    /// Area each side sweeps when the whole pair is applied.
    #[must_use]
    pub fn component_area(&self) -> f64 {
        self.component_area
    }

    /// Returns `true` when the hinge edge disappears under the full pair.
    #[must_use]
    pub fn collapses(&self) -> bool {
        self.collapses
    }

    /// Valid iff both sides are valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.first.is_valid() && self.second.is_valid()
    }

    /// Recomputes both sides' blocking sets.
    pub fn refresh_blocking(&mut self, polygon: &Polygon, eps: f64) {
        self.first.refresh_blocking(polygon, eps);
        self.second.refresh_blocking(polygon, eps);
    }

    pub(crate) fn reindex(&mut self, index: usize, n: usize) {
        self.first.reindex((index + n - 2) % n);
        self.second.reindex(index);
    }

    /// Union of both sides' blocking edges.
    #[must_use]
    pub fn blocking(&self) -> Vec<Edge> {
        let mut edges = self.first.blocking().to_vec();
        for e in self.second.blocking() {
            if !edges.iter().any(|x| x.same_undirected(e)) {
                edges.push(*e);
            }
        }
        edges
    }

    /// Swept regions of both sides.
    #[must_use]
    pub fn regions(&self, eps: f64) -> Vec<SweptRegion> {
        vec![self.first.region(eps), self.second.region(eps)]
    }

    /// The five window edges spanned by the pair.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = self.first.window().edges().to_vec();
        edges.extend(self.second.window().edges().iter().skip(1));
        edges
    }

    /// Vertex writes for applying `target` of the total area; each side takes
    /// half. At full extent an unclamped pair lands both hinge endpoints on
    /// the split point.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `target` exceeds the
    /// pair's area.
    pub fn targets(&self, target: f64, eps: f64) -> Result<Vec<(VertexId, Point2)>> {
        if !(-eps..=self.area() + eps).contains(&target) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "area",
                value: target,
                min: 0.0,
                max: self.area(),
            }
            .into());
        }
        let half = 0.5 * target;
        let mut writes = self.first.targets(half, eps)?;
        writes.extend(self.second.targets(half, eps)?);
        if self.collapses && half >= self.component_area - eps {
            writes[1].1 = self.split;
            writes[2].1 = self.split;
        }
        Ok(writes)
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

    fn pair(poly: &Polygon, b: usize) -> Option<PairNormalMove> {
        let n = poly.len();
        let a = Configuration::new(poly, b + n - 2);
        PairNormalMove::compute(&a, &Configuration::new(poly, b), poly, TOLERANCE)
    }

    #[test]
    fn vertical_hinge_balances_at_midpoint() {
        let poly = l_shape();
        let m = pair(&poly, 3).unwrap();
        assert!(m.is_valid());
        assert!(m.collapses());
        assert_eq!(m.first().sign(), NormalSign::Negative);
        assert_eq!(m.second().sign(), NormalSign::Positive);
        assert_abs_diff_eq!(m.split().x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.split().y, 7.5, epsilon = 1e-9);
        assert_abs_diff_eq!(m.area(), 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.component_area(), 12.5, epsilon = 1e-9);
    }

    #[test]
    fn horizontal_hinge_balances_at_midpoint() {
        let m = pair(&l_shape(), 4).unwrap();
        assert_eq!(m.first().sign(), NormalSign::Positive);
        assert_eq!(m.second().sign(), NormalSign::Negative);
        assert_abs_diff_eq!(m.split().x, 7.5, epsilon = 1e-9);
        assert_abs_diff_eq!(m.split().y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn convex_hinge_has_no_pair() {
        let poly = l_shape();
        assert!(pair(&poly, 1).is_none());
        assert!(pair(&poly, 0).is_none());
    }

    #[test]
    fn full_targets_meet_on_split() {
        let poly = l_shape();
        let m = pair(&poly, 3).unwrap();
        let writes = m.targets(m.area(), TOLERANCE).unwrap();
        assert_eq!(writes.len(), 4);
        assert_eq!(writes[1].0, poly.vertex_id(2));
        assert_eq!(writes[2].0, poly.vertex_id(3));
        assert_abs_diff_eq!(writes[0].1.y, 7.5, epsilon = 1e-9);
        assert_abs_diff_eq!((writes[1].1 - writes[2].1).norm(), 0.0, epsilon = 1e-12);
        assert!(m.targets(m.area() + 1.0, TOLERANCE).is_err());
    }

    #[test]
    fn unequal_sides_split_off_centre() {
        // Top edge 3 long, lower step 7 long: the split sits closer to the
        // lower step so both sides sweep the same area.
        let poly = Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(3.0, 10.0),
            p(3.0, 5.0),
            p(10.0, 5.0),
            p(10.0, 0.0),
        ])
        .unwrap();
        let m = pair(&poly, 3).unwrap();
        // 3·t = 7·(5 − t)  →  t = 3.5
        assert_abs_diff_eq!(m.split().y, 6.5, epsilon = 1e-9);
        assert_abs_diff_eq!(m.component_area(), 10.5, epsilon = 1e-9);
        assert_eq!(m.edges().len(), 5);
    }

    /// The top side can only drop 2 before it reaches (0, 8); the balance
    /// point on the hinge lies further down.
    fn shallow_top() -> Polygon {
        Polygon::new(&[
            p(0.0, 8.0),
            p(0.0, 10.0),
            p(3.0, 10.0),
            p(3.0, 5.0),
            p(10.0, 5.0),
            p(10.0, 0.0),
            p(-2.0, 0.0),
            p(-2.0, 8.0),
        ])
        .unwrap()
    }

    #[test]
    fn short_side_caps_the_pair() {
        let m = pair(&shallow_top(), 3).unwrap();
        assert!(!m.collapses());
        let (da, db) = m.distances();
        assert_abs_diff_eq!(da, m.first().distance(), epsilon = 1e-9);
        assert_abs_diff_eq!(da, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(db, 6.0 / 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.component_area(), 6.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.area(), 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(m.split().y, 8.0, epsilon = 1e-9);

        let writes = m.targets(m.area(), TOLERANCE).unwrap();
        assert_abs_diff_eq!(writes[0].1.y, 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(writes[2].1.y, 5.0 + 6.0 / 7.0, epsilon = 1e-9);
    }
}
