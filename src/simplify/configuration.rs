use crate::error::TopologyError;
use crate::math::polygon_2d::{classify_turn, interior_angle, Turn};
use crate::math::{Point2, Segment2, Vector2};
use crate::topology::{Edge, Polygon, VertexId};

/// A snapshot of the four vertices spanned by a configuration.
///
/// `ids` are `previous.start, inner.start, inner.end, next.end`. Moves keep a
/// window so they can check, before being applied, that the polygon has not
/// changed underneath them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub index: usize,
    pub ids: [VertexId; 4],
    pub points: [Point2; 4],
}

impl Window {
    /// Previous edge as a snapshot segment.
    #[must_use]
    pub fn previous(&self) -> Segment2 {
        Segment2::new(self.points[0], self.points[1])
    }

    /// Inner edge as a snapshot segment.
    #[must_use]
    pub fn inner(&self) -> Segment2 {
        Segment2::new(self.points[1], self.points[2])
    }

    /// Next edge as a snapshot segment.
    #[must_use]
    pub fn next(&self) -> Segment2 {
        Segment2::new(self.points[2], self.points[3])
    }

    /// The three window edges (previous, inner, next).
    #[must_use]
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.ids[0], self.ids[1]),
            Edge::new(self.ids[1], self.ids[2]),
            Edge::new(self.ids[2], self.ids[3]),
        ]
    }

    /// Returns `true` if the polygon still holds exactly this window at `index`.
    #[must_use]
    pub fn is_current(&self, polygon: &Polygon, eps: f64) -> bool {
        if polygon.len() < 3 || polygon.vertex_id(self.index) != self.ids[1] {
            return false;
        }
        (0..4).all(|k| {
            let id = polygon.vertex_id(self.index + polygon.len() + k - 1);
            id == self.ids[k] && (polygon.point_at(self.index + polygon.len() + k - 1) - self.points[k]).norm() <= eps
        })
    }
}

/// The local three-edge window `(previous, inner, next)` around the vertex at
/// ring position `index`.
///
/// Edges are handle pairs into the polygon's vertex store, so moving a vertex
/// is visible through every configuration that references it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Configuration {
    index: usize,
    previous: Edge,
    inner: Edge,
    next: Edge,
}

impl Configuration {
    /// Builds the configuration whose inner edge starts at ring position `index`.
    #[must_use]
    pub fn new(polygon: &Polygon, index: usize) -> Self {
        let n = polygon.len();
        Self {
            index: index % n,
            previous: polygon.edge(index + n - 1),
            inner: polygon.edge(index),
            next: polygon.edge(index + 1),
        }
    }

    /// Ring position of `inner.start`.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn previous(&self) -> Edge {
        self.previous
    }

    #[must_use]
    pub fn inner(&self) -> Edge {
        self.inner
    }

    #[must_use]
    pub fn next(&self) -> Edge {
        self.next
    }

    /// The three edges of the window.
    #[must_use]
    pub fn edges(&self) -> [Edge; 3] {
        [self.previous, self.inner, self.next]
    }

    /// Returns `true` if the two windows share an edge (in either direction).
    #[must_use]
    pub fn shares_edge(&self, other: &Configuration) -> bool {
        self.edges()
            .iter()
            .any(|a| other.edges().iter().any(|b| a.same_undirected(b)))
    }

    /// Snapshot of the four window vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced vertex has been removed from the store.
    pub fn window(&self, polygon: &Polygon) -> Result<Window, TopologyError> {
        let ids = [self.previous.start, self.inner.start, self.inner.end, self.next.end];
        Ok(Window {
            index: self.index,
            ids,
            points: [
                polygon.point(ids[0])?,
                polygon.point(ids[1])?,
                polygon.point(ids[2])?,
                polygon.point(ids[3])?,
            ],
        })
    }

    /// Checks the index invariant: `inner.start` sits at ring position `index`
    /// and the window edges are the ring edges around it.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::IndexMismatch` when the configuration is stale.
    pub fn check(&self, polygon: &Polygon, expected: usize) -> Result<(), TopologyError> {
        let n = polygon.len();
        let consistent = self.index == expected
            && polygon.vertex_id(expected) == self.inner.start
            && self.previous == polygon.edge(expected + n - 1)
            && self.inner == polygon.edge(expected)
            && self.next == polygon.edge(expected + 1);
        if consistent {
            Ok(())
        } else {
            Err(TopologyError::IndexMismatch {
                index: self.index,
                expected,
            })
        }
    }

    /// Turn at `inner.start`.
    #[must_use]
    pub fn start_turn(&self, polygon: &Polygon, eps: f64) -> Turn {
        turn_between(polygon, self.previous, self.inner, eps)
    }

    /// Turn at `inner.end`.
    #[must_use]
    pub fn end_turn(&self, polygon: &Polygon, eps: f64) -> Turn {
        turn_between(polygon, self.inner, self.next, eps)
    }

    /// Interior angle at `inner.start`, in `[0, 2π)`.
    #[must_use]
    pub fn start_angle(&self, polygon: &Polygon) -> f64 {
        angle_between(polygon, self.previous, self.inner)
    }

    /// Interior angle at `inner.end`, in `[0, 2π)`.
    #[must_use]
    pub fn end_angle(&self, polygon: &Polygon) -> f64 {
        angle_between(polygon, self.inner, self.next)
    }

    /// Both ends of the inner edge are convex.
    #[must_use]
    pub fn is_inner_convex(&self, polygon: &Polygon, eps: f64) -> bool {
        self.start_turn(polygon, eps) == Turn::Convex && self.end_turn(polygon, eps) == Turn::Convex
    }

    /// Both ends of the inner edge are reflex.
    #[must_use]
    pub fn is_inner_reflex(&self, polygon: &Polygon, eps: f64) -> bool {
        self.start_turn(polygon, eps) == Turn::Reflex && self.end_turn(polygon, eps) == Turn::Reflex
    }

    /// One end convex, the other reflex.
    #[must_use]
    pub fn is_mixed(&self, polygon: &Polygon, eps: f64) -> bool {
        matches!(
            (self.start_turn(polygon, eps), self.end_turn(polygon, eps)),
            (Turn::Convex, Turn::Reflex) | (Turn::Reflex, Turn::Convex)
        )
    }

    /// Ring positions whose neighbourhood must be re-examined by the cleanup
    /// cascade after this window's vertices were rewritten.
    #[must_use]
    pub fn cleanup_seeds(&self, n: usize) -> [usize; 4] {
        [
            (self.index + n - 1) % n,
            self.index,
            (self.index + 1) % n,
            (self.index + 2) % n,
        ]
    }
}

fn edge_direction(polygon: &Polygon, edge: Edge) -> Option<Vector2> {
    polygon.segment(edge).ok().and_then(|s| s.direction())
}

fn turn_between(polygon: &Polygon, a: Edge, b: Edge, eps: f64) -> Turn {
    match (edge_direction(polygon, a), edge_direction(polygon, b)) {
        (Some(da), Some(db)) => classify_turn(&da, &db, eps),
        _ => Turn::Degenerate,
    }
}

fn angle_between(polygon: &Polygon, a: Edge, b: Edge) -> f64 {
    match (edge_direction(polygon, a), edge_direction(polygon, b)) {
        (Some(da), Some(db)) => interior_angle(&da, &db),
        _ => 0.0,
    }
}
