pub mod edge;
pub mod vertex;

pub use edge::Edge;
pub use vertex::{VertexData, VertexId};

use crate::error::{OperationError, Result, TopologyError};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, Segment2, TOLERANCE};
use slotmap::SlotMap;

/// A simple polygon stored as a vertex arena plus an ordered cyclic ring.
///
/// Vertices are owned by the arena and referenced by [`VertexId`]; edges are
/// derived as `(ring[i], ring[i + 1 mod n])`. The ring is kept in clockwise
/// order, so the interior lies to the right of every edge.
#[derive(Debug, Clone, Default)]
pub struct Polygon {
    vertices: SlotMap<VertexId, VertexData>,
    ring: Vec<VertexId>,
}

impl Polygon {
    /// Builds a polygon from its vertex positions.
    ///
    /// Counter-clockwise input is reversed so the stored ring is clockwise.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if fewer than 3 points are given
    /// or the enclosed area is zero.
    pub fn new(points: &[Point2]) -> Result<Self> {
        if points.len() < 3 {
            return Err(OperationError::InvalidInput(format!(
                "a polygon needs at least 3 vertices, got {}",
                points.len()
            ))
            .into());
        }
        let area = signed_area_2d(points);
        if area.abs() < TOLERANCE {
            return Err(OperationError::InvalidInput("polygon has zero area".to_owned()).into());
        }

        let mut vertices = SlotMap::with_key();
        let mut ring: Vec<VertexId> = points
            .iter()
            .map(|p| vertices.insert(VertexData::new(*p)))
            .collect();
        if area > 0.0 {
            tracing::debug!("reversing counter-clockwise input polygon");
            ring.reverse();
        }
        Ok(Self { vertices, ring })
    }

    /// Returns the number of vertices in the ring.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if the ring has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Returns the vertex handle at ring position `index` (wrapping).
    #[must_use]
    pub fn vertex_id(&self, index: usize) -> VertexId {
        self.ring[index % self.ring.len()]
    }

    /// Returns the ring in order.
    #[must_use]
    pub fn ring(&self) -> &[VertexId] {
        &self.ring
    }

    /// Returns the ring position of a vertex, if it is still part of the polygon.
    #[must_use]
    pub fn index_of(&self, id: VertexId) -> Option<usize> {
        self.ring.iter().position(|v| *v == id)
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the store.
    pub fn point(&self, id: VertexId) -> std::result::Result<Point2, TopologyError> {
        self.vertices
            .get(id)
            .map(|v| v.point)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns the position of the vertex at ring position `index` (wrapping).
    #[must_use]
    pub fn point_at(&self, index: usize) -> Point2 {
        self.vertices[self.vertex_id(index)].point
    }

    /// Moves a vertex. Both incident edges observe the new position.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the store.
    pub fn set_point(
        &mut self,
        id: VertexId,
        point: Point2,
    ) -> std::result::Result<(), TopologyError> {
        self.vertices
            .get_mut(id)
            .map(|v| v.point = point)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns the edge starting at ring position `index` (wrapping).
    #[must_use]
    pub fn edge(&self, index: usize) -> Edge {
        Edge::new(self.vertex_id(index), self.vertex_id(index + 1))
    }

    /// Iterates over all edges in ring order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.ring.len()).map(|i| self.edge(i))
    }

    /// Returns a snapshot of an edge's geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if either endpoint is not in the store.
    pub fn segment(&self, edge: Edge) -> std::result::Result<Segment2, TopologyError> {
        Ok(Segment2::new(self.point(edge.start)?, self.point(edge.end)?))
    }

    /// Returns a snapshot of the edge geometry at ring position `index`.
    #[must_use]
    pub fn segment_at(&self, index: usize) -> Segment2 {
        Segment2::new(self.point_at(index), self.point_at(index + 1))
    }

    /// Returns copies of all vertex positions in ring order.
    #[must_use]
    pub fn points(&self) -> Vec<Point2> {
        self.ring.iter().map(|id| self.vertices[*id].point).collect()
    }

    /// Removes the vertices at the given ring positions.
    ///
    /// `indices` must be sorted ascending and refer to the ring as it is
    /// before the call; all positions are resolved first and removed in one
    /// pass.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::InvalidTopology` if an index is out of range
    /// or fewer than 3 vertices would remain.
    pub fn remove_indices(
        &mut self,
        indices: &[usize],
    ) -> std::result::Result<Vec<VertexId>, TopologyError> {
        let n = self.ring.len();
        if indices.iter().any(|i| *i >= n) || indices.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TopologyError::InvalidTopology(format!(
                "removal indices {indices:?} are not sorted positions of a ring of {n}"
            )));
        }
        if n - indices.len() < 3 {
            return Err(TopologyError::InvalidTopology(format!(
                "removing {} of {n} vertices leaves a degenerate polygon",
                indices.len()
            )));
        }

        let removed: Vec<VertexId> = indices.iter().map(|i| self.ring[*i]).collect();
        let mut cursor = 0;
        let mut position = 0;
        self.ring.retain(|_| {
            let drop = cursor < indices.len() && indices[cursor] == position;
            if drop {
                cursor += 1;
            }
            position += 1;
            !drop
        });
        for id in &removed {
            self.vertices.remove(*id);
        }
        Ok(removed)
    }

    /// Signed shoelace area (negative for the stored clockwise ring).
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.points())
    }

    /// Unsigned enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Returns all pairs of non-adjacent edges that intersect.
    #[must_use]
    pub fn self_intersections(&self, eps: f64) -> Vec<(Edge, Edge)> {
        let n = self.ring.len();
        let mut hits = Vec::new();
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let hit = segment_segment_intersect_2d(&self.segment_at(i), &self.segment_at(j), eps);
                if hit.is_some() {
                    hits.push((self.edge(i), self.edge(j)));
                }
            }
        }
        hits
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn square() -> Polygon {
        Polygon::new(&[p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)]).unwrap()
    }

    #[test]
    fn clockwise_input_is_kept() {
        let poly = square();
        assert!(poly.signed_area() < 0.0);
        assert!((poly.point_at(1).y - 10.0).abs() < TOLERANCE);
    }

    #[test]
    fn counter_clockwise_input_is_reversed() {
        let poly = Polygon::new(&[p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]).unwrap();
        assert!(poly.signed_area() < 0.0);
        assert!((poly.area() - 100.0).abs() < TOLERANCE);
    }

    #[test]
    fn too_few_points_rejected() {
        assert!(Polygon::new(&[p(0.0, 0.0), p(1.0, 0.0)]).is_err());
    }

    #[test]
    fn zero_area_rejected() {
        assert!(Polygon::new(&[p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0)]).is_err());
    }

    #[test]
    fn shared_vertex_visible_through_both_edges() {
        let mut poly = square();
        let prev = poly.edge(0);
        let next = poly.edge(1);
        assert_eq!(prev.end, next.start);
        poly.set_point(prev.end, p(1.0, 11.0)).unwrap();
        assert!((poly.segment(prev).unwrap().end.x - 1.0).abs() < TOLERANCE);
        assert!((poly.segment(next).unwrap().start.y - 11.0).abs() < TOLERANCE);
    }

    #[test]
    fn remove_indices_shifts_ring() {
        let mut poly = Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 5.0),
            p(0.0, 10.0),
            p(10.0, 10.0),
            p(10.0, 5.0),
            p(10.0, 0.0),
        ])
        .unwrap();
        let id = poly.vertex_id(2);
        let removed = poly.remove_indices(&[1, 4]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.index_of(id), Some(1));
        assert!(poly.point(removed[0]).is_err());
    }

    #[test]
    fn remove_indices_rejects_collapse() {
        let mut poly = square();
        assert!(poly.remove_indices(&[0, 1]).is_err());
        assert!(poly.remove_indices(&[2, 1]).is_err());
        assert_eq!(poly.len(), 4);
    }

    #[test]
    fn simple_polygon_has_no_self_intersections() {
        assert!(square().self_intersections(TOLERANCE).is_empty());
    }

    #[test]
    fn bowtie_reports_crossing() {
        let poly = Polygon::new(&[p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)]);
        // A bow-tie has zero net area and is rejected outright.
        assert!(poly.is_err());
        let poly = Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(10.0, 0.0),
            p(12.0, 10.0),
            p(12.0, 0.0),
        ])
        .unwrap();
        assert!(!poly.self_intersections(TOLERANCE).is_empty());
    }
}
