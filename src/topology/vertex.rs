use crate::math::Point2;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the polygon's vertex store.
    pub struct VertexId;
}

/// Data associated with a polygon vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 2D position of the vertex.
    pub point: Point2,
}

impl VertexData {
    /// Creates a new vertex at the given point.
    #[must_use]
    pub fn new(point: Point2) -> Self {
        Self { point }
    }
}
