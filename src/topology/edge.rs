use super::vertex::VertexId;

/// A directed polygon edge, referencing its endpoints by handle.
///
/// Two edges that share a vertex observe every mutation of it; nothing is
/// copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Start vertex of the edge.
    pub start: VertexId,
    /// End vertex of the edge.
    pub end: VertexId,
}

impl Edge {
    /// Creates a new edge between two vertices.
    #[must_use]
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self { start, end }
    }

    /// Returns `true` if both edges connect the same two vertices, in either
    /// direction.
    #[must_use]
    pub fn same_undirected(&self, other: &Edge) -> bool {
        (self.start == other.start && self.end == other.end)
            || (self.start == other.end && self.end == other.start)
    }
}
