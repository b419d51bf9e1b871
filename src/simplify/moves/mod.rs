//! Candidate moves.
//!
//! Every move is a snapshot taken against the polygon at construction time:
//! the window vertex handles and positions, the target geometry, the swept
//! area and the polygon edges blocking it. Moves never mutate the polygon;
//! they only report the vertex writes that apply them.

pub mod normal;
pub mod pair;
pub mod region;
pub mod rotation;

pub use normal::{NormalMove, NormalSign};
pub use pair::PairNormalMove;
pub use region::SweptRegion;
pub use rotation::{RotationMove, RotationPivot};

use crate::error::Result;
use crate::math::Point2;
use crate::simplify::configuration::Window;
use crate::topology::{Edge, Polygon, VertexId};

/// The seven kinds of move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MoveKind {
    Positive,
    Negative,
    Pair,
    StartRotation,
    EndRotation,
    MiddleRotation,
    CompensatingRotation,
}

impl MoveKind {
    pub const ALL: [MoveKind; 7] = [
        Self::Positive,
        Self::Negative,
        Self::Pair,
        Self::StartRotation,
        Self::EndRotation,
        Self::MiddleRotation,
        Self::CompensatingRotation,
    ];

    /// The rotation kind for a pivot.
    #[must_use]
    pub fn rotation(pivot: RotationPivot) -> Self {
        match pivot {
            RotationPivot::Start => Self::StartRotation,
            RotationPivot::End => Self::EndRotation,
            RotationPivot::Middle => Self::MiddleRotation,
            RotationPivot::Compensating => Self::CompensatingRotation,
        }
    }

    /// The pivot of a rotation kind.
    #[must_use]
    pub fn pivot(self) -> Option<RotationPivot> {
        match self {
            Self::StartRotation => Some(RotationPivot::Start),
            Self::EndRotation => Some(RotationPivot::End),
            Self::MiddleRotation => Some(RotationPivot::Middle),
            Self::CompensatingRotation => Some(RotationPivot::Compensating),
            Self::Positive | Self::Negative | Self::Pair => None,
        }
    }

    /// The normal kind for a sign.
    #[must_use]
    pub fn normal(sign: NormalSign) -> Self {
        match sign {
            NormalSign::Positive => Self::Positive,
            NormalSign::Negative => Self::Negative,
        }
    }
}

/// A candidate move of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Move {
    Normal(NormalMove),
    Pair(PairNormalMove),
    Rotation(RotationMove),
}

impl Move {
    #[must_use]
    pub fn kind(&self) -> MoveKind {
        match self {
            Self::Normal(m) => MoveKind::normal(m.sign()),
            Self::Pair(_) => MoveKind::Pair,
            Self::Rotation(m) => MoveKind::rotation(m.pivot()),
        }
    }

    /// Ring position the move is stored under.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Normal(m) => m.index(),
            Self::Pair(m) => m.index(),
            Self::Rotation(m) => m.index(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Normal(m) => m.is_valid(),
            Self::Pair(m) => m.is_valid(),
            Self::Rotation(m) => m.is_valid(),
        }
    }

    /// Unsigned area touched by the full move.
    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Normal(m) => m.area(),
            Self::Pair(m) => m.area(),
            Self::Rotation(m) => m.area(),
        }
    }

    /// Signed polygon area change when applied for `area`.
    #[must_use]
    pub fn net_area_at(&self, area: f64) -> f64 {
        match self {
            Self::Normal(m) => m.sign().area_sign() * area,
            Self::Pair(_) => 0.0,
            Self::Rotation(m) => m.net_area(),
        }
    }

    /// Signed polygon area change of the full move.
    #[must_use]
    pub fn net_area(&self) -> f64 {
        self.net_area_at(self.area())
    }

    /// Upper bound on the vertices the full move merges away.
    #[must_use]
    pub fn merges(&self) -> usize {
        match self {
            Self::Normal(m) => m.merges(),
            Self::Pair(m) => {
                let (da, db) = m.distances();
                let side = |mv: &NormalMove, d: f64| if d >= mv.distance() { mv.merges() } else { 0 };
                side(m.first(), da) + side(m.second(), db) + usize::from(m.collapses())
            }
            Self::Rotation(m) => m.merges(),
        }
    }

    /// Window snapshots the move depends on.
    #[must_use]
    pub fn windows(&self) -> Vec<&Window> {
        match self {
            Self::Normal(m) => vec![m.window()],
            Self::Pair(m) => vec![m.first().window(), m.second().window()],
            Self::Rotation(m) => vec![m.window()],
        }
    }

    /// Polygon edges the move rewrites.
    #[must_use]
    pub fn edges(&self) -> Vec<Edge> {
        match self {
            Self::Normal(m) => m.window().edges().to_vec(),
            Self::Pair(m) => m.edges(),
            Self::Rotation(m) => m.window().edges().to_vec(),
        }
    }

    /// Regions swept by the full move.
    #[must_use]
    pub fn regions(&self, eps: f64) -> Vec<SweptRegion> {
        match self {
            Self::Normal(m) => vec![m.region(eps)],
            Self::Pair(m) => m.regions(eps),
            Self::Rotation(m) => m.regions(eps),
        }
    }

    #[must_use]
    pub fn blocking(&self) -> Vec<Edge> {
        match self {
            Self::Normal(m) => m.blocking().to_vec(),
            Self::Pair(m) => m.blocking(),
            Self::Rotation(m) => m.blocking().to_vec(),
        }
    }

    /// Returns `true` if every window snapshot still matches the polygon.
    #[must_use]
    pub fn is_current(&self, polygon: &Polygon, eps: f64) -> bool {
        self.windows().iter().all(|w| w.is_current(polygon, eps))
    }

    /// Two moves can be applied in the same step when they rewrite no common
    /// edge and their swept regions do not overlap.
    #[must_use]
    pub fn is_compatible(&self, other: &Move, eps: f64) -> bool {
        let shares_edge = self
            .edges()
            .iter()
            .any(|a| other.edges().iter().any(|b| a.same_undirected(b)));
        if shares_edge {
            return false;
        }
        let theirs = other.regions(eps);
        !self
            .regions(eps)
            .iter()
            .any(|a| theirs.iter().any(|b| a.overlaps(b, eps)))
    }

    /// Vertex writes applying the move for `area`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` when `area` is not
    /// achievable by the move.
    pub fn targets(&self, area: f64, eps: f64) -> Result<Vec<(VertexId, Point2)>> {
        match self {
            Self::Normal(m) => m.targets(area, eps),
            Self::Pair(m) => m.targets(area, eps),
            Self::Rotation(m) => m.targets(area, eps),
        }
    }
}

/// A move selected for application, with the area to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub mv: Move,
    pub area: f64,
    /// Run the cleanup cascade around the move's windows.
    pub cleanup: bool,
}

impl Decision {
    /// Applies the move to its full extent.
    #[must_use]
    pub fn full(mv: Move) -> Self {
        let area = mv.area();
        Self { mv, area, cleanup: true }
    }

    /// Applies the move for `area`; cleanup runs only when that is the full
    /// extent.
    #[must_use]
    pub fn partial(mv: Move, area: f64, eps: f64) -> Self {
        let cleanup = area >= mv.area() - eps;
        Self { mv, area, cleanup }
    }

    /// Signed polygon area change of this decision.
    #[must_use]
    pub fn net_area(&self) -> f64 {
        self.mv.net_area_at(self.area)
    }
}
