use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::{chain_area_delta, triangle_area};
use crate::math::solve::smallest_root_in;
use crate::math::{cross, Line2, Point2, Segment2, Vector2};
use crate::simplify::config::OrientationSet;
use crate::simplify::configuration::{Configuration, Window};
use crate::topology::{Edge, Polygon, VertexId};

use super::region::{find_blocking, SweptRegion};

/// Point of the inner edge that stays fixed while it rotates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationPivot {
    Start,
    End,
    Middle,
    /// Chosen so the area gained on one side equals the area lost on the other.
    Compensating,
}

impl RotationPivot {
    pub const ALL: [RotationPivot; 4] = [Self::Start, Self::End, Self::Middle, Self::Compensating];

    /// Position of this pivot in [`RotationPivot::ALL`].
    #[must_use]
    pub fn slot(self) -> usize {
        match self {
            Self::Start => 0,
            Self::End => 1,
            Self::Middle => 2,
            Self::Compensating => 3,
        }
    }
}

/// Re-orientation of a configuration's inner edge onto an allowed direction.
///
/// The new edge passes through the pivot; its endpoints are re-anchored on
/// the supporting lines of the neighbouring edges.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationMove {
    pivot: RotationPivot,
    window: Window,
    orientation: Vector2,
    pivot_point: Point2,
    rotated: Segment2,
    swept_area: f64,
    net_area: f64,
    merges: usize,
    blocking: Vec<Edge>,
}

impl RotationMove {
    /// Finds the orientation with maximal swept area for the given pivot.
    ///
    /// Returns `None` unless the configuration is mixed and its inner edge is
    /// not yet aligned with `orientations`.
    #[must_use]
    pub fn compute(
        configuration: &Configuration,
        polygon: &Polygon,
        orientations: &OrientationSet,
        pivot: RotationPivot,
        eps: f64,
    ) -> Option<Self> {
        if !configuration.is_mixed(polygon, eps) {
            return None;
        }
        let window = configuration.window(polygon).ok()?;
        let inner_dir = window.inner().direction()?;
        if orientations.is_aligned(&inner_dir, eps) {
            return None;
        }
        let previous_dir = window.previous().direction()?;
        let next_dir = window.next().direction()?;

        let mut best = orientations
            .directions()
            .map(|u| if u.dot(&inner_dir) < 0.0 { -u } else { u })
            .filter_map(|u| candidate(&window, inner_dir, previous_dir, next_dir, u, pivot, eps))
            .max_by(|a, b| a.swept_area.total_cmp(&b.swept_area))?;
        best.refresh_blocking(polygon, eps);
        Some(best)
    }

    /// Recomputes the blocking set against the current polygon.
    pub fn refresh_blocking(&mut self, polygon: &Polygon, eps: f64) {
        self.blocking = find_blocking(&self.regions(eps), polygon, &self.window.edges(), eps);
    }

    pub(crate) fn reindex(&mut self, index: usize) {
        self.window.index = index;
    }

    /// The two triangles between the old and the rotated edge.
    #[must_use]
    pub fn regions(&self, eps: f64) -> Vec<SweptRegion> {
        let [_, s, e, _] = self.window.points;
        vec![
            SweptRegion::new(&[s, self.rotated.start, self.pivot_point], eps),
            SweptRegion::new(&[self.pivot_point, e, self.rotated.end], eps),
        ]
    }

    #[must_use]
    pub fn pivot(&self) -> RotationPivot {
        self.pivot
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

    /// Unit direction of the rotated edge.
    #[must_use]
    pub fn orientation(&self) -> Vector2 {
        self.orientation
    }

    #[must_use]
    pub fn pivot_point(&self) -> Point2 {
        self.pivot_point
    }

    /// The inner edge after rotation.
    #[must_use]
    pub fn rotated(&self) -> Segment2 {
        self.rotated
    }

    /// Sum of the two swept triangle areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.swept_area
    }

    /// Signed change of the polygon area; positive when the polygon grows.
    #[must_use]
    pub fn net_area(&self) -> f64 {
        self.net_area
    }

    /// Number of window vertices the move merges into a neighbour.
    #[must_use]
    pub fn merges(&self) -> usize {
        self.merges
    }

    #[must_use]
    pub fn blocking(&self) -> &[Edge] {
        &self.blocking
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.blocking.is_empty()
    }

    /// Vertex writes for the rotation. Rotations only apply in full.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` unless `target` equals the
    /// swept area.
    pub fn targets(&self, target: f64, eps: f64) -> Result<Vec<(VertexId, Point2)>> {
        if (target - self.swept_area).abs() > eps {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "area",
                value: target,
                min: self.swept_area,
                max: self.swept_area,
            }
            .into());
        }
        Ok(vec![
            (self.window.ids[1], self.rotated.start),
            (self.window.ids[2], self.rotated.end),
        ])
    }
}

fn candidate(
    window: &Window,
    inner_dir: Vector2,
    previous_dir: Vector2,
    next_dir: Vector2,
    u: Vector2,
    pivot: RotationPivot,
    eps: f64,
) -> Option<RotationMove> {
    let [far_prev, s, e, far_next] = window.points;
    let param = match pivot {
        RotationPivot::Start => 0.0,
        RotationPivot::End => 1.0,
        RotationPivot::Middle => 0.5,
        RotationPivot::Compensating => compensating_parameter(inner_dir, previous_dir, next_dir, u, eps)?,
    };
    let p = s + (e - s) * param;
    let line = Line2::new(p, u);

    let mut new_start = if pivot == RotationPivot::Start {
        s
    } else {
        line.intersect(&Line2::new(s, previous_dir))?
    };
    let mut new_end = if pivot == RotationPivot::End {
        e
    } else {
        line.intersect(&Line2::new(e, next_dir))?
    };

    // Endpoints must stay on the rays from the far neighbours.
    if ray_parameter(&far_prev, &s, &new_start) < -eps || ray_parameter(&far_next, &e, &new_end) < -eps {
        return None;
    }
    let mut merges = 0;
    if (new_start - far_prev).norm() <= eps {
        new_start = far_prev;
        merges += 1;
    }
    if (new_end - far_next).norm() <= eps {
        new_end = far_next;
        merges += 1;
    }
    if (new_end - new_start).dot(&u) <= eps {
        return None;
    }
    // The stretched neighbours must not fold across each other.
    let previous = Segment2::new(far_prev, new_start);
    let next = Segment2::new(new_end, far_next);
    if segment_segment_intersect_2d(&previous, &next, eps).is_some() {
        return None;
    }

    let swept = triangle_area(&s, &new_start, &p) + triangle_area(&p, &e, &new_end);
    if swept <= eps {
        return None;
    }

    // Shoelace on coordinates relative to `s` keeps the difference well conditioned.
    let local = |q: Point2| Point2::from(q - s);
    let old = [far_prev, s, e, far_next].map(local);
    let new = [far_prev, new_start, new_end, far_next].map(local);
    let net_area = -chain_area_delta(&old, &new);
    if pivot == RotationPivot::Compensating && net_area.abs() > eps * (1.0 + swept) {
        return None;
    }

    Some(RotationMove {
        pivot,
        window: *window,
        orientation: u,
        pivot_point: p,
        rotated: Segment2::new(new_start, new_end),
        swept_area: swept,
        net_area,
        merges,
        blocking: Vec::new(),
    })
}

/// `λ` with `q = from + λ·(through − from)`, projected.
fn ray_parameter(from: &Point2, through: &Point2, q: &Point2) -> f64 {
    let d = through - from;
    (q - from).dot(&d) / d.norm_squared()
}

/// Pivot position `s ∈ (0, 1)` along the inner edge at which both swept
/// triangles have equal area: `(K1 − K2)·s² + 2·K2·s − K2 = 0`.
fn compensating_parameter(w: Vector2, previous: Vector2, next: Vector2, u: Vector2, eps: f64) -> Option<f64> {
    let sin_u = cross(&u, &w).abs();
    let k = |n: Vector2| {
        let denom = cross(&n, &u).abs();
        (denom > eps).then(|| sin_u * cross(&w, &n).abs() / denom)
    };
    let k1 = k(previous)?;
    let k2 = k(next)?;
    smallest_root_in(k1 - k2, 2.0 * k2, -k2, 0.0, 1.0, eps).filter(|s| *s > eps && *s < 1.0 - eps)
}
