use std::collections::BTreeSet;

use crate::error::{GeometryError, OperationError, Result, TopologyError};
use crate::math::polygon_2d::{signed_area_2d, Turn};
use crate::math::Point2;
use crate::topology::{Edge, Polygon, VertexId};

use super::cleanup;
use super::config::{OrientationSet, SimplifyConfig};
use super::configuration::Configuration;
use super::moves::region::bounds_of;
use super::moves::{
    Decision, Move, MoveKind, NormalMove, NormalSign, PairNormalMove, RotationMove, RotationPivot, SweptRegion,
};

/// Polygons at or below this size are re-derived entirely after each step.
const FULL_REBUILD_LIMIT: usize = 5;

/// Reach of local re-derivation around a mutation site.
const WINDOW_REACH: usize = 2;
const PAIR_REACH: usize = 4;

/// Working state of a simplification: the polygon, one configuration per
/// vertex and every candidate move, all indexed by ring position.
#[derive(Debug, Clone)]
pub struct SimplificationData {
    polygon: Polygon,
    configurations: Vec<Configuration>,
    positive_moves: Vec<Option<NormalMove>>,
    negative_moves: Vec<Option<NormalMove>>,
    pair_moves: Vec<Option<PairNormalMove>>,
    rotation_moves: Vec<[Option<RotationMove>; 4]>,
    orientations: OrientationSet,
    tolerance: f64,
}

/// Outcome of applying one set of decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepOutcome {
    pub decisions: usize,
    pub vertices_removed: usize,
    /// Sum of the unsigned areas of the applied decisions.
    pub area_affected: f64,
    /// Measured change of the polygon area (positive when it grew).
    pub net_area_change: f64,
}

/// Short description of one candidate move, for introspection.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveSummary {
    pub kind: MoveKind,
    pub area: f64,
    pub net_area: f64,
    pub valid: bool,
    pub applicable: bool,
    pub blocking: Vec<Edge>,
}

/// Everything known about the configuration at one ring position.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationReport {
    pub index: usize,
    pub inner_start: Point2,
    pub inner_end: Point2,
    pub start_turn: Turn,
    pub end_turn: Turn,
    pub start_angle: f64,
    pub end_angle: f64,
    pub positive: Option<MoveSummary>,
    pub negative: Option<MoveSummary>,
    pub pair: Option<MoveSummary>,
    pub rotations: Vec<MoveSummary>,
}

impl SimplificationData {
    /// Builds configurations and all candidate moves for `polygon`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` for a non-positive
    /// tolerance and `OperationError::InvalidInput` if the polygon has
    /// redundant vertices or intersects itself.
    pub fn initialize(polygon: Polygon, config: &SimplifyConfig) -> Result<Self> {
        let eps = config.tolerance;
        if !(eps.is_finite() && eps > 0.0) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "tolerance",
                value: eps,
                min: 0.0,
                max: f64::MAX,
            }
            .into());
        }
        validate_polygon(&polygon, eps)?;

        let mut data = Self {
            polygon,
            configurations: Vec::new(),
            positive_moves: Vec::new(),
            negative_moves: Vec::new(),
            pair_moves: Vec::new(),
            rotation_moves: Vec::new(),
            orientations: config.orientations.clone(),
            tolerance: eps,
        };
        data.rebuild_all();
        tracing::debug!(vertices = data.polygon.len(), "simplification data initialized");
        Ok(data)
    }

    #[must_use]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Consumes the state and returns the simplified polygon.
    #[must_use]
    pub fn into_polygon(self) -> Polygon {
        self.polygon
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.polygon.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygon.is_empty()
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn orientations(&self) -> &OrientationSet {
        &self.orientations
    }

    #[must_use]
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    #[must_use]
    pub fn positive_moves(&self) -> &[Option<NormalMove>] {
        &self.positive_moves
    }

    #[must_use]
    pub fn negative_moves(&self) -> &[Option<NormalMove>] {
        &self.negative_moves
    }

    /// Pair moves, indexed by the later configuration of each pair.
    #[must_use]
    pub fn pair_moves(&self) -> &[Option<PairNormalMove>] {
        &self.pair_moves
    }

    /// Rotation moves per configuration, in [`RotationPivot::ALL`] order.
    #[must_use]
    pub fn rotation_moves(&self) -> &[[Option<RotationMove>; 4]] {
        &self.rotation_moves
    }

    /// All stored moves of one kind, in ring order.
    #[must_use]
    pub fn moves(&self, kind: MoveKind) -> Vec<Move> {
        match kind {
            MoveKind::Positive => self.positive_moves.iter().flatten().cloned().map(Move::Normal).collect(),
            MoveKind::Negative => self.negative_moves.iter().flatten().cloned().map(Move::Normal).collect(),
            MoveKind::Pair => self.pair_moves.iter().flatten().cloned().map(Move::Pair).collect(),
            _ => {
                let Some(pivot) = kind.pivot() else {
                    return Vec::new();
                };
                self.rotation_moves
                    .iter()
                    .filter_map(|r| r[pivot.slot()].clone())
                    .map(Move::Rotation)
                    .collect()
            }
        }
    }

    /// Stored moves of one kind that may be applied now, in ring order.
    #[must_use]
    pub fn applicable_moves(&self, kind: MoveKind) -> Vec<Move> {
        self.moves(kind).into_iter().filter(|m| self.is_applicable(m)).collect()
    }

    /// A move is applicable when it is valid, still matches the polygon, and
    /// applying it in full leaves at least three vertices and positive area.
    #[must_use]
    pub fn is_applicable(&self, mv: &Move) -> bool {
        let eps = self.tolerance;
        let n = self.polygon.len();
        let net = mv.net_area();
        mv.is_valid()
            && mv.is_current(&self.polygon, eps)
            && n >= 3 + mv.merges()
            && (net >= 0.0 || -net < self.polygon.area() - eps)
    }

    /// Returns `true` if no two moves share an edge or overlapping regions.
    #[must_use]
    pub fn are_compatible(&self, moves: &[&Move]) -> bool {
        moves.iter().enumerate().all(|(i, a)| {
            moves[i + 1..]
                .iter()
                .all(|b| a.is_compatible(b, self.tolerance))
        })
    }

    /// Applies a set of decisions atomically.
    ///
    /// # Errors
    ///
    /// Nothing is mutated when validation fails:
    /// - `OperationError::Blocked` for an invalid move,
    /// - `GeometryError::ParameterOutOfRange` for an area the move cannot sweep,
    /// - `OperationError::Failed` for a stale snapshot or a step that would
    ///   degenerate the polygon,
    /// - `OperationError::InvalidInput` for incompatible decisions.
    ///
    /// A `TopologyError` after commit means the index invariant broke.
    pub fn apply(&mut self, decisions: &[Decision]) -> Result<StepOutcome> {
        if decisions.is_empty() {
            return Ok(StepOutcome::default());
        }
        let eps = self.tolerance;

        // Step 1: validate.
        for d in decisions {
            let mv = &d.mv;
            if !mv.is_valid() {
                return Err(OperationError::Blocked(format!(
                    "{:?} move at {} crosses {} edge(s)",
                    mv.kind(),
                    mv.index(),
                    mv.blocking().len()
                ))
                .into());
            }
            if !(d.area > 0.0 && d.area <= mv.area() + eps) {
                return Err(GeometryError::ParameterOutOfRange {
                    parameter: "area",
                    value: d.area,
                    min: 0.0,
                    max: mv.area(),
                }
                .into());
            }
            if !mv.is_current(&self.polygon, eps) {
                return Err(OperationError::Failed(format!(
                    "{:?} move at {} no longer matches the polygon",
                    mv.kind(),
                    mv.index()
                ))
                .into());
            }
        }
        let refs: Vec<&Move> = decisions.iter().map(|d| &d.mv).collect();
        if !self.are_compatible(&refs) {
            return Err(OperationError::InvalidInput("decisions rewrite overlapping geometry".to_owned()).into());
        }

        // Step 2: stage the writes and plan the cleanup.
        let n = self.polygon.len();
        let mut writes: Vec<(VertexId, Point2)> = Vec::new();
        for d in decisions {
            writes.extend(d.mv.targets(d.area, eps)?);
        }
        let mut staged = self.polygon.points();
        let mut written = Vec::with_capacity(writes.len());
        for (id, p) in &writes {
            let index = self
                .polygon
                .index_of(*id)
                .ok_or_else(|| TopologyError::EntityNotFound("written vertex".into()))?;
            staged[index] = *p;
            written.push(index);
        }
        let seeds: Vec<usize> = decisions
            .iter()
            .filter(|d| d.cleanup)
            .flat_map(|d| d.mv.windows().into_iter().map(|w| w.index).collect::<Vec<_>>())
            .flat_map(|i| self.configurations[i].cleanup_seeds(n))
            .collect();
        let removed = cleanup::plan(&staged, &seeds, &written, eps);
        if n - removed.len() < 3 {
            return Err(OperationError::Failed("step would leave fewer than 3 vertices".to_owned()).into());
        }
        let remaining: Vec<Point2> = staged
            .iter()
            .enumerate()
            .filter(|(i, _)| removed.binary_search(i).is_err())
            .map(|(_, p)| *p)
            .collect();
        if signed_area_2d(&remaining).abs() <= eps {
            return Err(OperationError::Failed("step would leave no area".to_owned()).into());
        }

        // Step 3: commit.
        let old_area = self.polygon.area();
        let mut dirty: Vec<Point2> = writes.iter().map(|(_, p)| *p).collect();
        for (i, p) in self.polygon.points().into_iter().enumerate() {
            if written.contains(&i) || removed.binary_search(&i).is_ok() {
                dirty.push(p);
            }
        }
        let mut touched: Vec<VertexId> = writes.iter().map(|(id, _)| *id).collect();
        for (id, p) in &writes {
            self.polygon.set_point(*id, *p)?;
        }
        touched.extend(self.polygon.remove_indices(&removed)?);
        for r in removed.iter().rev() {
            self.configurations.remove(*r);
            self.positive_moves.remove(*r);
            self.negative_moves.remove(*r);
            self.pair_moves.remove(*r);
            self.rotation_moves.remove(*r);
        }

        // Step 4: re-derive around the mutation sites.
        let sites = self.mutation_sites(&writes, &removed);
        self.rederive(&sites, &dirty, &touched);

        // Step 5: verify.
        self.check_invariants()?;

        Ok(StepOutcome {
            decisions: decisions.len(),
            vertices_removed: removed.len(),
            area_affected: decisions.iter().map(|d| d.area).sum(),
            net_area_change: self.polygon.area() - old_area,
        })
    }

    /// Checks the index invariant of every configuration and stored move.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::IndexMismatch` for the first stale entry.
    pub fn check_invariants(&self) -> Result<()> {
        let n = self.polygon.len();
        let lengths = [
            self.configurations.len(),
            self.positive_moves.len(),
            self.negative_moves.len(),
            self.pair_moves.len(),
            self.rotation_moves.len(),
        ];
        if let Some(bad) = lengths.iter().find(|l| **l != n) {
            return Err(TopologyError::InvalidTopology(format!("{bad} entries for a ring of {n} vertices")).into());
        }
        for (i, c) in self.configurations.iter().enumerate() {
            c.check(&self.polygon, i)?;
        }
        for i in 0..n {
            let stored = self.positive_moves[i]
                .iter()
                .chain(self.negative_moves[i].iter())
                .map(NormalMove::index)
                .chain(self.pair_moves[i].iter().map(PairNormalMove::index))
                .chain(self.rotation_moves[i].iter().flatten().map(RotationMove::index));
            for index in stored {
                if index != i {
                    return Err(TopologyError::IndexMismatch { index, expected: i }.into());
                }
            }
        }
        Ok(())
    }

    /// Introspection of the configuration at ring position `index`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if `index` is outside the ring.
    pub fn inspect(&self, index: usize) -> Result<ConfigurationReport> {
        let n = self.polygon.len();
        if index >= n {
            #[allow(clippy::cast_precision_loss)]
            let (value, max) = (index as f64, n.saturating_sub(1) as f64);
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "index",
                value,
                min: 0.0,
                max,
            }
            .into());
        }
        let eps = self.tolerance;
        let c = &self.configurations[index];
        let summary = |mv: Move| MoveSummary {
            kind: mv.kind(),
            area: mv.area(),
            net_area: mv.net_area(),
            valid: mv.is_valid(),
            applicable: self.is_applicable(&mv),
            blocking: mv.blocking(),
        };
        Ok(ConfigurationReport {
            index,
            inner_start: self.polygon.point_at(index),
            inner_end: self.polygon.point_at(index + 1),
            start_turn: c.start_turn(&self.polygon, eps),
            end_turn: c.end_turn(&self.polygon, eps),
            start_angle: c.start_angle(&self.polygon),
            end_angle: c.end_angle(&self.polygon),
            positive: self.positive_moves[index].clone().map(Move::Normal).map(summary),
            negative: self.negative_moves[index].clone().map(Move::Normal).map(summary),
            pair: self.pair_moves[index].clone().map(Move::Pair).map(summary),
            rotations: self.rotation_moves[index]
                .iter()
                .flatten()
                .cloned()
                .map(Move::Rotation)
                .map(summary)
                .collect(),
        })
    }

    /// Pairs of non-adjacent polygon edges that intersect.
    #[must_use]
    pub fn self_intersections(&self) -> Vec<(Edge, Edge)> {
        self.polygon.self_intersections(self.tolerance)
    }

    fn rebuild_all(&mut self) {
        let n = self.polygon.len();
        self.configurations = (0..n).map(|i| Configuration::new(&self.polygon, i)).collect();
        self.positive_moves = vec![None; n];
        self.negative_moves = vec![None; n];
        self.pair_moves = vec![None; n];
        self.rotation_moves = vec![[None, None, None, None]; n];
        for i in 0..n {
            self.derive_window(i);
        }
        for i in 0..n {
            self.derive_pair(i);
        }
    }

    fn derive_window(&mut self, i: usize) {
        let eps = self.tolerance;
        let c = &self.configurations[i];
        self.positive_moves[i] = NormalMove::compute(c, &self.polygon, NormalSign::Positive, eps);
        self.negative_moves[i] = NormalMove::compute(c, &self.polygon, NormalSign::Negative, eps);
        self.rotation_moves[i] =
            RotationPivot::ALL.map(|pivot| RotationMove::compute(c, &self.polygon, &self.orientations, pivot, eps));
    }

    fn derive_pair(&mut self, i: usize) {
        let n = self.polygon.len();
        self.pair_moves[i] = if n >= 4 {
            let a = &self.configurations[(i + n - 2) % n];
            PairNormalMove::compute(a, &self.configurations[i], &self.polygon, self.tolerance)
        } else {
            None
        };
    }

    /// Post-commit ring positions of every written vertex and of the
    /// survivors on both sides of every removed one.
    fn mutation_sites(&self, writes: &[(VertexId, Point2)], removed: &[usize]) -> Vec<usize> {
        let n = self.polygon.len();
        let mut sites: Vec<usize> = writes.iter().filter_map(|(id, _)| self.polygon.index_of(*id)).collect();
        for (k, r) in removed.iter().enumerate() {
            // `k` earlier removals shift the follower of `r` down by `k`.
            let follower = (r - k) % n;
            sites.push(follower);
            sites.push((follower + n - 1) % n);
        }
        sites
    }

    fn rederive(&mut self, sites: &[usize], dirty: &[Point2], touched: &[VertexId]) {
        let n = self.polygon.len();
        self.configurations = (0..n).map(|i| Configuration::new(&self.polygon, i)).collect();
        if n <= FULL_REBUILD_LIMIT {
            tracing::trace!(vertices = n, "small polygon, rebuilding every move");
            self.rebuild_all();
            return;
        }

        for i in 0..n {
            self.reindex_moves(i, n);
        }
        let around = |reach: usize| -> BTreeSet<usize> {
            sites
                .iter()
                .flat_map(|s| (0..=2 * reach).map(move |d| (s + n + d - reach) % n))
                .collect()
        };
        let windows = around(WINDOW_REACH.min(n / 2));
        let pairs = around(PAIR_REACH.min(n / 2));
        tracing::trace!(?windows, ?pairs, "re-deriving moves");
        for i in &windows {
            self.derive_window(*i);
        }
        for i in &pairs {
            self.derive_pair(*i);
        }

        let eps = self.tolerance;
        let (min, max) = bounds_of(&self.dirty_points(dirty, sites));
        let stale = |regions: &[SweptRegion], blocking: &[Edge]| {
            blocking.iter().any(|e| touched.contains(&e.start) || touched.contains(&e.end))
                || regions.iter().any(|r| {
                    let (a, b) = r.bounds();
                    a.x <= max.x + eps && min.x <= b.x + eps && a.y <= max.y + eps && min.y <= b.y + eps
                })
        };
        for i in (0..n).filter(|i| !windows.contains(i)) {
            for m in self.positive_moves[i].iter_mut().chain(self.negative_moves[i].iter_mut()) {
                if stale(&[m.region(eps)], m.blocking()) {
                    m.refresh_blocking(&self.polygon, eps);
                }
            }
            for m in self.rotation_moves[i].iter_mut().flatten() {
                if stale(&m.regions(eps), m.blocking()) {
                    m.refresh_blocking(&self.polygon, eps);
                }
            }
        }
        for i in (0..n).filter(|i| !pairs.contains(i)) {
            if let Some(m) = self.pair_moves[i].as_mut() {
                if stale(&m.regions(eps), &m.blocking()) {
                    m.refresh_blocking(&self.polygon, eps);
                }
            }
        }
    }

    /// Changed positions plus the nearest surviving neighbours of each site.
    fn dirty_points(&self, dirty: &[Point2], sites: &[usize]) -> Vec<Point2> {
        let mut points = dirty.to_vec();
        for s in sites {
            points.push(self.polygon.point_at(*s + self.polygon.len() - 1));
            points.push(self.polygon.point_at(*s));
            points.push(self.polygon.point_at(*s + 1));
        }
        points
    }

    fn reindex_moves(&mut self, i: usize, n: usize) {
        for m in self.positive_moves[i].iter_mut().chain(self.negative_moves[i].iter_mut()) {
            m.reindex(i);
        }
        if let Some(m) = self.pair_moves[i].as_mut() {
            m.reindex(i, n);
        }
        for m in self.rotation_moves[i].iter_mut().flatten() {
            m.reindex(i);
        }
    }
}

/// Rejects inputs with redundant vertices or self-intersections.
fn validate_polygon(polygon: &Polygon, eps: f64) -> Result<()> {
    for i in 0..polygon.len() {
        let c = Configuration::new(polygon, i);
        if c.start_turn(polygon, eps) == Turn::Degenerate {
            return Err(OperationError::InvalidInput(format!(
                "vertex {i} at {:?} is redundant",
                polygon.point_at(i)
            ))
            .into());
        }
    }
    let crossings = polygon.self_intersections(eps);
    if !crossings.is_empty() {
        return Err(
            OperationError::InvalidInput(format!("polygon has {} self-intersection(s)", crossings.len())).into(),
        );
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SimplifyError;
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

    fn data(polygon: Polygon) -> SimplificationData {
        SimplificationData::initialize(polygon, &SimplifyConfig::default()).unwrap()
    }

    /// Staircase with three reflex steps, large enough for local updates.
    fn staircase() -> Polygon {
        Polygon::new(&[
            p(0.0, 0.0),
            p(0.0, 12.0),
            p(3.0, 12.0),
            p(3.0, 9.0),
            p(6.0, 9.0),
            p(6.0, 6.0),
            p(9.0, 6.0),
            p(9.0, 3.0),
            p(12.0, 3.0),
            p(12.0, 0.0),
        ])
        .unwrap()
    }

    // ── initialization ──

    #[test]
    fn initialize_builds_every_slot() {
        let d = data(l_shape());
        assert_eq!(d.configurations().len(), 6);
        assert_eq!(d.positive_moves().len(), 6);
        assert!(d.positive_moves()[3].is_some());
        assert!(d.positive_moves()[0].is_none());
        assert!(d.negative_moves()[0].is_some());
        assert!(d.pair_moves()[3].is_some());
        assert!(d.pair_moves()[4].is_some());
        assert!(d.pair_moves()[0].is_none());
        assert!(d.check_invariants().is_ok());
    }

    #[test]
    fn initialize_rejects_bad_input() {
        let straight = Polygon::new(&[p(0.0, 0.0), p(0.0, 5.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)]).unwrap();
        assert!(matches!(
            SimplificationData::initialize(straight, &SimplifyConfig::default()),
            Err(SimplifyError::Operation(OperationError::InvalidInput(_)))
        ));

        let bowtie = Polygon::new(&[p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0), p(-5.0, 5.0)]).unwrap();
        assert!(SimplificationData::initialize(bowtie, &SimplifyConfig::default()).is_err());

        let config = SimplifyConfig::default().with_tolerance(0.0);
        assert!(matches!(
            SimplificationData::initialize(l_shape(), &config),
            Err(SimplifyError::Geometry(GeometryError::ParameterOutOfRange { .. }))
        ));
    }

    #[test]
    fn square_has_nothing_applicable() {
        let d = data(Polygon::new(&[p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)]).unwrap());
        for kind in MoveKind::ALL {
            assert!(d.applicable_moves(kind).is_empty(), "{kind:?}");
        }
    }

    // ── apply ──

    #[test]
    fn positive_move_fills_notch() {
        let mut d = data(l_shape());
        let mv = d.applicable_moves(MoveKind::Positive).remove(0);
        // Both notch walls can slide out; the lower index comes first.
        assert_eq!(mv.index(), 2);
        let outcome = d.apply(&[Decision::full(mv)]).unwrap();
        assert_eq!(d.len(), 4);
        assert_eq!(outcome.vertices_removed, 2);
        assert_abs_diff_eq!(outcome.net_area_change, 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.polygon().area(), 100.0, epsilon = 1e-9);
        assert!(d.check_invariants().is_ok());
        assert!(d.applicable_moves(MoveKind::Positive).is_empty());
    }

    #[test]
    fn pair_move_keeps_area() {
        let mut d = data(l_shape());
        let mv = d.applicable_moves(MoveKind::Pair).remove(0);
        assert_eq!(mv.index(), 3);
        let outcome = d.apply(&[Decision::full(mv)]).unwrap();
        assert_eq!(d.len(), 4);
        assert_abs_diff_eq!(outcome.net_area_change, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.polygon().area(), 75.0, epsilon = 1e-9);
        assert!(d.self_intersections().is_empty());
    }

    #[test]
    fn partial_move_keeps_vertex_count() {
        let mut d = data(l_shape());
        let mv = d.positive_moves()[3].clone().map(Move::Normal).unwrap();
        let outcome = d.apply(&[Decision::partial(mv, 10.0, d.tolerance())]).unwrap();
        assert_eq!(outcome.vertices_removed, 0);
        assert_eq!(d.len(), 6);
        assert_abs_diff_eq!(d.polygon().area(), 85.0, epsilon = 1e-9);
        let report = d.inspect(3).unwrap();
        assert_abs_diff_eq!(report.inner_start.y, 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.positive.unwrap().area, 15.0, epsilon = 1e-9);
    }

    #[test]
    fn stale_decision_rejected_without_mutation() {
        let mut d = data(l_shape());
        let mv = d.applicable_moves(MoveKind::Positive).remove(0);
        d.apply(&[Decision::partial(mv.clone(), 10.0, d.tolerance())]).unwrap();
        let before = d.polygon().points();
        assert!(matches!(
            d.apply(&[Decision::full(mv)]),
            Err(SimplifyError::Operation(OperationError::Failed(_)))
        ));
        assert_eq!(d.polygon().points(), before);
    }

    #[test]
    fn blocked_move_rejected() {
        let overhang = Polygon::new(&[
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
        let mut d = data(overhang);
        let mv = d.positive_moves()[3].clone().map(Move::Normal).unwrap();
        assert!(!d.is_applicable(&mv));
        assert!(matches!(
            d.apply(&[Decision::full(mv)]),
            Err(SimplifyError::Operation(OperationError::Blocked(_)))
        ));
        assert_eq!(d.len(), 12);
    }

    #[test]
    fn over_sized_area_rejected() {
        let mut d = data(l_shape());
        let mv = d.applicable_moves(MoveKind::Positive).remove(0);
        assert!(matches!(
            d.apply(&[Decision::partial(mv, 30.0, d.tolerance())]),
            Err(SimplifyError::Geometry(GeometryError::ParameterOutOfRange { .. }))
        ));
        assert_eq!(d.len(), 6);
    }

    #[test]
    fn incompatible_decisions_rejected() {
        let mut d = data(l_shape());
        let pos = d.applicable_moves(MoveKind::Positive).remove(0);
        let neg = d.negative_moves()[2].clone().map(Move::Normal).unwrap();
        assert!(!d.are_compatible(&[&pos, &neg]));
        assert!(matches!(
            d.apply(&[Decision::full(pos), Decision::full(neg)]),
            Err(SimplifyError::Operation(OperationError::InvalidInput(_)))
        ));
    }

    #[test]
    fn local_update_matches_full_rebuild() {
        let mut d = data(staircase());
        let mv = d.positive_moves()[5].clone().map(Move::Normal).unwrap();
        d.apply(&[Decision::full(mv)]).unwrap();
        assert!(d.len() > FULL_REBUILD_LIMIT);

        let fresh = data(d.polygon().clone());
        assert_eq!(d.positive_moves(), fresh.positive_moves());
        assert_eq!(d.negative_moves(), fresh.negative_moves());
        assert_eq!(d.pair_moves(), fresh.pair_moves());
        assert_eq!(d.rotation_moves(), fresh.rotation_moves());
    }

    #[test]
    fn inspect_reports_move_candidates() {
        let d = data(l_shape());
        let report = d.inspect(3).unwrap();
        assert_eq!(report.start_turn, Turn::Reflex);
        assert_eq!(report.end_turn, Turn::Convex);
        assert!(report.positive.as_ref().is_some_and(|m| m.valid && m.applicable));
        assert!(report.pair.is_some());
        assert!(report.rotations.is_empty());
        assert!(d.inspect(6).is_err());
    }

    #[test]
    fn capped_pair_removes_the_short_side() {
        let shallow_top = Polygon::new(&[
            p(0.0, 8.0),
            p(0.0, 10.0),
            p(3.0, 10.0),
            p(3.0, 5.0),
            p(10.0, 5.0),
            p(10.0, 0.0),
            p(-2.0, 0.0),
            p(-2.0, 8.0),
        ])
        .unwrap();
        let before = shallow_top.area();
        let mut d = data(shallow_top);
        let mv = d.pair_moves()[3].clone().map(Move::Pair).unwrap();
        assert!(d.is_applicable(&mv));

        let outcome = d.apply(&[Decision::full(mv)]).unwrap();
        assert!(outcome.vertices_removed >= 1);
        assert!(outcome.net_area_change.abs() <= 2.0 * crate::math::TOLERANCE);
        assert_eq!(d.len(), 6);
        assert_abs_diff_eq!(d.polygon().area(), before, epsilon = 1e-9);
        assert!(d.self_intersections().is_empty());
    }
}
