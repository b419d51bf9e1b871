use std::time::Instant;

use crate::error::{OperationError, Result};
use crate::topology::{Edge, Polygon};

use super::config::SimplifyConfig;
use super::data::{ConfigurationReport, SimplificationData};
use super::decider::{Decider, DeciderRegistry};
use super::moves::Move;
use super::stats::{IterationStats, Statistics};

/// Where the driver stands between steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Decisions may still be available.
    Ready,
    /// The decider returned nothing on the last step.
    FixedPoint,
}

/// Runs a decider against a polygon step by step.
///
/// # Example
///
/// ```
/// use polycontract::math::Point2;
/// use polycontract::simplify::{Simplifier, SimplifyConfig};
/// use polycontract::topology::Polygon;
///
/// let polygon = Polygon::new(&[
///     Point2::new(0.0, 0.0),
///     Point2::new(0.0, 10.0),
///     Point2::new(5.0, 10.0),
///     Point2::new(5.0, 5.0),
///     Point2::new(10.0, 5.0),
///     Point2::new(10.0, 0.0),
/// ])?;
/// let mut simplifier = Simplifier::new(polygon, SimplifyConfig::default())?;
/// simplifier.run_to_fixed_point()?;
/// assert_eq!(simplifier.polygon().len(), 4);
/// # Ok::<(), polycontract::error::SimplifyError>(())
/// ```
#[derive(Debug)]
pub struct Simplifier {
    data: SimplificationData,
    decider: Box<dyn Decider>,
    config: SimplifyConfig,
    stats: Statistics,
    state: RunState,
}

impl Simplifier {
    /// Prepares a run with the decider named in `config`, looked up in the
    /// default registry.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnknownDecider` for an unregistered decider
    /// name, and the errors of [`SimplificationData::initialize`].
    pub fn new(polygon: Polygon, config: SimplifyConfig) -> Result<Self> {
        Self::with_registry(polygon, config, &DeciderRegistry::default())
    }

    /// Prepares a run with the decider named in `config`, looked up in
    /// `registry`.
    ///
    /// # Errors
    ///
    /// Same as [`Simplifier::new`].
    pub fn with_registry(
        polygon: Polygon,
        config: SimplifyConfig,
        registry: &DeciderRegistry,
    ) -> Result<Self> {
        let decider = registry.create(&config.decider, &config)?;
        let data = SimplificationData::initialize(polygon, &config)?;
        Ok(Self {
            data,
            decider,
            config,
            stats: Statistics::default(),
            state: RunState::Ready,
        })
    }

    /// Switches to another policy from `registry`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::UnknownDecider` if `name` is not registered;
    /// the current decider is kept.
    pub fn set_decider(&mut self, registry: &DeciderRegistry, name: &str) -> Result<()> {
        self.decider = registry.create(name, &self.config)?;
        name.clone_into(&mut self.config.decider);
        self.state = RunState::Ready;
        Ok(())
    }

    /// Asks the decider for decisions and applies them.
    ///
    /// Returns `Ok(false)` at a fixed point, without touching the polygon.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` when the decider proposes
    /// incompatible decisions, and any error of [`SimplificationData::apply`].
    pub fn step(&mut self) -> Result<bool> {
        let started = Instant::now();
        let decisions = self.decider.decide(&self.data);
        if decisions.is_empty() {
            self.state = RunState::FixedPoint;
            return Ok(false);
        }

        let moves: Vec<&Move> = decisions.iter().map(|d| &d.mv).collect();
        if !self.data.are_compatible(&moves) {
            tracing::warn!(
                decider = self.decider.name(),
                count = decisions.len(),
                "decider proposed incompatible decisions"
            );
            return Err(OperationError::InvalidInput(format!(
                "{} proposed {} incompatible decisions",
                self.decider.name(),
                decisions.len()
            ))
            .into());
        }

        let outcome = self.data.apply(&decisions)?;
        let step = IterationStats {
            decisions: outcome.decisions,
            vertices_removed: outcome.vertices_removed,
            area_affected: outcome.area_affected,
            net_area_change: outcome.net_area_change,
            elapsed: started.elapsed(),
        };
        tracing::debug!(
            iteration = self.stats.iterations + 1,
            decisions = step.decisions,
            removed = step.vertices_removed,
            area = step.area_affected,
            net = step.net_area_change,
            vertices = self.data.len(),
            "step applied"
        );
        self.stats.record(step);
        self.state = RunState::Ready;
        Ok(true)
    }

    /// Runs at most `n` steps; returns how many were applied.
    ///
    /// # Errors
    ///
    /// Propagates the first error of [`Simplifier::step`].
    pub fn run_n(&mut self, n: usize) -> Result<usize> {
        let mut applied = 0;
        while applied < n && self.step()? {
            applied += 1;
        }
        self.finish("run_n", applied);
        Ok(applied)
    }

    /// Runs until the polygon has at most `target` vertices or no decision
    /// remains; returns the number of steps applied.
    ///
    /// # Errors
    ///
    /// Propagates the first error of [`Simplifier::step`].
    pub fn run_until_vertex_count(&mut self, target: usize) -> Result<usize> {
        let mut applied = 0;
        while self.data.len() > target && self.step()? {
            applied += 1;
        }
        self.finish("run_until_vertex_count", applied);
        Ok(applied)
    }

    /// Runs until the decider returns nothing, bounded by
    /// `SimplifyConfig::max_iterations`; returns the number of steps applied.
    ///
    /// # Errors
    ///
    /// Propagates the first error of [`Simplifier::step`].
    pub fn run_to_fixed_point(&mut self) -> Result<usize> {
        let limit = self.config.max_iterations.unwrap_or(usize::MAX);
        let mut applied = 0;
        while applied < limit && self.step()? {
            applied += 1;
        }
        self.finish("run_to_fixed_point", applied);
        Ok(applied)
    }

    fn finish(&self, run: &str, applied: usize) {
        tracing::info!(
            run,
            decider = self.decider.name(),
            steps = applied,
            vertices = self.data.len(),
            area = self.data.polygon().area(),
            fixed_point = self.state == RunState::FixedPoint,
            "run finished"
        );
    }

    #[must_use]
    pub fn data(&self) -> &SimplificationData {
        &self.data
    }

    #[must_use]
    pub fn polygon(&self) -> &Polygon {
        self.data.polygon()
    }

    /// Consumes the driver and returns the simplified polygon.
    #[must_use]
    pub fn into_polygon(self) -> Polygon {
        self.data.into_polygon()
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub fn decider_name(&self) -> &'static str {
        self.decider.name()
    }

    /// See [`SimplificationData::inspect`].
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is outside the ring.
    pub fn inspect(&self, index: usize) -> Result<ConfigurationReport> {
        self.data.inspect(index)
    }

    #[must_use]
    pub fn self_intersections(&self) -> Vec<(Edge, Edge)> {
        self.data.self_intersections()
    }
}
