use std::time::Duration;

/// Measurements of one applied step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationStats {
    pub decisions: usize,
    pub vertices_removed: usize,
    /// Sum of the unsigned areas of the applied decisions.
    pub area_affected: f64,
    /// Signed change of the polygon area.
    pub net_area_change: f64,
    pub elapsed: Duration,
}

/// Running totals over a simplification run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub iterations: usize,
    pub decisions: usize,
    pub vertices_removed: usize,
    pub area_affected: f64,
    pub net_area_change: f64,
    pub elapsed: Duration,
    history: Vec<IterationStats>,
}

impl Statistics {
    /// Adds one step to the totals.
    pub fn record(&mut self, step: IterationStats) {
        self.iterations += 1;
        self.decisions += step.decisions;
        self.vertices_removed += step.vertices_removed;
        self.area_affected += step.area_affected;
        self.net_area_change += step.net_area_change;
        self.elapsed += step.elapsed;
        self.history.push(step);
    }

    /// Per-step measurements in application order.
    #[must_use]
    pub fn history(&self) -> &[IterationStats] {
        &self.history
    }

    #[must_use]
    pub fn last(&self) -> Option<&IterationStats> {
        self.history.last()
    }

    /// Mean wall time per step, zero before the first step.
    #[must_use]
    pub fn mean_elapsed(&self) -> Duration {
        u32::try_from(self.iterations)
            .ok()
            .filter(|n| *n > 0)
            .map_or(Duration::ZERO, |n| self.elapsed / n)
    }
}
