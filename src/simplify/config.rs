use std::f64::consts::PI;

use crate::error::{GeometryError, Result};
use crate::math::{cross, Vector2, TOLERANCE};

/// The fixed set of edge orientations rotation moves may snap to.
///
/// Orientations are undirected: an angle `θ` and `θ + π` describe the same
/// line direction, so all angles are kept in `[0, π)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationSet {
    angles: Vec<f64>,
}

impl OrientationSet {
    /// `c` evenly spaced orientations starting at angle 0.
    ///
    /// `c = 2` is the rectilinear set, `c = 4` adds the diagonals.
    #[must_use]
    pub fn c_oriented(c: usize) -> Self {
        Self::with_offset(c, 0.0)
    }

    /// `c` evenly spaced orientations rotated by `offset` radians.
    #[must_use]
    pub fn with_offset(c: usize, offset: f64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let step = if c == 0 { 0.0 } else { PI / c as f64 };
        #[allow(clippy::cast_precision_loss)]
        let angles = (0..c).map(|k| normalize(offset + step * k as f64)).collect();
        Self { angles }
    }

    /// An explicit list of orientation angles in radians.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::ParameterOutOfRange` if an angle is not finite.
    pub fn from_angles(angles: &[f64]) -> Result<Self> {
        if let Some(bad) = angles.iter().find(|a| !a.is_finite()) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "orientation",
                value: *bad,
                min: f64::MIN,
                max: f64::MAX,
            }
            .into());
        }
        let mut normalized: Vec<f64> = angles.iter().map(|a| normalize(*a)).collect();
        normalized.sort_by(f64::total_cmp);
        normalized.dedup_by(|a, b| (*a - *b).abs() < TOLERANCE);
        Ok(Self { angles: normalized })
    }

    /// Returns the orientation angles in `[0, π)`.
    #[must_use]
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Returns `true` if the set allows no orientation at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// Unit direction vectors for every orientation.
    pub fn directions(&self) -> impl Iterator<Item = Vector2> + '_ {
        self.angles.iter().map(|a| Vector2::new(a.cos(), a.sin()))
    }

    /// Returns `true` if `dir` (a unit vector) is parallel to an allowed orientation.
    #[must_use]
    pub fn is_aligned(&self, dir: &Vector2, eps: f64) -> bool {
        self.directions().any(|d| cross(&d, dir).abs() < eps)
    }
}

impl Default for OrientationSet {
    fn default() -> Self {
        Self::c_oriented(2)
    }
}

fn normalize(angle: f64) -> f64 {
    let a = angle.rem_euclid(PI);
    if (a - PI).abs() < TOLERANCE {
        0.0
    } else {
        a
    }
}

/// Parameters controlling a simplification run.
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Tolerance for every geometric predicate.
    pub tolerance: f64,
    /// Orientations rotation moves may snap to.
    pub orientations: OrientationSet,
    /// Registry name of the decider policy.
    pub decider: String,
    /// Pair rotation moves with a compensating normal move elsewhere.
    pub compensate_rotations: bool,
    /// Upper bound on iterations for `run_to_fixed_point`; `None` is unbounded.
    pub max_iterations: Option<usize>,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            tolerance: TOLERANCE,
            orientations: OrientationSet::default(),
            decider: "minimal-complementary-pair".to_owned(),
            compensate_rotations: true,
            max_iterations: None,
        }
    }
}

impl SimplifyConfig {
    /// Sets the geometric tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the orientation set used by rotation moves.
    #[must_use]
    pub fn with_orientations(mut self, orientations: OrientationSet) -> Self {
        self.orientations = orientations;
        self
    }

    /// Selects the decider policy by registry name.
    #[must_use]
    pub fn with_decider(mut self, name: &str) -> Self {
        name.clone_into(&mut self.decider);
        self
    }

    /// Enables or disables compensation of rotation moves.
    #[must_use]
    pub fn with_compensated_rotations(mut self, enabled: bool) -> Self {
        self.compensate_rotations = enabled;
        self
    }

    /// Bounds the number of iterations of `run_to_fixed_point`.
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }
}
