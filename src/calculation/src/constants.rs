/// Numerical constants and tuning parameters for the lifting-line solvers.
///
/// Every literal the solvers depend on (grid sizes, lift-curve slope, pass
/// counts, empirical formation gains) lives here so that tests can run on
/// smaller grids and analyses can be tuned without touching solver code.

use serde::{Deserialize, Serialize};

use crate::error::{AeroError, Result};

/// Thin-airfoil lift-curve slope (per radian).
pub const THIN_AIRFOIL_SLOPE: f64 = 2.0 * std::f64::consts::PI;

/// Discretisation used by the least-squares interference model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiftingLineConfig {
    /// Number of spanwise stations, tip to tip inclusive.
    pub station_count: usize,

    /// Number of sine harmonics in the circulation series.
    pub harmonic_count: usize,

    /// Section lift-curve slope a₀ (per radian).
    pub lift_curve_slope: f64,
}

impl LiftingLineConfig {
    /// 101 stations and 20 harmonics.
    pub const fn new() -> Self {
        Self {
            station_count: 101,
            harmonic_count: 20,
            lift_curve_slope: THIN_AIRFOIL_SLOPE,
        }
    }

    /// A coarse grid, useful for quick sweeps and tests.
    pub const fn coarse() -> Self {
        Self {
            station_count: 41,
            harmonic_count: 8,
            lift_curve_slope: THIN_AIRFOIL_SLOPE,
        }
    }

    /// Check the grid can support the requested harmonics.
    pub fn validate(&self) -> Result<()> {
        if self.harmonic_count == 0 {
            return Err(AeroError::Config("harmonic_count must be at least 1".into()));
        }
        // Both tip stations carry sin θ = 0 and add nothing to the fit.
        if self.station_count < self.harmonic_count + 2 {
            return Err(AeroError::Config(format!(
                "station_count ({}) must exceed harmonic_count ({}) by at least 2",
                self.station_count, self.harmonic_count
            )));
        }
        if !(self.lift_curve_slope > 0.0) {
            return Err(AeroError::Config("lift_curve_slope must be positive".into()));
        }
        Ok(())
    }
}

impl Default for LiftingLineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-point relaxation settings for the interference model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxationConfig {
    /// Maximum number of Gauss-Seidel passes over the wing set.
    pub passes: usize,

    /// Stop early once the largest coefficient change of a pass falls below
    /// this value. `None` always runs every pass.
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl RelaxationConfig {
    /// Ten passes, no tolerance.
    pub const fn new() -> Self {
        Self {
            passes: 10,
            tolerance: None,
        }
    }

    /// Enable early stopping.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// At least one pass and a positive tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.passes == 0 {
            return Err(AeroError::Config("passes must be at least 1".into()));
        }
        if let Some(tol) = self.tolerance {
            if !(tol > 0.0) {
                return Err(AeroError::Config("tolerance must be positive".into()));
            }
        }
        Ok(())
    }
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Empirical parameters of the sequential leader/follower model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationParams {
    /// Gain applied to the upwash angle induced by the preceding aircraft.
    pub upwash_gain: f64,

    /// Parasitic (zero-lift) drag coefficient CD₀ added to every aircraft.
    pub parasitic_drag: f64,
}

impl FormationParams {
    /// Gain 0.15 and CD₀ = 0.02.
    pub const fn new() -> Self {
        Self {
            upwash_gain: 0.15,
            parasitic_drag: 0.02,
        }
    }

    /// Reject a negative CD₀.
    pub fn validate(&self) -> Result<()> {
        if self.parasitic_drag < 0.0 {
            return Err(AeroError::Config("parasitic_drag must not be negative".into()));
        }
        Ok(())
    }
}

impl Default for FormationParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Geometry factors of the V formation used by the angle sweep.
pub mod v_formation {
    /// Streamwise spacing between rows, as a fraction of span.
    pub const SPACING_X_FACTOR: f64 = 0.9;

    /// Lateral spacing between rows, as a fraction of span.
    pub const SPACING_Y_FACTOR: f64 = 0.8;

    /// Followers fly at this fraction of the leader's angle of attack.
    pub const FOLLOWER_ALPHA_FACTOR: f64 = 0.9;
}
