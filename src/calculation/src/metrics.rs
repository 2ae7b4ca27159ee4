/// Derived performance metrics from solved coefficients.
///
/// These are the quantities the reports compare between isolated and
/// formation flight: aerodynamic efficiency, its relative improvement, and
/// drag reduction against a reference aircraft.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AeroError, Result};
use crate::solver::LiftingLineSolver;

/// Lift and induced-drag coefficients of one aircraft at one condition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroPoint {
    /// CL.
    pub lift: f64,
    /// CDi.
    pub induced_drag: f64,
}

impl AeroPoint {
    /// Point from raw coefficients.
    pub const fn new(lift: f64, induced_drag: f64) -> Self {
        Self { lift, induced_drag }
    }

    /// Query a solved strategy for its coefficients.
    pub fn from_solver(solver: &dyn LiftingLineSolver) -> Result<Self> {
        let point = Self::new(solver.lift()?, solver.induced_drag()?);
        debug!(
            method = solver.method(),
            aspect_ratio = solver.aspect_ratio(),
            cl = point.lift,
            cdi = point.induced_drag,
            "coefficients"
        );
        Ok(point)
    }

    /// CL/CDi.
    pub fn efficiency(&self) -> Result<f64> {
        if self.induced_drag == 0.0 {
            return Err(AeroError::ZeroLiftDegeneracy);
        }
        Ok(self.lift / self.induced_drag)
    }

    /// Efficiency change relative to `reference`, in percent.
    pub fn efficiency_gain_pct(&self, reference: &AeroPoint) -> Result<f64> {
        Ok((self.efficiency()? / reference.efficiency()? - 1.0) * 100.0)
    }
}

/// (reference − drag)/reference × 100. Positive when `drag` is lower.
#[inline]
pub fn drag_reduction_pct(reference_drag: f64, drag: f64) -> f64 {
    (reference_drag - drag) / reference_drag * 100.0
}

/// Index of the value closest to `target`.
pub fn closest_index(values: &[f64], target: f64) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - target).abs().total_cmp(&(b.1 - target).abs()))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::{FourierLiftingLine, WingGeometry};
    use crate::vector::Vec3;
    use crate::wing::WingState;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_from_either_strategy() {
        let mut wing = WingState::new(10.0, 1.0, 5.0, Vec3::zero(), "solo").unwrap();
        wing.elliptic_circulation();
        let mut fourier = FourierLiftingLine::new(WingGeometry::elliptic(10.0, 10.0, 0.0).unwrap());
        fourier.solve(5f64.to_radians(), &[PI / 2.0], &[1]).unwrap();

        let solvers: [&dyn LiftingLineSolver; 2] = [&wing, &fourier];
        assert_ne!(solvers[0].method(), solvers[1].method());
        for solver in solvers {
            let point = AeroPoint::from_solver(solver).unwrap();
            assert!(point.lift > 0.0);
            assert_relative_eq!(point.efficiency().unwrap(), solver.efficiency().unwrap(), max_relative = 1e-12);
        }

        let unsolved = FourierLiftingLine::new(WingGeometry::elliptic(10.0, 10.0, 0.0).unwrap());
        assert_eq!(AeroPoint::from_solver(&unsolved), Err(AeroError::NotSolved));
    }

    #[test]
    fn test_efficiency() {
        let p = AeroPoint::new(0.8, 0.02);
        assert_relative_eq!(p.efficiency().unwrap(), 40.0);
        assert_eq!(AeroPoint::new(0.0, 0.0).efficiency(), Err(AeroError::ZeroLiftDegeneracy));
    }

    #[test]
    fn test_efficiency_gain() {
        let isolated = AeroPoint::new(0.8, 0.02);
        let follower = AeroPoint::new(0.8, 0.016);
        assert_relative_eq!(follower.efficiency_gain_pct(&isolated).unwrap(), 25.0, epsilon = 1e-12);
    }

    #[test]
    fn test_drag_reduction() {
        assert_relative_eq!(drag_reduction_pct(0.04, 0.03), 25.0, epsilon = 1e-12);
        assert_eq!(drag_reduction_pct(0.04, 0.04), 0.0);
    }

    #[test]
    fn test_closest_index() {
        let alphas = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(closest_index(&alphas, 5.0), Some(4));
        assert_eq!(closest_index(&alphas, 4.6), Some(4));
        assert_eq!(closest_index(&[], 5.0), None);
    }
}
