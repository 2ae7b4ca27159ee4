/// Mutual-interference relaxation over a group of wings.
///
/// Every wing's circulation depends on the lift of the others, so the
/// coupled problem is solved by repeated Gauss–Seidel passes: wings are
/// refitted in order and each fit already sees the updated neighbours
/// earlier in the same pass.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::RelaxationConfig;
use crate::error::{AeroError, Result};
use crate::wing::WingState;

/// Outcome of a relaxation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxationReport {
    /// Passes actually run.
    pub passes: usize,
    /// Largest coefficient change in the final pass.
    pub max_delta: f64,
    /// Whether the tolerance was met. Always false when none is configured.
    pub converged: bool,
}

/// Owns the wings of a formation while their interference is relaxed.
#[derive(Debug, Clone)]
pub struct FormationInterferenceSolver {
    wings: Vec<WingState>,
    config: RelaxationConfig,
}

impl FormationInterferenceSolver {
    /// Fails on an empty formation or an invalid config.
    pub fn new(wings: Vec<WingState>, config: RelaxationConfig) -> Result<Self> {
        if wings.is_empty() {
            return Err(AeroError::PreconditionViolation("no wings to relax".into()));
        }
        config.validate()?;
        Ok(Self { wings, config })
    }

    /// Wings in relaxation order.
    pub fn wings(&self) -> &[WingState] {
        &self.wings
    }

    /// Wing at `index`, if any.
    pub fn wing(&self, index: usize) -> Option<&WingState> {
        self.wings.get(index)
    }

    /// Give the relaxed wings back.
    pub fn into_wings(self) -> Vec<WingState> {
        self.wings
    }

    /// Reset every wing to its elliptic starting distribution.
    pub fn seed_elliptic(&mut self) {
        for wing in &mut self.wings {
            wing.elliptic_circulation();
        }
    }

    /// One Gauss–Seidel sweep. Returns the largest |ΔAₙ| seen.
    fn pass(&mut self) -> Result<f64> {
        let mut max_delta = 0.0f64;
        for i in 0..self.wings.len() {
            let others = self
                .wings
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, w)| w);
            let fitted = self.wings[i].fit_coefficients(others)?;

            let delta = fitted
                .iter()
                .zip(self.wings[i].coefficients().iter())
                .map(|(new, old)| (new - old).abs())
                .fold(0.0, f64::max);
            max_delta = max_delta.max(delta);

            self.wings[i].set_coefficients(fitted)?;
        }
        Ok(max_delta)
    }

    /// Run passes until the configured count is reached or the tolerance is met.
    pub fn relax(&mut self) -> Result<RelaxationReport> {
        let mut report = RelaxationReport {
            passes: 0,
            max_delta: 0.0,
            converged: false,
        };

        for pass in 1..=self.config.passes {
            let max_delta = self.pass()?;
            report.passes = pass;
            report.max_delta = max_delta;
            debug!(pass, max_delta, "relaxation pass");

            if self.config.tolerance.is_some_and(|tol| max_delta <= tol) {
                report.converged = true;
                break;
            }
        }

        info!(
            wings = self.wings.len(),
            passes = report.passes,
            max_delta = report.max_delta,
            converged = report.converged,
            "interference relaxation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LiftingLineConfig;
    use crate::solver::LiftingLineSolver;
    use crate::vector::Vec3;
    use approx::assert_relative_eq;

    fn wing(x: f64, y: f64, name: &str) -> WingState {
        WingState::with_config(10.0, 1.0, 5.0, Vec3::new(x, y, 0.0), name, &LiftingLineConfig::coarse())
            .unwrap()
    }

    #[test]
    fn test_single_wing_matches_isolated_fit() {
        let lone = wing(0.0, 0.0, "lone");
        let expected = lone.fit_coefficients(Vec::<&WingState>::new()).unwrap();

        let mut solver = FormationInterferenceSolver::new(vec![lone], RelaxationConfig { passes: 3, tolerance: None }).unwrap();
        let report = solver.relax().unwrap();
        assert_eq!(report.passes, 3);
        assert!(!report.converged);
        assert_eq!(solver.wing(0).unwrap().coefficients(), &expected);
    }

    #[test]
    fn test_follower_is_affected_by_leader() {
        let mut solver = FormationInterferenceSolver::new(
            vec![wing(0.0, 0.0, "leader"), wing(-9.0, 8.0, "follower")],
            RelaxationConfig::default(),
        )
        .unwrap();
        solver.relax().unwrap();

        let isolated = wing(0.0, 0.0, "isolated");
        let isolated_cl = isolated
            .fit_coefficients(Vec::<&WingState>::new())
            .map(|a| std::f64::consts::PI * isolated.aspect_ratio() * a[0])
            .unwrap();
        let follower_cl = solver.wing(1).unwrap().lift().unwrap();
        assert!((follower_cl - isolated_cl).abs() > 1e-9);
    }

    #[test]
    fn test_tolerance_stops_early() {
        let mut solver = FormationInterferenceSolver::new(
            vec![wing(0.0, 0.0, "leader"), wing(-9.0, 8.0, "left"), wing(-9.0, -8.0, "right")],
            RelaxationConfig { passes: 50, tolerance: None }.with_tolerance(1e-10),
        )
        .unwrap();
        let report = solver.relax().unwrap();
        assert!(report.converged);
        assert!(report.passes < 50);
        assert!(report.max_delta <= 1e-10);
    }

    #[test]
    fn test_seed_resets_to_elliptic() {
        let mut solver = FormationInterferenceSolver::new(
            vec![wing(0.0, 0.0, "a"), wing(-9.0, 8.0, "b")],
            RelaxationConfig { passes: 2, tolerance: None },
        )
        .unwrap();
        solver.relax().unwrap();
        solver.seed_elliptic();

        for w in solver.wings() {
            let a = w.coefficients();
            assert_relative_eq!(a[0], w.alpha() / 3.5, epsilon = 1e-15);
            assert!(a.iter().skip(1).all(|&an| an == 0.0));
        }
    }

    #[test]
    fn test_pass_uses_updated_neighbours() {
        let mut solver = FormationInterferenceSolver::new(
            vec![wing(0.0, 0.0, "first"), wing(-9.0, 8.0, "second"), wing(-18.0, -8.0, "third")],
            RelaxationConfig { passes: 1, tolerance: None },
        )
        .unwrap();
        solver.seed_elliptic();
        let seeded = solver.wings().to_vec();

        solver.relax().unwrap();
        let relaxed = solver.wings();

        // Wings 1 and 2 were refitted earlier in the same pass.
        let against_updated = relaxed[2].fit_coefficients([&relaxed[0], &relaxed[1]]).unwrap();
        assert_eq!(relaxed[2].coefficients(), &against_updated);

        let against_seeds = seeded[2].fit_coefficients([&seeded[0], &seeded[1]]).unwrap();
        let gap = against_seeds
            .iter()
            .zip(relaxed[2].coefficients().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        assert!(gap > 1e-9);

        // The first wing only ever saw the seeds.
        let first = seeded[0].fit_coefficients([&seeded[1], &seeded[2]]).unwrap();
        assert_eq!(relaxed[0].coefficients(), &first);
    }

    #[test]
    fn test_empty_formation_rejected() {
        let err = FormationInterferenceSolver::new(Vec::new(), RelaxationConfig::default()).unwrap_err();
        assert!(matches!(err, AeroError::PreconditionViolation(_)));
    }
}
