/// Sequential leader/follower lifting-line model for a formation in line.
///
/// The leader is solved in undisturbed flow. Each follower then sees an
/// upwash offset δα = k·(CL_prev/(πAR))·(b/d) from the aircraft ahead of it,
/// is re-solved at α + δα, and has its force vector rotated by δα:
/// CL += CDi·sin δα, CDi −= CL·sin δα.
///
/// The leader's Oswald factor is computed once and reused for every aircraft.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::FormationParams;
use crate::error::{AeroError, Result};
use crate::fourier::{AngleInput, FourierLiftingLine, WingGeometry};
use crate::metrics::drag_reduction_pct;

/// Solved coefficients of one aircraft in the formation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftCoefficients {
    /// Position in the formation; 0 is the leader.
    pub index: usize,
    /// CL after force rotation.
    pub lift: f64,
    /// CDi after force rotation.
    pub induced_drag: f64,
    /// CDi + CD₀.
    pub total_drag: f64,
    /// Drag reduction relative to the leader, in percent.
    pub drag_reduction_pct: f64,
}

/// In-line formation of identical wings solved one after another.
#[derive(Debug, Clone)]
pub struct FormationLiftingLine {
    solver: FourierLiftingLine,
    aircraft_count: usize,
    params: FormationParams,
    leader_oswald: Option<f64>,
    lift: Vec<f64>,
    induced_drag: Vec<f64>,
    total_drag: Vec<f64>,
    drag_reduction: Vec<f64>,
}

impl FormationLiftingLine {
    /// Formation of `aircraft_count` wings sharing `geometry`.
    pub fn new(geometry: WingGeometry, aircraft_count: usize, params: FormationParams) -> Result<Self> {
        if aircraft_count == 0 {
            return Err(AeroError::PreconditionViolation(
                "a formation needs at least one aircraft".into(),
            ));
        }
        params.validate()?;

        Ok(Self {
            solver: FourierLiftingLine::new(geometry),
            aircraft_count,
            params,
            leader_oswald: None,
            lift: vec![0.0; aircraft_count],
            induced_drag: vec![0.0; aircraft_count],
            total_drag: vec![0.0; aircraft_count],
            drag_reduction: Vec::new(),
        })
    }

    /// Number of aircraft, leader included.
    pub fn aircraft_count(&self) -> usize {
        self.aircraft_count
    }

    /// Empirical model parameters.
    pub fn params(&self) -> &FormationParams {
        &self.params
    }

    /// The underlying isolated-wing solver, holding the last aircraft solved.
    pub fn solver(&self) -> &FourierLiftingLine {
        &self.solver
    }

    /// Upwash offset (rad) behind an aircraft with lift `preceding_lift` at `distance` m.
    pub fn upwash_offset(&self, preceding_lift: f64, distance: f64) -> f64 {
        let geometry = self.solver.geometry();
        self.params.upwash_gain * (preceding_lift / (PI * geometry.aspect_ratio)) * (self.solver.span() / distance)
    }

    /// Solve every aircraft. `distances[i]` separates aircraft i and i+1.
    pub fn solve_formation(
        &mut self,
        alpha: impl Into<AngleInput>,
        station_angles: &[f64],
        terms: &[u32],
        distances: &[f64],
    ) -> Result<()> {
        if distances.len() != self.aircraft_count - 1 {
            return Err(AeroError::PreconditionViolation(format!(
                "{} aircraft need {} separations, got {}",
                self.aircraft_count,
                self.aircraft_count - 1,
                distances.len()
            )));
        }
        if let Some(d) = distances.iter().find(|&&d| !(d > 0.0)) {
            return Err(AeroError::PreconditionViolation(format!(
                "separations must be positive (got {})",
                d
            )));
        }

        let alpha = alpha.into();
        let ar = self.solver.geometry().aspect_ratio;
        let cd0 = self.params.parasitic_drag;

        let mut lift = Vec::with_capacity(self.aircraft_count);
        let mut induced_drag = Vec::with_capacity(self.aircraft_count);
        let mut total_drag = Vec::with_capacity(self.aircraft_count);

        self.solver.solve(alpha.clone(), station_angles, terms)?;
        let cl_leader = self.solver.lift_coefficient()?;
        let oswald = FourierLiftingLine::oswald_coefficient(self.solver.induced_drag_parameter()?);
        let cdi_leader = cl_leader * cl_leader / (PI * oswald * ar);
        lift.push(cl_leader);
        induced_drag.push(cdi_leader);
        total_drag.push(cdi_leader + cd0);
        debug!(cl = cl_leader, cdi = cdi_leader, oswald, "leader solved");

        for (i, &distance) in distances.iter().enumerate() {
            let delta_alpha = self.upwash_offset(lift[i], distance);

            self.solver.solve(alpha.offset(delta_alpha), station_angles, terms)?;
            let mut cl = self.solver.lift_coefficient()?;
            let mut cdi = cl * cl / (PI * oswald * ar);

            let (delta_lift, delta_drag) = (cdi * delta_alpha.sin(), cl * delta_alpha.sin());
            cl += delta_lift;
            cdi -= delta_drag;

            debug!(aircraft = i + 1, delta_alpha, cl, cdi, "follower solved");
            lift.push(cl);
            induced_drag.push(cdi);
            total_drag.push(cdi + cd0);
        }

        let reference = total_drag[0];
        self.drag_reduction = total_drag.iter().map(|&cd| drag_reduction_pct(reference, cd)).collect();
        self.lift = lift;
        self.induced_drag = induced_drag;
        self.total_drag = total_drag;
        self.leader_oswald = Some(oswald);
        Ok(())
    }

    /// Oswald factor of the leader, reused for every follower.
    pub fn leader_oswald(&self) -> Option<f64> {
        self.leader_oswald
    }

    /// CL per aircraft.
    pub fn lift_coefficients(&self) -> &[f64] {
        &self.lift
    }

    /// CDi per aircraft.
    pub fn induced_drag_coefficients(&self) -> &[f64] {
        &self.induced_drag
    }

    /// CDi + CD₀ per aircraft.
    pub fn total_drag_coefficients(&self) -> &[f64] {
        &self.total_drag
    }

    /// Empty until the first successful `solve_formation`.
    pub fn drag_reduction_pct(&self) -> &[f64] {
        &self.drag_reduction
    }

    /// Per-aircraft rows of the last solve.
    pub fn results(&self) -> Vec<AircraftCoefficients> {
        self.drag_reduction
            .iter()
            .enumerate()
            .map(|(i, &reduction)| AircraftCoefficients {
                index: i,
                lift: self.lift[i],
                induced_drag: self.induced_drag[i],
                total_drag: self.total_drag[i],
                drag_reduction_pct: reduction,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::{half_span_stations, odd_terms};
    use approx::assert_relative_eq;

    fn formation(count: usize) -> FormationLiftingLine {
        let geometry = WingGeometry::rectangular(8.0, 10.0, 0.0).unwrap();
        FormationLiftingLine::new(geometry, count, FormationParams::default()).unwrap()
    }

    fn solve(f: &mut FormationLiftingLine, distances: &[f64]) {
        f.solve_formation(5.0f64.to_radians(), &half_span_stations(4), &odd_terms(4), distances)
            .unwrap();
    }

    #[test]
    fn test_followers_gain_from_upwash() {
        let mut f = formation(3);
        solve(&mut f, &[9.0, 9.0]);

        let cd = f.total_drag_coefficients();
        assert!(cd[1] < cd[0]);
        assert!(cd[2] < cd[0]);
        assert!(f.drag_reduction_pct()[1] > 0.0);
        assert_eq!(f.drag_reduction_pct()[0], 0.0);
        assert!(f.lift_coefficients()[1] > f.lift_coefficients()[0]);
    }

    #[test]
    fn test_leader_matches_isolated_solve() {
        let mut f = formation(2);
        solve(&mut f, &[9.0]);

        let mut isolated = FourierLiftingLine::new(WingGeometry::rectangular(8.0, 10.0, 0.0).unwrap());
        isolated
            .solve(5.0f64.to_radians(), &half_span_stations(4), &odd_terms(4))
            .unwrap();
        assert_eq!(f.lift_coefficients()[0], isolated.lift_coefficient().unwrap());

        let delta = isolated.induced_drag_parameter().unwrap();
        let e = FourierLiftingLine::oswald_coefficient(delta);
        assert_eq!(f.leader_oswald(), Some(e));
        assert_relative_eq!(f.total_drag_coefficients()[0], f.induced_drag_coefficients()[0] + 0.02);
    }

    #[test]
    fn test_infinite_separation_matches_leader() {
        let mut f = formation(3);
        solve(&mut f, &[f64::INFINITY, 1.0e12]);

        let cl = f.lift_coefficients();
        let cdi = f.induced_drag_coefficients();
        assert_eq!(cl[1], cl[0]);
        assert_eq!(cdi[1], cdi[0]);
        assert_relative_eq!(cl[2], cl[0], epsilon = 1e-9);
        assert_relative_eq!(cdi[2], cdi[0], epsilon = 1e-9);
    }

    #[test]
    fn test_repeat_solves_are_identical() {
        let mut f = formation(3);
        solve(&mut f, &[9.0, 9.0]);
        let first = f.results();
        solve(&mut f, &[9.0, 9.0]);
        assert_eq!(first, f.results());
    }

    #[test]
    fn test_upwash_offset() {
        let f = formation(2);
        let span = 80f64.sqrt();
        let expected = 0.15 * (0.5 / (PI * 8.0)) * (span / 9.0);
        assert_relative_eq!(f.upwash_offset(0.5, 9.0), expected, epsilon = 1e-15);
    }

    #[test]
    fn test_distance_count_checked() {
        let mut f = formation(3);
        let err = f
            .solve_formation(0.1, &half_span_stations(2), &odd_terms(2), &[9.0])
            .unwrap_err();
        assert!(matches!(err, AeroError::PreconditionViolation(_)));
        assert!(f.results().is_empty());

        let err = f
            .solve_formation(0.1, &half_span_stations(2), &odd_terms(2), &[9.0, 0.0])
            .unwrap_err();
        assert!(matches!(err, AeroError::PreconditionViolation(_)));
    }

    #[test]
    fn test_single_aircraft() {
        let mut f = formation(1);
        solve(&mut f, &[]);
        let results = f.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].drag_reduction_pct, 0.0);
    }
}
