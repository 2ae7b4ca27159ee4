/// Parameter sweeps comparing formation flight with solo flight.
///
/// `angle_sweep` runs the interference model over a range of angles of
/// attack for a V formation. `aspect_ratio_sweep` runs the sequential
/// leader/follower model over aspect ratios and induced angles.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{v_formation, FormationParams, LiftingLineConfig, RelaxationConfig};
use crate::error::{AeroError, Result};
use crate::formation::FormationLiftingLine;
use crate::fourier::{half_span_stations, odd_terms, Planform};
use crate::metrics::{closest_index, AeroPoint};
use crate::relaxation::{FormationInterferenceSolver, RelaxationReport};
use crate::vector::Vec3;
use crate::wing::WingState;

/// V-formation angle sweep settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AngleSweepConfig {
    /// Angles of attack (degrees).
    pub alphas_deg: Vec<f64>,
    /// Aircraft in the V, leader included.
    pub aircraft_count: usize,
    /// Span of every wing (m).
    pub span: f64,
    /// Chord of every wing (m).
    pub chord: f64,
}

impl Default for AngleSweepConfig {
    fn default() -> Self {
        Self {
            alphas_deg: Array1::linspace(1.0, 10.0, 10).to_vec(),
            aircraft_count: 3,
            span: 10.0,
            chord: 1.0,
        }
    }
}

impl AngleSweepConfig {
    /// Needs an angle and an aircraft.
    pub fn validate(&self) -> Result<()> {
        if self.alphas_deg.is_empty() {
            return Err(AeroError::Config("angle sweep needs at least one alpha".into()));
        }
        if self.aircraft_count == 0 {
            return Err(AeroError::Config("angle sweep needs at least one aircraft".into()));
        }
        Ok(())
    }
}

/// Results of `angle_sweep`, indexed like `alphas_deg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSweep {
    /// Swept angles (degrees).
    pub alphas_deg: Vec<f64>,
    /// Isolated reference wing at each angle.
    pub isolated: Vec<AeroPoint>,
    /// One series per aircraft, leader first.
    pub formation: Vec<Vec<AeroPoint>>,
    /// Relaxation outcome at each angle.
    pub relaxation: Vec<RelaxationReport>,
}

/// One formation aircraft in a `SweepSummary`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AircraftSummary {
    /// Position in the formation; 0 is the leader.
    pub index: usize,
    /// Coefficients.
    pub point: AeroPoint,
    /// CL/CDi.
    pub efficiency: f64,
    /// Efficiency change against the isolated wing, in percent.
    pub efficiency_gain_pct: f64,
}

/// Formation against solo flight at a single angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Angle of attack (degrees).
    pub alpha_deg: f64,
    /// Isolated reference wing.
    pub isolated: AeroPoint,
    /// CL/CDi of the isolated wing.
    pub isolated_efficiency: f64,
    /// Formation aircraft, leader first.
    pub aircraft: Vec<AircraftSummary>,
}

impl AngleSweep {
    /// Number of formation aircraft.
    pub fn aircraft_count(&self) -> usize {
        self.formation.len()
    }

    /// Summary at the swept angle closest to `alpha_deg`.
    pub fn summary_at(&self, alpha_deg: f64) -> Result<SweepSummary> {
        let idx = closest_index(&self.alphas_deg, alpha_deg)
            .ok_or_else(|| AeroError::PreconditionViolation("empty angle sweep".into()))?;

        let isolated = self.isolated[idx];
        let aircraft = self
            .formation
            .iter()
            .enumerate()
            .map(|(i, series)| {
                let point = series[idx];
                Ok(AircraftSummary {
                    index: i,
                    point,
                    efficiency: point.efficiency()?,
                    efficiency_gain_pct: point.efficiency_gain_pct(&isolated)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SweepSummary {
            alpha_deg: self.alphas_deg[idx],
            isolated,
            isolated_efficiency: isolated.efficiency()?,
            aircraft,
        })
    }
}

/// Build a V formation: leader at the origin, followers in alternating
/// rows at negative x at a reduced angle of attack.
///
/// Row k sits at (-k·dx, ±k·dy) with dx = 0.9·b and dy = 0.8·b.
pub fn build_v_formation(alpha_deg: f64, sweep: &AngleSweepConfig, lifting: &LiftingLineConfig) -> Result<Vec<WingState>> {
    let spacing_x = sweep.span * v_formation::SPACING_X_FACTOR;
    let spacing_y = sweep.span * v_formation::SPACING_Y_FACTOR;

    (0..sweep.aircraft_count)
        .map(|i| {
            let (position, alpha) = if i == 0 {
                (Vec3::zero(), alpha_deg)
            } else {
                let row = ((i + 1) / 2) as f64;
                let side = if i % 2 == 1 { 1.0 } else { -1.0 };
                (
                    Vec3::new(-row * spacing_x, side * row * spacing_y, 0.0),
                    alpha_deg * v_formation::FOLLOWER_ALPHA_FACTOR,
                )
            };
            let mut wing = WingState::with_config(
                sweep.span,
                sweep.chord,
                alpha,
                position,
                &format!("aircraft {}", i + 1),
                lifting,
            )?;
            wing.elliptic_circulation();
            Ok(wing)
        })
        .collect()
}

/// Isolated and V-formation coefficients across the configured angles.
pub fn angle_sweep(
    sweep: &AngleSweepConfig,
    lifting: &LiftingLineConfig,
    relaxation: &RelaxationConfig,
) -> Result<AngleSweep> {
    sweep.validate()?;

    let mut isolated = Vec::with_capacity(sweep.alphas_deg.len());
    let mut formation = vec![Vec::with_capacity(sweep.alphas_deg.len()); sweep.aircraft_count];
    let mut reports = Vec::with_capacity(sweep.alphas_deg.len());

    for &alpha in &sweep.alphas_deg {
        let mut solo = WingState::with_config(sweep.span, sweep.chord, alpha, Vec3::zero(), "isolated", lifting)?;
        solo.elliptic_circulation();
        isolated.push(AeroPoint::from_solver(&solo)?);

        let mut solver = FormationInterferenceSolver::new(build_v_formation(alpha, sweep, lifting)?, *relaxation)?;
        reports.push(solver.relax()?);

        for (series, wing) in formation.iter_mut().zip(solver.wings()) {
            series.push(AeroPoint::from_solver(wing)?);
        }
        info!(alpha_deg = alpha, "angle sweep point done");
    }

    Ok(AngleSweep {
        alphas_deg: sweep.alphas_deg.clone(),
        isolated,
        formation,
        relaxation: reports,
    })
}

/// Sequential-model sweep over aspect ratio and induced angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AspectRatioSweepConfig {
    /// Aspect ratios to solve.
    pub aspect_ratios: Vec<f64>,
    /// Added to `alpha_deg` for each run (degrees).
    pub induced_angles_deg: Vec<f64>,
    /// Base angle of attack (degrees).
    pub alpha_deg: f64,
    /// Half-span stations and odd harmonics used by every solve.
    pub harmonics: usize,
    /// Wing area S (m²).
    pub area: f64,
    /// Planform shared by every aircraft.
    pub planform: Planform,
    /// Aircraft in line, leader included.
    pub aircraft_count: usize,
    /// Separation between consecutive aircraft (m).
    pub distances: Vec<f64>,
}

impl Default for AspectRatioSweepConfig {
    fn default() -> Self {
        Self {
            aspect_ratios: vec![4.0, 6.0, 8.0, 10.0, 12.0],
            induced_angles_deg: vec![2.0, 4.0, 6.0, 8.0],
            alpha_deg: 5.0,
            harmonics: 4,
            area: 10.0,
            planform: Planform::Rectangular,
            aircraft_count: 3,
            distances: vec![9.0, 9.0],
        }
    }
}

impl AspectRatioSweepConfig {
    /// Needs a follower and at least one harmonic.
    pub fn validate(&self) -> Result<()> {
        if self.aircraft_count < 2 {
            return Err(AeroError::Config(
                "aspect-ratio sweep compares a follower with the leader; needs 2+ aircraft".into(),
            ));
        }
        if self.harmonics == 0 {
            return Err(AeroError::Config("harmonics must be at least 1".into()));
        }
        Ok(())
    }
}

/// Coefficient compared in a `RatioRow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoefficientKind {
    /// CL.
    #[serde(rename = "CL")]
    Lift,
    /// Total drag CDi + CD₀.
    #[serde(rename = "CD")]
    Drag,
    /// CDi.
    #[serde(rename = "CDi")]
    InducedDrag,
}

impl CoefficientKind {
    /// Column label used in reports.
    pub const fn label(self) -> &'static str {
        match self {
            CoefficientKind::Lift => "CL",
            CoefficientKind::Drag => "CD",
            CoefficientKind::InducedDrag => "CDi",
        }
    }
}

/// Follower/leader ratio of one coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioRow {
    /// Aspect ratio of the run.
    pub aspect_ratio: f64,
    /// Induced angle added to the base alpha (degrees).
    pub induced_angle_deg: f64,
    /// Which coefficient.
    pub kind: CoefficientKind,
    /// Second aircraft over leader.
    pub ratio: f64,
}

/// Formation/solo ratios of the second aircraft against the leader.
pub fn aspect_ratio_sweep(sweep: &AspectRatioSweepConfig, params: &FormationParams) -> Result<Vec<RatioRow>> {
    sweep.validate()?;

    let stations = half_span_stations(sweep.harmonics);
    let terms = odd_terms(sweep.harmonics);
    let mut rows = Vec::with_capacity(sweep.aspect_ratios.len() * sweep.induced_angles_deg.len() * 3);

    for &induced in &sweep.induced_angles_deg {
        for &ar in &sweep.aspect_ratios {
            let geometry = sweep.planform.geometry(ar, sweep.area, 0.0)?;
            let mut formation = FormationLiftingLine::new(geometry, sweep.aircraft_count, *params)?;
            formation.solve_formation(
                (sweep.alpha_deg + induced).to_radians(),
                &stations,
                &terms,
                &sweep.distances,
            )?;

            let cl = formation.lift_coefficients();
            let cd = formation.total_drag_coefficients();
            let cdi = formation.induced_drag_coefficients();
            for (kind, ratio) in [
                (CoefficientKind::Lift, cl[1] / cl[0]),
                (CoefficientKind::Drag, cd[1] / cd[0]),
                (CoefficientKind::InducedDrag, cdi[1] / cdi[0]),
            ] {
                rows.push(RatioRow {
                    aspect_ratio: ar,
                    induced_angle_deg: induced,
                    kind,
                    ratio,
                });
            }
        }
    }

    info!(rows = rows.len(), "aspect-ratio sweep done");
    Ok(rows)
}

/// Everything the analysis binary can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Interference-model sweep.
    pub angle_sweep: AngleSweepConfig,
    /// Sequential-model sweep.
    pub aspect_ratio_sweep: AspectRatioSweepConfig,
    /// Grid of the interference model.
    pub lifting_line: LiftingLineConfig,
    /// Relaxation passes and tolerance.
    pub relaxation: RelaxationConfig,
    /// Upwash gain and CD₀.
    pub formation: FormationParams,
}

impl AnalysisConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.angle_sweep.validate()?;
        self.aspect_ratio_sweep.validate()?;
        self.lifting_line.validate()?;
        self.relaxation.validate()?;
        self.formation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::interference::StreamwiseRegime;

    fn small_sweep() -> AngleSweepConfig {
        AngleSweepConfig {
            alphas_deg: vec![2.0, 5.0],
            ..AngleSweepConfig::default()
        }
    }

    #[test]
    fn test_default_alphas() {
        let config = AngleSweepConfig::default();
        assert_eq!(config.alphas_deg.len(), 10);
        assert_relative_eq!(config.alphas_deg[0], 1.0);
        assert_relative_eq!(config.alphas_deg[9], 10.0);
    }

    #[test]
    fn test_v_formation_layout() {
        let config = AngleSweepConfig {
            aircraft_count: 5,
            ..AngleSweepConfig::default()
        };
        let wings = build_v_formation(5.0, &config, &LiftingLineConfig::coarse()).unwrap();

        assert_eq!(wings[0].position(), Vec3::zero());
        assert_eq!(wings[1].position(), Vec3::new(-9.0, 8.0, 0.0));
        assert_eq!(wings[2].position(), Vec3::new(-9.0, -8.0, 0.0));
        assert_eq!(wings[3].position(), Vec3::new(-18.0, 16.0, 0.0));
        assert_eq!(wings[4].position(), Vec3::new(-18.0, -16.0, 0.0));
        assert_relative_eq!(wings[0].alpha(), 5f64.to_radians());
        assert_relative_eq!(wings[1].alpha(), 4.5f64.to_radians(), epsilon = 1e-15);
        assert_eq!(wings[2].name(), "aircraft 3");

        // The kernel sees the leader behind every follower.
        let dx = wings[1].position().sub(&wings[0].position()).x;
        assert_eq!(StreamwiseRegime::classify(dx), StreamwiseRegime::Upstream);
    }

    #[test]
    fn test_angle_sweep_shapes() {
        let result = angle_sweep(&small_sweep(), &LiftingLineConfig::coarse(), &RelaxationConfig::default()).unwrap();

        assert_eq!(result.isolated.len(), 2);
        assert_eq!(result.aircraft_count(), 3);
        assert!(result.formation.iter().all(|series| series.len() == 2));
        assert_eq!(result.relaxation.len(), 2);
        assert!(result.isolated[1].lift > result.isolated[0].lift);
        for series in &result.formation {
            assert!(series.iter().all(|p| p.lift > 0.0 && p.induced_drag > 0.0));
        }
    }

    #[test]
    fn test_isolated_point_is_elliptic() {
        let result = angle_sweep(&small_sweep(), &LiftingLineConfig::coarse(), &RelaxationConfig::default()).unwrap();
        // AR 10 with a thin-airfoil slope: A1 = α/3.5, CDi = CL²/(10π).
        let alpha = 5f64.to_radians();
        let cl = std::f64::consts::PI * 10.0 * alpha / 3.5;
        assert_relative_eq!(result.isolated[1].lift, cl, epsilon = 1e-12);
        assert_relative_eq!(
            result.isolated[1].induced_drag,
            cl * cl / (10.0 * std::f64::consts::PI),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_summary_picks_closest_alpha() {
        let result = angle_sweep(&small_sweep(), &LiftingLineConfig::coarse(), &RelaxationConfig::default()).unwrap();
        let summary = result.summary_at(4.6).unwrap();

        assert_eq!(summary.alpha_deg, 5.0);
        assert_eq!(summary.aircraft.len(), 3);
        let lead = &summary.aircraft[0];
        assert_relative_eq!(lead.efficiency, lead.point.lift / lead.point.induced_drag);
        assert_relative_eq!(
            lead.efficiency_gain_pct,
            (lead.efficiency / summary.isolated_efficiency - 1.0) * 100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_aspect_ratio_sweep_ratios() {
        let rows = aspect_ratio_sweep(&AspectRatioSweepConfig::default(), &FormationParams::default()).unwrap();
        assert_eq!(rows.len(), 4 * 5 * 3);

        for row in &rows {
            match row.kind {
                CoefficientKind::Lift => assert!(row.ratio > 1.0),
                CoefficientKind::Drag | CoefficientKind::InducedDrag => assert!(row.ratio < 1.0),
            }
        }
        assert_eq!(rows[0].aspect_ratio, 4.0);
        assert_eq!(rows[0].induced_angle_deg, 2.0);
        assert_eq!(rows[0].kind.label(), "CL");
    }

    #[test]
    fn test_aspect_ratio_sweep_needs_follower() {
        let config = AspectRatioSweepConfig {
            aircraft_count: 1,
            distances: Vec::new(),
            ..AspectRatioSweepConfig::default()
        };
        let err = aspect_ratio_sweep(&config, &FormationParams::default()).unwrap_err();
        assert!(matches!(err, AeroError::Config(_)));
    }

    #[test]
    fn test_analysis_config_defaults_validate() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }
}
