/// Prandtl lifting-line solver with an exact Fourier-coefficient solve.
///
/// At each chosen station angle θ the fundamental equation
///
/// ```text
/// (2b / (π c(θ))) Σ Aₙ sin nθ + α₀ₗ(θ) + Σ n Aₙ sin nθ / sin θ = α(θ)
/// ```
///
/// is written as one linear equation in the considered harmonics. With as
/// many stations as harmonics the system is square and is solved exactly.
/// Coefficients are keyed by harmonic number, starting at 1.

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AeroError, Result};
use crate::solver::LiftingLineSolver;

/// A spanwise distribution as a function of station angle θ (rad).
pub type ThetaFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// An angle given either as a constant or as a function of θ. Radians.
#[derive(Clone)]
pub enum AngleInput {
    /// Same value at every station.
    Constant(f64),
    /// Value as a function of θ.
    Distribution(ThetaFn),
}

impl AngleInput {
    /// Wrap a closure of θ.
    pub fn distribution(f: impl Fn(f64) -> f64 + Send + Sync + 'static) -> Self {
        Self::Distribution(Arc::new(f))
    }

    /// Value at station angle `theta`.
    #[inline]
    pub fn at(&self, theta: f64) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Distribution(f) => f(theta),
        }
    }

    /// The same input shifted by a uniform `delta`.
    pub fn offset(&self, delta: f64) -> Self {
        match self {
            Self::Constant(value) => Self::Constant(value + delta),
            Self::Distribution(f) => {
                let f = Arc::clone(f);
                Self::Distribution(Arc::new(move |theta| f(theta) + delta))
            }
        }
    }
}

impl From<f64> for AngleInput {
    fn from(value: f64) -> Self {
        Self::Constant(value)
    }
}

impl fmt::Debug for AngleInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => write!(f, "Constant({})", value),
            Self::Distribution(_) => write!(f, "Distribution(..)"),
        }
    }
}

/// Standard planforms for building a `WingGeometry` from AR and area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Planform {
    /// Constant chord.
    Rectangular,
    /// Elliptic chord distribution.
    Elliptic,
    /// Straight taper with the given tip/root chord ratio.
    Tapered(f64),
}

impl Planform {
    /// Build the matching geometry.
    pub fn geometry(self, aspect_ratio: f64, area: f64, zero_lift_angle: f64) -> Result<WingGeometry> {
        match self {
            Self::Rectangular => WingGeometry::rectangular(aspect_ratio, area, zero_lift_angle),
            Self::Elliptic => WingGeometry::elliptic(aspect_ratio, area, zero_lift_angle),
            Self::Tapered(taper) => WingGeometry::tapered(aspect_ratio, taper, area, zero_lift_angle),
        }
    }
}

/// Geometry of an isolated wing.
#[derive(Clone)]
pub struct WingGeometry {
    /// AR = b²/S.
    pub aspect_ratio: f64,
    /// Tip/root chord ratio λ. 1 for rectangular, 0 for elliptic.
    pub taper_ratio: f64,
    /// Planform area S.
    pub area: f64,
    chord: ThetaFn,
    zero_lift_angle: AngleInput,
}

impl WingGeometry {
    /// Geometry from a chord distribution c(θ) and zero-lift angle α₀ₗ.
    pub fn new(
        aspect_ratio: f64,
        taper_ratio: f64,
        area: f64,
        chord: impl Fn(f64) -> f64 + Send + Sync + 'static,
        zero_lift_angle: impl Into<AngleInput>,
    ) -> Result<Self> {
        if !(aspect_ratio > 0.0) || !(area > 0.0) {
            return Err(AeroError::PreconditionViolation(format!(
                "aspect ratio and area must be positive (got {}, {})",
                aspect_ratio, area
            )));
        }
        Ok(Self {
            aspect_ratio,
            taper_ratio,
            area,
            chord: Arc::new(chord),
            zero_lift_angle: zero_lift_angle.into(),
        })
    }

    /// Constant chord c = S/b.
    pub fn rectangular(aspect_ratio: f64, area: f64, zero_lift_angle: f64) -> Result<Self> {
        let chord = (area / aspect_ratio).sqrt();
        Self::new(aspect_ratio, 1.0, area, move |_| chord, zero_lift_angle)
    }

    /// c(θ) = c₀ sin θ with c₀ = 4S/(πb).
    pub fn elliptic(aspect_ratio: f64, area: f64, zero_lift_angle: f64) -> Result<Self> {
        let span = (aspect_ratio * area).sqrt();
        let root = 4.0 * area / (PI * span);
        Self::new(aspect_ratio, 0.0, area, move |theta: f64| root * theta.sin(), zero_lift_angle)
    }

    /// Linear taper c = c_r(1 - (1-λ)|cos θ|) with c_r = 2S/(b(1+λ)).
    pub fn tapered(aspect_ratio: f64, taper_ratio: f64, area: f64, zero_lift_angle: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&taper_ratio) {
            return Err(AeroError::PreconditionViolation(format!(
                "taper ratio must lie in [0, 1] (got {})",
                taper_ratio
            )));
        }
        let span = (aspect_ratio * area).sqrt();
        let root = 2.0 * area / (span * (1.0 + taper_ratio));
        Self::new(
            aspect_ratio,
            taper_ratio,
            area,
            move |theta: f64| root * (1.0 - (1.0 - taper_ratio) * theta.cos().abs()),
            zero_lift_angle,
        )
    }

    /// b = √(AR·S).
    pub fn span(&self) -> f64 {
        (self.aspect_ratio * self.area).sqrt()
    }

    /// Chord at station angle `theta`.
    pub fn chord_at(&self, theta: f64) -> f64 {
        (self.chord)(theta)
    }

    /// Zero-lift angle α₀ₗ (rad) at `theta`.
    pub fn zero_lift_angle_at(&self, theta: f64) -> f64 {
        self.zero_lift_angle.at(theta)
    }
}

impl fmt::Debug for WingGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WingGeometry")
            .field("aspect_ratio", &self.aspect_ratio)
            .field("taper_ratio", &self.taper_ratio)
            .field("area", &self.area)
            .field("zero_lift_angle", &self.zero_lift_angle)
            .finish_non_exhaustive()
    }
}

/// One station's lifting-line equation: Σ coefficient·Aₙ = rhs.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearEquation {
    /// Station angle θ (rad).
    pub station: f64,
    /// (harmonic number, coefficient) in the order of the considered terms.
    pub terms: Vec<(u32, f64)>,
    /// Right-hand side α(θ) - α₀ₗ(θ).
    pub rhs: f64,
}

impl fmt::Display for LinearEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (n, coeff)) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(if *coeff < 0.0 { " - " } else { " + " })?;
                write!(f, "{:.6}*A{}", coeff.abs(), n)?;
            } else {
                write!(f, "{:.6}*A{}", coeff, n)?;
            }
        }
        write!(f, " = {:.6}", self.rhs)
    }
}

/// Progress of a `FourierLiftingLine`. Coefficient queries need `Solved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStage {
    /// Geometry only.
    GeometryLoaded,
    /// Equations assembled, not yet solved.
    SystemDefined,
    /// Coefficients available.
    Solved,
}

/// Which quantity closes the induced-drag formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InducedDragInput {
    /// CDi = CL²/(π e AR).
    Oswald(f64),
    /// CDi = CL²/(πAR)·(1 + δ).
    DragParameter(f64),
}

/// Exact lifting-line solver for one wing.
#[derive(Debug, Clone)]
pub struct FourierLiftingLine {
    geometry: WingGeometry,
    span: f64,
    station_angles: Vec<f64>,
    terms: Vec<u32>,
    system: Vec<LinearEquation>,
    coefficients: BTreeMap<u32, f64>,
    stage: SolverStage,
}

impl FourierLiftingLine {
    /// Unsolved solver for `geometry`.
    pub fn new(geometry: WingGeometry) -> Self {
        let span = geometry.span();
        Self {
            geometry,
            span,
            station_angles: Vec::new(),
            terms: Vec::new(),
            system: Vec::new(),
            coefficients: BTreeMap::new(),
            stage: SolverStage::GeometryLoaded,
        }
    }

    /// Wing geometry.
    pub fn geometry(&self) -> &WingGeometry {
        &self.geometry
    }

    /// Span b.
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Current stage.
    pub fn stage(&self) -> SolverStage {
        self.stage
    }

    /// Equations of the last assembled system.
    pub fn system(&self) -> &[LinearEquation] {
        &self.system
    }

    /// Harmonic numbers of the last solve.
    pub fn terms(&self) -> &[u32] {
        &self.terms
    }

    /// Solve for the considered harmonics at angle of attack `alpha` (rad).
    pub fn solve(
        &mut self,
        alpha: impl Into<AngleInput>,
        station_angles: &[f64],
        terms: &[u32],
    ) -> Result<()> {
        if station_angles.len() != terms.len() {
            return Err(AeroError::PreconditionViolation(format!(
                "{} station angles for {} considered terms; the system must be square",
                station_angles.len(),
                terms.len()
            )));
        }
        if terms.is_empty() {
            return Err(AeroError::PreconditionViolation(
                "at least one Fourier term is required".into(),
            ));
        }
        for (i, &n) in terms.iter().enumerate() {
            if n == 0 || terms[..i].contains(&n) {
                return Err(AeroError::PreconditionViolation(format!(
                    "considered terms must be distinct harmonic numbers >= 1 (got {:?})",
                    terms
                )));
            }
        }

        self.coefficients.clear();
        self.stage = SolverStage::GeometryLoaded;
        self.station_angles = station_angles.to_vec();
        self.terms = terms.to_vec();

        self.define_system(&alpha.into())?;
        self.solve_system()
    }

    fn define_system(&mut self, alpha: &AngleInput) -> Result<()> {
        let mut system = Vec::with_capacity(self.station_angles.len());

        for &theta in &self.station_angles {
            let sin_theta = theta.sin();
            if sin_theta.abs() < 1e-12 {
                return Err(AeroError::PreconditionViolation(format!(
                    "station angle {} lies on a wing tip (sin θ = 0)",
                    theta
                )));
            }
            let chord = self.geometry.chord_at(theta);
            if !(chord > 0.0) || !chord.is_finite() {
                return Err(AeroError::PreconditionViolation(format!(
                    "chord at station {} must be positive (got {})",
                    theta, chord
                )));
            }

            let k = 2.0 * self.span / (PI * chord);
            let terms = self
                .terms
                .iter()
                .map(|&n| {
                    let nf = n as f64;
                    let sin_n = (nf * theta).sin();
                    (n, k * sin_n + nf * sin_n / sin_theta)
                })
                .collect();

            system.push(LinearEquation {
                station: theta,
                terms,
                rhs: alpha.at(theta) - self.geometry.zero_lift_angle_at(theta),
            });
        }

        debug!(stations = system.len(), "lifting-line system defined");
        self.system = system;
        self.stage = SolverStage::SystemDefined;
        Ok(())
    }

    fn solve_system(&mut self) -> Result<()> {
        let size = self.system.len();
        let a = DMatrix::from_fn(size, size, |i, j| self.system[i].terms[j].1);
        let b = DVector::from_iterator(size, self.system.iter().map(|eq| eq.rhs));

        let singular_values = a.singular_values();
        let tol = singular_values.max() * size as f64 * f64::EPSILON;
        let rank = singular_values.iter().filter(|&&s| s > tol).count();
        if rank < size {
            return Err(AeroError::SingularSystem { rank, size });
        }

        let solution = a
            .full_piv_lu()
            .solve(&b)
            .ok_or(AeroError::SingularSystem { rank, size })?;

        self.coefficients = self
            .terms
            .iter()
            .zip(solution.iter())
            .map(|(&n, &value)| (n, value))
            .collect();
        self.stage = SolverStage::Solved;

        debug!(a1 = ?self.coefficients.get(&1), "lifting-line system solved");
        Ok(())
    }

    /// All solved coefficients, keyed by harmonic number.
    pub fn coefficients(&self) -> Result<&BTreeMap<u32, f64>> {
        match self.stage {
            SolverStage::Solved => Ok(&self.coefficients),
            _ => Err(AeroError::NotSolved),
        }
    }

    /// Aₙ for one solved harmonic.
    pub fn coefficient(&self, harmonic: u32) -> Result<f64> {
        self.coefficients()?
            .get(&harmonic)
            .copied()
            .ok_or(AeroError::MissingHarmonic(harmonic))
    }

    /// CL = π·AR·A₁.
    pub fn lift_coefficient(&self) -> Result<f64> {
        Ok(self.coefficient(1)? * PI * self.geometry.aspect_ratio)
    }

    /// δ = Σ_{n≠1} n·(Aₙ/A₁)².
    pub fn induced_drag_parameter(&self) -> Result<f64> {
        let a1 = self.coefficient(1)?;
        if a1 == 0.0 {
            return Err(AeroError::ZeroLiftDegeneracy);
        }
        Ok(self
            .coefficients
            .iter()
            .filter(|&(&n, _)| n != 1)
            .map(|(&n, &an)| n as f64 * (an / a1).powi(2))
            .sum())
    }

    /// e = 1/(1+δ).
    pub fn oswald_coefficient(induced_drag_parameter: f64) -> f64 {
        1.0 / (1.0 + induced_drag_parameter)
    }

    /// CDi closed by either an Oswald factor or a drag parameter.
    pub fn induced_drag_coefficient(&self, input: InducedDragInput) -> Result<f64> {
        let cl = self.lift_coefficient()?;
        let ar = self.geometry.aspect_ratio;
        Ok(match input {
            InducedDragInput::Oswald(e) => cl * cl / (PI * e * ar),
            InducedDragInput::DragParameter(delta) => cl * cl / (PI * ar) * (1.0 + delta),
        })
    }
}

impl LiftingLineSolver for FourierLiftingLine {
    fn method(&self) -> &'static str {
        "exact Fourier lifting line"
    }

    fn aspect_ratio(&self) -> f64 {
        self.geometry.aspect_ratio
    }

    fn lift(&self) -> Result<f64> {
        self.lift_coefficient()
    }

    fn induced_drag(&self) -> Result<f64> {
        let delta = self.induced_drag_parameter()?;
        self.induced_drag_coefficient(InducedDragInput::DragParameter(delta))
    }
}

/// Evenly spaced station angles in (0, π/2], for symmetric loading.
pub fn half_span_stations(count: usize) -> Vec<f64> {
    (1..=count).map(|i| i as f64 * PI / (2.0 * count as f64)).collect()
}

/// The first `count` odd harmonics 1, 3, 5, ...
pub fn odd_terms(count: usize) -> Vec<u32> {
    (0..count as u32).map(|i| 2 * i + 1).collect()
}
