/// Single-wing state for the least-squares interference model.
///
/// The circulation is represented by a sine series Γ(θ) ∝ Σ Aₙ sin(nθ) over
/// the station angle θ, with y = -(b/2)·cos θ. Coefficients are stored
/// zero-based: `coefficients[0]` is the first harmonic.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};
use tracing::{debug, warn};

use crate::constants::LiftingLineConfig;
use crate::error::{AeroError, Result};
use crate::interference::{induced_angle, InterferenceSource};
use crate::solver::LiftingLineSolver;
use crate::vector::Vec3;

/// Rectangular wing with a fitted circulation series.
///
/// Geometry is fixed at construction so that the derived area and aspect
/// ratio always agree with span and chord.
#[derive(Debug, Clone, PartialEq)]
pub struct WingState {
    name: String,
    span: f64,
    chord: f64,
    /// Angle of attack (rad).
    alpha: f64,
    position: Vec3,
    area: f64,
    aspect_ratio: f64,
    /// Fixed at 1.
    oswald: f64,
    lift_curve_slope: f64,
    /// Spanwise station coordinates, tip to tip.
    y: Array1<f64>,
    /// Station angles matching `y`.
    theta: Array1<f64>,
    coefficients: Array1<f64>,
}

impl WingState {
    /// Rectangular wing with the default discretisation. `alpha_deg` in degrees.
    pub fn new(span: f64, chord: f64, alpha_deg: f64, position: Vec3, name: &str) -> Result<Self> {
        Self::with_config(span, chord, alpha_deg, position, name, &LiftingLineConfig::default())
    }

    /// Wing with the station count, harmonic count and a₀ taken from `config`.
    pub fn with_config(
        span: f64,
        chord: f64,
        alpha_deg: f64,
        position: Vec3,
        name: &str,
        config: &LiftingLineConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !(span > 0.0) || !(chord > 0.0) {
            return Err(AeroError::PreconditionViolation(format!(
                "wing '{}' needs positive span and chord (got {}, {})",
                name, span, chord
            )));
        }

        let area = span * chord;
        let y = Array1::linspace(-span / 2.0, span / 2.0, config.station_count);
        let theta = y.mapv(|yi| (-2.0 * yi / span).clamp(-1.0, 1.0).acos());

        Ok(Self {
            name: name.to_string(),
            span,
            chord,
            alpha: alpha_deg.to_radians(),
            position,
            area,
            aspect_ratio: span * span / area,
            oswald: 1.0,
            lift_curve_slope: config.lift_curve_slope,
            y,
            theta,
            coefficients: Array1::zeros(config.harmonic_count),
        })
    }

    /// Label used in logs and reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Span b (m).
    pub fn span(&self) -> f64 {
        self.span
    }

    /// Chord c (m).
    pub fn chord(&self) -> f64 {
        self.chord
    }

    /// Angle of attack (rad).
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Wing centre in formation coordinates.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Planform area S = b·c.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// AR = b²/S.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Oswald factor e.
    pub fn oswald(&self) -> f64 {
        self.oswald
    }

    /// Section lift-curve slope a₀ (1/rad).
    pub fn lift_curve_slope(&self) -> f64 {
        self.lift_curve_slope
    }

    /// Change the angle of attack and re-seed the first harmonic.
    pub fn set_alpha_deg(&mut self, alpha_deg: f64) {
        self.alpha = alpha_deg.to_radians();
        self.coefficients[0] = self.elliptic_seed();
    }

    /// Spanwise stations y (m), from the left tip to the right tip.
    pub fn stations(&self) -> &Array1<f64> {
        &self.y
    }

    /// Station angles θ = acos(-2y/b), running from 0 to π.
    pub fn station_angles(&self) -> &Array1<f64> {
        &self.theta
    }

    /// Series coefficients, first harmonic first.
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Replace the series. The harmonic count cannot change.
    pub fn set_coefficients(&mut self, coefficients: Array1<f64>) -> Result<()> {
        if coefficients.len() != self.coefficients.len() {
            return Err(AeroError::PreconditionViolation(format!(
                "wing '{}' holds {} coefficients, got {}",
                self.name,
                self.coefficients.len(),
                coefficients.len()
            )));
        }
        self.coefficients = coefficients;
        Ok(())
    }

    /// Closed-form single-harmonic solution A₁ = α / (1 + πAR/(2a₀)).
    fn elliptic_seed(&self) -> f64 {
        self.alpha / (1.0 + PI * self.aspect_ratio / (2.0 * self.lift_curve_slope))
    }

    /// Normalised elliptic circulation √(1-(2y/b)²) over the stations.
    ///
    /// Also resets the series to the single-harmonic elliptic solution.
    pub fn elliptic_circulation(&mut self) -> Array1<f64> {
        let gamma = self
            .y
            .mapv(|yi| (1.0 - (2.0 * yi / self.span).powi(2)).max(0.0).sqrt());

        self.coefficients.fill(0.0);
        self.coefficients[0] = self.elliptic_seed();

        gamma
    }

    /// Describe this wing as a disturbance source for the kernel.
    pub fn as_source(&self) -> InterferenceSource {
        InterferenceSource {
            position: self.position,
            span: self.span,
            chord: self.chord,
            lift_coefficient: self.lift_coefficient(),
        }
    }

    /// Induced angle (rad) caused by `other` at the local station `y_point`.
    pub fn interference_angle(&self, other: &WingState, y_point: f64) -> f64 {
        induced_angle(&self.position, y_point, &other.as_source())
    }

    /// Assemble the fitting matrix M[i,n] = sin((n+1)θᵢ)·(1 + (n+1)πAR/(2a₀)).
    fn design_matrix(&self) -> Array2<f64> {
        let n_terms = self.coefficients.len();
        let k = PI * self.aspect_ratio / (2.0 * self.lift_curve_slope);

        Array2::from_shape_fn((self.theta.len(), n_terms), |(i, n)| {
            let harmonic = (n + 1) as f64;
            (harmonic * self.theta[i]).sin() * (1.0 + harmonic * k)
        })
    }

    /// Right-hand side α·sin θᵢ plus interference from `others`.
    fn forcing<'a, I>(&self, others: I) -> Array1<f64>
    where
        I: IntoIterator<Item = &'a WingState>,
    {
        let others: Vec<&WingState> = others.into_iter().collect();

        Array1::from_shape_fn(self.theta.len(), |i| {
            let interference: f64 = others
                .iter()
                .map(|other| self.interference_angle(other, self.y[i]))
                .sum();
            (self.alpha + interference) * self.theta[i].sin()
        })
    }

    /// Least-squares fit of the series against `others` without mutating self.
    ///
    /// The system is overdetermined (stations ≫ harmonics). A rank-deficient
    /// matrix yields the minimum-norm solution and a warning.
    pub fn fit_coefficients<'a, I>(&self, others: I) -> Result<Array1<f64>>
    where
        I: IntoIterator<Item = &'a WingState>,
    {
        let m = self.design_matrix();
        let b = self.forcing(others);
        let (rows, cols) = m.dim();

        let a = DMatrix::from_fn(rows, cols, |i, j| m[(i, j)]);
        let rhs = DVector::from_iterator(rows, b.iter().copied());

        let svd = a.svd(true, true);
        let max_sv = svd.singular_values.max();
        let eps = max_sv * rows.max(cols) as f64 * f64::EPSILON;
        let rank = svd.rank(eps);
        if rank < cols {
            warn!(
                wing = %self.name,
                rank,
                harmonics = cols,
                "rank-deficient interference fit; using minimum-norm coefficients"
            );
        }

        let solution = svd
            .solve(&rhs, eps)
            .map_err(|_| AeroError::SingularSystem { rank, size: cols })?;

        debug!(wing = %self.name, a1 = solution[0], "fitted circulation series");
        Ok(Array1::from_iter(solution.iter().copied()))
    }

    /// Refit the series in place against the given neighbours.
    pub fn compute_coefficients(&mut self, others: &[WingState]) -> Result<&Array1<f64>> {
        let fitted = self.fit_coefficients(others)?;
        self.coefficients = fitted;
        Ok(&self.coefficients)
    }

    /// CL = π·AR·A₁.
    pub fn lift_coefficient(&self) -> f64 {
        PI * self.aspect_ratio * self.coefficients[0]
    }

    /// CDi = CL²/(πARe)·(1 + Σ (n+1)(Aₙ/A₁)²).
    pub fn induced_drag_coefficient(&self) -> Result<f64> {
        let a1 = self.coefficients[0];
        if a1 == 0.0 {
            return Err(AeroError::ZeroLiftDegeneracy);
        }

        let sum: f64 = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(n, an)| (n + 1) as f64 * (an / a1).powi(2))
            .sum();

        let cl = self.lift_coefficient();
        Ok(cl * cl / (PI * self.aspect_ratio * self.oswald) * (1.0 + sum))
    }
}

impl LiftingLineSolver for WingState {
    fn method(&self) -> &'static str {
        "least-squares interference"
    }

    fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    fn lift(&self) -> Result<f64> {
        Ok(self.lift_coefficient())
    }

    fn induced_drag(&self) -> Result<f64> {
        self.induced_drag_coefficient()
    }
}
