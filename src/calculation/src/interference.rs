/// Heuristic induced-angle kernel between wings of a formation.
///
/// The angle induced by a disturbing wing at a spanwise point of another wing
/// is the product of an approximate bound circulation, a lateral regime
/// (near wake vs far field) and a streamwise regime (the disturbing wing ahead
/// of or behind the point). Both regimes are small tables so that the formula
/// for each case is stated exactly once.
///
/// Positive angles are upwash, negative angles downwash.

use std::f64::consts::PI;

use crate::vector::Vec3;

/// Offsets (m) below which the kernel saturates to zero instead of diverging.
pub const SEPARATION_CUTOFF: f64 = 0.1;

/// Lateral position of the point relative to the disturbing wing's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateralRegime {
    /// |η| < 1: inside the disturbing wing's trailing vortex pair (downwash).
    NearWake,
    /// |η| ≥ 1: outboard of the tip vortices (upwash, decaying with distance).
    FarField,
}

impl LateralRegime {
    /// `eta` is the lateral offset normalised by the disturbing half-span.
    pub fn classify(eta: f64) -> Self {
        if eta.abs() < 1.0 {
            Self::NearWake
        } else {
            Self::FarField
        }
    }

    /// Downwash inside the wake, upwash outside.
    pub const fn sign(self) -> f64 {
        match self {
            Self::NearWake => -1.0,
            Self::FarField => 1.0,
        }
    }

    /// NearWake: cos(πη/2). FarField: 1/(π|η|).
    pub fn intensity(self, eta: f64) -> f64 {
        match self {
            Self::NearWake => (PI * eta / 2.0).cos(),
            Self::FarField => 1.0 / (eta.abs() * PI),
        }
    }
}

/// Streamwise position of the disturbing wing relative to the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamwiseRegime {
    /// The disturbing wing is ahead; the point sits in its wake.
    Downstream,
    /// The disturbing wing is behind the point.
    Upstream,
}

/// Row of the streamwise regime table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamwiseDecay {
    /// Exponential decay rate per span of streamwise separation.
    pub decay_rate: f64,
    /// Multiplier on the lateral intensity.
    pub intensity_scale: f64,
}

impl StreamwiseRegime {
    /// `dx` is the point's x minus the disturbing wing's x (x downstream).
    pub fn classify(dx: f64) -> Self {
        if dx > 0.0 {
            Self::Downstream
        } else {
            Self::Upstream
        }
    }

    /// Parameter row for this regime.
    pub const fn decay(self) -> StreamwiseDecay {
        match self {
            Self::Downstream => StreamwiseDecay {
                decay_rate: 0.1,
                intensity_scale: 1.0,
            },
            Self::Upstream => StreamwiseDecay {
                decay_rate: 0.2,
                intensity_scale: 0.1,
            },
        }
    }
}

/// What the kernel needs to know about the disturbing wing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterferenceSource {
    /// Centre of the disturbing wing.
    pub position: Vec3,
    /// Span b (m).
    pub span: f64,
    /// Chord c (m).
    pub chord: f64,
    /// Current CL of the disturbing wing.
    pub lift_coefficient: f64,
}

impl InterferenceSource {
    /// Circulation proxy Γ ≈ ½·CL·c.
    #[inline]
    pub fn circulation(&self) -> f64 {
        0.5 * self.lift_coefficient * self.chord
    }
}

/// Induced angle (rad) at `y_point` on a wing centred at `target`.
///
/// `y_point` is the wing-local spanwise coordinate of the station; it is
/// compared against the disturbing wing's lateral position directly.
pub fn induced_angle(target: &Vec3, y_point: f64, source: &InterferenceSource) -> f64 {
    let rel = target.sub(&source.position);

    if rel.x.abs() < SEPARATION_CUTOFF {
        return 0.0;
    }

    let rel_y = y_point - source.position.y;
    let total_dist = Vec3::new(rel.x, rel_y, rel.z).magnitude();
    if total_dist < SEPARATION_CUTOFF {
        return 0.0;
    }

    let eta = 2.0 * rel_y / source.span;
    let lateral = LateralRegime::classify(eta);
    let streamwise = StreamwiseRegime::classify(rel.x).decay();

    let lateral_decay = 1.0 / (1.0 + (eta.abs() * PI).powi(2));
    let longitudinal_decay = (-streamwise.decay_rate * rel.x.abs() / source.span).exp();

    lateral.sign()
        * source.circulation()
        * lateral.intensity(eta)
        * streamwise.intensity_scale
        * lateral_decay
        * longitudinal_decay
        / (4.0 * PI)
}
