//! Lifting-line aerodynamics for aircraft flying in formation.
//!
//! This library provides:
//! - A least-squares lifting-line model with wake interference between wings
//! - Gauss–Seidel relaxation of the mutual interference in a formation
//! - An exact Prandtl lifting-line solver over chosen stations and harmonics
//! - A sequential leader/follower model with upwash and force rotation
//! - Efficiency metrics and parameter sweeps comparing formation and solo flight
//!
//! All angles passed to the solvers are in radians, except where a function
//! or field name says `_deg`.

#![warn(missing_docs)]
#![warn(clippy::doc_markdown)]
#![allow(clippy::neg_cmp_op_on_partial_ord)]

/// Grid sizes, relaxation settings and empirical model parameters.
pub mod constants;
/// Error type shared by every solver.
pub mod error;
/// Sequential leader/follower model.
pub mod formation;
/// Exact Fourier lifting-line solver.
pub mod fourier;
/// Induced-angle kernel between wings.
pub mod interference;
/// Efficiency and drag-reduction metrics.
pub mod metrics;
/// Gauss–Seidel relaxation of formation interference.
pub mod relaxation;
/// Interface shared by the lifting-line strategies.
pub mod solver;
/// Angle-of-attack and aspect-ratio sweeps.
pub mod sweep;
/// Formation coordinates.
pub mod vector;
/// Least-squares interference model of one wing.
pub mod wing;

pub use constants::{FormationParams, LiftingLineConfig, RelaxationConfig, THIN_AIRFOIL_SLOPE};
pub use error::{AeroError, Result};
pub use formation::{AircraftCoefficients, FormationLiftingLine};
pub use fourier::{AngleInput, FourierLiftingLine, InducedDragInput, Planform, SolverStage, WingGeometry};
pub use metrics::AeroPoint;
pub use relaxation::{FormationInterferenceSolver, RelaxationReport};
pub use solver::LiftingLineSolver;
pub use sweep::{angle_sweep, aspect_ratio_sweep, AnalysisConfig, AngleSweep, CoefficientKind, RatioRow};
pub use vector::Vec3;
pub use wing::WingState;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
