/// Common interface of the lifting-line strategies.
///
/// The least-squares interference model (`WingState`) and the exact Fourier
/// solver (`FourierLiftingLine`) approximate the same physics with different
/// numerics. Once solved, both answer the same coefficient queries.

use crate::error::Result;

/// Coefficient queries answered by a solved wing model.
pub trait LiftingLineSolver {
    /// Short description of the numerical method.
    fn method(&self) -> &'static str;

    /// Aspect ratio of the wing being modelled.
    fn aspect_ratio(&self) -> f64;

    /// Wing lift coefficient CL.
    fn lift(&self) -> Result<f64>;

    /// Induced-drag coefficient CDi.
    fn induced_drag(&self) -> Result<f64>;

    /// Aerodynamic efficiency CL/CDi.
    fn efficiency(&self) -> Result<f64> {
        Ok(self.lift()? / self.induced_drag()?)
    }
}
