pub mod path_vector;
pub mod straight;

pub use path_vector::PathVector;
pub use straight::StraightPath;

use crate::constraint::ConstraintSet;
use crate::space::state::Configuration;
use num_traits::Float;
use std::rc::Rc;

/// Shared handle to a path. Edges and parent maps reference the same
/// underlying path; storage is released with the last referent.
pub type PathPtr<F, const N: usize> = Rc<dyn Path<F, N>>;

/// A parametrised path through configuration space.
///
/// A path is defined on a closed parameter interval and evaluates to a
/// configuration at each parameter. Evaluation applies the attached
/// constraint set, if any, and reports failure when the projection does
/// not converge.
pub trait Path<F: Float, const N: usize> {
    /// Total length of the path, non-negative.
    fn length(&self) -> F;

    /// The parameter interval `[t0, t1]` on which the path is defined.
    fn time_range(&self) -> (F, F);

    /// Evaluates the path at parameter `t` (clamped into the time range).
    fn eval(&self, t: F) -> Option<Configuration<F, N>>;

    /// The configuration at the start of the path.
    fn initial(&self) -> Configuration<F, N>;

    /// The configuration at the end of the path.
    fn end(&self) -> Configuration<F, N>;

    /// A path traversing the same configurations in reverse.
    fn reverse(&self) -> PathPtr<F, N>;

    /// The sub-path on `[t0, t1]`; when `t0 > t1` the sub-path is
    /// traversed in reverse.
    fn extract(&self, t0: F, t1: F) -> PathPtr<F, N>;

    /// The constraint set attached to this path, if any.
    fn constraints(&self) -> Option<&ConstraintSet<F, N>>;
}
