pub mod progressive;

pub use progressive::ProgressiveProjector;

use crate::path::PathPtr;
use num_traits::Float;

/// Pulls a steered path onto the constraint manifold of its attached
/// constraint set.
///
/// `apply` returns the projected path, or None when the projection
/// fails; a failed projection is routine and simply drops the candidate
/// path for the current planner step.
pub trait PathProjector<F: Float, const N: usize> {
    fn apply(&self, path: &PathPtr<F, N>) -> Option<PathPtr<F, N>>;
}
