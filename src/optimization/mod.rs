pub mod random_shortcut;

pub use random_shortcut::RandomShortcut;

use crate::path::PathVector;
use crate::problem::Problem;
use num_traits::Float;

/// Post-processes a solution path into a shorter one, using the problem's
/// steering and validation.
pub trait PathOptimizer<F: Float, const N: usize> {
    fn optimize(&mut self, problem: &Problem<F, N>, path: &PathVector<F, N>) -> PathVector<F, N>;
}
