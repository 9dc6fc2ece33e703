pub mod straight;

pub use straight::StraightSteering;

use crate::constraint::ConstraintSet;
use crate::path::PathPtr;
use crate::space::state::Configuration;
use num_traits::Float;

/// A local planner producing a candidate path between two configurations,
/// ignoring obstacles. Steering may fail.
pub trait SteeringMethod<F: Float, const N: usize> {
    fn steer(&self, q1: &Configuration<F, N>, q2: &Configuration<F, N>) -> Option<PathPtr<F, N>>;

    fn constraints(&self) -> Option<&ConstraintSet<F, N>>;

    fn set_constraints(&mut self, constraints: Option<ConstraintSet<F, N>>);

    fn boxed_clone(&self) -> Box<dyn SteeringMethod<F, N>>;
}
