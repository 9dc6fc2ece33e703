use crate::constraint::{ConstraintSet, LineSearchKind};
use crate::path::{PathPtr, StraightPath};
use crate::space::distance::Distance;
use crate::space::state::Configuration;
use crate::steering::SteeringMethod;
use num_traits::Float;
use std::rc::Rc;

/// Straight-line steering: the candidate path is a constant-velocity
/// interpolation whose length is the metric distance between the inputs.
pub struct StraightSteering<F: Float, const N: usize> {
    distance: Rc<dyn Distance<F, N>>,
    constraints: Option<ConstraintSet<F, N>>,
}

impl<F: Float, const N: usize> StraightSteering<F, N> {
    pub fn new(distance: Rc<dyn Distance<F, N>>) -> Self {
        Self {
            distance,
            constraints: None,
        }
    }
}

impl<F: Float + 'static, const N: usize> SteeringMethod<F, N> for StraightSteering<F, N> {
    fn steer(&self, q1: &Configuration<F, N>, q2: &Configuration<F, N>) -> Option<PathPtr<F, N>> {
        let length = self.distance.eval(q1, q2);
        // A constrained path carries its own copy of the constraint set,
        // with the projector's right-hand side bound to the start
        // configuration and a backtracking line search.
        let constraints = match &self.constraints {
            Some(set) if set.config_projector().is_some() => {
                let mut copy = set.clone();
                let projector = copy.config_projector_mut().unwrap();
                projector.right_hand_side_from_config(q1);
                projector.line_search_type(LineSearchKind::Backtracking);
                Some(copy)
            }
            other => other.clone(),
        };
        Some(Rc::new(StraightPath::new(*q1, *q2, length, constraints)))
    }

    fn constraints(&self) -> Option<&ConstraintSet<F, N>> {
        self.constraints.as_ref()
    }

    fn set_constraints(&mut self, constraints: Option<ConstraintSet<F, N>>) {
        self.constraints = constraints;
    }

    fn boxed_clone(&self) -> Box<dyn SteeringMethod<F, N>> {
        Box::new(Self {
            distance: Rc::clone(&self.distance),
            constraints: self.constraints.clone(),
        })
    }
}
