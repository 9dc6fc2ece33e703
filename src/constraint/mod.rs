pub mod config_projector;

pub use config_projector::{
    AffineFunction, ConfigProjector, DifferentiableFunction, LineSearchKind,
};

use crate::space::state::Configuration;
use num_traits::Float;

/// A named bundle of constraints attached to paths and steering methods.
///
/// Cloning produces a deep copy of the projector state (right-hand side,
/// line search) while sharing the constraint functions themselves, which
/// is what the straight steering method relies on when it re-binds a copy
/// to the start configuration of each candidate path.
#[derive(Clone)]
pub struct ConstraintSet<F: Float, const N: usize> {
    name: String,
    projector: Option<ConfigProjector<F, N>>,
}

impl<F: Float, const N: usize> ConstraintSet<F, N> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            projector: None,
        }
    }

    pub fn with_projector(name: impl Into<String>, projector: ConfigProjector<F, N>) -> Self {
        Self {
            name: name.into(),
            projector: Some(projector),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_projector(&self) -> Option<&ConfigProjector<F, N>> {
        self.projector.as_ref()
    }

    pub fn config_projector_mut(&mut self) -> Option<&mut ConfigProjector<F, N>> {
        self.projector.as_mut()
    }

    /// Projects `q` onto the constraint manifold. A set without a
    /// projector accepts every configuration.
    pub fn apply(&self, q: &mut Configuration<F, N>) -> bool {
        match &self.projector {
            Some(projector) => projector.apply(q),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_accepts_everything() {
        let set = ConstraintSet::<f64, 2>::new("empty");
        let mut q = Configuration::new([1.0, 2.0]);
        assert!(set.apply(&mut q));
        assert_eq!(q, Configuration::new([1.0, 2.0]));
    }

    #[test]
    fn clone_does_not_share_projector_state() {
        let mut projector = ConfigProjector::new(1e-8, 20);
        projector.add(std::rc::Rc::new(AffineFunction::new(
            Configuration::new([1.0, 0.0]),
            0.0,
        )));
        let mut original = ConstraintSet::with_projector("plane", projector);
        let mut copy = original.clone();
        copy.config_projector_mut()
            .unwrap()
            .right_hand_side_from_config(&Configuration::new([5.0, 0.0]));
        original
            .config_projector_mut()
            .unwrap()
            .right_hand_side_from_config(&Configuration::new([1.0, 0.0]));
        assert_eq!(copy.config_projector().unwrap().right_hand_side(), &[5.0]);
        assert_eq!(
            original.config_projector().unwrap().right_hand_side(),
            &[1.0]
        );
    }
}
