use crate::constraint::ConstraintSet;
use crate::path::{Path, PathPtr};
use crate::space::state::Configuration;
use num_traits::Float;
use std::rc::Rc;

/// A constant-velocity straight interpolation between two configurations.
///
/// The parameter interval is `[0, length]`. When a constraint set is
/// attached, evaluation projects the interpolated configuration onto the
/// constraint manifold.
pub struct StraightPath<F: Float, const N: usize> {
    initial: Configuration<F, N>,
    end: Configuration<F, N>,
    length: F,
    constraints: Option<ConstraintSet<F, N>>,
}

impl<F: Float, const N: usize> StraightPath<F, N> {
    pub fn new(
        initial: Configuration<F, N>,
        end: Configuration<F, N>,
        length: F,
        constraints: Option<ConstraintSet<F, N>>,
    ) -> Self {
        Self {
            initial,
            end,
            length,
            constraints,
        }
    }

    /// Raw interpolation at parameter `t`, without constraint projection.
    fn interpolated(&self, t: F) -> Configuration<F, N> {
        if self.length <= F::zero() {
            return self.initial;
        }
        let u = (t / self.length).max(F::zero()).min(F::one());
        self.initial.interpolate(&self.end, u)
    }
}

impl<F: Float + 'static, const N: usize> Path<F, N> for StraightPath<F, N> {
    fn length(&self) -> F {
        self.length
    }

    fn time_range(&self) -> (F, F) {
        (F::zero(), self.length)
    }

    fn eval(&self, t: F) -> Option<Configuration<F, N>> {
        let mut q = self.interpolated(t);
        match &self.constraints {
            Some(constraints) => constraints.apply(&mut q).then_some(q),
            None => Some(q),
        }
    }

    fn initial(&self) -> Configuration<F, N> {
        self.initial
    }

    fn end(&self) -> Configuration<F, N> {
        self.end
    }

    fn reverse(&self) -> PathPtr<F, N> {
        Rc::new(Self {
            initial: self.end,
            end: self.initial,
            length: self.length,
            constraints: self.constraints.clone(),
        })
    }

    fn extract(&self, t0: F, t1: F) -> PathPtr<F, N> {
        if t0 > t1 {
            return self.extract(t1, t0).reverse();
        }
        // Endpoints of a constrained sub-path live on the manifold; fall
        // back to the raw interpolation when projection fails there.
        let initial = self.eval(t0).unwrap_or_else(|| self.interpolated(t0));
        let end = self.eval(t1).unwrap_or_else(|| self.interpolated(t1));
        Rc::new(Self {
            initial,
            end,
            length: t1 - t0,
            constraints: self.constraints.clone(),
        })
    }

    fn constraints(&self) -> Option<&ConstraintSet<F, N>> {
        self.constraints.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> StraightPath<f64, 2> {
        StraightPath::new(
            Configuration::new([0.0, 0.0]),
            Configuration::new([2.0, 0.0]),
            2.0,
            None,
        )
    }

    #[test]
    fn eval_endpoints_and_midpoint() {
        let p = path();
        assert_eq!(p.eval(0.0).unwrap(), p.initial());
        assert_eq!(p.eval(2.0).unwrap(), p.end());
        assert_eq!(p.eval(1.0).unwrap(), Configuration::new([1.0, 0.0]));
    }

    #[test]
    fn eval_clamps_out_of_range_parameters() {
        let p = path();
        assert_eq!(p.eval(-1.0).unwrap(), p.initial());
        assert_eq!(p.eval(5.0).unwrap(), p.end());
    }

    #[test]
    fn reverse_twice_is_identity_on_endpoints_and_length() {
        let p: PathPtr<f64, 2> = Rc::new(path());
        let rr = p.reverse().reverse();
        assert_eq!(rr.initial(), p.initial());
        assert_eq!(rr.end(), p.end());
        assert_eq!(rr.length(), p.length());
    }

    #[test]
    fn extract_is_no_longer_than_the_path() {
        let p = path();
        let sub = p.extract(0.5, 1.5);
        assert!(sub.length() <= p.length());
        assert_eq!(sub.length(), 1.0);
        assert_eq!(sub.initial(), Configuration::new([0.5, 0.0]));
        assert_eq!(sub.end(), Configuration::new([1.5, 0.0]));
    }

    #[test]
    fn reversed_extract() {
        let p = path();
        let sub = p.extract(1.5, 0.5);
        assert_eq!(sub.initial(), Configuration::new([1.5, 0.0]));
        assert_eq!(sub.end(), Configuration::new([0.5, 0.0]));
        assert_eq!(sub.length(), 1.0);
    }

    #[test]
    fn zero_length_path_evaluates_to_its_endpoint() {
        let q = Configuration::new([1.0, 1.0]);
        let p = StraightPath::new(q, q, 0.0, None);
        assert_eq!(p.eval(0.0).unwrap(), q);
    }
}
