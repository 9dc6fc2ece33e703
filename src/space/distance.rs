use crate::space::state::Configuration;
use num_traits::Float;

/// A distance metric over the configuration space.
///
/// Implementations must return a non-negative value and zero for equal
/// configurations.
pub trait Distance<F: Float, const N: usize> {
    fn eval(&self, q1: &Configuration<F, N>, q2: &Configuration<F, N>) -> F;
}

/// The plain Euclidean metric.
#[derive(Clone, Copy, Debug, Default)]
pub struct EuclideanDistance;

impl<F: Float, const N: usize> Distance<F, N> for EuclideanDistance {
    fn eval(&self, q1: &Configuration<F, N>, q2: &Configuration<F, N>) -> F {
        q1.euclidean_distance(q2)
    }
}

/// A per-axis weighted Euclidean metric.
///
/// Useful when some degrees of freedom (large joints, base translation)
/// should dominate the others.
#[derive(Clone, Copy, Debug)]
pub struct WeighedDistance<F: Float, const N: usize> {
    weights: [F; N],
}

impl<F: Float, const N: usize> WeighedDistance<F, N> {
    pub fn new(weights: [F; N]) -> Self {
        Self { weights }
    }
}

impl<F: Float, const N: usize> Distance<F, N> for WeighedDistance<F, N> {
    fn eval(&self, q1: &Configuration<F, N>, q2: &Configuration<F, N>) -> F {
        let mut acc = F::zero();
        for i in 0..N {
            let d = (q1[i] - q2[i]) * self.weights[i];
            acc = acc + d * d;
        }
        acc.sqrt()
    }
}
