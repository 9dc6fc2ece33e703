use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

/// A configuration in N-dimensional configuration space.
///
/// The vector has a fixed length `N` chosen per problem. The first
/// `N - E` entries are the kinematic part and the trailing `E` entries
/// form the extra-config-space suffix (velocities and similar); the split
/// is carried by the robot model, not by this type. Equality is by value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "F: Serialize", deserialize = "F: Deserialize<'de>"))]
pub struct Configuration<F: Float, const N: usize> {
    #[serde(with = "serde_arrays")]
    values: [F; N],
}

impl<F: Float, const N: usize> Configuration<F, N> {
    pub fn new(values: [F; N]) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[F; N] {
        &self.values
    }

    /// Dot product with another configuration.
    pub fn dot(&self, other: &Self) -> F {
        let mut acc = F::zero();
        for i in 0..N {
            acc = acc + self.values[i] * other.values[i];
        }
        acc
    }

    pub fn norm_squared(&self) -> F {
        self.dot(self)
    }

    pub fn norm(&self) -> F {
        self.norm_squared().sqrt()
    }

    pub fn euclidean_distance_squared(&self, other: &Self) -> F {
        (*self - *other).norm_squared()
    }

    pub fn euclidean_distance(&self, other: &Self) -> F {
        self.euclidean_distance_squared(other).sqrt()
    }

    /// Linear interpolation towards `other`; `u = 0` yields `self`,
    /// `u = 1` yields `other`.
    pub fn interpolate(&self, other: &Self, u: F) -> Self {
        *self + (*other - *self) * u
    }
}

impl<F: Float, const N: usize> Index<usize> for Configuration<F, N> {
    type Output = F;

    fn index(&self, index: usize) -> &F {
        &self.values[index]
    }
}

impl<F: Float, const N: usize> IndexMut<usize> for Configuration<F, N> {
    fn index_mut(&mut self, index: usize) -> &mut F {
        &mut self.values[index]
    }
}

impl<F: Float, const N: usize> Add for Configuration<F, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut values = self.values;
        for i in 0..N {
            values[i] = values[i] + rhs.values[i];
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Sub for Configuration<F, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        let mut values = self.values;
        for i in 0..N {
            values[i] = values[i] - rhs.values[i];
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Mul<F> for Configuration<F, N> {
    type Output = Self;

    fn mul(self, rhs: F) -> Self {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = *v * rhs;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Div<F> for Configuration<F, N> {
    type Output = Self;

    fn div(self, rhs: F) -> Self {
        let mut values = self.values;
        for v in values.iter_mut() {
            *v = *v / rhs;
        }
        Self { values }
    }
}

impl<F: Float, const N: usize> Sub for &Configuration<F, N> {
    type Output = Configuration<F, N>;

    fn sub(self, rhs: Self) -> Configuration<F, N> {
        *self - *rhs
    }
}

impl<F: Float, const N: usize> Add for &Configuration<F, N> {
    type Output = Configuration<F, N>;

    fn add(self, rhs: Self) -> Configuration<F, N> {
        *self + *rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = Configuration::new([1.0, 2.0]);
        let b = Configuration::new([4.0, 6.0]);
        assert_eq!((b - a).values(), &[3.0, 4.0]);
        assert_eq!((a + b).values(), &[5.0, 8.0]);
        assert_eq!((a * 2.0).values(), &[2.0, 4.0]);
        assert_eq!((b / 2.0).values(), &[2.0, 3.0]);
    }

    #[test]
    fn norms_and_distances() {
        let a = Configuration::new([0.0, 0.0]);
        let b = Configuration::new([3.0, 4.0]);
        assert_eq!(b.norm(), 5.0);
        assert_eq!(a.euclidean_distance(&b), 5.0);
        assert_eq!(a.euclidean_distance_squared(&b), 25.0);
        assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn interpolation_endpoints() {
        let a = Configuration::new([1.0, -1.0]);
        let b = Configuration::new([3.0, 1.0]);
        assert_eq!(a.interpolate(&b, 0.0), a);
        assert_eq!(a.interpolate(&b, 1.0), b);
        assert_eq!(a.interpolate(&b, 0.5), Configuration::new([2.0, 0.0]));
    }
}
