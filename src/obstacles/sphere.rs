use crate::obstacles::AnalyticObstacle;
use crate::space::state::Configuration;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// A solid N-dimensional ball in configuration space.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sphere<F: Float, const N: usize> {
    center: Configuration<F, N>,
    radius: F,
}

impl<F: Float, const N: usize> Sphere<F, N> {
    pub fn new(center: Configuration<F, N>, radius: F) -> Self {
        Self { center, radius }
    }

    pub fn center(&self) -> &Configuration<F, N> {
        &self.center
    }

    pub fn radius(&self) -> F {
        self.radius
    }
}

impl<F: Float, const N: usize> AnalyticObstacle<F, N> for Sphere<F, N> {
    fn contains(&self, q: &Configuration<F, N>) -> bool {
        self.center.euclidean_distance_squared(q) < self.radius * self.radius
    }

    /// The segment meets the open ball iff its closest point to the
    /// center does.
    fn intersects_segment(&self, start: &Configuration<F, N>, end: &Configuration<F, N>) -> bool {
        let span = *end - *start;
        let span_sq = span.norm_squared();
        if span_sq == F::zero() {
            return self.contains(start);
        }
        // Parameter of the closest point, clamped onto the segment.
        let u = ((self.center - *start).dot(&span) / span_sq)
            .max(F::zero())
            .min(F::one());
        let closest = start.interpolate(end, u);
        self.contains(&closest)
    }
}
