use crate::obstacles::AnalyticObstacle;
use crate::space::state::Configuration;
use num_traits::Float;
use serde::{Deserialize, Serialize};

/// An axis-aligned hyper-rectangle in configuration space.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AxisAlignedBox<F: Float, const N: usize> {
    min_corner: Configuration<F, N>,
    max_corner: Configuration<F, N>,
}

impl<F: Float, const N: usize> AxisAlignedBox<F, N> {
    pub fn new(min_corner: Configuration<F, N>, max_corner: Configuration<F, N>) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    pub fn min_corner(&self) -> &Configuration<F, N> {
        &self.min_corner
    }

    pub fn max_corner(&self) -> &Configuration<F, N> {
        &self.max_corner
    }
}

impl<F: Float, const N: usize> AnalyticObstacle<F, N> for AxisAlignedBox<F, N> {
    fn contains(&self, q: &Configuration<F, N>) -> bool {
        (0..N).all(|i| q[i] >= self.min_corner[i] && q[i] <= self.max_corner[i])
    }

    /// Clips the segment's parameter interval, starting from [0, 1],
    /// against every axis slab in turn. The segment meets the box iff
    /// the interval never empties.
    fn intersects_segment(&self, start: &Configuration<F, N>, end: &Configuration<F, N>) -> bool {
        let mut interval = (F::zero(), F::one());
        for axis in 0..N {
            let origin = start[axis];
            let delta = end[axis] - origin;
            if delta == F::zero() {
                // No motion along this axis: the whole segment either
                // sits inside the slab or misses the box entirely.
                if origin < self.min_corner[axis] || origin > self.max_corner[axis] {
                    return false;
                }
                continue;
            }
            let towards_min = (self.min_corner[axis] - origin) / delta;
            let towards_max = (self.max_corner[axis] - origin) / delta;
            let enter = towards_min.min(towards_max);
            let leave = towards_min.max(towards_max);
            interval = (interval.0.max(enter), interval.1.min(leave));
            if interval.0 > interval.1 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> AxisAlignedBox<f64, 2> {
        AxisAlignedBox::new(
            Configuration::new([0.45, -0.5]),
            Configuration::new([0.55, 0.4]),
        )
    }

    #[test]
    fn containment() {
        let b = wall();
        assert!(b.contains(&Configuration::new([0.5, 0.0])));
        assert!(!b.contains(&Configuration::new([0.5, 0.5])));
        assert!(!b.contains(&Configuration::new([0.0, 0.0])));
    }

    #[test]
    fn crossing_segment_intersects() {
        let b = wall();
        let a = Configuration::new([0.0, 0.0]);
        let c = Configuration::new([1.0, 0.0]);
        assert!(b.intersects_segment(&a, &c));
    }

    #[test]
    fn segment_over_the_top_does_not_intersect() {
        let b = wall();
        let a = Configuration::new([0.0, 0.45]);
        let c = Configuration::new([1.0, 0.45]);
        assert!(!b.intersects_segment(&a, &c));
    }

    #[test]
    fn segment_parallel_outside_does_not_intersect() {
        let b = wall();
        let a = Configuration::new([0.2, -1.0]);
        let c = Configuration::new([0.2, 1.0]);
        assert!(!b.intersects_segment(&a, &c));
    }
}
