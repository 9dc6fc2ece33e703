pub mod aabb;
pub mod sphere;

pub use aabb::AxisAlignedBox;
pub use sphere::Sphere;

use crate::space::state::Configuration;
use crate::validation::ConfigValidation;
use num_traits::Float;
use std::rc::Rc;

/// An obstacle with exact containment and segment-intersection tests in
/// configuration space. No sampling or approximation is involved.
pub trait AnalyticObstacle<F: Float, const N: usize> {
    fn contains(&self, q: &Configuration<F, N>) -> bool;

    fn intersects_segment(&self, start: &Configuration<F, N>, end: &Configuration<F, N>) -> bool;
}

/// Validates configurations and straight segments against a fixed set of
/// analytic obstacles. The obstacle set does not change during a solve.
pub struct ObstacleValidation<F: Float, const N: usize> {
    obstacles: Vec<Rc<dyn AnalyticObstacle<F, N>>>,
}

impl<F: Float, const N: usize> ObstacleValidation<F, N> {
    pub fn new(obstacles: Vec<Rc<dyn AnalyticObstacle<F, N>>>) -> Self {
        Self { obstacles }
    }
}

impl<F: Float, const N: usize> ConfigValidation<F, N> for ObstacleValidation<F, N> {
    fn is_config_valid(&self, q: &Configuration<F, N>) -> bool {
        self.obstacles.iter().all(|obstacle| !obstacle.contains(q))
    }

    fn is_segment_valid(&self, a: &Configuration<F, N>, b: &Configuration<F, N>) -> bool {
        self.obstacles
            .iter()
            .all(|obstacle| !obstacle.intersects_segment(a, b))
    }
}
