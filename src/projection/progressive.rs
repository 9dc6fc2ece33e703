use crate::path::{PathPtr, PathVector};
use crate::projection::PathProjector;
use crate::space::distance::Distance;
use crate::steering::SteeringMethod;
use log::trace;
use num_traits::Float;
use std::rc::Rc;

/// Projects a path by walking it at a fixed parameter step, projecting
/// each sampled configuration with the path's constraint set, and
/// connecting consecutive projected configurations with the steering
/// method (stripped of constraints).
///
/// Projection fails as a whole when a sample does not project or when
/// two consecutive projected configurations come closer than
/// `minimal_dist`. Only full projections are returned, so the projected
/// path keeps the endpoints the planner expects.
pub struct ProgressiveProjector<F: Float, const N: usize> {
    distance: Rc<dyn Distance<F, N>>,
    steering: Box<dyn SteeringMethod<F, N>>,
    step: F,
    minimal_dist: F,
}

impl<F: Float, const N: usize> ProgressiveProjector<F, N> {
    /// Parameters:
    /// - `distance`: The metric used for the stall check.
    /// - `steering`: Copied; its constraint set is dropped so that the
    ///   produced segments interpolate the projected configurations as is.
    /// - `step`: The sampling step along the input path parameter.
    /// - `minimal_dist`: The halting threshold between consecutive
    ///   projected configurations.
    pub fn new(
        distance: Rc<dyn Distance<F, N>>,
        steering: &dyn SteeringMethod<F, N>,
        step: F,
        minimal_dist: F,
    ) -> Self {
        let mut steering = steering.boxed_clone();
        steering.set_constraints(None);
        Self {
            distance,
            steering,
            step,
            minimal_dist,
        }
    }
}

impl<F: Float + 'static, const N: usize> PathProjector<F, N> for ProgressiveProjector<F, N> {
    fn apply(&self, path: &PathPtr<F, N>) -> Option<PathPtr<F, N>> {
        let has_projector = path
            .constraints()
            .and_then(|set| set.config_projector())
            .is_some();
        if !has_projector {
            return Some(Rc::clone(path));
        }

        let (t0, t1) = path.time_range();
        let span = t1 - t0;
        if span <= F::zero() {
            return Some(Rc::clone(path));
        }

        let steps = (span / self.step).ceil().to_usize().unwrap_or(1).max(1);
        let mut configs = vec![path.eval(t0)?];
        for i in 1..=steps {
            let t = if i == steps {
                t1
            } else {
                t0 + span * F::from(i).unwrap() / F::from(steps).unwrap()
            };
            let q = match path.eval(t) {
                Some(q) => q,
                None => {
                    trace!("[Progressive] projection failed at parameter {:?}", t.to_f64());
                    return None;
                }
            };
            let prev = configs.last().unwrap();
            if self.distance.eval(prev, &q) < self.minimal_dist {
                trace!("[Progressive] projection stalled at parameter {:?}", t.to_f64());
                return None;
            }
            configs.push(q);
        }
        let mut segments: Vec<PathPtr<F, N>> = Vec::with_capacity(configs.len() - 1);
        for pair in configs.windows(2) {
            segments.push(self.steering.steer(&pair[0], &pair[1])?);
        }
        Some(Rc::new(PathVector::new(segments)))
    }
}
