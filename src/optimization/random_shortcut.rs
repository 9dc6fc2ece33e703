use crate::optimization::PathOptimizer;
use crate::path::{Path, PathPtr, PathVector};
use crate::problem::Problem;
use log::trace;
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

/// Repeatedly samples two parameters on the path, steers directly between
/// them and splices the steered segment in when it is valid and strictly
/// shorter than the part it replaces.
pub struct RandomShortcut {
    rounds: usize,
    rng: StdRng,
}

impl RandomShortcut {
    pub fn new() -> Self {
        Self {
            rounds: 100,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(rounds: usize, seed: u64) -> Self {
        Self {
            rounds,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomShortcut {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float + SampleUniform + 'static, const N: usize> PathOptimizer<F, N> for RandomShortcut {
    fn optimize(&mut self, problem: &Problem<F, N>, path: &PathVector<F, N>) -> PathVector<F, N> {
        let mut current = path.clone();
        for _ in 0..self.rounds {
            let (t0, t1) = current.time_range();
            if t1 - t0 <= F::zero() {
                break;
            }
            let mut u1 = self.rng.gen_range(t0..t1);
            let mut u2 = self.rng.gen_range(t0..t1);
            if u2 < u1 {
                std::mem::swap(&mut u1, &mut u2);
            }
            let (q1, q2) = match (current.eval(u1), current.eval(u2)) {
                (Some(q1), Some(q2)) => (q1, q2),
                _ => continue,
            };
            let direct = match problem.steering_method().steer(&q1, &q2) {
                Some(direct) => direct,
                None => continue,
            };
            let replaced = current.extract(u1, u2);
            if direct.length() >= replaced.length() {
                continue;
            }
            if !problem.path_validation().validate(&direct, false).valid {
                continue;
            }
            let prefix = current.extract(t0, u1);
            let suffix = current.extract(u2, t1);
            let shorter: Vec<PathPtr<F, N>> = vec![prefix, Rc::clone(&direct), suffix];
            current = PathVector::new(shorter);
            trace!(
                "[RandomShortcut] spliced a shortcut, length now {:?}",
                current.length().to_f64()
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::StraightPath;
    use crate::problem::PointRobot;
    use crate::space::state::Configuration;

    fn elbow() -> PathVector<f64, 2> {
        let a = Configuration::new([0.0, 0.0]);
        let b = Configuration::new([1.0, 1.0]);
        let c = Configuration::new([2.0, 0.0]);
        PathVector::new(vec![
            Rc::new(StraightPath::new(a, b, a.euclidean_distance(&b), None)) as PathPtr<f64, 2>,
            Rc::new(StraightPath::new(b, c, b.euclidean_distance(&c), None)) as PathPtr<f64, 2>,
        ])
    }

    fn problem() -> Problem<f64, 2> {
        Problem::new(Rc::new(PointRobot::new([(-1.0, 3.0), (-1.0, 3.0)]))).unwrap()
    }

    #[test]
    fn shortcut_never_lengthens_the_path() {
        let problem = problem();
        let path = elbow();
        let before = path.length();
        let mut optimizer = RandomShortcut::with_seed(50, 3);
        let optimized = optimizer.optimize(&problem, &path);
        assert!(optimized.length() <= before + 1e-9);
        assert_eq!(optimized.initial(), path.initial());
        assert_eq!(optimized.end(), path.end());
    }

    #[test]
    fn shortcut_straightens_a_free_space_detour() {
        let problem = problem();
        let path = elbow();
        let mut optimizer = RandomShortcut::with_seed(200, 7);
        let optimized = optimizer.optimize(&problem, &path);
        // The elbow is 2 sqrt(2) long; the direct segment is 2.
        assert!(optimized.length() < 2.5);
        assert!(optimized.length() >= 2.0 - 1e-9);
    }
}
