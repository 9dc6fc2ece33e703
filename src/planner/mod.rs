pub mod bi_rrt_star;

pub use bi_rrt_star::BiRrtStar;

use crate::error::{Error, Result};
use crate::path::{PathPtr, PathVector};
use crate::problem::Problem;
use crate::roadmap::{NodeId, Roadmap};
use num_traits::Float;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A roadmap-building path planner, driven cooperatively.
///
/// The caller invokes `start_solve` once, then `one_step` repeatedly
/// until `roadmap().path_exists()`, then `compute_path`. The `interrupt`
/// flag may be set from another thread; it is observed only between
/// steps, never inside one.
pub trait PathPlanner<F: Float, const N: usize> {
    fn problem(&self) -> &Problem<F, N>;

    fn problem_mut(&mut self) -> &mut Problem<F, N>;

    fn roadmap(&self) -> &Roadmap<F, N>;

    fn roadmap_mut(&mut self) -> &mut Roadmap<F, N>;

    fn interrupt_flag(&self) -> &Arc<AtomicBool>;

    /// Validates preconditions and seeds the roadmap from the problem's
    /// init and goal configurations.
    fn start_solve(&mut self) -> Result<()>;

    /// Runs one planning iteration. Returns `Error::Interrupted` without
    /// touching the roadmap when the interrupt flag is set.
    fn one_step(&mut self) -> Result<()>;

    /// Extracts the solution path once `roadmap().path_exists()`.
    fn compute_path(&self) -> Result<PathVector<F, N>>;

    fn interrupt(&self) {
        self.interrupt_flag().store(true, Ordering::Relaxed);
    }

    fn interrupted(&self) -> bool {
        self.interrupt_flag().load(Ordering::Relaxed)
    }

    /// Tries to connect the init node straight to each goal node; adds
    /// the edge pair for every fully valid candidate.
    fn try_direct_path(&mut self) -> Result<()> {
        let init = self.roadmap().init_node().ok_or(Error::NoInitConfig)?;
        let init_q = *self.roadmap().node(init).configuration();
        let goal_ids: Vec<NodeId> = self.roadmap().goal_nodes().to_vec();
        for goal in goal_ids {
            if goal == init {
                continue;
            }
            let goal_q = *self.roadmap().node(goal).configuration();
            let problem = self.problem();
            let path = match problem.steering_method().steer(&init_q, &goal_q) {
                Some(path) => path,
                None => continue,
            };
            let path = match problem.path_projector() {
                Some(projector) => match projector.apply(&path) {
                    Some(projected) => projected,
                    None => continue,
                },
                None => path,
            };
            if !problem.path_validation().validate(&path, false).valid {
                continue;
            }
            // Projection may have moved the endpoints off the nodes.
            let tolerance = F::from(1e-6).unwrap();
            let distance = problem.distance();
            if distance.eval(&path.initial(), &init_q) > tolerance
                || distance.eval(&path.end(), &goal_q) > tolerance
            {
                continue;
            }
            let reversed: PathPtr<F, N> = path.reverse();
            let roadmap = self.roadmap_mut();
            roadmap.add_edge(init, goal, path);
            roadmap.add_edge(goal, init, reversed);
        }
        Ok(())
    }

    /// Full solve loop: start, direct-path attempt, then one step at a
    /// time until a path exists or the interrupt flag is raised.
    fn solve(&mut self) -> Result<PathVector<F, N>> {
        self.start_solve()?;
        self.try_direct_path()?;
        while !self.roadmap().path_exists() {
            if self.interrupted() {
                return Err(Error::Interrupted);
            }
            self.one_step()?;
        }
        self.compute_path()
    }
}
