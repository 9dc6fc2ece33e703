//! End-to-end planner scenarios on small 2D problems.

use birrt_star::obstacles::{AxisAlignedBox, ObstacleValidation};
use birrt_star::path::Path;
use birrt_star::planner::{BiRrtStar, PathPlanner};
use birrt_star::problem::{PointRobot, Problem};
use birrt_star::roadmap::Roadmap;
use birrt_star::space::distance::EuclideanDistance;
use birrt_star::space::shooter::{ConfigurationShooter, UniformShooter};
use birrt_star::space::state::Configuration;
use birrt_star::validation::DiscretizedValidation;
use birrt_star::Error;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Plays back a fixed sample sequence, then falls through to a seeded
/// uniform shooter. Counts every shot.
struct ScriptedShooter {
    queue: VecDeque<Configuration<f64, 2>>,
    fallback: UniformShooter<f64, 2>,
    shots: Rc<Cell<usize>>,
}

impl ScriptedShooter {
    fn new(samples: &[[f64; 2]], shots: Rc<Cell<usize>>) -> Self {
        Self {
            queue: samples.iter().map(|s| Configuration::new(*s)).collect(),
            fallback: UniformShooter::with_seed([(-1.0, 2.0), (-1.0, 1.0)], 99).unwrap(),
            shots,
        }
    }
}

impl ConfigurationShooter<f64, 2> for ScriptedShooter {
    fn shoot(&mut self) -> Configuration<f64, 2> {
        self.shots.set(self.shots.get() + 1);
        self.queue.pop_front().unwrap_or_else(|| self.fallback.shoot())
    }
}

fn free_space_problem(
    bounds: [(f64, f64); 2],
    init: [f64; 2],
    goal: [f64; 2],
    seed: u64,
) -> Problem<f64, 2> {
    let _ = env_logger::builder().is_test(true).try_init();
    let robot = Rc::new(PointRobot::new(bounds));
    let mut problem = Problem::new(robot).unwrap();
    problem.set_shooter(Box::new(
        UniformShooter::with_seed(bounds, seed).unwrap(),
    ));
    problem.set_init_config(Configuration::new(init));
    problem.add_goal_config(Configuration::new(goal));
    problem
}

fn planner_of(problem: Problem<f64, 2>) -> BiRrtStar<f64, 2> {
    let roadmap = Roadmap::with_kd_tree(Rc::new(EuclideanDistance));
    BiRrtStar::new(problem, roadmap)
}

fn step_until_path_exists(planner: &mut BiRrtStar<f64, 2>, max_steps: usize) -> usize {
    for step in 1..=max_steps {
        planner.one_step().unwrap();
        if planner.roadmap().path_exists() {
            return step;
        }
    }
    panic!("no path after {} steps", max_steps);
}

#[test]
fn trivial_problem_connects_and_keeps_improving() {
    let problem = free_space_problem([(-0.5, 1.5), (-0.5, 0.5)], [0.0, 0.0], [1.0, 0.0], 12);
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();

    let steps = step_until_path_exists(&mut planner, 500);
    assert!(steps <= 500);
    let first = planner.compute_path().unwrap();
    // Nothing beats the straight segment.
    assert!(first.length() >= 1.0 - 1e-9);
    assert_eq!(first.initial(), Configuration::new([0.0, 0.0]));
    assert_eq!(first.end(), Configuration::new([1.0, 0.0]));

    // The one-component phase only ever adds edges, so the extracted
    // path never gets longer.
    for _ in 0..100 {
        planner.one_step().unwrap();
    }
    let improved = planner.compute_path().unwrap();
    assert!(improved.length() <= first.length() + 1e-9);
    assert!(improved.length() >= 1.0 - 1e-9);
}

#[test]
fn component_count_is_monotonically_non_increasing() {
    let problem = free_space_problem([(-0.5, 1.5), (-0.5, 0.5)], [0.0, 0.0], [1.0, 0.0], 5);
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();
    let mut previous = planner.roadmap().component_count();
    for _ in 0..120 {
        planner.one_step().unwrap();
        let current = planner.roadmap().component_count();
        assert!(current <= previous);
        previous = current;
    }
}

#[test]
fn every_planner_edge_has_a_reverse_twin() {
    let problem = free_space_problem([(-0.5, 1.5), (-0.5, 0.5)], [0.0, 0.0], [1.0, 0.0], 21);
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();
    step_until_path_exists(&mut planner, 500);
    for _ in 0..50 {
        planner.one_step().unwrap();
    }

    let roadmap = planner.roadmap();
    let pairs: Vec<(usize, usize)> = roadmap
        .edge_ids()
        .map(|e| {
            let edge = roadmap.edge(e);
            (edge.from().index(), edge.to().index())
        })
        .collect();
    for (from, to) in &pairs {
        assert!(
            pairs.contains(&(*to, *from)),
            "edge ({}, {}) has no reverse twin",
            from,
            to
        );
    }

    // Edge paths start and end on their endpoint configurations.
    for e in roadmap.edge_ids() {
        let edge = roadmap.edge(e);
        let from_q = roadmap.node(edge.from()).configuration();
        let to_q = roadmap.node(edge.to()).configuration();
        assert!(edge.path().initial().euclidean_distance(from_q) < 1e-9);
        assert!(edge.path().end().euclidean_distance(to_q) < 1e-9);
    }
}

#[test]
fn wall_with_funnel_opening_is_cleared() {
    let bounds = [(-0.5, 1.5), (-1.0, 1.0)];
    let mut problem = free_space_problem(bounds, [0.0, 0.0], [1.0, 0.0], 0);
    let wall = AxisAlignedBox::new(
        Configuration::new([0.49, -0.5]),
        Configuration::new([0.51, 0.4]),
    );
    problem.set_path_validation(Rc::new(DiscretizedValidation::new(
        Box::new(ObstacleValidation::new(vec![Rc::new(wall)])),
        0.1,
    )));
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();

    let steps = step_until_path_exists(&mut planner, 500);
    assert!(steps <= 500);
    let path = planner.compute_path().unwrap();
    // Any route has to clear the wall, so it is strictly longer than the
    // straight segment.
    assert!(path.length() >= (1.0f64 + 4.0 * 0.14 * 0.14).sqrt());

    // The solution stays collision free along its whole length.
    let blocked = AxisAlignedBox::new(
        Configuration::new([0.49, -0.5]),
        Configuration::new([0.51, 0.4]),
    );
    let (t0, t1) = path.time_range();
    let samples = 200;
    for i in 0..=samples {
        let t = t0 + (t1 - t0) * (i as f64) / (samples as f64);
        let q = path.eval(t).unwrap();
        assert!(
            !birrt_star::obstacles::AnalyticObstacle::contains(&blocked, &q),
            "solution enters the wall at parameter {}",
            t
        );
    }
}

#[test]
fn rewiring_drops_the_goal_cost_when_a_better_via_point_appears() {
    // First sample builds init -> A -> goal with cost 2.0, second sample
    // B sits on the straight segment and improves the route to 1.6.
    let shots = Rc::new(Cell::new(0));
    let mut problem = free_space_problem([(-1.0, 2.0), (-1.0, 1.0)], [0.0, 0.0], [1.6, 0.0], 1);
    problem.set_shooter(Box::new(ScriptedShooter::new(
        &[[0.8, 0.6], [0.8, 0.0]],
        Rc::clone(&shots),
    )));
    problem.set_parameter("BiRRT*/maxStepLength", 10.0);
    problem.set_parameter("BiRRT*/gamma", 10.0);
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();

    planner.one_step().unwrap();
    assert!(planner.roadmap().path_exists());
    let via_a = planner.compute_path().unwrap();
    assert!((via_a.length() - 2.0).abs() < 1e-9);

    planner.one_step().unwrap();
    let via_b = planner.compute_path().unwrap();
    assert!((via_b.length() - 1.6).abs() < 1e-9);
}

#[test]
fn connect_merges_the_trees_and_later_steps_improve() {
    let shots = Rc::new(Cell::new(0));
    let mut problem = free_space_problem([(-1.0, 2.0), (-1.0, 1.0)], [0.0, 0.0], [1.0, 0.0], 1);
    problem.set_shooter(Box::new(ScriptedShooter::new(
        &[[0.5, 0.5], [0.5, -0.5]],
        Rc::clone(&shots),
    )));
    problem.set_parameter("BiRRT*/maxStepLength", 10.0);
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();
    assert_eq!(planner.roadmap().component_count(), 2);

    // One two-component step: extend reaches the sample, connect grows
    // the goal tree onto it and the components merge.
    planner.one_step().unwrap();
    assert_eq!(planner.roadmap().component_count(), 1);
    assert!(planner.roadmap().path_exists());
    assert_eq!(shots.get(), 1);

    // The next step runs in the one-component phase: the sample feeds
    // the improve pass, which inserts a new shared node.
    let nodes_before = planner.roadmap().node_count();
    planner.one_step().unwrap();
    assert_eq!(shots.get(), 2);
    assert_eq!(planner.roadmap().component_count(), 1);
    assert_eq!(planner.roadmap().node_count(), nodes_before + 1);
}

#[test]
fn two_goal_configurations_fail_the_precondition_and_leave_the_roadmap_alone() {
    let mut problem = free_space_problem([(-1.0, 2.0), (-1.0, 1.0)], [0.0, 0.0], [1.0, 0.0], 1);
    problem.add_goal_config(Configuration::new([0.0, 1.0]));
    let mut planner = planner_of(problem);
    match planner.start_solve() {
        Err(Error::GoalNodeCount(2)) => {}
        other => panic!("expected GoalNodeCount(2), got {:?}", other.err()),
    }
    assert_eq!(planner.roadmap().node_count(), 0);
    assert_eq!(planner.roadmap().edge_count(), 0);
}

#[test]
fn interrupt_returns_without_touching_the_roadmap() {
    let problem = free_space_problem([(-1.0, 2.0), (-1.0, 1.0)], [0.0, 0.0], [1.0, 0.0], 1);
    let mut planner = planner_of(problem);
    planner.start_solve().unwrap();
    planner.one_step().unwrap();
    let nodes = planner.roadmap().node_count();
    let edges = planner.roadmap().edge_count();

    planner.interrupt();
    assert!(matches!(planner.one_step(), Err(Error::Interrupted)));
    assert_eq!(planner.roadmap().node_count(), nodes);
    assert_eq!(planner.roadmap().edge_count(), edges);
}
