use crate::constraint::ConstraintSet;
use crate::error::{Error, Result};
use crate::obstacles::{AnalyticObstacle, ObstacleValidation};
use crate::optimization::{PathOptimizer, RandomShortcut};
use crate::path::PathVector;
use crate::planner::{BiRrtStar, PathPlanner};
use crate::problem::{Problem, Robot};
use crate::projection::{PathProjector, ProgressiveProjector};
use crate::roadmap::Roadmap;
use crate::space::distance::Distance;
use crate::space::shooter::{ConfigurationShooter, UniformShooter};
use crate::space::state::Configuration;
use crate::steering::SteeringMethod;
use crate::validation::{ConfigValidation, DiscretizedValidation, PathValidation};
use kiddo::float::kdtree::Axis;
use log::debug;
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use std::collections::HashMap;
use std::rc::Rc;

/// Builds a planner owning the problem and the roadmap.
pub type PlannerBuilder<F, const N: usize> =
    fn(Problem<F, N>, Roadmap<F, N>) -> Box<dyn PathPlanner<F, N>>;

/// Builds a path validation from a config-level checker and a tolerance.
pub type ValidationBuilder<F, const N: usize> =
    fn(Box<dyn ConfigValidation<F, N>>, F) -> Rc<dyn PathValidation<F, N>>;

/// Builds a path projector from `(distance, steering method, tolerance,
/// minimal distance)`. Returning None means paths are not projected.
pub type ProjectorBuilder<F, const N: usize> =
    fn(Rc<dyn Distance<F, N>>, &dyn SteeringMethod<F, N>, F, F) -> Option<Rc<dyn PathProjector<F, N>>>;

/// Builds a path optimizer; None disables optimization for that entry.
pub type OptimizerBuilder<F, const N: usize> = fn() -> Option<Box<dyn PathOptimizer<F, N>>>;

/// Builds a configuration shooter for the robot, optionally seeded.
pub type ShooterBuilder<F, const N: usize> =
    fn(&dyn Robot<F, N>, Option<u64>) -> Result<Box<dyn ConfigurationShooter<F, N>>>;

fn discretized_validation<F: Float + 'static, const N: usize>(
    checker: Box<dyn ConfigValidation<F, N>>,
    tolerance: F,
) -> Rc<dyn PathValidation<F, N>> {
    Rc::new(DiscretizedValidation::new(checker, tolerance))
}

fn none_projector<F: Float, const N: usize>(
    _distance: Rc<dyn Distance<F, N>>,
    _steering: &dyn SteeringMethod<F, N>,
    _tolerance: F,
    _minimal_dist: F,
) -> Option<Rc<dyn PathProjector<F, N>>> {
    None
}

fn progressive_projector<F: Float + 'static, const N: usize>(
    distance: Rc<dyn Distance<F, N>>,
    steering: &dyn SteeringMethod<F, N>,
    tolerance: F,
    minimal_dist: F,
) -> Option<Rc<dyn PathProjector<F, N>>> {
    Some(Rc::new(ProgressiveProjector::new(
        distance,
        steering,
        tolerance,
        minimal_dist,
    )))
}

fn none_optimizer<F: Float, const N: usize>() -> Option<Box<dyn PathOptimizer<F, N>>> {
    None
}

fn random_shortcut_optimizer<F: Float + SampleUniform + 'static, const N: usize>(
) -> Option<Box<dyn PathOptimizer<F, N>>> {
    Some(Box::new(RandomShortcut::new()))
}

fn uniform_shooter<F: Float + SampleUniform + 'static, const N: usize>(
    robot: &dyn Robot<F, N>,
    seed: Option<u64>,
) -> Result<Box<dyn ConfigurationShooter<F, N>>> {
    let shooter = match seed {
        Some(seed) => UniformShooter::with_seed(robot.bounds(), seed)?,
        None => UniformShooter::new(robot.bounds())?,
    };
    Ok(Box::new(shooter))
}

/// Drives a solve end to end: holds the problem ingredients, looks up the
/// selected implementations in per-kind factory registries, builds the
/// planner, and extracts and optimizes the result.
///
/// Registries are plain per-instance maps from name to factory function;
/// there is no process-wide registration. Unknown names are rejected at
/// selection time with an error naming the missing entry.
pub struct ProblemSolver<F: Float, const N: usize> {
    robot: Option<Rc<dyn Robot<F, N>>>,
    init_config: Option<Configuration<F, N>>,
    goal_configs: Vec<Configuration<F, N>>,
    obstacles: Vec<Rc<dyn AnalyticObstacle<F, N>>>,
    constraint_set: Option<ConstraintSet<F, N>>,
    parameters: Vec<(String, F)>,
    planner_type: String,
    validation_type: String,
    validation_tolerance: F,
    projector_type: String,
    projector_tolerance: F,
    shooter_type: String,
    shooter_seed: Option<u64>,
    optimizer_types: Vec<String>,
    planner_factory: HashMap<String, PlannerBuilder<F, N>>,
    validation_factory: HashMap<String, ValidationBuilder<F, N>>,
    projector_factory: HashMap<String, ProjectorBuilder<F, N>>,
    optimizer_factory: HashMap<String, OptimizerBuilder<F, N>>,
    shooter_factory: HashMap<String, ShooterBuilder<F, N>>,
    planner: Option<Box<dyn PathPlanner<F, N>>>,
    paths: Vec<PathVector<F, N>>,
}

impl<F, const N: usize> ProblemSolver<F, N>
where
    F: Float + Axis + SampleUniform + 'static,
{
    pub fn new() -> Self {
        let mut planner_factory: HashMap<String, PlannerBuilder<F, N>> = HashMap::new();
        planner_factory.insert("BiRRT*".to_owned(), BiRrtStar::create);

        let mut validation_factory: HashMap<String, ValidationBuilder<F, N>> = HashMap::new();
        validation_factory.insert("Discretized".to_owned(), discretized_validation);

        let mut projector_factory: HashMap<String, ProjectorBuilder<F, N>> = HashMap::new();
        projector_factory.insert("None".to_owned(), none_projector);
        projector_factory.insert("Progressive".to_owned(), progressive_projector);

        let mut optimizer_factory: HashMap<String, OptimizerBuilder<F, N>> = HashMap::new();
        optimizer_factory.insert("None".to_owned(), none_optimizer);
        optimizer_factory.insert("RandomShortcut".to_owned(), random_shortcut_optimizer);

        let mut shooter_factory: HashMap<String, ShooterBuilder<F, N>> = HashMap::new();
        shooter_factory.insert("Uniform".to_owned(), uniform_shooter);

        Self {
            robot: None,
            init_config: None,
            goal_configs: Vec::new(),
            obstacles: Vec::new(),
            constraint_set: None,
            parameters: Vec::new(),
            planner_type: "BiRRT*".to_owned(),
            validation_type: "Discretized".to_owned(),
            validation_tolerance: F::from(0.05).unwrap(),
            projector_type: "None".to_owned(),
            projector_tolerance: F::from(0.2).unwrap(),
            shooter_type: "Uniform".to_owned(),
            shooter_seed: None,
            optimizer_types: Vec::new(),
            planner_factory,
            validation_factory,
            projector_factory,
            optimizer_factory,
            shooter_factory,
            planner: None,
            paths: Vec::new(),
        }
    }

    pub fn set_robot(&mut self, robot: Rc<dyn Robot<F, N>>) {
        self.robot = Some(robot);
    }

    pub fn set_init_config(&mut self, q: Configuration<F, N>) {
        self.init_config = Some(q);
    }

    pub fn add_goal_config(&mut self, q: Configuration<F, N>) {
        self.goal_configs.push(q);
    }

    pub fn reset_goal_configs(&mut self) {
        self.goal_configs.clear();
    }

    pub fn add_obstacle(&mut self, obstacle: Rc<dyn AnalyticObstacle<F, N>>) {
        self.obstacles.push(obstacle);
    }

    pub fn set_constraint_set(&mut self, constraint_set: Option<ConstraintSet<F, N>>) {
        self.constraint_set = constraint_set;
    }

    /// Records a named parameter forwarded to the problem at build time.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: F) {
        self.parameters.push((key.into(), value));
    }

    pub fn set_shooter_seed(&mut self, seed: Option<u64>) {
        self.shooter_seed = seed;
    }

    pub fn set_planner_type(&mut self, name: &str) -> Result<()> {
        if !self.planner_factory.contains_key(name) {
            return Err(Error::UnknownFactory {
                kind: "path planner",
                name: name.to_owned(),
            });
        }
        self.planner_type = name.to_owned();
        Ok(())
    }

    pub fn set_path_validation_type(&mut self, name: &str, tolerance: F) -> Result<()> {
        if !self.validation_factory.contains_key(name) {
            return Err(Error::UnknownFactory {
                kind: "path validation method",
                name: name.to_owned(),
            });
        }
        self.validation_type = name.to_owned();
        self.validation_tolerance = tolerance;
        Ok(())
    }

    pub fn set_path_projector_type(&mut self, name: &str, tolerance: F) -> Result<()> {
        if !self.projector_factory.contains_key(name) {
            return Err(Error::UnknownFactory {
                kind: "path projector method",
                name: name.to_owned(),
            });
        }
        self.projector_type = name.to_owned();
        self.projector_tolerance = tolerance;
        Ok(())
    }

    pub fn set_configuration_shooter_type(&mut self, name: &str) -> Result<()> {
        if !self.shooter_factory.contains_key(name) {
            return Err(Error::UnknownFactory {
                kind: "configuration shooter",
                name: name.to_owned(),
            });
        }
        self.shooter_type = name.to_owned();
        Ok(())
    }

    pub fn add_path_optimizer(&mut self, name: &str) -> Result<()> {
        if !self.optimizer_factory.contains_key(name) {
            return Err(Error::UnknownFactory {
                kind: "path optimizer",
                name: name.to_owned(),
            });
        }
        self.optimizer_types.push(name.to_owned());
        Ok(())
    }

    pub fn clear_path_optimizers(&mut self) {
        self.optimizer_types.clear();
    }

    /// Registers an additional planner factory under `name`.
    pub fn register_planner(&mut self, name: impl Into<String>, builder: PlannerBuilder<F, N>) {
        self.planner_factory.insert(name.into(), builder);
    }

    pub fn register_path_validation(
        &mut self,
        name: impl Into<String>,
        builder: ValidationBuilder<F, N>,
    ) {
        self.validation_factory.insert(name.into(), builder);
    }

    pub fn register_path_projector(
        &mut self,
        name: impl Into<String>,
        builder: ProjectorBuilder<F, N>,
    ) {
        self.projector_factory.insert(name.into(), builder);
    }

    pub fn register_path_optimizer(
        &mut self,
        name: impl Into<String>,
        builder: OptimizerBuilder<F, N>,
    ) {
        self.optimizer_factory.insert(name.into(), builder);
    }

    fn build_problem(&self) -> Result<Problem<F, N>> {
        let robot = self.robot.clone().ok_or(Error::NoRobot)?;
        let mut problem = Problem::new(Rc::clone(&robot))?;

        for (key, value) in &self.parameters {
            problem.set_parameter(key.clone(), *value);
        }

        let validation_builder = self.validation_factory[&self.validation_type];
        let checker: Box<dyn ConfigValidation<F, N>> =
            Box::new(ObstacleValidation::new(self.obstacles.clone()));
        problem.set_path_validation(validation_builder(checker, self.validation_tolerance));

        problem.set_constraint_set(self.constraint_set.clone());

        let projector_builder = self.projector_factory[&self.projector_type];
        let minimal_dist = problem.parameter("PathProjection/MinimalDist");
        let projector = projector_builder(
            Rc::clone(problem.distance()),
            problem.steering_method(),
            self.projector_tolerance,
            minimal_dist,
        );
        problem.set_path_projector(projector);

        let shooter_builder = self.shooter_factory[&self.shooter_type];
        problem.set_shooter(shooter_builder(robot.as_ref(), self.shooter_seed)?);

        if let Some(q) = self.init_config {
            problem.set_init_config(q);
        }
        for q in &self.goal_configs {
            problem.add_goal_config(*q);
        }
        Ok(problem)
    }

    /// Builds the problem and the planner, runs `start_solve` and the
    /// direct-path attempt, and reports whether a path already exists.
    pub fn prepare_solve_step_by_step(&mut self) -> Result<bool> {
        let problem = self.build_problem()?;
        let roadmap = Roadmap::with_kd_tree(Rc::clone(problem.distance()));
        let create = self.planner_factory[&self.planner_type];
        let mut planner = create(problem, roadmap);
        planner.start_solve()?;
        planner.try_direct_path()?;
        let exists = planner.roadmap().path_exists();
        debug!(
            "[ProblemSolver] prepared with planner {}, direct path {}",
            self.planner_type,
            if exists { "found" } else { "not found" }
        );
        self.planner = Some(planner);
        Ok(exists)
    }

    /// Runs one planner step; returns whether a path now exists.
    pub fn execute_one_step(&mut self) -> Result<bool> {
        let planner = self.planner.as_mut().ok_or(Error::NotPrepared)?;
        planner.one_step()?;
        Ok(planner.roadmap().path_exists())
    }

    /// Extracts and stores the solution path.
    pub fn finish_solve_step_by_step(&mut self) -> Result<&PathVector<F, N>> {
        let planner = self.planner.as_ref().ok_or(Error::NotPrepared)?;
        if !planner.roadmap().path_exists() {
            return Err(Error::NoPath);
        }
        let path = planner.compute_path()?;
        self.paths.push(path);
        Ok(self.paths.last().unwrap())
    }

    /// Full solve: prepare, step until a path exists, extract, then run
    /// the selected optimizers, storing each result.
    pub fn solve(&mut self) -> Result<&PathVector<F, N>> {
        let mut exists = self.prepare_solve_step_by_step()?;
        while !exists {
            exists = self.execute_one_step()?;
        }
        let planner = self.planner.as_ref().unwrap();
        let mut path = planner.compute_path()?;
        self.paths.push(path.clone());
        for name in self.optimizer_types.clone() {
            let builder = self.optimizer_factory[&name];
            if let Some(mut optimizer) = builder() {
                path = optimizer.optimize(self.planner.as_ref().unwrap().problem(), &path);
                self.paths.push(path.clone());
            }
        }
        Ok(self.paths.last().unwrap())
    }

    /// Raises the planner's cooperative interrupt flag.
    pub fn interrupt(&self) {
        if let Some(planner) = &self.planner {
            planner.interrupt();
        }
    }

    pub fn planner(&self) -> Option<&dyn PathPlanner<F, N>> {
        self.planner.as_deref()
    }

    pub fn paths(&self) -> &[PathVector<F, N>] {
        &self.paths
    }
}

impl<F, const N: usize> Default for ProblemSolver<F, N>
where
    F: Float + Axis + SampleUniform + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
