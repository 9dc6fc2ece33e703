use crate::constraint::ConstraintSet;
use crate::error::Result;
use crate::projection::PathProjector;
use crate::space::distance::{Distance, EuclideanDistance};
use crate::space::shooter::{ConfigurationShooter, UniformShooter};
use crate::space::state::Configuration;
use crate::steering::{SteeringMethod, StraightSteering};
use crate::validation::{AlwaysValid, DiscretizedValidation, PathValidation};
use num_traits::Float;
use rand::distributions::uniform::SampleUniform;
use std::collections::HashMap;
use std::rc::Rc;

/// The dimensions appended to the kinematic configuration, typically
/// carrying velocities.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtraConfigSpace {
    pub dimension: usize,
}

/// Kinematic facade of the robot model.
///
/// The configuration size is the type-level `N`; the trailing
/// `extra_config_space().dimension` entries are not degrees of freedom.
pub trait Robot<F: Float, const N: usize> {
    fn config_size(&self) -> usize {
        N
    }

    fn extra_config_space(&self) -> &ExtraConfigSpace;

    fn number_dof(&self) -> usize {
        N - self.extra_config_space().dimension
    }

    /// Per-axis configuration bounds, used by the default shooter.
    fn bounds(&self) -> [(F, F); N];
}

/// A free-flying point in configuration space.
pub struct PointRobot<F: Float, const N: usize> {
    bounds: [(F, F); N],
    extra_config_space: ExtraConfigSpace,
}

impl<F: Float, const N: usize> PointRobot<F, N> {
    pub fn new(bounds: [(F, F); N]) -> Self {
        Self {
            bounds,
            extra_config_space: ExtraConfigSpace::default(),
        }
    }

    pub fn with_extra_config_space(bounds: [(F, F); N], dimension: usize) -> Self {
        debug_assert!(dimension <= N);
        Self {
            bounds,
            extra_config_space: ExtraConfigSpace { dimension },
        }
    }
}

impl<F: Float, const N: usize> Robot<F, N> for PointRobot<F, N> {
    fn extra_config_space(&self) -> &ExtraConfigSpace {
        &self.extra_config_space
    }

    fn bounds(&self) -> [(F, F); N] {
        self.bounds
    }
}

/// The planning problem: robot, metric, steering, validation, optional
/// projection and constraints, start and goal configurations, and named
/// floating-point parameters.
///
/// Everything except the shooter is read-only during a solve.
pub struct Problem<F: Float, const N: usize> {
    robot: Rc<dyn Robot<F, N>>,
    distance: Rc<dyn Distance<F, N>>,
    steering_method: Box<dyn SteeringMethod<F, N>>,
    path_validation: Rc<dyn PathValidation<F, N>>,
    path_projector: Option<Rc<dyn PathProjector<F, N>>>,
    shooter: Box<dyn ConfigurationShooter<F, N>>,
    constraints: Option<ConstraintSet<F, N>>,
    init_config: Option<Configuration<F, N>>,
    goal_configs: Vec<Configuration<F, N>>,
    parameters: HashMap<String, F>,
}

impl<F: Float + SampleUniform + 'static, const N: usize> Problem<F, N> {
    /// Builds a problem with the default collaborators: Euclidean
    /// distance, straight steering, discretized validation without
    /// obstacles, no projector, and a uniform shooter over the robot's
    /// bounds.
    pub fn new(robot: Rc<dyn Robot<F, N>>) -> Result<Self> {
        let distance: Rc<dyn Distance<F, N>> = Rc::new(EuclideanDistance);
        let steering_method = Box::new(StraightSteering::new(Rc::clone(&distance)));
        let path_validation = Rc::new(DiscretizedValidation::new(
            Box::new(AlwaysValid),
            F::from(0.05).unwrap(),
        ));
        let shooter = Box::new(UniformShooter::new(robot.bounds())?);
        Ok(Self {
            robot,
            distance,
            steering_method,
            path_validation,
            path_projector: None,
            shooter,
            constraints: None,
            init_config: None,
            goal_configs: Vec::new(),
            parameters: Self::default_parameters(),
        })
    }

    fn default_parameters() -> HashMap<String, F> {
        let mut parameters = HashMap::new();
        parameters.insert("BiRRT*/maxStepLength".to_owned(), F::from(-1.0).unwrap());
        parameters.insert("BiRRT*/gamma".to_owned(), F::one());
        parameters.insert(
            "PathProjection/HessianBound".to_owned(),
            F::from(-1.0).unwrap(),
        );
        parameters.insert(
            "PathProjection/MinimalDist".to_owned(),
            F::from(1e-3).unwrap(),
        );
        parameters.insert(
            "PathProjection/RecursiveHermite/Beta".to_owned(),
            F::from(0.9).unwrap(),
        );
        parameters
    }
}

impl<F: Float, const N: usize> Problem<F, N> {
    pub fn robot(&self) -> &Rc<dyn Robot<F, N>> {
        &self.robot
    }

    pub fn distance(&self) -> &Rc<dyn Distance<F, N>> {
        &self.distance
    }

    pub fn set_distance(&mut self, distance: Rc<dyn Distance<F, N>>) {
        self.distance = distance;
    }

    pub fn steering_method(&self) -> &dyn SteeringMethod<F, N> {
        self.steering_method.as_ref()
    }

    pub fn set_steering_method(&mut self, steering_method: Box<dyn SteeringMethod<F, N>>) {
        self.steering_method = steering_method;
    }

    pub fn path_validation(&self) -> &Rc<dyn PathValidation<F, N>> {
        &self.path_validation
    }

    pub fn set_path_validation(&mut self, path_validation: Rc<dyn PathValidation<F, N>>) {
        self.path_validation = path_validation;
    }

    pub fn path_projector(&self) -> Option<&Rc<dyn PathProjector<F, N>>> {
        self.path_projector.as_ref()
    }

    pub fn set_path_projector(&mut self, path_projector: Option<Rc<dyn PathProjector<F, N>>>) {
        self.path_projector = path_projector;
    }

    pub fn set_shooter(&mut self, shooter: Box<dyn ConfigurationShooter<F, N>>) {
        self.shooter = shooter;
    }

    /// Draws the next random configuration from the shooter.
    pub fn shoot(&mut self) -> Configuration<F, N> {
        self.shooter.shoot()
    }

    pub fn constraint_set(&self) -> Option<&ConstraintSet<F, N>> {
        self.constraints.as_ref()
    }

    /// Installs the constraint set on the problem and on the steering
    /// method, which attaches a re-bound copy to every steered path.
    pub fn set_constraint_set(&mut self, constraints: Option<ConstraintSet<F, N>>) {
        self.steering_method.set_constraints(constraints.clone());
        self.constraints = constraints;
    }

    pub fn init_config(&self) -> Option<&Configuration<F, N>> {
        self.init_config.as_ref()
    }

    pub fn set_init_config(&mut self, q: Configuration<F, N>) {
        self.init_config = Some(q);
    }

    pub fn goal_configs(&self) -> &[Configuration<F, N>] {
        &self.goal_configs
    }

    pub fn add_goal_config(&mut self, q: Configuration<F, N>) {
        self.goal_configs.push(q);
    }

    pub fn reset_goal_configs(&mut self) {
        self.goal_configs.clear();
    }

    /// Looks up a named parameter. Unknown keys are programming errors.
    pub fn parameter(&self, key: &str) -> F {
        match self.parameters.get(key) {
            Some(value) => *value,
            None => panic!("unknown parameter {}", key),
        }
    }

    pub fn set_parameter(&mut self, key: impl Into<String>, value: F) {
        self.parameters.insert(key.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{AffineFunction, ConfigProjector};

    fn problem() -> Problem<f64, 2> {
        let robot = Rc::new(PointRobot::new([(0.0, 1.0), (0.0, 1.0)]));
        Problem::new(robot).unwrap()
    }

    #[test]
    fn default_parameters_are_registered() {
        let p = problem();
        assert_eq!(p.parameter("BiRRT*/maxStepLength"), -1.0);
        assert_eq!(p.parameter("BiRRT*/gamma"), 1.0);
        assert_eq!(p.parameter("PathProjection/MinimalDist"), 1e-3);
        assert_eq!(p.parameter("PathProjection/HessianBound"), -1.0);
        assert_eq!(p.parameter("PathProjection/RecursiveHermite/Beta"), 0.9);
    }

    #[test]
    fn parameters_can_be_overridden() {
        let mut p = problem();
        p.set_parameter("BiRRT*/gamma", 2.5);
        assert_eq!(p.parameter("BiRRT*/gamma"), 2.5);
    }

    #[test]
    fn number_dof_excludes_the_extra_config_space() {
        let robot = PointRobot::<f64, 2>::with_extra_config_space([(0.0, 1.0), (0.0, 1.0)], 1);
        assert_eq!(robot.config_size(), 2);
        assert_eq!(robot.number_dof(), 1);
    }

    #[test]
    fn constraint_set_reaches_the_steering_method() {
        let mut p = problem();
        let mut projector = ConfigProjector::new(1e-8, 20);
        projector.add(Rc::new(AffineFunction::new(
            Configuration::new([1.0, 0.0]),
            0.0,
        )));
        p.set_constraint_set(Some(ConstraintSet::with_projector("plane", projector)));
        let q1 = Configuration::new([0.5, 0.0]);
        let q2 = Configuration::new([0.5, 1.0]);
        let path = p.steering_method().steer(&q1, &q2).unwrap();
        assert!(path.constraints().is_some());
        assert_eq!(
            path.constraints()
                .unwrap()
                .config_projector()
                .unwrap()
                .right_hand_side(),
            &[0.5]
        );
    }
}
