//! Bidirectional RRT* motion planning over a shared roadmap.
//!
//! The crate builds a roadmap (a bidirected graph of collision-free
//! configurations connected by locally steered paths) by growing two
//! trees, one from the initial configuration and one from the goal, and
//! keeps improving the solution by rewiring once the trees merge. The
//! steer / project / validate pipeline is pluggable: steering methods,
//! path projectors, path validations, distances and configuration
//! shooters are trait objects selected per problem, or by name through
//! the [`solver::ProblemSolver`] registries.
//!
//! The planner is randomized; runs are reproducible exactly when the
//! configuration shooter is seeded and the linear neighbor backend is
//! used with a deterministic metric.

pub mod constraint;
pub mod error;
pub mod obstacles;
pub mod optimization;
pub mod path;
pub mod planner;
pub mod problem;
pub mod projection;
pub mod roadmap;
pub mod solver;
pub mod space;
pub mod steering;
pub mod validation;

pub use error::{Error, Result};
pub use path::{Path, PathPtr, PathVector, StraightPath};
pub use planner::{BiRrtStar, PathPlanner};
pub use problem::{ExtraConfigSpace, PointRobot, Problem, Robot};
pub use roadmap::Roadmap;
pub use solver::ProblemSolver;
pub use space::{Configuration, ConfigurationShooter, Distance, EuclideanDistance, UniformShooter};
