use thiserror::Error;

/// Error type for planning and solver operations.
///
/// Local sampling failures (steering, projection or validation rejecting a
/// candidate path) are not errors; they are reported through `Option`/`bool`
/// returns and retried on the next planner step.
#[derive(Error, Debug)]
pub enum Error {
    #[error("there should be exactly one goal node, got {0}")]
    GoalNodeCount(usize),

    #[error("no initial configuration set")]
    NoInitConfig,

    #[error("no robot set")]
    NoRobot,

    #[error("no {kind} with name {name}")]
    UnknownFactory { kind: &'static str, name: String },

    #[error("no path exists in the roadmap")]
    NoPath,

    #[error("planning interrupted")]
    Interrupted,

    #[error("invalid sampling bounds: {0}")]
    InvalidBounds(String),

    #[error("prepare_solve_step_by_step must be called first")]
    NotPrepared,
}

pub type Result<T> = std::result::Result<T, Error>;
