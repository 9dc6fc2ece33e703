pub mod discretized;

pub use discretized::DiscretizedValidation;

use crate::path::PathPtr;
use crate::space::state::Configuration;
use num_traits::Float;

/// Validity tests for single configurations and straight segments.
pub trait ConfigValidation<F: Float, const N: usize> {
    fn is_config_valid(&self, q: &Configuration<F, N>) -> bool;

    fn is_segment_valid(&self, a: &Configuration<F, N>, b: &Configuration<F, N>) -> bool;
}

/// Accepts every configuration and segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysValid;

impl<F: Float, const N: usize> ConfigValidation<F, N> for AlwaysValid {
    fn is_config_valid(&self, _q: &Configuration<F, N>) -> bool {
        true
    }

    fn is_segment_valid(&self, _a: &Configuration<F, N>, _b: &Configuration<F, N>) -> bool {
        true
    }
}

/// Report attached to a failed validation; `parameter` is the first
/// parameter found invalid along the traversed direction.
#[derive(Clone, Copy, Debug)]
pub struct PathValidationReport<F: Float> {
    pub parameter: F,
}

/// Outcome of validating a path.
///
/// `valid_part` is the maximal collision-free prefix of the traversed
/// path; it may equal the input, be a proper prefix, or have zero length.
pub struct PathValidationResult<F: Float, const N: usize> {
    pub valid: bool,
    pub valid_part: PathPtr<F, N>,
    pub report: Option<PathValidationReport<F>>,
}

/// Collision validation for whole paths.
///
/// Implementations are pure with respect to roadmap state.
pub trait PathValidation<F: Float, const N: usize> {
    /// Validates `path`, traversing it from its end when `reverse` is set.
    fn validate(&self, path: &PathPtr<F, N>, reverse: bool) -> PathValidationResult<F, N>;
}
