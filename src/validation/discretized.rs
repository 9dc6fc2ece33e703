use crate::path::PathPtr;
use crate::validation::{
    ConfigValidation, PathValidation, PathValidationReport, PathValidationResult,
};
use num_traits::Float;
use std::rc::Rc;

/// Validates a path by checking configurations at a fixed parameter step,
/// together with the straight segments between consecutive samples.
pub struct DiscretizedValidation<F: Float, const N: usize> {
    checker: Box<dyn ConfigValidation<F, N>>,
    step: F,
}

impl<F: Float, const N: usize> DiscretizedValidation<F, N> {
    /// Parameters:
    /// - `checker`: The configuration-level validity test.
    /// - `step`: The discretisation step along the path parameter.
    pub fn new(checker: Box<dyn ConfigValidation<F, N>>, step: F) -> Self {
        debug_assert!(step > F::zero());
        Self { checker, step }
    }
}

impl<F: Float, const N: usize> PathValidation<F, N> for DiscretizedValidation<F, N> {
    fn validate(&self, path: &PathPtr<F, N>, reverse: bool) -> PathValidationResult<F, N> {
        let p = if reverse {
            path.reverse()
        } else {
            Rc::clone(path)
        };
        let (t0, t1) = p.time_range();

        let start = p.eval(t0);
        let start_valid = match &start {
            Some(q) => self.checker.is_config_valid(q),
            None => false,
        };
        if !start_valid {
            return PathValidationResult {
                valid: false,
                valid_part: p.extract(t0, t0),
                report: Some(PathValidationReport { parameter: t0 }),
            };
        }
        if t1 <= t0 {
            return PathValidationResult {
                valid: true,
                valid_part: p,
                report: None,
            };
        }

        let span = t1 - t0;
        let steps = (span / self.step).ceil().to_usize().unwrap_or(1).max(1);
        let mut prev_t = t0;
        let mut prev_q = start.unwrap();
        for i in 1..=steps {
            let t = if i == steps {
                t1
            } else {
                t0 + span * F::from(i).unwrap() / F::from(steps).unwrap()
            };
            let ok = match p.eval(t) {
                Some(q)
                    if self.checker.is_config_valid(&q)
                        && self.checker.is_segment_valid(&prev_q, &q) =>
                {
                    prev_q = q;
                    true
                }
                _ => false,
            };
            if !ok {
                return PathValidationResult {
                    valid: false,
                    valid_part: p.extract(t0, prev_t),
                    report: Some(PathValidationReport { parameter: t }),
                };
            }
            prev_t = t;
        }

        PathValidationResult {
            valid: true,
            valid_part: p,
            report: None,
        }
    }
}
