use crate::constraint::ConstraintSet;
use crate::path::{Path, PathPtr};
use crate::space::state::Configuration;
use num_traits::Float;
use std::rc::Rc;

/// A concatenation of paths, re-parametrised on `[0, sum of spans]`.
///
/// Used for projector output and for the final solution assembled from
/// roadmap edges.
#[derive(Clone)]
pub struct PathVector<F: Float, const N: usize> {
    paths: Vec<PathPtr<F, N>>,
    length: F,
    time_length: F,
}

impl<F: Float, const N: usize> PathVector<F, N> {
    /// Builds a concatenation. `paths` must not be empty.
    pub fn new(paths: Vec<PathPtr<F, N>>) -> Self {
        debug_assert!(!paths.is_empty(), "a path vector needs at least one path");
        let mut vector = Self {
            paths: Vec::new(),
            length: F::zero(),
            time_length: F::zero(),
        };
        for p in paths {
            vector.push(p);
        }
        vector
    }

    pub fn push(&mut self, path: PathPtr<F, N>) {
        let (t0, t1) = path.time_range();
        self.time_length = self.time_length + (t1 - t0);
        self.length = self.length + path.length();
        self.paths.push(path);
    }

    pub fn segments(&self) -> &[PathPtr<F, N>] {
        &self.paths
    }

    /// The segment containing global parameter `t`, with the segment's
    /// local parameter.
    fn locate(&self, t: F) -> (&PathPtr<F, N>, F) {
        let t = t.max(F::zero()).min(self.time_length);
        let mut acc = F::zero();
        for (i, seg) in self.paths.iter().enumerate() {
            let (s0, s1) = seg.time_range();
            let span = s1 - s0;
            if t <= acc + span || i + 1 == self.paths.len() {
                return (seg, s0 + (t - acc).min(span));
            }
            acc = acc + span;
        }
        unreachable!("path vector is never empty")
    }
}

impl<F: Float + 'static, const N: usize> Path<F, N> for PathVector<F, N> {
    fn length(&self) -> F {
        self.length
    }

    fn time_range(&self) -> (F, F) {
        (F::zero(), self.time_length)
    }

    fn eval(&self, t: F) -> Option<Configuration<F, N>> {
        let (seg, local) = self.locate(t);
        seg.eval(local)
    }

    fn initial(&self) -> Configuration<F, N> {
        self.paths.first().expect("non-empty").initial()
    }

    fn end(&self) -> Configuration<F, N> {
        self.paths.last().expect("non-empty").end()
    }

    fn reverse(&self) -> PathPtr<F, N> {
        let reversed = self.paths.iter().rev().map(|p| p.reverse()).collect();
        Rc::new(Self::new(reversed))
    }

    fn extract(&self, t0: F, t1: F) -> PathPtr<F, N> {
        if t0 > t1 {
            return self.extract(t1, t0).reverse();
        }
        let a = t0.max(F::zero()).min(self.time_length);
        let b = t1.max(F::zero()).min(self.time_length);
        if a == b {
            let (seg, local) = self.locate(a);
            return seg.extract(local, local);
        }
        let mut parts: Vec<PathPtr<F, N>> = Vec::new();
        let mut acc = F::zero();
        for seg in &self.paths {
            let (s0, s1) = seg.time_range();
            let span = s1 - s0;
            let lo = a.max(acc);
            let hi = b.min(acc + span);
            if hi > lo {
                parts.push(seg.extract(s0 + (lo - acc), s0 + (hi - acc)));
            }
            acc = acc + span;
        }
        Rc::new(Self::new(parts))
    }

    fn constraints(&self) -> Option<&ConstraintSet<F, N>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::StraightPath;

    fn segment(a: [f64; 2], b: [f64; 2], length: f64) -> PathPtr<f64, 2> {
        Rc::new(StraightPath::new(
            Configuration::new(a),
            Configuration::new(b),
            length,
            None,
        ))
    }

    fn elbow() -> PathVector<f64, 2> {
        PathVector::new(vec![
            segment([0.0, 0.0], [1.0, 0.0], 1.0),
            segment([1.0, 0.0], [1.0, 2.0], 2.0),
        ])
    }

    #[test]
    fn length_is_the_sum_of_segments() {
        let v = elbow();
        assert_eq!(v.length(), 3.0);
        assert_eq!(v.time_range(), (0.0, 3.0));
    }

    #[test]
    fn eval_crosses_segment_boundaries() {
        let v = elbow();
        assert_eq!(v.eval(0.0).unwrap(), Configuration::new([0.0, 0.0]));
        assert_eq!(v.eval(0.5).unwrap(), Configuration::new([0.5, 0.0]));
        assert_eq!(v.eval(1.0).unwrap(), Configuration::new([1.0, 0.0]));
        assert_eq!(v.eval(2.0).unwrap(), Configuration::new([1.0, 1.0]));
        assert_eq!(v.eval(3.0).unwrap(), Configuration::new([1.0, 2.0]));
    }

    #[test]
    fn reverse_traverses_backwards() {
        let v = elbow();
        let r = v.reverse();
        assert_eq!(r.initial(), v.end());
        assert_eq!(r.end(), v.initial());
        assert_eq!(r.length(), v.length());
        assert_eq!(r.eval(1.0).unwrap(), Configuration::new([1.0, 1.0]));
    }

    #[test]
    fn extract_within_one_segment() {
        let v = elbow();
        let sub = v.extract(0.25, 0.75);
        assert_eq!(sub.length(), 0.5);
        assert_eq!(sub.initial(), Configuration::new([0.25, 0.0]));
        assert_eq!(sub.end(), Configuration::new([0.75, 0.0]));
    }

    #[test]
    fn extract_across_segments() {
        let v = elbow();
        let sub = v.extract(0.5, 2.0);
        assert_eq!(sub.length(), 1.5);
        assert_eq!(sub.initial(), Configuration::new([0.5, 0.0]));
        assert_eq!(sub.end(), Configuration::new([1.0, 1.0]));
    }

    #[test]
    fn zero_width_extract_has_zero_length() {
        let v = elbow();
        let sub = v.extract(1.5, 1.5);
        assert_eq!(sub.length(), 0.0);
        assert_eq!(sub.initial(), Configuration::new([1.0, 0.5]));
    }
}
