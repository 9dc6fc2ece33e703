use crate::space::state::Configuration;
use num_traits::Float;
use std::rc::Rc;

/// A differentiable map from configuration space to a constraint space.
///
/// The projector drives configurations towards `value(q) == rhs`.
pub trait DifferentiableFunction<F: Float, const N: usize> {
    fn output_size(&self) -> usize;

    fn value(&self, q: &Configuration<F, N>) -> Vec<F>;

    /// Row-major `output_size() x N` Jacobian at `q`.
    fn jacobian(&self, q: &Configuration<F, N>) -> Vec<F>;
}

/// An affine scalar constraint `normal . q + offset`.
#[derive(Clone, Copy, Debug)]
pub struct AffineFunction<F: Float, const N: usize> {
    normal: Configuration<F, N>,
    offset: F,
}

impl<F: Float, const N: usize> AffineFunction<F, N> {
    pub fn new(normal: Configuration<F, N>, offset: F) -> Self {
        Self { normal, offset }
    }
}

impl<F: Float, const N: usize> DifferentiableFunction<F, N> for AffineFunction<F, N> {
    fn output_size(&self) -> usize {
        1
    }

    fn value(&self, q: &Configuration<F, N>) -> Vec<F> {
        vec![self.normal.dot(q) + self.offset]
    }

    fn jacobian(&self, _q: &Configuration<F, N>) -> Vec<F> {
        self.normal.values().to_vec()
    }
}

/// Line-search strategy used by the Newton projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineSearchKind {
    /// Always take the full Newton step.
    Constant,
    /// Halve the step until the residual decreases.
    Backtracking,
}

/// Projects configurations onto the manifold `f(q) = rhs` defined by a
/// stack of differentiable constraints.
///
/// The constraint functions are shared; the right-hand side and the
/// line-search strategy are per-instance state, so a cloned projector can
/// be re-bound (see the straight steering method) without affecting the
/// original.
#[derive(Clone)]
pub struct ConfigProjector<F: Float, const N: usize> {
    functions: Vec<Rc<dyn DifferentiableFunction<F, N>>>,
    right_hand_side: Vec<F>,
    error_threshold: F,
    max_iterations: usize,
    line_search: LineSearchKind,
}

impl<F: Float, const N: usize> ConfigProjector<F, N> {
    pub fn new(error_threshold: F, max_iterations: usize) -> Self {
        Self {
            functions: Vec::new(),
            right_hand_side: Vec::new(),
            error_threshold,
            max_iterations,
            line_search: LineSearchKind::Constant,
        }
    }

    /// Adds a constraint function. The right-hand side grows by the
    /// function's output size, initialised to zero.
    pub fn add(&mut self, function: Rc<dyn DifferentiableFunction<F, N>>) {
        self.right_hand_side
            .extend(std::iter::repeat(F::zero()).take(function.output_size()));
        self.functions.push(function);
    }

    pub fn line_search_type(&mut self, kind: LineSearchKind) {
        self.line_search = kind;
    }

    pub fn line_search(&self) -> LineSearchKind {
        self.line_search
    }

    pub fn right_hand_side(&self) -> &[F] {
        &self.right_hand_side
    }

    /// Binds the right-hand side to the constraint values at `q`, so that
    /// `q` itself satisfies the constraints exactly.
    pub fn right_hand_side_from_config(&mut self, q: &Configuration<F, N>) {
        self.right_hand_side = self.stacked_value(q);
    }

    fn output_size(&self) -> usize {
        self.functions.iter().map(|f| f.output_size()).sum()
    }

    fn stacked_value(&self, q: &Configuration<F, N>) -> Vec<F> {
        let mut value = Vec::with_capacity(self.output_size());
        for f in &self.functions {
            value.extend(f.value(q));
        }
        value
    }

    /// Row-major `output_size() x N` stacked Jacobian.
    fn stacked_jacobian(&self, q: &Configuration<F, N>) -> Vec<F> {
        let mut jacobian = Vec::with_capacity(self.output_size() * N);
        for f in &self.functions {
            jacobian.extend(f.jacobian(q));
        }
        jacobian
    }

    fn residual(&self, q: &Configuration<F, N>) -> Vec<F> {
        let mut e = self.stacked_value(q);
        for (ei, ri) in e.iter_mut().zip(self.right_hand_side.iter()) {
            *ei = *ei - *ri;
        }
        e
    }

    fn residual_norm(e: &[F]) -> F {
        let mut acc = F::zero();
        for &v in e {
            acc = acc + v * v;
        }
        acc.sqrt()
    }

    /// Computes the Gauss-Newton step `-J^T (J J^T)^-1 e` for residual `e`.
    /// Returns None when the normal system is singular.
    fn newton_step(&self, jacobian: &[F], e: &[F]) -> Option<Configuration<F, N>> {
        let m = e.len();
        // Normal matrix J J^T, damped to keep the solve well posed.
        let mut a = vec![F::zero(); m * m];
        let mut diag_max = F::zero();
        for r in 0..m {
            for c in 0..m {
                let mut acc = F::zero();
                for k in 0..N {
                    acc = acc + jacobian[r * N + k] * jacobian[c * N + k];
                }
                a[r * m + c] = acc;
                if r == c && acc > diag_max {
                    diag_max = acc;
                }
            }
        }
        let damping = (diag_max + F::one()) * F::from(1e-12).unwrap();
        for r in 0..m {
            a[r * m + r] = a[r * m + r] + damping;
        }
        let mut y = e.to_vec();
        if !gauss_solve(&mut a, &mut y, m) {
            return None;
        }
        // dq = -J^T y
        let mut dq = Configuration::new([F::zero(); N]);
        for k in 0..N {
            let mut acc = F::zero();
            for r in 0..m {
                acc = acc + jacobian[r * N + k] * y[r];
            }
            dq[k] = -acc;
        }
        Some(dq)
    }

    /// Projects `q` onto the constraint manifold in place.
    ///
    /// Returns true when the residual dropped below the error threshold
    /// within the iteration budget.
    pub fn apply(&self, q: &mut Configuration<F, N>) -> bool {
        if self.functions.is_empty() {
            return true;
        }
        let mut error = Self::residual_norm(&self.residual(q));
        for _ in 0..self.max_iterations {
            if error <= self.error_threshold {
                return true;
            }
            let e = self.residual(q);
            let jacobian = self.stacked_jacobian(q);
            let dq = match self.newton_step(&jacobian, &e) {
                Some(dq) => dq,
                None => return false,
            };
            match self.line_search {
                LineSearchKind::Constant => {
                    *q = *q + dq;
                    error = Self::residual_norm(&self.residual(q));
                }
                LineSearchKind::Backtracking => {
                    let mut alpha = F::one();
                    let mut accepted = false;
                    for _ in 0..10 {
                        let candidate = *q + dq * alpha;
                        let candidate_error = Self::residual_norm(&self.residual(&candidate));
                        if candidate_error < error {
                            *q = candidate;
                            error = candidate_error;
                            accepted = true;
                            break;
                        }
                        alpha = alpha * F::from(0.5).unwrap();
                    }
                    if !accepted {
                        return false;
                    }
                }
            }
        }
        error <= self.error_threshold
    }

    /// Projects the displacement `q_to - q_from` onto the kernel of the
    /// constraint Jacobian at `q_from` and writes `q_from + P (q_to - q_from)`
    /// into `q_out`. Returns false when the normal system is singular.
    pub fn project_on_kernel(
        &self,
        q_from: &Configuration<F, N>,
        q_to: &Configuration<F, N>,
        q_out: &mut Configuration<F, N>,
    ) -> bool {
        if self.functions.is_empty() {
            *q_out = *q_to;
            return true;
        }
        let d = *q_to - *q_from;
        let jacobian = self.stacked_jacobian(q_from);
        let m = self.output_size();
        // J d
        let mut jd = vec![F::zero(); m];
        for r in 0..m {
            let mut acc = F::zero();
            for k in 0..N {
                acc = acc + jacobian[r * N + k] * d[k];
            }
            jd[r] = acc;
        }
        // The kernel part of d is d - J^T (J J^T)^-1 J d, which is d plus
        // the Gauss-Newton step for residual J d.
        match self.newton_step(&jacobian, &jd) {
            Some(step) => {
                *q_out = *q_from + d + step;
                true
            }
            None => false,
        }
    }
}

/// Solves `a x = b` in place for a row-major `m x m` matrix using Gaussian
/// elimination with partial pivoting. The solution overwrites `b`.
fn gauss_solve<F: Float>(a: &mut [F], b: &mut [F], m: usize) -> bool {
    for col in 0..m {
        let mut pivot = col;
        for row in col + 1..m {
            if a[row * m + col].abs() > a[pivot * m + col].abs() {
                pivot = row;
            }
        }
        if a[pivot * m + col].abs() < F::from(1e-30).unwrap() {
            return false;
        }
        if pivot != col {
            for k in 0..m {
                a.swap(col * m + k, pivot * m + k);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..m {
            let factor = a[row * m + col] / a[col * m + col];
            for k in col..m {
                a[row * m + k] = a[row * m + k] - factor * a[col * m + k];
            }
            b[row] = b[row] - factor * b[col];
        }
    }
    for col in (0..m).rev() {
        let mut acc = b[col];
        for k in col + 1..m {
            acc = acc - a[col * m + k] * b[k];
        }
        b[col] = acc / a[col * m + col];
    }
    true
}
