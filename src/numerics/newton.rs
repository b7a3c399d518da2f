use crate::base::Error;
use log::debug;
use russell_lab::{solve_lin_sys, vec_norm, Matrix, Norm, Vector};

/// Defines the residual function `r = R(x)` of a nonlinear system
///
/// The first argument is the residual (output) and the second one is the unknown vector.
/// An error signals a non-admissible trial point (e.g., a negative width).
pub type ResidualFn<'a> = dyn FnMut(&mut Vector, &Vector) -> Result<(), Error> + 'a;

/// Specifies a nonlinear root finder `R(x) = 0`
pub trait RootSolver {
    /// Solves the nonlinear system starting from the initial guess `x0`
    fn solve(&self, x0: &Vector, residual: &mut ResidualFn) -> Result<Vector, Error>;
}

/// Implements the Newton-Raphson method with a finite-difference Jacobian and backtracking
pub struct NewtonSolver {
    /// Maximum number of iterations
    pub n_max_iterations: usize,

    /// Tolerance on the max norm of the residual
    pub tol: f64,

    /// Relative step of the finite-difference Jacobian
    pub fd_step: f64,

    /// Maximum number of step halvings in the line search
    pub n_max_halvings: usize,
}

/// Holds statistics of the last solve
#[derive(Clone, Copy, Debug, Default)]
pub struct NewtonStats {
    pub n_iterations: usize,
    pub n_function_evaluations: usize,
    pub norm_rr: f64,
}

impl NewtonSolver {
    /// Allocates a new instance
    pub fn new(n_max_iterations: usize, tol: f64) -> Self {
        NewtonSolver {
            n_max_iterations,
            tol,
            fd_step: 1e-7,
            n_max_halvings: 30,
        }
    }

    /// Solves the nonlinear system and returns the solution with statistics
    pub fn solve_with_stats(&self, x0: &Vector, residual: &mut ResidualFn) -> Result<(Vector, NewtonStats), Error> {
        let n = x0.dim();
        if n == 0 {
            return Err(Error::Solver("the system has no unknowns".to_string()));
        }
        let mut stats = NewtonStats::default();
        let mut x = x0.clone();
        let mut rr = Vector::new(n);
        residual(&mut rr, &x)?;
        stats.n_function_evaluations += 1;
        let mut norm_rr = vec_norm(&rr, Norm::Max);

        let mut jj = Matrix::new(n, n);
        let mut rr_pert = Vector::new(n);
        let mut x_trial = Vector::new(n);
        let mut rr_trial = Vector::new(n);

        for iteration in 0..self.n_max_iterations {
            stats.n_iterations = iteration;
            stats.norm_rr = norm_rr;
            if !norm_rr.is_finite() {
                return Err(Error::Solver("found NaN or Inf in the residual".to_string()));
            }
            if norm_rr < self.tol {
                debug!("newton: converged after {} iterations; |R| = {:.3e}", iteration, norm_rr);
                return Ok((x, stats));
            }

            // Jacobian matrix by forward differences
            for j in 0..n {
                let h = self.fd_step * f64::max(1.0, f64::abs(x[j]));
                let xj = x[j];
                x[j] = xj + h;
                let res = residual(&mut rr_pert, &x);
                x[j] = xj;
                stats.n_function_evaluations += 1;
                res?;
                for i in 0..n {
                    jj.set(i, j, (rr_pert[i] - rr[i]) / h);
                }
            }

            // Newton step: J · δx = -R
            let mut dx = Vector::new(n);
            for i in 0..n {
                dx[i] = -rr[i];
            }
            solve_lin_sys(&mut dx, &mut jj)
                .map_err(|e| Error::Solver(format!("cannot solve the linear system: {}", e)))?;

            // backtracking: halve the step until the residual decreases
            let mut alpha = 1.0;
            let mut accepted = false;
            for _ in 0..self.n_max_halvings {
                for i in 0..n {
                    x_trial[i] = x[i] + alpha * dx[i];
                }
                stats.n_function_evaluations += 1;
                if residual(&mut rr_trial, &x_trial).is_ok() {
                    let norm_trial = vec_norm(&rr_trial, Norm::Max);
                    if norm_trial.is_finite() && norm_trial < norm_rr {
                        accepted = true;
                        break;
                    }
                }
                alpha /= 2.0;
            }
            if !accepted {
                return Err(Error::Solver(format!(
                    "the line search failed at iteration {}; |R| = {:.3e}",
                    iteration, norm_rr
                )));
            }
            for i in 0..n {
                x[i] = x_trial[i];
                rr[i] = rr_trial[i];
            }
            norm_rr = vec_norm(&rr, Norm::Max);
        }
        if norm_rr < self.tol {
            stats.n_iterations = self.n_max_iterations;
            stats.norm_rr = norm_rr;
            return Ok((x, stats));
        }
        Err(Error::Solver(format!(
            "did not converge after {} iterations; |R| = {:.3e}",
            self.n_max_iterations, norm_rr
        )))
    }
}

impl RootSolver for NewtonSolver {
    fn solve(&self, x0: &Vector, residual: &mut ResidualFn) -> Result<Vector, Error> {
        let (x, _) = self.solve_with_stats(x0, residual)?;
        Ok(x)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
