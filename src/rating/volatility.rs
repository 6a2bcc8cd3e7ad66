//! Volatility solver
//!
//! Finds the new volatility `sigma'` as the root of Glickman's step-5
//! objective using the Illinois variant of regula falsi. Plain regula falsi
//! can keep one bracket end fixed for many iterations; halving the stale
//! end's function value forces the bracket to shrink from both sides.

use crate::config::RatingConfig;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

/// Outcome of one solver run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilitySolution {
    pub volatility: f64,
    /// Regula-falsi iterations, excluding the initial bracket search
    pub iterations: u32,
}

/// `f(x)` from step 5 of the Glicko-2 procedure, with `x = ln(sigma'^2)`
#[derive(Debug, Clone, Copy)]
pub struct VolatilityObjective {
    phi_sq: f64,
    delta_sq: f64,
    v: f64,
    a: f64,
    tau_sq: f64,
}

impl VolatilityObjective {
    pub fn new(phi: f64, sigma: f64, delta: f64, v: f64, tau: f64) -> Self {
        Self {
            phi_sq: phi * phi,
            delta_sq: delta * delta,
            v,
            a: (sigma * sigma).ln(),
            tau_sq: tau * tau,
        }
    }

    /// `ln(sigma^2)`, the starting point of the search
    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn eval(&self, x: f64) -> f64 {
        let ex = x.exp();
        let denom = self.phi_sq + self.v + ex;
        ex * (self.delta_sq - self.phi_sq - self.v - ex) / (2.0 * denom * denom)
            - (x - self.a) / self.tau_sq
    }

    /// Initial bracket `[A, B]` with `f(A)` and `f(B)` of opposite sign
    fn bracket(&self, tau: f64, max_steps: u32) -> (f64, f64) {
        let a = self.a;
        let excess = self.delta_sq - self.phi_sq - self.v;
        if excess > 0.0 {
            return (a, excess.ln());
        }

        // f(a) <= 0 here and f grows without bound as x -> -inf, so stepping
        // down by tau reaches a non-negative value.
        let mut k = 1u32;
        while self.eval(a - f64::from(k) * tau) < 0.0 {
            if k >= max_steps {
                warn!(k, "Volatility bracket search hit the step cap");
                break;
            }
            k += 1;
        }
        (a, a - f64::from(k) * tau)
    }
}

/// Solve for the new volatility given the pre-update `phi`, `sigma`, the
/// performance delta and the estimated variance `v`
pub fn solve_volatility(
    phi: f64,
    sigma: f64,
    delta: f64,
    v: f64,
    config: &RatingConfig,
) -> VolatilitySolution {
    let f = VolatilityObjective::new(phi, sigma, delta, v, config.tau);
    let epsilon = config.convergence_tolerance;

    let (mut a, mut b) = f.bracket(config.tau, config.max_solver_iterations);
    let mut fa = f.eval(a);
    let mut fb = f.eval(b);

    let mut iterations = 0u32;
    while (b - a).abs() > epsilon {
        if iterations >= config.max_solver_iterations {
            warn!(
                iterations,
                width = (b - a).abs(),
                "Volatility solver stopped before converging"
            );
            break;
        }
        iterations += 1;

        let c = a + (a - b) * fa / (fb - fa);
        let fc = f.eval(c);

        if fc * fb <= 0.0 {
            a = b;
            fa = fb;
        } else {
            fa /= 2.0;
        }

        b = c;
        fb = fc;

        trace!(iterations, a, b, fa, fb, "Volatility solver step");
    }

    VolatilitySolution {
        volatility: (a / 2.0).exp(),
        iterations,
    }
}
