use serde::Serialize;
use tracing::debug;

use crate::config::SolverConfig;

/// Outcome of one numeric minimization run.
///
/// `converged` is false when the iteration budget ran out before the
/// tolerance criterion was met; `best_x` is then the best iterate found,
/// reported as-is rather than treated as a failure.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SolverRun {
    pub best_x: f64,
    pub best_objective: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Single-variable minimization strategy.
///
/// The supply-balancing objective is a convex quadratic with an obvious
/// closed form, but the engine goes through an iterative routine so the
/// same seam carries richer objectives later.
pub trait Minimizer: Send + Sync {
    fn minimize(
        &self,
        objective: &dyn Fn(f64) -> f64,
        initial: f64,
        settings: &SolverConfig,
    ) -> SolverRun;
}

/// Gradient descent with central-difference gradients and a backtracking
/// (Armijo) line search.
///
/// Termination: gradient magnitude or accepted step below `tolerance`,
/// whichever comes first, within `max_iterations`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GradientDescent;

const ARMIJO_C: f64 = 1e-4;
const MAX_HALVINGS: u32 = 60;

impl Minimizer for GradientDescent {
    fn minimize(
        &self,
        objective: &dyn Fn(f64) -> f64,
        initial: f64,
        settings: &SolverConfig,
    ) -> SolverRun {
        let mut x = initial;
        let mut fx = objective(x);
        let mut best = (x, fx);
        let mut converged = false;
        let mut iterations = 0;

        for _ in 0..settings.max_iterations {
            iterations += 1;

            let h = x.abs().max(1.0) * 1e-7;
            let grad = (objective(x + h) - objective(x - h)) / (2.0 * h);
            if !grad.is_finite() {
                break;
            }
            if grad.abs() <= settings.tolerance {
                converged = true;
                break;
            }

            let mut step = 1.0;
            let mut candidate = x - step * grad;
            let mut fc = objective(candidate);
            let mut halvings = 0;
            while fc > fx - ARMIJO_C * step * grad * grad && halvings < MAX_HALVINGS {
                step *= 0.5;
                candidate = x - step * grad;
                fc = objective(candidate);
                halvings += 1;
            }

            let delta = (candidate - x).abs();
            x = candidate;
            fx = fc;
            if fx < best.1 {
                best = (x, fx);
            }
            if delta <= settings.tolerance {
                converged = true;
                break;
            }
        }

        debug!(
            best_x = best.0,
            iterations,
            converged,
            "minimization finished"
        );

        SolverRun {
            best_x: best.0,
            best_objective: best.1,
            iterations,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings() -> SolverConfig {
        SolverConfig {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }

    #[test]
    fn converges_on_supply_demand_gap() {
        // us-west scenario: demand 1000 MW, current supply 1010 MW.
        let demand = 1000.0;
        let run = GradientDescent.minimize(&|s| (s - demand).powi(2), 1010.0, &settings());
        assert!(run.converged);
        assert!((run.best_x - demand).abs() <= 1e-6);
        assert!(run.best_objective.abs() < 1e-9);
        assert!(run.iterations <= 100);
    }

    #[test]
    fn converges_from_us_east_state() {
        let demand = 1500.0;
        let run = GradientDescent.minimize(&|s| (s - demand).powi(2), 1510.0, &settings());
        assert!(run.converged);
        assert!((run.best_x - demand).abs() <= 1e-6);
    }

    #[test]
    fn already_optimal_initial_point_converges_immediately() {
        let run = GradientDescent.minimize(&|s| (s - 800.0).powi(2), 800.0, &settings());
        assert!(run.converged);
        assert_eq!(run.best_x, 800.0);
    }

    #[test]
    fn exhausted_budget_reports_non_convergence_with_best_iterate() {
        let cramped = SolverConfig {
            tolerance: 1e-6,
            max_iterations: 1,
        };
        let run = GradientDescent.minimize(&|s: f64| (s - 1000.0).powi(2), 1200.0, &cramped);
        assert!(!run.converged);
        // The single accepted step must not be worse than where we started.
        assert!(run.best_objective <= (1200.0_f64 - 1000.0).powi(2));
    }

    #[test]
    fn zero_iteration_budget_returns_initial_iterate() {
        let cramped = SolverConfig {
            tolerance: 1e-6,
            max_iterations: 0,
        };
        let run = GradientDescent.minimize(&|s: f64| (s - 1000.0).powi(2), 1200.0, &cramped);
        assert!(!run.converged);
        assert_eq!(run.iterations, 0);
        assert_eq!(run.best_x, 1200.0);
    }

    #[test]
    fn minimizes_non_quadratic_objective() {
        // Quartic bowl centered at 3.0; still unimodal, slower gradient.
        let run = GradientDescent.minimize(&|x: f64| (x - 3.0).powi(4) + 1.0, 10.0, &settings());
        assert!((run.best_x - 3.0).abs() < 1e-1);
        assert!(run.best_objective < 1.0 + 1e-4);
    }

    proptest! {
        #[test]
        fn converges_for_any_reasonable_state(
            demand in 1.0..5000.0_f64,
            offset in -500.0..500.0_f64,
        ) {
            let run = GradientDescent.minimize(
                &|s| (s - demand).powi(2),
                demand + offset,
                &settings(),
            );
            prop_assert!(run.converged);
            prop_assert!((run.best_x - demand).abs() <= 1e-6);
        }
    }
}
