use nalgebra::DVector;
use std::error::Error;
use thiserror::Error;
use tracing::{debug, warn};

/// Submodules for the fixed-step integration components.
pub mod result;
pub mod rk;
pub mod stepping;

pub use result::Solution;
pub use rk::RungeKutta4;
pub use stepping::FixedStepControl;

#[derive(Debug, Error)]
pub enum DiffeqErrors {
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("step size must be finite and greater than zero, got {0}")]
    InvalidStep(f64),
    #[error("time span ({0}, {1}) must be finite with end after start")]
    InvalidTimeSpan(f64, f64),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("model evaluation failed: {0}")]
    Model(#[source] Box<dyn Error + Send + Sync>),
    #[error("model produced a non-finite derivative in stage {stage}")]
    NonFiniteDerivative { stage: usize },
    #[error("state became non-finite at t = {t}")]
    NonFiniteState { t: f64 },
    #[error("{what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("step size {dt} splits the time span into more samples than can be stored")]
    TooManySamples { dt: f64 },
}

/// Longer runs grow their `Solution` as they go.
const MAX_PREALLOCATED_SAMPLES: usize = 1 << 16;

/// A second-order system `xddot = f(x, xdot)`.
///
/// The model is borrowed mutably for each evaluation, so it is free to
/// keep per-evaluation scratch state.
pub trait SecondOrderModel {
    type Error: Error + Send + Sync + 'static;

    /// Computes the accelerations for positions `x` and velocities `xdot`.
    fn eval(
        &mut self,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<DVector<f64>, Self::Error>;
}

/// A fixed-step explicit integrator.
///
/// Implementors provide a single `step`; `solve` drives it across a time
/// span and collects the samples.
pub trait Integrator {
    /// Advances `(x, xdot)` by one step of size `h`.
    fn step<Model: SecondOrderModel>(
        &mut self,
        model: &mut Model,
        h: f64,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<(DVector<f64>, DVector<f64>), DiffeqErrors>;

    /// Integrates from `(x0, xdot0)` over `[tspan.0, tspan.1)` with step `dt`.
    ///
    /// The first sample is the initial state. Any non-finite value aborts
    /// the run immediately; no step size reduction is attempted.
    fn solve<Model: SecondOrderModel>(
        &mut self,
        model: &mut Model,
        x0: &DVector<f64>,
        xdot0: &DVector<f64>,
        tspan: (f64, f64),
        dt: f64,
    ) -> Result<Solution, DiffeqErrors> {
        check_length("xdot0", x0.len(), xdot0.len())?;
        let control = FixedStepControl::new(dt)?;
        let n = control.samples(tspan)?;
        if !is_finite(x0) || !is_finite(xdot0) {
            return Err(DiffeqErrors::NonFiniteState { t: tspan.0 });
        }

        debug!(samples = n, dt, dof = x0.len(), "starting fixed step integration");

        let mut solution = Solution::with_capacity(n.min(MAX_PREALLOCATED_SAMPLES));
        solution.push(tspan.0, x0.clone(), xdot0.clone());

        for i in 1..n {
            let (x, xdot) = self.step(model, dt, &solution.x[i - 1], &solution.xdot[i - 1])?;
            let t = control.time(tspan.0, i);
            if !is_finite(&x) || !is_finite(&xdot) {
                warn!(t, "integration diverged");
                return Err(DiffeqErrors::NonFiniteState { t });
            }
            solution.push(t, x, xdot);
        }

        debug!(samples = solution.len(), "integration complete");
        Ok(solution)
    }
}

/// Evaluates the model for one integrator stage, validating the result.
pub(crate) fn evaluate<Model: SecondOrderModel>(
    model: &mut Model,
    x: &DVector<f64>,
    xdot: &DVector<f64>,
    stage: usize,
) -> Result<DVector<f64>, DiffeqErrors> {
    let xddot = model
        .eval(x, xdot)
        .map_err(|e| DiffeqErrors::Model(Box::new(e)))?;
    check_length("xddot", x.len(), xddot.len())?;
    if !is_finite(&xddot) {
        warn!(stage, "model returned a non-finite derivative");
        return Err(DiffeqErrors::NonFiniteDerivative { stage });
    }
    Ok(xddot)
}

pub(crate) fn check_length(
    what: &'static str,
    expected: usize,
    found: usize,
) -> Result<(), DiffeqErrors> {
    if expected != found {
        return Err(DiffeqErrors::ShapeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn is_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|e| e.is_finite())
}
