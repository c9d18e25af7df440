use crate::DiffeqErrors;

/// Fixed-step control configuration.
///
/// Sample `i` of a run starting at `t0` is taken at `t0 + i * dt`, computed
/// directly rather than accumulated so long runs do not drift.
#[derive(Copy, Clone, Debug)]
pub struct FixedStepControl {
    /// Constant step size.
    pub dt: f64,
}

impl FixedStepControl {
    /// Constructs a new fixed-step controller with a given step size.
    pub fn new(dt: f64) -> Result<Self, DiffeqErrors> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(DiffeqErrors::InvalidStep(dt));
        }
        Ok(Self { dt })
    }

    /// Number of samples in `[tspan.0, tspan.1)`, i.e. `ceil((end - start) / dt)`.
    pub fn samples(&self, tspan: (f64, f64)) -> Result<usize, DiffeqErrors> {
        let (start, end) = tspan;
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(DiffeqErrors::InvalidTimeSpan(start, end));
        }
        let samples = ((end - start) / self.dt).ceil();
        // usize::MAX rounds up to 2^64 as f64, so this also rejects saturation
        if samples >= usize::MAX as f64 {
            return Err(DiffeqErrors::TooManySamples { dt: self.dt });
        }
        Ok(samples as usize)
    }

    #[inline]
    pub fn time(&self, t0: f64, i: usize) -> f64 {
        t0 + i as f64 * self.dt
    }
}
