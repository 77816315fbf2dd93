// Direct-form (position) PID and the working state it shares with the gain-scheduling strategies
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use core::time::Duration;

use crate::config::{Gains, PidConfig};
use crate::controller::Controller;
use crate::Real;

/// Working variables of a direct-form PID.
///
/// The fuzzy, adaptive and tuned strategies all run the same direct-form law on top of this
/// context, differing only in which gains they feed it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidContext<F> {
    pub(crate) integral: F,
    pub(crate) last_error: F,
    pub(crate) last_input: F,
}

/// The quantities one direct-form step produced.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Step<F> {
    pub(crate) error: F,
    pub(crate) integral_increment: F,
    pub(crate) output: F,
}

impl<F: Real> Default for PidContext<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Real> PidContext<F> {
    /// A zeroed context, identical to the state right after construction or reset.
    pub fn new() -> Self {
        Self {
            integral: F::zero(),
            last_error: F::zero(),
            last_input: F::zero(),
        }
    }

    /// The integral accumulator, i.e. the running sum of `ki * error * dt`.
    pub fn integral(&self) -> F {
        self.integral
    }

    /// The error of the most recent step.
    pub fn last_error(&self) -> F {
        self.last_error
    }

    /// The process value of the most recent step.
    pub fn last_input(&self) -> F {
        self.last_input
    }

    /// Runs one direct-form step.
    ///
    /// The integral gain is applied before accumulation, and the derivative acts on the
    /// measurement so setpoint steps do not kick the output.
    #[inline]
    pub(crate) fn advance(
        &mut self,
        gains: &Gains<F>,
        dt: F,
        setpoint: F,
        process_value: F,
    ) -> Step<F> {
        let error = setpoint - process_value;
        let p_term = gains.kp * error;

        let integral_increment = gains.ki * error * dt;
        self.integral = self.integral + integral_increment;

        let d_term = gains.kd * (process_value - self.last_input) / dt;

        let output = p_term + self.integral - d_term;

        self.last_error = error;
        self.last_input = process_value;
        Step {
            error,
            integral_increment,
            output,
        }
    }
}

/// A direct-form (position) PID controller.
///
/// ```text
/// e = r - y
/// u = kp·e + Σ ki·e·Δt - kd·(y - y[t-1])/Δt
/// ```
#[derive(Clone, Debug)]
pub struct PositionalPid<F> {
    config: PidConfig<F>,
    ctx: PidContext<F>,
}

impl<F: Real> PositionalPid<F> {
    /// Creates a controller with zeroed history.
    pub fn new(config: PidConfig<F>) -> Self {
        log_debug!(gains = ?config.gains(), dt = ?config.dt(), "positional PID created");
        Self {
            config,
            ctx: PidContext::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the configuration for on-the-fly retuning.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.config
    }

    /// Returns the working variables.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// The integral accumulator.
    pub fn integral(&self) -> F {
        self.ctx.integral
    }
}

impl<F: Real> Controller<F> for PositionalPid<F> {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        self.ctx
            .advance(&self.config.gains(), self.config.dt(), setpoint, process_value)
            .output
    }

    fn reset(&mut self) {
        self.ctx = PidContext::new();
        log_debug!("positional PID reset");
    }

    fn gains(&self) -> Gains<F> {
        self.config.gains()
    }

    fn sample_time(&self) -> Duration {
        self.config.sample_time()
    }
}
