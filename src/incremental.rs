// Incremental-form (velocity) PID
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

/// An incremental-form PID controller.
///
/// Returns the command *change* for this sample rather than an absolute command, for actuators
/// that integrate their input themselves:
///
/// ```text
/// Δu = kp·(e - e[t-1]) + ki·e·Δt + kd·(e - 2e[t-1] + e[t-2])/Δt
/// ```
///
/// There is no integral accumulator; the actuator is the integrator.
#[derive(Clone, Debug)]
pub struct IncrementalPid<F> {
    config: PidConfig<F>,
    last_error: F,
    second_last_error: F,
}

impl<F: Real> IncrementalPid<F> {
    /// Creates a controller with both error slots zeroed.
    pub fn new(config: PidConfig<F>) -> Self {
        log_debug!(gains = ?config.gains(), dt = ?config.dt(), "incremental PID created");
        Self {
            config,
            last_error: F::zero(),
            second_last_error: F::zero(),
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

    /// The errors of the previous two samples, most recent first.
    pub fn error_history(&self) -> (F, F) {
        (self.last_error, self.second_last_error)
    }
}

impl<F: Real> Controller<F> for IncrementalPid<F> {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        let Gains { kp, ki, kd } = self.config.gains();
        let dt = self.config.dt();
        let two = F::constant(2.0);

        let error = setpoint - process_value;
        let delta = kp * (error - self.last_error)
            + ki * error * dt
            + kd * (error - two * self.last_error + self.second_last_error) / dt;

        self.second_last_error = self.last_error;
        self.last_error = error;
        delta
    }

    fn reset(&mut self) {
        self.last_error = F::zero();
        self.second_last_error = F::zero();
        log_debug!("incremental PID reset");
    }

    fn gains(&self) -> Gains<F> {
        self.config.gains()
    }

    fn sample_time(&self) -> Duration {
        self.config.sample_time()
    }
}
