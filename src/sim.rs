// Plant models and a closed-loop driver for exercising the controllers
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

use nalgebra as na;
use std::vec::Vec;

use crate::controller::Controller;
use crate::metrics::StepResponse;

/// A discrete-time plant advanced by one sample per call.
pub trait Plant {
    /// Applies `input` for `dt` seconds and returns the new measured output.
    fn step(&mut self, input: f64, dt: f64) -> f64;

    /// Returns the plant to rest.
    fn reset(&mut self);

    /// A short name for reports.
    fn name(&self) -> &'static str;
}

/// `T·y' + y = K·u`, forward Euler.
#[derive(Clone, Debug)]
pub struct FirstOrderSystem {
    pub gain: f64,
    pub time_constant: f64,
    output: f64,
}

impl FirstOrderSystem {
    pub fn new(gain: f64, time_constant: f64) -> Self {
        Self {
            gain,
            time_constant,
            output: 0.0,
        }
    }
}

impl Plant for FirstOrderSystem {
    fn step(&mut self, input: f64, dt: f64) -> f64 {
        self.output += dt / self.time_constant * (self.gain * input - self.output);
        self.output
    }

    fn reset(&mut self) {
        self.output = 0.0;
    }

    fn name(&self) -> &'static str {
        "first-order"
    }
}

/// `y'' + 2ζωₙy' + ωₙ²y = K·ωₙ²·u`, semi-implicit Euler.
#[derive(Clone, Debug)]
pub struct SecondOrderSystem {
    pub gain: f64,
    pub damping_ratio: f64,
    pub natural_frequency: f64,
    state: na::Vector2<f64>,
}

impl SecondOrderSystem {
    pub fn new(gain: f64, damping_ratio: f64, natural_frequency: f64) -> Self {
        Self {
            gain,
            damping_ratio,
            natural_frequency,
            state: na::Vector2::zeros(),
        }
    }

    /// Implements the state-space realization:
    /// ┌     ┐   ┌              ┐┌    ┐   ┌       ┐
    /// │ y'  │ = │  0     1     ││ y  │ + │ 0     │ u
    /// │ y'' │   │  -ωₙ²  -2ζωₙ ││ y' │   │ K·ωₙ² │
    /// └     ┘   └              ┘└    ┘   └       ┘
    pub fn f(&self, x: na::Vector2<f64>, u: f64) -> na::Vector2<f64> {
        let omega_sq = self.natural_frequency.powi(2);
        let two_zeta_omega = 2.0 * self.natural_frequency * self.damping_ratio;

        let mat_a = na::Matrix2::new(0.0, 1.0, -omega_sq, -two_zeta_omega);
        let mat_b = na::Vector2::new(0.0, self.gain * omega_sq);

        mat_a * x + mat_b * u
    }
}

impl Plant for SecondOrderSystem {
    fn step(&mut self, input: f64, dt: f64) -> f64 {
        let acceleration = self.f(self.state, input)[1];
        // Velocity first, then position from the updated velocity
        self.state[1] += acceleration * dt;
        self.state[0] += self.state[1] * dt;
        self.state[0]
    }

    fn reset(&mut self) {
        self.state = na::Vector2::zeros();
    }

    fn name(&self) -> &'static str {
        "second-order"
    }
}

/// A first-order plant behind an input saturation and a dead zone.
#[derive(Clone, Debug)]
pub struct NonlinearSystem {
    pub saturation_limit: f64,
    pub deadzone_width: f64,
    linear: FirstOrderSystem,
}

impl NonlinearSystem {
    pub fn new(gain: f64, time_constant: f64, saturation_limit: f64, deadzone_width: f64) -> Self {
        Self {
            saturation_limit,
            deadzone_width,
            linear: FirstOrderSystem::new(gain, time_constant),
        }
    }

    fn shape_input(&self, input: f64) -> f64 {
        // Only the magnitude of the limit counts; a NaN limit leaves the input unclamped
        let limit = self.saturation_limit.abs();
        let saturated = input.max(-limit).min(limit);
        if saturated > self.deadzone_width {
            saturated - self.deadzone_width
        } else if saturated < -self.deadzone_width {
            saturated + self.deadzone_width
        } else {
            0.0
        }
    }
}

impl Plant for NonlinearSystem {
    fn step(&mut self, input: f64, dt: f64) -> f64 {
        let shaped = self.shape_input(input);
        self.linear.step(shaped, dt)
    }

    fn reset(&mut self) {
        self.linear.reset();
    }

    fn name(&self) -> &'static str {
        "nonlinear"
    }
}

/// How the controller's command reaches the plant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Actuator {
    /// The command is applied as-is.
    Direct,
    /// Commands are summed before being applied, as a stepper-like actuator does with the
    /// deltas an incremental PID emits.
    Integrating,
}

/// A recorded closed-loop run.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    pub time: Vec<f64>,
    pub setpoint: Vec<f64>,
    pub process_value: Vec<f64>,
    pub output: Vec<f64>,
}

impl Trace {
    pub fn metrics(&self) -> StepResponse<f64> {
        StepResponse::from_series(&self.time, &self.setpoint, &self.process_value)
    }
}

/// Drives `controller` against `plant` for `steps` samples with a constant `setpoint`, starting
/// from rest.
///
/// Each sample: compute the command from the latest measurement, actuate, measure. The plant is
/// reset first; the controller is not.
pub fn run_step_response<C, P>(
    controller: &mut C,
    plant: &mut P,
    actuator: Actuator,
    setpoint: f64,
    steps: usize,
) -> Trace
where
    C: Controller<f64> + ?Sized,
    P: Plant + ?Sized,
{
    let dt = controller.sample_time().as_secs_f64();
    plant.reset();

    let mut trace = Trace {
        time: Vec::with_capacity(steps),
        setpoint: Vec::with_capacity(steps),
        process_value: Vec::with_capacity(steps),
        output: Vec::with_capacity(steps),
    };

    let mut measurement = 0.0;
    let mut applied = 0.0;
    for i in 0..steps {
        let command = controller.compute(setpoint, measurement);
        applied = match actuator {
            Actuator::Direct => command,
            Actuator::Integrating => applied + command,
        };
        measurement = plant.step(applied, dt);

        trace.time.push(i as f64 * dt);
        trace.setpoint.push(setpoint);
        trace.process_value.push(measurement);
        trace.output.push(command);
    }
    trace
}
