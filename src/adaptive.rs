// Gradient-adaptive PID tuned online by the MIT rule
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

use crate::config::{check_non_negative, Gains, PidConfig, PidConfigError};
use crate::controller::Controller;
use crate::positional::PidContext;
use crate::Real;

/// Inclusive per-gain bounds the adapted gains are clamped into after every update.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainBounds<F> {
    /// Lower bounds. Defaults to zero for every gain.
    pub min: Gains<F>,
    /// Upper bounds. Defaults to kp ≤ 15, ki ≤ 3, kd ≤ 2.
    pub max: Gains<F>,
}

impl<F: Real> Default for GainBounds<F> {
    fn default() -> Self {
        Self {
            min: Gains::new(F::zero(), F::zero(), F::zero()),
            max: Gains::new(F::constant(15.0), F::constant(3.0), F::constant(2.0)),
        }
    }
}

impl<F: Real> GainBounds<F> {
    /// Checks that every bound is finite and non-negative and that `min ≤ max` per gain.
    pub fn validate(self) -> Result<Self, PidConfigError> {
        let err = PidConfigError::InvalidGainBounds;
        for (lo, hi) in [
            (self.min.kp, self.max.kp),
            (self.min.ki, self.max.ki),
            (self.min.kd, self.max.kd),
        ] {
            check_non_negative(lo, err)?;
            check_non_negative(hi, err)?;
            if lo > hi {
                return Err(err);
            }
        }
        Ok(self)
    }

    /// Clamps each gain into its range. Also reports whether anything changed.
    pub fn clamp(&self, gains: Gains<F>) -> (Gains<F>, bool) {
        let clamped = Gains::new(
            gains.kp.max(self.min.kp).min(self.max.kp),
            gains.ki.max(self.min.ki).min(self.max.ki),
            gains.kd.max(self.min.kd).min(self.max.kd),
        );
        (clamped, clamped != gains)
    }

    /// Whether every gain lies within its range.
    pub fn contains(&self, gains: &Gains<F>) -> bool {
        (self.min.kp..=self.max.kp).contains(&gains.kp)
            && (self.min.ki..=self.max.ki).contains(&gains.ki)
            && (self.min.kd..=self.max.kd).contains(&gains.kd)
    }
}

/// Adaptation parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdaptiveConfig<F> {
    /// Base learning rate γ. Defaults to 0.01.
    pub learning_rate: F,
    /// Safe ranges for the adapted gains.
    pub bounds: GainBounds<F>,
}

impl<F: Real> Default for AdaptiveConfig<F> {
    fn default() -> Self {
        Self {
            learning_rate: F::constant(0.01),
            bounds: GainBounds::default(),
        }
    }
}

impl<F: Real> AdaptiveConfig<F> {
    /// Checks the learning rate and the gain bounds.
    pub fn validate(self) -> Result<Self, PidConfigError> {
        check_non_negative(self.learning_rate, PidConfigError::InvalidLearningRate)?;
        self.bounds.validate()?;
        Ok(self)
    }

    /// The learning rate scheduled on the error magnitude: γ for `|e| ≥ 0.5`, γ/2 for
    /// `0.1 ≤ |e| < 0.5` and γ/10 below that.
    pub fn scheduled_rate(&self, error: F) -> F {
        let magnitude = error.abs();
        if magnitude < F::constant(0.1) {
            self.learning_rate * F::constant(0.1)
        } else if magnitude < F::constant(0.5) {
            self.learning_rate * F::constant(0.5)
        } else {
            self.learning_rate
        }
    }
}

/// A direct-form PID that adapts its own gains by gradient descent on `J = ½e²` (MIT rule).
///
/// The sensitivities are cheap finite-difference proxies, not exact closed-loop gradients:
///
/// ```text
/// ∂J/∂kp ≈ -e·e[t-1]
/// ∂J/∂ki ≈ -e·I            (I: integral accumulator after this step)
/// ∂J/∂kd ≈ -e·(y - 2y[t-1] + y[t-2])
/// ```
///
/// Each step returns the output computed with the gains it started with; the updated and
/// clamped gains take effect on the next step.
#[derive(Clone, Debug)]
pub struct AdaptivePid<F> {
    config: PidConfig<F>,
    adaptation: AdaptiveConfig<F>,
    gains: Gains<F>,
    ctx: PidContext<F>,
    second_last_input: F,
    previous_output: F,
    performance_index: F,
}

impl<F: Real> AdaptivePid<F> {
    /// Creates a controller with the default learning rate and gain bounds.
    pub fn new(config: PidConfig<F>) -> Self {
        let adaptation = AdaptiveConfig::default();
        Self::build(config, adaptation)
    }

    /// Creates a controller with custom adaptation parameters.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidLearningRate`] or [`PidConfigError::InvalidGainBounds`].
    pub fn with_adaptation(
        config: PidConfig<F>,
        adaptation: AdaptiveConfig<F>,
    ) -> Result<Self, PidConfigError> {
        Ok(Self::build(config, adaptation.validate()?))
    }

    fn build(config: PidConfig<F>, adaptation: AdaptiveConfig<F>) -> Self {
        // Initial gains are held to the same bounds as adapted ones
        let (gains, clamped) = adaptation.bounds.clamp(config.gains());
        if clamped {
            log_warn!(
                requested = ?config.gains(),
                gains = ?gains,
                "initial gains clamped into adaptive bounds"
            );
        }
        log_debug!(
            gains = ?gains,
            learning_rate = ?adaptation.learning_rate,
            "adaptive PID created"
        );
        Self {
            config,
            adaptation,
            gains,
            ctx: PidContext::new(),
            second_last_input: F::zero(),
            previous_output: F::zero(),
            performance_index: F::zero(),
        }
    }

    /// Returns the configuration holding the initial gains.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the adaptation parameters.
    pub fn adaptation(&self) -> &AdaptiveConfig<F> {
        &self.adaptation
    }

    /// Overrides the current gains, e.g. to restart adaptation from a known tuning.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidGainBounds`] if `gains` lies outside the adaptive bounds.
    pub fn set_gains(&mut self, gains: Gains<F>) -> Result<(), PidConfigError> {
        if !self.adaptation.bounds.contains(&gains) {
            return Err(PidConfigError::InvalidGainBounds);
        }
        self.gains = gains;
        Ok(())
    }

    /// Returns the working variables.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// `½e²` of the most recent step.
    pub fn performance_index(&self) -> F {
        self.performance_index
    }

    /// The output of the most recent step.
    pub fn previous_output(&self) -> F {
        self.previous_output
    }
}

impl<F: Real> Controller<F> for AdaptivePid<F> {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        let last_error = self.ctx.last_error;
        let last_input = self.ctx.last_input;

        let step = self
            .ctx
            .advance(&self.gains, self.config.dt(), setpoint, process_value);
        let error = step.error;
        let two = F::constant(2.0);

        self.performance_index = F::constant(0.5) * error * error;

        let d_kp = -error * last_error;
        let d_ki = -error * self.ctx.integral;
        let d_kd = -error * (process_value - two * last_input + self.second_last_input);

        let rate = self.adaptation.scheduled_rate(error);
        let descended = Gains::new(
            self.gains.kp - rate * d_kp,
            self.gains.ki - rate * d_ki,
            self.gains.kd - rate * d_kd,
        );
        let (gains, clamped) = self.adaptation.bounds.clamp(descended);
        if clamped {
            log_trace!(unclamped = ?descended, gains = ?gains, "adapted gains clamped");
        }
        self.gains = gains;

        self.second_last_input = last_input;
        self.previous_output = step.output;
        step.output
    }

    fn reset(&mut self) {
        self.ctx = PidContext::new();
        self.second_last_input = F::zero();
        self.previous_output = F::zero();
        self.performance_index = F::zero();
        log_debug!(gains = ?self.gains, "adaptive PID reset; gains kept");
    }

    fn gains(&self) -> Gains<F> {
        self.gains
    }

    fn sample_time(&self) -> Duration {
        self.config.sample_time()
    }
}
