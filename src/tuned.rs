// Model-based tuned PID with output clamping and integral back-calculation
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

use crate::config::{
    check_non_negative, check_positive, Gains, OutputLimits, PidConfig, PidConfigError,
};
use crate::controller::{saturate, Controller};
use crate::positional::PidContext;
use crate::Real;

/// How a [`TunedPid`] derives its gains before each step.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TuningRule<F> {
    /// Use the configured gains as they are.
    Fixed,

    /// Internal-model tuning for a first-order process with time constant τ and a desired
    /// closed-loop time constant λ:
    ///
    /// ```text
    /// kp' = (τ + λ/2) / (kp·(λ + Δt/2))
    /// ki' = 1 / (λ + Δt/2)
    /// kd' = τ / (kp'·(λ + Δt/2))
    /// ```
    ///
    /// The new kp is derived from the *current* kp, so kp alternates between two values from
    /// one step to the next. A reset restarts the recurrence from the configured kp.
    Imc {
        /// Assumed process time constant τ in seconds.
        process_time_constant: F,
        /// Desired closed-loop time constant λ in seconds.
        lambda: F,
    },

    /// Classical Ziegler–Nichols ratios from a relay test:
    /// `kp = 0.6·Ku`, `ki = 1.2·Ku/Tu`, `kd = 0.075·Ku·Tu`.
    ZieglerNichols {
        /// Critical (ultimate) gain Ku.
        critical_gain: F,
        /// Critical oscillation period Tu in seconds.
        critical_period: F,
    },
}

impl<F: Real> TuningRule<F> {
    /// Checks the rule's parameters.
    pub fn validate(self) -> Result<Self, PidConfigError> {
        match self {
            TuningRule::Fixed => {}
            TuningRule::Imc {
                process_time_constant,
                lambda,
            } => {
                check_positive(
                    process_time_constant,
                    PidConfigError::InvalidProcessTimeConstant,
                )?;
                check_positive(lambda, PidConfigError::InvalidLambda)?;
            }
            TuningRule::ZieglerNichols {
                critical_gain,
                critical_period,
            } => {
                check_non_negative(critical_gain, PidConfigError::InvalidCriticalGain)?;
                check_positive(critical_period, PidConfigError::InvalidCriticalPeriod)?;
            }
        }
        Ok(self)
    }

    /// Derives the gains for the next step from the current ones.
    pub fn retune(&self, current: Gains<F>, nominal: Gains<F>, dt: F) -> Gains<F> {
        let half = F::constant(0.5);
        match *self {
            TuningRule::Fixed => nominal,
            TuningRule::Imc {
                process_time_constant: tau,
                lambda,
            } => {
                let denominator = lambda + dt * half;
                let kp = (tau + lambda * half) / (current.kp * denominator);
                let ki = F::one() / denominator;
                let kd = tau / (kp * denominator);
                Gains::new(kp, ki, kd)
            }
            TuningRule::ZieglerNichols {
                critical_gain: ku,
                critical_period: tu,
            } => Gains::new(
                F::constant(0.6) * ku,
                F::constant(1.2) * ku / tu,
                F::constant(0.075) * ku * tu,
            ),
        }
    }
}

/// Tuning rule plus the clamping policy shared by all tuned controllers.
///
/// When deserialized, omitted limits mean unbounded and omitted anti-windup means off.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "F: Real + serde::Deserialize<'de>"))
)]
pub struct TunedConfig<F> {
    rule: TuningRule<F>,
    #[cfg_attr(feature = "serde", serde(default))]
    output_limits: OutputLimits<F>,
    #[cfg_attr(feature = "serde", serde(default))]
    anti_windup: bool,
}

impl<F: Real> TunedConfig<F> {
    /// Unbounded output, anti-windup off.
    pub fn new(rule: TuningRule<F>) -> Self {
        Self {
            rule,
            output_limits: OutputLimits::unbounded(),
            anti_windup: false,
        }
    }

    /// Sets the output limits.
    pub fn with_output_limits(mut self, output_limits: OutputLimits<F>) -> Self {
        self.output_limits = output_limits;
        self
    }

    /// Enables or disables integral back-calculation on saturation.
    pub fn with_anti_windup(mut self, anti_windup: bool) -> Self {
        self.anti_windup = anti_windup;
        self
    }

    /// Returns the tuning rule.
    pub fn rule(&self) -> TuningRule<F> {
        self.rule
    }

    /// Returns the output limits.
    pub fn output_limits(&self) -> OutputLimits<F> {
        self.output_limits
    }

    /// Returns whether anti-windup is enabled.
    pub fn anti_windup(&self) -> bool {
        self.anti_windup
    }
}

impl<F: Real> Default for TunedConfig<F> {
    fn default() -> Self {
        Self::new(TuningRule::Fixed)
    }
}

/// A direct-form PID whose gains are recomputed by a [`TuningRule`] before every step, with the
/// output clamped into [`OutputLimits`].
///
/// With anti-windup enabled, a step whose raw output was clamped takes its own `ki·e·Δt` back
/// out of the integral accumulator, so the integral cannot wind up during prolonged saturation.
///
/// ```rust
/// use multi_pid::{Controller, OutputLimits, PidConfig, TunedConfig, TunedPid, TuningRule};
///
/// let tuning = TunedConfig::new(TuningRule::ZieglerNichols {
///     critical_gain: 4.0,
///     critical_period: 2.0,
/// })
/// .with_output_limits(OutputLimits::new(-5.0, 5.0).unwrap())
/// .with_anti_windup(true);
/// let mut pid = TunedPid::new(PidConfig::default(), tuning).unwrap();
///
/// assert_eq!(pid.compute(100.0, 0.0), 5.0);
/// assert!(pid.saturated());
/// ```
#[derive(Clone, Debug)]
pub struct TunedPid<F> {
    config: PidConfig<F>,
    tuning: TunedConfig<F>,
    gains: Gains<F>,
    ctx: PidContext<F>,
    saturated: bool,
}

impl<F: Real> TunedPid<F> {
    /// Creates a tuned controller. The configured gains seed the internal-model recurrence and
    /// are used as-is by [`TuningRule::Fixed`]; Ziegler–Nichols ignores them.
    ///
    /// # Errors
    /// Any invalid rule parameter, or [`PidConfigError::InvalidProportionalGain`] if the
    /// internal-model rule is seeded with `kp == 0`.
    pub fn new(config: PidConfig<F>, tuning: TunedConfig<F>) -> Result<Self, PidConfigError> {
        let rule = tuning.rule.validate()?;
        if matches!(rule, TuningRule::Imc { .. }) {
            check_positive(config.kp(), PidConfigError::InvalidProportionalGain)?;
        }
        log_debug!(
            gains = ?config.gains(),
            rule = ?rule,
            limits = ?tuning.output_limits,
            anti_windup = tuning.anti_windup,
            "tuned PID created"
        );
        Ok(Self {
            config,
            tuning,
            gains: config.gains(),
            ctx: PidContext::new(),
            saturated: false,
        })
    }

    /// Returns the configuration holding the nominal gains.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the tuning rule and clamping policy.
    pub fn tuning(&self) -> &TunedConfig<F> {
        &self.tuning
    }

    /// Returns the working variables.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// The integral accumulator.
    pub fn integral(&self) -> F {
        self.ctx.integral
    }

    /// Whether the most recent output was clamped.
    pub fn saturated(&self) -> bool {
        self.saturated
    }

    /// Replaces the tuning rule. Takes effect on the next step.
    pub fn set_rule(&mut self, rule: TuningRule<F>) -> Result<(), PidConfigError> {
        let rule = rule.validate()?;
        if matches!(rule, TuningRule::Imc { .. }) {
            check_positive(self.gains.kp, PidConfigError::InvalidProportionalGain)?;
        }
        self.tuning.rule = rule;
        Ok(())
    }

    /// Changes λ of the internal-model rule. Takes effect on the next step.
    ///
    /// # Errors
    /// [`PidConfigError::TuningRuleMismatch`] unless the internal-model rule is active.
    pub fn set_lambda(&mut self, lambda: F) -> Result<(), PidConfigError> {
        match &mut self.tuning.rule {
            TuningRule::Imc { lambda: current, .. } => {
                *current = check_positive(lambda, PidConfigError::InvalidLambda)?;
                Ok(())
            }
            _ => Err(PidConfigError::TuningRuleMismatch),
        }
    }

    /// Changes τ of the internal-model rule. Takes effect on the next step.
    ///
    /// # Errors
    /// [`PidConfigError::TuningRuleMismatch`] unless the internal-model rule is active.
    pub fn set_process_time_constant(&mut self, tau: F) -> Result<(), PidConfigError> {
        match &mut self.tuning.rule {
            TuningRule::Imc {
                process_time_constant,
                ..
            } => {
                *process_time_constant =
                    check_positive(tau, PidConfigError::InvalidProcessTimeConstant)?;
                Ok(())
            }
            _ => Err(PidConfigError::TuningRuleMismatch),
        }
    }

    /// Feeds new relay-test results to the Ziegler–Nichols rule. Takes effect on the next step.
    ///
    /// # Errors
    /// [`PidConfigError::TuningRuleMismatch`] unless the Ziegler–Nichols rule is active.
    pub fn set_critical_parameters(
        &mut self,
        critical_gain: F,
        critical_period: F,
    ) -> Result<(), PidConfigError> {
        let candidate = TuningRule::ZieglerNichols {
            critical_gain,
            critical_period,
        }
        .validate()?;
        match self.tuning.rule {
            TuningRule::ZieglerNichols { .. } => {
                self.tuning.rule = candidate;
                Ok(())
            }
            _ => Err(PidConfigError::TuningRuleMismatch),
        }
    }

    /// Changes the output limits.
    pub fn set_output_limits(&mut self, output_limits: OutputLimits<F>) {
        self.tuning.output_limits = output_limits;
    }

    /// Enables or disables integral back-calculation.
    pub fn set_anti_windup(&mut self, anti_windup: bool) {
        self.tuning.anti_windup = anti_windup;
    }
}

impl<F: Real> Controller<F> for TunedPid<F> {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        let dt = self.config.dt();
        self.gains = self
            .tuning
            .rule
            .retune(self.gains, self.config.gains(), dt);
        log_trace!(gains = ?self.gains, "gains retuned");

        let step = self.ctx.advance(&self.gains, dt, setpoint, process_value);
        let (output, saturated) = saturate(
            &self.tuning.output_limits,
            self.tuning.anti_windup,
            &mut self.ctx,
            step.output,
            step.integral_increment,
        );
        self.saturated = saturated;
        output
    }

    fn reset(&mut self) {
        self.ctx = PidContext::new();
        self.saturated = false;
        // The internal-model recurrence restarts from its seed
        if matches!(self.tuning.rule, TuningRule::Imc { .. }) {
            self.gains = self.config.gains();
        }
        log_debug!(gains = ?self.gains, "tuned PID reset");
    }

    fn gains(&self) -> Gains<F> {
        self.gains
    }

    fn sample_time(&self) -> Duration {
        self.config.sample_time()
    }
}
