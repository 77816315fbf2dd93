// Validated configuration shared by every control strategy
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

use crate::Real;

/// Reasons a configuration value is rejected.
///
/// Every variant names the parameter at fault. A rejected setter leaves the configuration
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum PidConfigError {
    /// The proportional gain was negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("proportional gain must be finite and non-negative")
    )]
    InvalidProportionalGain,

    /// The integral gain was negative or not finite.
    #[cfg_attr(feature = "std", error("integral gain must be finite and non-negative"))]
    InvalidIntegralGain,

    /// The derivative gain was negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("derivative gain must be finite and non-negative")
    )]
    InvalidDerivativeGain,

    /// The sample time was zero or not representable as a finite scalar.
    #[cfg_attr(feature = "std", error("sample time must be positive and finite"))]
    InvalidSampleTime,

    /// An output limit was NaN or the minimum exceeded the maximum.
    #[cfg_attr(
        feature = "std",
        error("output limits must not be NaN and min must not exceed max")
    )]
    InvalidOutputLimits,

    /// The adaptive learning rate was negative or not finite.
    #[cfg_attr(feature = "std", error("learning rate must be finite and non-negative"))]
    InvalidLearningRate,

    /// An adaptive gain range was empty, negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("adaptive gain bounds must be finite, non-negative and ordered")
    )]
    InvalidGainBounds,

    /// A fuzzy adjustment range was negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("fuzzy adjustment ranges must be finite and non-negative")
    )]
    InvalidFuzzyRanges,

    /// The internal-model closed-loop time constant was not positive and finite.
    #[cfg_attr(feature = "std", error("lambda must be positive and finite"))]
    InvalidLambda,

    /// The internal-model process time constant was not positive and finite.
    #[cfg_attr(
        feature = "std",
        error("process time constant must be positive and finite")
    )]
    InvalidProcessTimeConstant,

    /// The relay-test critical gain was negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("critical gain must be finite and non-negative")
    )]
    InvalidCriticalGain,

    /// The relay-test critical period was not positive and finite.
    #[cfg_attr(feature = "std", error("critical period must be positive and finite"))]
    InvalidCriticalPeriod,

    /// A tuning parameter was set that the active tuning rule does not use.
    #[cfg_attr(
        feature = "std",
        error("parameter does not apply to the active tuning rule")
    )]
    TuningRuleMismatch,
}

pub(crate) fn check_non_negative<F: Real>(
    value: F,
    err: PidConfigError,
) -> Result<F, PidConfigError> {
    if value < F::zero() || !value.is_finite() {
        return Err(err);
    }
    Ok(value)
}

pub(crate) fn check_positive<F: Real>(
    value: F,
    err: PidConfigError,
) -> Result<F, PidConfigError> {
    if value <= F::zero() || !value.is_finite() {
        return Err(err);
    }
    Ok(value)
}

/// Proportional, integral and derivative gains.
///
/// The integral gain multiplies the error *before* it is accumulated, so changing `ki` never
/// rescales integral action that has already been accumulated.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gains<F> {
    /// Proportional gain.
    pub kp: F,
    /// Integral gain.
    pub ki: F,
    /// Derivative gain.
    pub kd: F,
}

impl<F: Real> Gains<F> {
    /// Bundles three gains without validation.
    pub fn new(kp: F, ki: F, kd: F) -> Self {
        Self { kp, ki, kd }
    }

    /// Checks that every gain is finite and non-negative.
    pub fn validate(self) -> Result<Self, PidConfigError> {
        check_non_negative(self.kp, PidConfigError::InvalidProportionalGain)?;
        check_non_negative(self.ki, PidConfigError::InvalidIntegralGain)?;
        check_non_negative(self.kd, PidConfigError::InvalidDerivativeGain)?;
        Ok(self)
    }
}

impl<F: Real> Default for Gains<F> {
    fn default() -> Self {
        Self::new(F::one(), F::zero(), F::zero())
    }
}

/// Inclusive bounds on the actuator command.
///
/// Either bound may be infinite to leave that side unclamped. With the `serde` feature a
/// deserialized pair goes through the same check as [`OutputLimits::new`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OutputLimits<F> {
    min: F,
    max: F,
}

impl<F: Real> OutputLimits<F> {
    /// Creates a validated pair of limits. `min == max` pins the output to a single value.
    pub fn new(min: F, max: F) -> Result<Self, PidConfigError> {
        if min.is_nan() || max.is_nan() || min > max {
            return Err(PidConfigError::InvalidOutputLimits);
        }
        Ok(Self { min, max })
    }

    /// Limits that never clamp.
    pub fn unbounded() -> Self {
        Self {
            min: F::neg_infinity(),
            max: F::infinity(),
        }
    }

    /// Returns the lower limit.
    pub fn min(&self) -> F {
        self.min
    }

    /// Returns the upper limit.
    pub fn max(&self) -> F {
        self.max
    }

    /// Saturates `value` into `[min, max]`.
    #[inline]
    pub fn clamp(&self, value: F) -> F {
        value.max(self.min).min(self.max)
    }
}

impl<F: Real> Default for OutputLimits<F> {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(feature = "serde")]
impl<'de, F> serde::Deserialize<'de> for OutputLimits<F>
where
    F: Real + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Limits<T> {
            min: T,
            max: T,
        }

        let Limits { min, max } = <Limits<F> as serde::Deserialize>::deserialize(deserializer)?;
        Self::new(min, max).map_err(|_| {
            serde::de::Error::custom("output limits must not be NaN and min must not exceed max")
        })
    }
}

/// Gains and sample time common to every strategy.
///
/// Only obtainable through [`PidConfigBuilder`] or [`PidConfig::default`], so the sample time is
/// always valid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<F> {
    /// Nominal gains.
    /// Defaults to kp = 1, ki = 0, kd = 0.
    gains: Gains<F>,

    /// Sampling time for the controller.
    /// Defaults to 10ms.
    sample_time: Duration,

    /// `sample_time` in seconds, cached as the working scalar type.
    dt: F,
}

impl<F: Real> Default for PidConfig<F> {
    fn default() -> Self {
        let sample_time = Duration::from_millis(10);
        PidConfig {
            gains: Gains::default(),
            sample_time,
            dt: F::constant(sample_time.as_secs_f64()),
        }
    }
}

fn seconds<F: Real>(sample_time: Duration) -> Result<F, PidConfigError> {
    let dt = F::constant(sample_time.as_secs_f64());
    check_positive(dt, PidConfigError::InvalidSampleTime)
}

impl<F: Real> PidConfig<F> {
    /// Returns the proportional gain.
    pub fn kp(&self) -> F {
        self.gains.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> F {
        self.gains.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> F {
        self.gains.kd
    }

    /// Convenience method that returns the three gains together.
    pub fn gains(&self) -> Gains<F> {
        self.gains
    }

    /// Returns the sampling time.
    pub fn sample_time(&self) -> Duration {
        self.sample_time
    }

    /// Returns the sampling time in seconds.
    pub fn dt(&self) -> F {
        self.dt
    }

    /// Sets the proportional gain.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidProportionalGain`] if `kp` is negative or not finite.
    pub fn set_kp(&mut self, kp: F) -> Result<(), PidConfigError> {
        self.gains.kp = check_non_negative(kp, PidConfigError::InvalidProportionalGain)?;
        Ok(())
    }

    /// Sets the integral gain. The accumulated integral is left untouched.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidIntegralGain`] if `ki` is negative or not finite.
    pub fn set_ki(&mut self, ki: F) -> Result<(), PidConfigError> {
        self.gains.ki = check_non_negative(ki, PidConfigError::InvalidIntegralGain)?;
        Ok(())
    }

    /// Sets the derivative gain.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidDerivativeGain`] if `kd` is negative or not finite.
    pub fn set_kd(&mut self, kd: F) -> Result<(), PidConfigError> {
        self.gains.kd = check_non_negative(kd, PidConfigError::InvalidDerivativeGain)?;
        Ok(())
    }

    /// Sets all three gains at once. Either all of them change or none does.
    pub fn set_gains(&mut self, gains: Gains<F>) -> Result<(), PidConfigError> {
        self.gains = gains.validate()?;
        Ok(())
    }

    /// Sets the sampling time.
    ///
    /// Unlike gains, the sample period is meant to stay fixed for the lifetime of a running
    /// controller; change it only between runs.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidSampleTime`] if the period is zero or not representable.
    pub fn set_sample_time(&mut self, sample_time: Duration) -> Result<(), PidConfigError> {
        self.dt = seconds(sample_time)?;
        self.sample_time = sample_time;
        Ok(())
    }
}

/// Builder for [`PidConfig`] that validates everything once in [`PidConfigBuilder::build`].
///
/// ```rust
/// use core::time::Duration;
/// use multi_pid::config::PidConfigBuilder;
///
/// let config = PidConfigBuilder::default()
///     .kp(0.5)
///     .ki(0.1)
///     .kd(0.05)
///     .sample_time(Duration::from_millis(100))
///     .build()
///     .expect("Invalid PID config");
/// assert_eq!(config.dt(), 0.1);
/// ```
///
/// With the `serde` feature the builder is the deserialization target, so loaded
/// configurations pass through the same validation.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PidConfigBuilder<F> {
    gains: Gains<F>,
    sample_time: Duration,
}

impl<F: Real> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        let config = PidConfig::<F>::default();
        Self {
            gains: config.gains,
            sample_time: config.sample_time,
        }
    }
}

impl<F: Real> PidConfigBuilder<F> {
    /// Sets the proportional gain.
    pub fn kp(mut self, kp: F) -> Self {
        self.gains.kp = kp;
        self
    }

    /// Sets the integral gain.
    pub fn ki(mut self, ki: F) -> Self {
        self.gains.ki = ki;
        self
    }

    /// Sets the derivative gain.
    pub fn kd(mut self, kd: F) -> Self {
        self.gains.kd = kd;
        self
    }

    /// Sets all three gains.
    pub fn gains(mut self, gains: Gains<F>) -> Self {
        self.gains = gains;
        self
    }

    /// Sets the sampling time.
    pub fn sample_time(mut self, sample_time: Duration) -> Self {
        self.sample_time = sample_time;
        self
    }

    /// Validates and assembles the configuration.
    pub fn build(self) -> Result<PidConfig<F>, PidConfigError> {
        let result = self.gains.validate().and_then(|gains| {
            Ok(PidConfig {
                gains,
                sample_time: self.sample_time,
                dt: seconds(self.sample_time)?,
            })
        });
        #[cfg(feature = "std")]
        if let Err(err) = &result {
            log_warn!(error = ?err, "rejected PID configuration");
        }
        result
    }
}
