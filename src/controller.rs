// Defines the calling contract shared by every strategy and a tagged union over them
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

use core::fmt;
use core::time::Duration;

use crate::adaptive::AdaptivePid;
use crate::config::{Gains, OutputLimits};
use crate::fuzzy::FuzzyPid;
use crate::incremental::IncrementalPid;
use crate::positional::{PidContext, PositionalPid};
use crate::tuned::TunedPid;
use crate::Real;

/// The contract every control strategy implements.
///
/// The driver must call [`Controller::compute`] exactly once per sample period, in sample order.
/// The controller does not check the wall clock; calling it at a cadence that differs from the
/// configured sample time silently skews the integral and derivative terms.
///
/// Inputs must be finite. Screening out corrupted measurements is the caller's job.
pub trait Controller<F: Real> {
    /// Computes the actuator command for one sample.
    ///
    /// Only the controller's own state is mutated.
    fn compute(&mut self, setpoint: F, process_value: F) -> F;

    /// Clears error history, derivative history and the integral accumulator.
    ///
    /// Gains survive a reset, so adaptive and tuned strategies keep what they learned.
    fn reset(&mut self);

    /// Returns the current gains: the nominal ones for fixed-gain strategies, the most recently
    /// adapted or tuned ones otherwise. Per-step fuzzy perturbations are not included.
    fn gains(&self) -> Gains<F>;

    /// Returns the configured sample period.
    fn sample_time(&self) -> Duration;
}

impl<F: Real, C: Controller<F> + ?Sized> Controller<F> for &mut C {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        (**self).compute(setpoint, process_value)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn gains(&self) -> Gains<F> {
        (**self).gains()
    }

    fn sample_time(&self) -> Duration {
        (**self).sample_time()
    }
}

/// Names a control strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    /// Direct-form PID.
    Positional,
    /// Incremental-form PID.
    Incremental,
    /// Fuzzy-gain-scheduled PID.
    Fuzzy,
    /// MIT-rule adaptive PID.
    Adaptive,
    /// Model-tuned PID.
    Tuned,
}

impl Strategy {
    /// Every strategy, in declaration order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Positional,
        Strategy::Incremental,
        Strategy::Fuzzy,
        Strategy::Adaptive,
        Strategy::Tuned,
    ];

    /// A short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Positional => "positional",
            Strategy::Incremental => "incremental",
            Strategy::Fuzzy => "fuzzy",
            Strategy::Adaptive => "adaptive",
            Strategy::Tuned => "tuned",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any of the strategies, selected at construction time.
///
/// Dispatch is a `match`, so an `AnyController` can live on the stack or in a fixed-size array
/// without boxing.
#[derive(Clone, Debug)]
pub enum AnyController<F> {
    /// See [`PositionalPid`].
    Positional(PositionalPid<F>),
    /// See [`IncrementalPid`].
    Incremental(IncrementalPid<F>),
    /// See [`FuzzyPid`].
    Fuzzy(FuzzyPid<F>),
    /// See [`AdaptivePid`].
    Adaptive(AdaptivePid<F>),
    /// See [`TunedPid`].
    Tuned(TunedPid<F>),
}

impl<F: Real> AnyController<F> {
    /// Returns which strategy is wrapped.
    pub fn strategy(&self) -> Strategy {
        match self {
            AnyController::Positional(_) => Strategy::Positional,
            AnyController::Incremental(_) => Strategy::Incremental,
            AnyController::Fuzzy(_) => Strategy::Fuzzy,
            AnyController::Adaptive(_) => Strategy::Adaptive,
            AnyController::Tuned(_) => Strategy::Tuned,
        }
    }
}

macro_rules! dispatch {
    ($self:expr, $pid:ident => $body:expr) => {
        match $self {
            AnyController::Positional($pid) => $body,
            AnyController::Incremental($pid) => $body,
            AnyController::Fuzzy($pid) => $body,
            AnyController::Adaptive($pid) => $body,
            AnyController::Tuned($pid) => $body,
        }
    };
}

impl<F: Real> Controller<F> for AnyController<F> {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        dispatch!(self, pid => pid.compute(setpoint, process_value))
    }

    fn reset(&mut self) {
        dispatch!(self, pid => pid.reset())
    }

    fn gains(&self) -> Gains<F> {
        dispatch!(self, pid => pid.gains())
    }

    fn sample_time(&self) -> Duration {
        dispatch!(self, pid => pid.sample_time())
    }
}

macro_rules! impl_from {
    ($variant:ident, $ty:ident) => {
        impl<F> From<$ty<F>> for AnyController<F> {
            fn from(pid: $ty<F>) -> Self {
                AnyController::$variant(pid)
            }
        }
    };
}

impl_from!(Positional, PositionalPid);
impl_from!(Incremental, IncrementalPid);
impl_from!(Fuzzy, FuzzyPid);
impl_from!(Adaptive, AdaptivePid);
impl_from!(Tuned, TunedPid);

/// Clamps `raw` into `limits` and, when `anti_windup` is set and clamping changed the value,
/// takes `integral_increment` (the amount this step added to the accumulator) back out of the
/// context.
///
/// Returns the clamped output and whether it saturated.
pub(crate) fn saturate<F: Real>(
    limits: &OutputLimits<F>,
    anti_windup: bool,
    ctx: &mut PidContext<F>,
    raw: F,
    integral_increment: F,
) -> (F, bool) {
    let clamped = limits.clamp(raw);
    let saturated = clamped != raw;
    if saturated && anti_windup {
        ctx.integral = ctx.integral - integral_increment;
        log_trace!(
            raw = ?raw,
            clamped = ?clamped,
            integral = ?ctx.integral,
            "output saturated; integral rolled back"
        );
    } else if saturated {
        log_trace!(raw = ?raw, clamped = ?clamped, "output saturated");
    }
    (clamped, saturated)
}
