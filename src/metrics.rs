// Step-response metrics computed over externally captured time series
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

//! Nothing here is called from a controller; these are consumers of recorded data.

use crate::Real;

/// Standard step-response figures of merit.
///
/// The reference (final) value is the last setpoint sample. Times are taken from the caller's
/// time axis, so they are absolute, not relative to the step.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepResponse<F> {
    /// Time at which the response first reached 90% of the final value, after having reached
    /// 10% on an earlier sample. Zero if it never did.
    pub rise_time: F,
    /// Peak excursion above the final value, in percent of the final value. Zero without
    /// overshoot.
    pub overshoot_percent: F,
    /// Earliest time from which every later sample stays within ±2% of the final value. Zero if
    /// the response never settles.
    pub settling_time: F,
    /// `|final - last process value|`.
    pub steady_state_error: F,
}

impl<F: Real> StepResponse<F> {
    /// Computes all four metrics.
    ///
    /// Only the common prefix of the three slices is considered. Empty input yields all zeros.
    pub fn from_series(time: &[F], setpoint: &[F], process_value: &[F]) -> Self {
        let len = time.len().min(setpoint.len()).min(process_value.len());
        let (time, setpoint, process_value) =
            (&time[..len], &setpoint[..len], &process_value[..len]);
        Self {
            rise_time: rise_time(time, setpoint, process_value),
            overshoot_percent: overshoot_percent(setpoint, process_value),
            settling_time: settling_time(time, setpoint, process_value),
            steady_state_error: steady_state_error(setpoint, process_value),
        }
    }
}

/// 10%→90% rise time. See [`StepResponse::rise_time`].
pub fn rise_time<F: Real>(time: &[F], setpoint: &[F], process_value: &[F]) -> F {
    let Some(&target) = setpoint.last() else {
        return F::zero();
    };
    let low = F::constant(0.1) * target;
    let high = F::constant(0.9) * target;

    let mut low_crossed = false;
    for (&t, &y) in time.iter().zip(process_value) {
        if !low_crossed {
            // The sample that crosses 10% is not also counted as the 90% crossing
            low_crossed = y >= low;
            continue;
        }
        if y >= high {
            return t;
        }
    }
    F::zero()
}

/// Percent overshoot. See [`StepResponse::overshoot_percent`].
pub fn overshoot_percent<F: Real>(setpoint: &[F], process_value: &[F]) -> F {
    let Some(&target) = setpoint.last() else {
        return F::zero();
    };
    let peak = process_value
        .iter()
        .copied()
        .fold(F::neg_infinity(), F::max);
    if peak <= target {
        return F::zero();
    }
    (peak - target) / target * F::constant(100.0)
}

/// 2% settling time. See [`StepResponse::settling_time`].
pub fn settling_time<F: Real>(time: &[F], setpoint: &[F], process_value: &[F]) -> F {
    let Some(&target) = setpoint.last() else {
        return F::zero();
    };
    let tolerance = F::constant(0.02) * target;
    let (lower, upper) = (target - tolerance, target + tolerance);
    let inside = |y: F| y >= lower && y <= upper;

    // Walk backwards to find where the trailing in-band run starts
    let mut settled_from = None;
    for (&t, &y) in time.iter().zip(process_value).rev() {
        if !inside(y) {
            break;
        }
        settled_from = Some(t);
    }
    settled_from.unwrap_or_else(F::zero)
}

/// Absolute error at the last sample. See [`StepResponse::steady_state_error`].
pub fn steady_state_error<F: Real>(setpoint: &[F], process_value: &[F]) -> F {
    match (setpoint.last(), process_value.last()) {
        (Some(&target), Some(&y)) => (target - y).abs(),
        _ => F::zero(),
    }
}
