// Fuzzy-gain-scheduled PID with a 7x7 rule base per gain
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

/// The seven linguistic terms used both for inputs (error, error rate) and for gain
/// adjustments. The discriminant is the signed level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum Linguistic {
    /// Negative big.
    NB = -3,
    /// Negative medium.
    NM = -2,
    /// Negative small.
    NS = -1,
    /// Zero.
    ZO = 0,
    /// Positive small.
    PS = 1,
    /// Positive medium.
    PM = 2,
    /// Positive big.
    PB = 3,
}

impl Linguistic {
    /// Every term, from NB to PB. Position in this array is the rule-table index.
    pub const ALL: [Linguistic; 7] = [
        Linguistic::NB,
        Linguistic::NM,
        Linguistic::NS,
        Linguistic::ZO,
        Linguistic::PS,
        Linguistic::PM,
        Linguistic::PB,
    ];

    /// Maps a crisp value onto a term with sharp, non-overlapping cut-offs at ±0.1, ±0.5 and
    /// ±1.5. Each upper edge is inclusive, e.g. exactly `0.1` is `ZO` and exactly `-1.5` is `NB`.
    /// Membership is crisp; [`gaussian_membership`] is not consulted.
    pub fn fuzzify<F: Real>(value: F) -> Self {
        if value <= F::constant(-1.5) {
            Linguistic::NB
        } else if value <= F::constant(-0.5) {
            Linguistic::NM
        } else if value <= F::constant(-0.1) {
            Linguistic::NS
        } else if value <= F::constant(0.1) {
            Linguistic::ZO
        } else if value <= F::constant(0.5) {
            Linguistic::PS
        } else if value <= F::constant(1.5) {
            Linguistic::PM
        } else {
            Linguistic::PB
        }
    }

    /// The signed level in `[-3, 3]`.
    pub fn level(self) -> i8 {
        self as i8
    }

    /// The row/column index into a rule table, in `0..7`.
    pub fn index(self) -> usize {
        (self.level() + 3) as usize
    }

    /// Inverse of [`Linguistic::level`].
    pub fn from_level(level: i8) -> Option<Self> {
        match level {
            -3..=3 => Some(Self::ALL[(level + 3) as usize]),
            _ => None,
        }
    }
}

/// Gaussian membership function `exp(-(x - mean)² / (2σ²))`.
///
/// Provided for callers building graded fuzzy sets; the fuzzy PID itself bins crisply.
pub fn gaussian_membership<F: Real>(x: F, mean: F, sigma: F) -> F {
    let two = F::constant(2.0);
    (-(x - mean).powi(2) / (two * sigma.powi(2))).exp()
}

/// Maps a linguistic level back to a number: `level · range / 3`.
#[inline]
pub fn defuzzify<F: Real>(level: Linguistic, range: F) -> F {
    F::constant(f64::from(level.level())) * (range / F::constant(3.0))
}

/// A 7×7 table indexed by `[error term][error-rate term]`.
pub type RuleTable = [[Linguistic; 7]; 7];

/// The three rule tables, one per gain.
#[derive(Debug, PartialEq, Eq)]
pub struct RuleBase {
    /// Proportional gain adjustments.
    pub kp: RuleTable,
    /// Integral gain adjustments.
    pub ki: RuleTable,
    /// Derivative gain adjustments.
    pub kd: RuleTable,
}

/// The adjustment levels one rule lookup yields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Adjustment {
    /// Proportional gain adjustment level.
    pub kp: Linguistic,
    /// Integral gain adjustment level.
    pub ki: Linguistic,
    /// Derivative gain adjustment level.
    pub kd: Linguistic,
}

impl RuleBase {
    /// Looks up the adjustment for one `(error, error rate)` pair.
    #[inline]
    pub fn infer(&self, error: Linguistic, error_rate: Linguistic) -> Adjustment {
        let (row, col) = (error.index(), error_rate.index());
        Adjustment {
            kp: self.kp[row][col],
            ki: self.ki[row][col],
            kd: self.kd[row][col],
        }
    }
}

use Linguistic::{NB, NM, NS, PB, PM, PS, ZO};

/// The standard rule base: large error with a same-sign rate boosts kp and trims ki; near-zero
/// error and rate leave the gains alone.
pub static DEFAULT_RULES: RuleBase = RuleBase {
    kp: [
        [PB, PB, PM, PM, PM, PS, ZO],
        [PB, PB, PM, PM, PS, PS, NS],
        [PM, PM, PM, PS, ZO, NS, NM],
        [PM, PS, ZO, NS, NS, NM, NM],
        [PS, PS, ZO, NS, NM, NM, NM],
        [PS, ZO, NS, NM, NM, NB, NB],
        [ZO, ZO, NS, NM, NB, NB, NB],
    ],
    ki: [
        [NB, NB, NB, NM, NM, NS, ZO],
        [NB, NB, NM, NM, NS, ZO, ZO],
        [NM, NM, NS, NS, ZO, PS, PS],
        [NM, NS, ZO, PS, PS, PM, PM],
        [NS, ZO, PS, PS, PM, PM, PB],
        [ZO, ZO, PS, PM, PM, PB, PB],
        [ZO, PS, PM, PM, PB, PB, PB],
    ],
    kd: [
        [PM, PS, NS, NM, NM, NM, ZO],
        [PM, PS, NS, NM, NM, NS, ZO],
        [PS, PS, NS, NS, NS, NS, ZO],
        [PS, ZO, ZO, ZO, ZO, ZO, ZO],
        [ZO, ZO, ZO, ZO, ZO, ZO, ZO],
        [ZO, PS, PS, PS, PS, PS, PM],
        [ZO, PM, PM, PM, PS, PS, PM],
    ],
};

/// Full-scale adjustment of each gain, i.e. what a `PB` level adds.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuzzyRanges<F> {
    /// Proportional range. Defaults to 0.5.
    pub kp: F,
    /// Integral range. Defaults to 0.1.
    pub ki: F,
    /// Derivative range. Defaults to 0.2.
    pub kd: F,
}

impl<F: Real> Default for FuzzyRanges<F> {
    fn default() -> Self {
        Self {
            kp: F::constant(0.5),
            ki: F::constant(0.1),
            kd: F::constant(0.2),
        }
    }
}

impl<F: Real> FuzzyRanges<F> {
    /// Checks that every range is finite and non-negative.
    pub fn validate(self) -> Result<Self, PidConfigError> {
        check_non_negative(self.kp, PidConfigError::InvalidFuzzyRanges)?;
        check_non_negative(self.ki, PidConfigError::InvalidFuzzyRanges)?;
        check_non_negative(self.kd, PidConfigError::InvalidFuzzyRanges)?;
        Ok(self)
    }
}

/// A direct-form PID whose gains are perturbed every step by fuzzy inference over the error and
/// the error rate `(e - e[t-1]) / Δt`.
///
/// The configured gains are the nominal tuning and are never modified; each step uses
/// `nominal + defuzzify(rule(error, error_rate))`.
#[derive(Clone, Debug)]
pub struct FuzzyPid<F> {
    config: PidConfig<F>,
    ranges: FuzzyRanges<F>,
    rules: &'static RuleBase,
    ctx: PidContext<F>,
    effective: Gains<F>,
}

impl<F: Real> FuzzyPid<F> {
    /// Creates a controller with the default ranges and [`DEFAULT_RULES`].
    pub fn new(config: PidConfig<F>) -> Self {
        log_debug!(gains = ?config.gains(), "fuzzy PID created");
        Self {
            config,
            ranges: FuzzyRanges::default(),
            rules: &DEFAULT_RULES,
            ctx: PidContext::new(),
            effective: config.gains(),
        }
    }

    /// Creates a controller with custom ranges and rule base.
    ///
    /// # Errors
    /// [`PidConfigError::InvalidFuzzyRanges`] if a range is negative or not finite.
    pub fn with_rules(
        config: PidConfig<F>,
        ranges: FuzzyRanges<F>,
        rules: &'static RuleBase,
    ) -> Result<Self, PidConfigError> {
        let ranges = ranges.validate()?;
        log_debug!(gains = ?config.gains(), ranges = ?ranges, "fuzzy PID created");
        Ok(Self {
            config,
            ranges,
            rules,
            ctx: PidContext::new(),
            effective: config.gains(),
        })
    }

    /// Returns the configuration holding the nominal gains.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Returns the configuration for on-the-fly retuning of the nominal gains.
    pub fn config_mut(&mut self) -> &mut PidConfig<F> {
        &mut self.config
    }

    /// Returns the adjustment ranges.
    pub fn ranges(&self) -> &FuzzyRanges<F> {
        &self.ranges
    }

    /// The gains actually used by the most recent step.
    pub fn effective_gains(&self) -> Gains<F> {
        self.effective
    }

    /// Returns the working variables.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// Fuzzifies, infers and defuzzifies the gain adjustments for one `(error, error_rate)`
    /// pair.
    pub fn schedule(&self, error: F, error_rate: F) -> Gains<F> {
        let adjustment = self
            .rules
            .infer(Linguistic::fuzzify(error), Linguistic::fuzzify(error_rate));
        let nominal = self.config.gains();
        Gains::new(
            nominal.kp + defuzzify(adjustment.kp, self.ranges.kp),
            nominal.ki + defuzzify(adjustment.ki, self.ranges.ki),
            nominal.kd + defuzzify(adjustment.kd, self.ranges.kd),
        )
    }
}

impl<F: Real> Controller<F> for FuzzyPid<F> {
    fn compute(&mut self, setpoint: F, process_value: F) -> F {
        let dt = self.config.dt();
        let error = setpoint - process_value;
        let error_rate = (error - self.ctx.last_error) / dt;

        self.effective = self.schedule(error, error_rate);
        self.ctx
            .advance(&self.effective, dt, setpoint, process_value)
            .output
    }

    fn reset(&mut self) {
        self.ctx = PidContext::new();
        self.effective = self.config.gains();
        log_debug!("fuzzy PID reset");
    }

    fn gains(&self) -> Gains<F> {
        self.config.gains()
    }

    fn sample_time(&self) -> Duration {
        self.config.sample_time()
    }
}
