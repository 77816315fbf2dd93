#![warn(missing_docs)]

//! # Multi-strategy discrete PID library
//!
//! This library provides a family of interchangeable discrete feedback controllers that all
//! share one calling contract, [`Controller`]: `compute(setpoint, process_value) -> output`
//! once per sample period, and `reset()`.
//!
//! ## Strategies
//!
//! - [`PositionalPid`]: direct-form PID with derivative on measurement.
//! - [`IncrementalPid`]: velocity-form PID that emits a command *delta*.
//! - [`FuzzyPid`]: direct-form PID whose gains are perturbed every step by a 7×7 fuzzy rule base
//!   over the error and the error rate.
//! - [`AdaptivePid`]: direct-form PID whose gains follow an MIT-rule gradient descent on
//!   `J = ½e²`, with an error-scheduled learning rate and clamped gains.
//! - [`TunedPid`]: direct-form PID whose gains are recomputed before every step from an
//!   internal-model or relay (Ziegler–Nichols) tuning rule, with output clamping and optional
//!   integral back-calculation.
//!
//! All strategies are generic over the scalar type (`f32` or `f64`), never allocate, and never
//! block, so they can run inside a hard real-time loop.
//!
//! ## Usage
//!
//! ```rust
//! use core::time::Duration;
//!
//! use multi_pid::{Controller, PidConfigBuilder, PositionalPid};
//!
//! let config = PidConfigBuilder::default()
//!     .kp(0.5)
//!     .ki(0.1)
//!     .kd(0.05)
//!     .sample_time(Duration::from_millis(100))
//!     .build()
//!     .expect("Invalid PID config");
//! let mut pid = PositionalPid::new(config);
//!
//! let output: f64 = pid.compute(1.0, 0.0);
//! assert!((output - 0.51).abs() < 1e-12);
//! ```
//!
//! ### Selecting a strategy at runtime
//!
//! ```rust
//! use multi_pid::{AnyController, Controller, FuzzyPid, IncrementalPid, PidConfig};
//!
//! let config = PidConfig::<f64>::default();
//! let mut controllers = [
//!     AnyController::from(IncrementalPid::new(config)),
//!     AnyController::from(FuzzyPid::new(config)),
//! ];
//!
//! for pid in controllers.iter_mut() {
//!     let _ = pid.compute(1.0, 0.0);
//!     pid.reset();
//! }
//! ```
//!
//! ## Features
//!
//! - `std` (default): `std::error::Error` for [`PidConfigError`] and `tracing` events.
//! - `serde`: deserialize configuration builders from any serde format.
//! - `simulation`: plant models and a closed-loop driver for comparing strategies.
#![no_std]

#[cfg(feature = "std")]
extern crate std;

macro_rules! log_debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "std")]
        tracing::debug!($($arg)*);
    };
}

macro_rules! log_trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "std")]
        tracing::trace!($($arg)*);
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "std")]
        tracing::warn!($($arg)*);
    };
}

mod real;

/// Gains, sample time, output limits and their validation.
pub mod config;

/// The shared calling contract and runtime strategy selection.
pub mod controller;

/// Direct-form (position) PID.
pub mod positional;

/// Incremental-form (velocity) PID.
pub mod incremental;

/// Fuzzy-gain-scheduled PID and its rule base.
pub mod fuzzy;

/// Gradient-adaptive (MIT-rule) PID.
pub mod adaptive;

/// Model-based tuned PID with output clamping and anti-windup.
pub mod tuned;

/// Step-response metrics over captured time series.
pub mod metrics;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

pub use adaptive::{AdaptiveConfig, AdaptivePid, GainBounds};
pub use config::{Gains, OutputLimits, PidConfig, PidConfigBuilder, PidConfigError};
pub use controller::{AnyController, Controller, Strategy};
pub use fuzzy::{FuzzyPid, FuzzyRanges, Linguistic};
pub use incremental::IncrementalPid;
pub use positional::{PidContext, PositionalPid};
pub use real::Real;
pub use tuned::{TunedConfig, TunedPid, TuningRule};
