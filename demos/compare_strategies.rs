// Runs every control strategy against every simulated plant and logs step-response metrics
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

#[cfg(feature = "simulation")]
pub fn main() {
    use std::time::Duration;

    use multi_pid::sim::{
        self, Actuator, FirstOrderSystem, NonlinearSystem, Plant, SecondOrderSystem,
    };
    use multi_pid::{
        AdaptivePid, AnyController, FuzzyPid, IncrementalPid, OutputLimits, PidConfig,
        PidConfigBuilder, PositionalPid, Strategy, TunedConfig, TunedPid, TuningRule,
    };

    const SAMPLE_TIME_MS: u64 = 100;
    const DURATION_S: u64 = 20;
    const SETPOINT: f64 = 1.0;

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_thread_names(true)
        .init();

    fn make_config() -> PidConfig<f64> {
        PidConfigBuilder::default()
            .kp(0.5)
            .ki(0.1)
            .kd(0.05)
            .sample_time(Duration::from_millis(SAMPLE_TIME_MS))
            .build()
            .expect("Invalid PID config")
    }

    fn make_controller(strategy: Strategy) -> AnyController<f64> {
        let config = make_config();
        match strategy {
            Strategy::Positional => PositionalPid::new(config).into(),
            Strategy::Incremental => IncrementalPid::new(config).into(),
            Strategy::Fuzzy => FuzzyPid::new(config).into(),
            Strategy::Adaptive => AdaptivePid::new(config).into(),
            Strategy::Tuned => {
                let tuning = TunedConfig::new(TuningRule::ZieglerNichols {
                    critical_gain: 4.0,
                    critical_period: 2.0,
                })
                .with_output_limits(OutputLimits::new(-5.0, 5.0).expect("Invalid output limits"))
                .with_anti_windup(true);
                TunedPid::new(config, tuning)
                    .expect("Invalid tuning")
                    .into()
            }
        }
    }

    fn make_plants() -> [Box<dyn Plant + Send>; 3] {
        [
            Box::new(FirstOrderSystem::new(1.0, 1.0)),
            Box::new(SecondOrderSystem::new(1.0, 0.7, 1.0)),
            Box::new(NonlinearSystem::new(1.0, 1.0, 0.5, 0.1)),
        ]
    }

    let steps = (DURATION_S * 1000 / SAMPLE_TIME_MS) as usize;

    std::thread::scope(|s| {
        for plant_index in 0..make_plants().len() {
            for strategy in Strategy::ALL {
                std::thread::Builder::new()
                    .name(format!("{strategy}-{plant_index}"))
                    .spawn_scoped(s, move || {
                        // Each thread owns its controller and plant outright
                        let mut plant = make_plants()
                            .into_iter()
                            .nth(plant_index)
                            .expect("plant index in range");
                        let mut pid = make_controller(strategy);
                        let actuator = match strategy {
                            Strategy::Incremental => Actuator::Integrating,
                            _ => Actuator::Direct,
                        };

                        let trace = sim::run_step_response(
                            &mut pid,
                            plant.as_mut(),
                            actuator,
                            SETPOINT,
                            steps,
                        );
                        let metrics = trace.metrics();
                        tracing::info!(
                            strategy = %strategy,
                            plant = plant.name(),
                            rise_time = metrics.rise_time,
                            overshoot_percent = metrics.overshoot_percent,
                            settling_time = metrics.settling_time,
                            steady_state_error = metrics.steady_state_error,
                            "step response"
                        );
                    })
                    .expect("Failed to spawn simulation thread");
            }
        }
    });
}

#[cfg(not(feature = "simulation"))]
fn main() {
    eprintln!("This example requires `--features simulation` to run.");
}
