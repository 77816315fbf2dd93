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


mod proptests {
    use super::fixtures::test_pid::*;

    use multi_pid::{
        AdaptiveConfig, AdaptivePid, AnyController, Controller, Linguistic, PositionalPid,
        TuningRule,
    };
    use proptest::collection::vec;
    use proptest::prelude::*;

    fn samples() -> impl Strategy<Value = Vec<(f64, f64)>> {
        vec((-100.0f64..100.0, -100.0f64..100.0), 1..64)
    }

    proptest! {
        #[test]
        fn adaptive_gains_stay_in_bounds(
            learning_rate in 0.0f64..10.0,
            sequence in samples(),
        ) {
            let adaptation = AdaptiveConfig { learning_rate, ..AdaptiveConfig::default() };
            let bounds = adaptation.bounds;
            let mut pid = AdaptivePid::with_adaptation(make_config(), adaptation).unwrap();
            for (sp, pv) in sequence {
                pid.compute(sp, pv);
                prop_assert!(bounds.contains(&pid.gains()), "gains {:?}", pid.gains());
            }
        }

        #[test]
        fn tuned_output_always_clamped(
            critical_gain in 0.0f64..50.0,
            critical_period in 0.1f64..10.0,
            anti_windup in any::<bool>(),
            sequence in samples(),
        ) {
            let rule = TuningRule::ZieglerNichols { critical_gain, critical_period };
            let mut pid = make_tuned(rule, (-5.0, 5.0), anti_windup);
            for (sp, pv) in sequence {
                let out = pid.compute(sp, pv);
                prop_assert!((-5.0..=5.0).contains(&out), "output {out} out of bounds");
            }
        }

        #[test]
        fn zero_error_keeps_positional_output(
            value in -100.0f64..100.0,
            steps in 2usize..50,
        ) {
            let mut pid = PositionalPid::new(make_config());
            pid.compute(value, value);
            let held = pid.compute(value, value);
            for _ in 0..steps {
                prop_assert_eq!(pid.compute(value, value), held);
            }
        }

        #[test]
        fn reset_replays_like_fresh(
            warmup in samples(),
            sequence in samples(),
        ) {
            let with_imc = || {
                let imc: AnyController<f64> = make_tuned(imc_rule(), (-5.0, 5.0), true).into();
                make_all().into_iter().chain([imc])
            };
            for (mut pid, mut fresh) in with_imc().zip(with_imc()) {
                if pid.strategy() == multi_pid::Strategy::Adaptive {
                    continue;
                }
                for &(sp, pv) in &warmup {
                    pid.compute(sp, pv);
                }
                pid.reset();
                for &(sp, pv) in &sequence {
                    prop_assert_eq!(pid.compute(sp, pv), fresh.compute(sp, pv));
                }
            }
        }

        #[test]
        fn fuzzify_is_monotonic(a in -5.0f64..5.0, b in -5.0f64..5.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(Linguistic::fuzzify(lo) <= Linguistic::fuzzify(hi));
        }
    }
}
