//! Property-based tests for the signal controller.
//!
//! These tests use proptest to drive the controller through random tick
//! counts, press patterns and timings, and check the lamp invariants after
//! every step.

use proptest::prelude::*;
use rs_crossing::hal::MockLamps;
use rs_crossing::{ButtonColor, CommandSource, Phase, SignalController, TimingConfig};

fn check_invariants(controller: &SignalController<MockLamps>) -> Result<(), TestCaseError> {
    let phase = controller.phase();
    let lamps = controller.indicators();
    let timing = controller.timing();

    prop_assert!(!(lamps.vehicle_green && lamps.pedestrian_green));
    prop_assert!(!(lamps.pedestrian_red && lamps.pedestrian_green));
    if lamps.vehicle_green {
        prop_assert!(lamps.pedestrian_red);
    }
    if lamps.pedestrian_green {
        prop_assert!(lamps.vehicle_red);
    }
    if lamps.button == ButtonColor::Acknowledged {
        prop_assert_eq!(phase, Phase::VehicleGreen);
    }

    let longest = timing
        .duration_ms(phase, true)
        .max(timing.duration_ms(phase, false));
    prop_assert!(controller.remaining_ms() <= longest);
    prop_assert_eq!(controller.tick_interval_ms(), timing.interval_ms(phase));
    prop_assert_eq!(controller.output().current, lamps);
    Ok(())
}

prop_compose! {
    fn arbitrary_timing()(
        off in 0..5u32,
        first_red in 1..20u32,
        red in 1..20u32,
        green in 2..20u32,
    ) -> TimingConfig {
        TimingConfig::default()
            .with_off_ms(off * 1000)
            .with_first_red_ms(first_red * 1000)
            .with_red_ms(red * 1000)
            .with_green_ms(green * 1000)
    }
}

proptest! {
    #[test]
    fn lamps_stay_consistent(ticks in 0..400usize) {
        let mut controller = SignalController::new(MockLamps::new());
        check_invariants(&controller)?;
        for _ in 0..ticks {
            controller.tick().unwrap();
            check_invariants(&controller)?;
        }
    }

    #[test]
    fn random_presses_keep_invariants(
        presses in prop::collection::vec(any::<bool>(), 1..300)
    ) {
        let mut controller = SignalController::new(MockLamps::new());
        let mut left_off = false;

        for press in presses {
            if press {
                let outcome = controller.request_wait(CommandSource::Button);
                prop_assert_eq!(outcome.is_accepted(), controller.phase() == Phase::VehicleGreen);
            }
            controller.tick().unwrap();
            check_invariants(&controller)?;

            if controller.phase() != Phase::Off {
                left_off = true;
            }
            if left_off {
                prop_assert_ne!(controller.phase(), Phase::Off);
            }
        }
    }

    #[test]
    fn press_ends_green_within_extension(
        before in 0..8usize,
        repeats in 1..4usize,
    ) {
        let mut controller = SignalController::new(MockLamps::new());
        while controller.phase() != Phase::VehicleGreen {
            controller.tick().unwrap();
        }
        for _ in 0..before {
            controller.tick().unwrap();
        }
        prop_assert_eq!(controller.phase(), Phase::VehicleGreen);

        for _ in 0..repeats {
            controller.request_wait(CommandSource::Button);
        }
        controller.tick().unwrap();
        prop_assert_eq!(controller.remaining_ms(), 2000);

        controller.tick().unwrap();
        prop_assert_eq!(controller.phase(), Phase::VehicleGreen);
        controller.tick().unwrap();
        prop_assert_eq!(controller.phase(), Phase::PedestrianBlinkEnd);
    }

    #[test]
    fn measured_cycles_match_timing(timing in arbitrary_timing()) {
        let mut controller = SignalController::with_timing(MockLamps::new(), timing).unwrap();
        while controller.phase() != Phase::VehicleRed {
            controller.tick().unwrap();
        }

        for first_cycle in [true, false, false] {
            let mut elapsed = 0;
            let mut left_red = false;
            loop {
                elapsed += controller.tick_interval_ms();
                controller.tick().unwrap();
                check_invariants(&controller)?;
                match controller.phase() {
                    Phase::VehicleRed if left_red => break,
                    Phase::VehicleRed => {}
                    _ => left_red = true,
                }
            }
            prop_assert_eq!(elapsed, timing.cycle_length_ms(first_cycle));
        }
    }
}
