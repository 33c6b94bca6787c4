//! Integration tests for the signal controller

use rs_crossing::{
    hal::MockLamps, ButtonColor, CommandOutcome, CommandSource, Indicator, IndicatorValue,
    Indicators, Phase, RejectReason, SignalController,
};

fn controller() -> SignalController<MockLamps> {
    SignalController::new(MockLamps::new())
}

fn tick_n(controller: &mut SignalController<MockLamps>, n: usize) {
    for _ in 0..n {
        controller.tick().unwrap();
    }
}

fn run_until(controller: &mut SignalController<MockLamps>, phase: Phase) {
    let mut guard = 0;
    while controller.phase() != phase {
        controller.tick().unwrap();
        guard += 1;
        assert!(guard < 200, "never reached {phase:?}");
    }
}

/// Time spent from one entry into `VehicleRed` to the next.
fn cycle_ms(controller: &mut SignalController<MockLamps>) -> u32 {
    assert_eq!(controller.phase(), Phase::VehicleRed);
    let mut total = 0;
    let mut left_red = false;
    loop {
        total += controller.tick_interval_ms();
        controller.tick().unwrap();
        match controller.phase() {
            Phase::VehicleRed if left_red => return total,
            Phase::VehicleRed => {}
            _ => left_red = true,
        }
    }
}

// ============================================================================
// Cycle Timing
// ============================================================================

#[test]
fn cycle_lengths_first_and_later() {
    let mut controller = controller();
    run_until(&mut controller, Phase::VehicleRed);

    assert_eq!(cycle_ms(&mut controller), 24_000);
    assert_eq!(cycle_ms(&mut controller), 22_000);
    assert_eq!(cycle_ms(&mut controller), 22_000);
}

#[test]
fn phase_sequence_is_fixed() {
    let mut controller = controller();
    let mut seen = vec![controller.phase()];
    for _ in 0..200 {
        controller.tick().unwrap();
        if seen.last() != Some(&controller.phase()) {
            seen.push(controller.phase());
        }
    }

    assert_eq!(seen[0], Phase::Off);
    for pair in seen.windows(2) {
        assert_eq!(pair[0].next(), pair[1]);
    }
    assert_eq!(seen.iter().filter(|p| **p == Phase::Off).count(), 1);
}

#[test]
fn three_ticks_reach_vehicle_red() {
    let mut controller = controller();
    tick_n(&mut controller, 3);

    assert_eq!(controller.phase(), Phase::VehicleRed);
    let lamps = controller.indicators();
    assert!(lamps.vehicle_red);
    assert!(lamps.pedestrian_green);
    assert!(!lamps.pedestrian_red);
    assert_eq!(controller.output().current, lamps);
}

#[test]
fn vehicle_red_holds_for_ten_ticks() {
    let mut controller = controller();
    tick_n(&mut controller, 3);

    for _ in 0..9 {
        controller.tick().unwrap();
        assert_eq!(controller.phase(), Phase::VehicleRed);
        let lamps = controller.output().current;
        assert!(lamps.vehicle_red);
        assert!(lamps.pedestrian_green);
        assert!(!lamps.pedestrian_red);
    }

    controller.tick().unwrap();
    assert_eq!(controller.phase(), Phase::PedestrianBlinkWarning);
    assert!(controller.output().current.vehicle_red);
    // Blink warning starts with pedestrian green still lit
    assert!(controller.output().current.pedestrian_green);
}

// ============================================================================
// Blinking
// ============================================================================

#[test]
fn blink_warning_toggles_then_stops_pedestrians() {
    let mut controller = controller();
    run_until(&mut controller, Phase::PedestrianBlinkWarning);
    assert_eq!(controller.tick_interval_ms(), 500);

    controller.tick().unwrap();
    assert_eq!(controller.phase(), Phase::PedestrianBlinkWarning);
    assert!(!controller.output().current.pedestrian_green);

    controller.tick().unwrap();
    assert_eq!(controller.phase(), Phase::VehicleRedYellow);
    let lamps = controller.output().current;
    assert!(lamps.pedestrian_red);
    assert!(!lamps.pedestrian_green);
    assert!(lamps.vehicle_red && lamps.vehicle_yellow);
    assert_eq!(controller.tick_interval_ms(), 1000);
}

#[test]
fn blink_end_flashes_vehicle_green() {
    let mut controller = controller();
    run_until(&mut controller, Phase::PedestrianBlinkEnd);

    let mut green = vec![controller.output().current.vehicle_green];
    for _ in 0..3 {
        controller.tick().unwrap();
        assert_eq!(controller.phase(), Phase::PedestrianBlinkEnd);
        green.push(controller.output().current.vehicle_green);
    }
    assert_eq!(green, vec![true, false, true, false]);

    controller.tick().unwrap();
    assert_eq!(controller.phase(), Phase::VehicleYellow);
    assert_eq!(
        controller.output().current,
        Indicators::for_phase(Phase::VehicleYellow, false)
    );
}

// ============================================================================
// Wait Requests
// ============================================================================

#[test]
fn wait_during_green_scenario() {
    let mut controller = controller();
    run_until(&mut controller, Phase::VehicleGreen);
    assert_eq!(controller.remaining_ms(), 8000);

    tick_n(&mut controller, 5);
    assert_eq!(controller.remaining_ms(), 3000);

    assert_eq!(
        controller.request_wait(CommandSource::Button),
        CommandOutcome::Accepted
    );
    controller.tick().unwrap();
    assert_eq!(controller.remaining_ms(), 2000);
    assert_eq!(controller.output().current.button, ButtonColor::Acknowledged);

    tick_n(&mut controller, 2);
    assert_eq!(controller.phase(), Phase::PedestrianBlinkEnd);
    assert_eq!(controller.output().current.button, ButtonColor::Inert);
}

#[test]
fn double_wait_is_not_cumulative() {
    let mut once = controller();
    let mut twice = controller();
    run_until(&mut once, Phase::VehicleGreen);
    run_until(&mut twice, Phase::VehicleGreen);

    once.request_wait(CommandSource::Button);
    twice.request_wait(CommandSource::Button);
    twice.request_wait(CommandSource::WebApi);

    once.tick().unwrap();
    twice.tick().unwrap();

    assert_eq!(twice.remaining_ms(), 2000);
    assert_eq!(once.state(), twice.state());
}

#[test]
fn wait_outside_green_changes_nothing() {
    let mut controller = controller();
    for _ in 0..40 {
        if controller.phase() != Phase::VehicleGreen {
            let before = controller.state();
            assert_eq!(
                controller.request_wait(CommandSource::Mqtt),
                CommandOutcome::Ignored(RejectReason::NotVehicleGreen)
            );
            let after = controller.state();
            assert_eq!(before.phase, after.phase);
            assert_eq!(before.remaining_ms, after.remaining_ms);
            assert_eq!(before.indicators.button, after.indicators.button);
            assert!(!after.wait_pending);
        }
        controller.tick().unwrap();
    }
}

#[test]
fn ignored_wait_does_not_spoil_a_later_press() {
    let mut controller = controller();
    run_until(&mut controller, Phase::VehicleRedYellow);
    controller.request_wait(CommandSource::Button);

    run_until(&mut controller, Phase::VehicleGreen);
    controller.tick().unwrap();
    // No stale request shortened the green
    assert_eq!(controller.remaining_ms(), 7000);
    assert_eq!(controller.indicators().button, ButtonColor::Inert);

    assert!(controller.request_wait(CommandSource::Button).is_accepted());
    controller.tick().unwrap();
    assert_eq!(controller.remaining_ms(), 2000);
}

#[test]
fn can_request_wait_only_in_green() {
    let mut controller = controller();
    for _ in 0..60 {
        assert_eq!(
            controller.can_request_wait(),
            controller.phase() == Phase::VehicleGreen
        );
        controller.tick().unwrap();
    }
}

#[test]
fn button_change_is_published_once() {
    let mut controller = controller();
    run_until(&mut controller, Phase::VehicleGreen);
    controller.output_mut().clear();

    controller.request_wait(CommandSource::Button);
    controller.tick().unwrap();
    controller.tick().unwrap();

    let button_changes: Vec<_> = controller
        .output()
        .changes
        .iter()
        .filter(|c| c.indicator == Indicator::CrossingButton)
        .collect();
    assert_eq!(button_changes.len(), 1);
    assert_eq!(
        button_changes[0].value,
        IndicatorValue::Color(ButtonColor::Acknowledged)
    );
}
