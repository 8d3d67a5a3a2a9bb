use foxflow::battery::{BatteryCapacityCalculator, EstimateDirection};
use foxflow::telemetry::BatteryDescriptor;

fn calculator() -> BatteryCapacityCalculator {
    BatteryCapacityCalculator::new(10_000, 0.2)
}

#[test]
fn near_zero_power_never_estimates() {
    let c = calculator();
    for power in [0.0, 1e-10, -1e-10, 5e-10] {
        for soc in [0.0, 0.3, 0.5, 0.9] {
            assert!(c.battery_percentage_remaining(power, soc).is_none());
        }
    }
}

#[test]
fn charging_full_battery_never_estimates() {
    let c = calculator();
    for soc in [0.9899, 0.99, 0.995, 1.0] {
        for power in [0.1, 1.0, 5.0] {
            assert!(c.battery_percentage_remaining(power, soc).is_none());
        }
    }
}

#[test]
fn discharging_empty_battery_never_estimates() {
    let c = calculator();
    for soc in [0.0, 0.1, 0.2, 0.203] {
        for power in [-0.1, -1.0, -5.0] {
            assert!(c.battery_percentage_remaining(power, soc).is_none());
        }
    }
}

#[test]
fn full_charge_amount_equals_capacity() {
    assert_eq!(calculator().current_estimated_charge_amount(1.0, true), 10_000.0);
}

#[test]
fn half_full_at_one_kilowatt_takes_five_hours() {
    let estimate = calculator().battery_percentage_remaining(1.0, 0.5).unwrap();
    assert_eq!(estimate.direction, EstimateDirection::ToFull);
    assert_eq!(estimate.minutes, 300);
    assert_eq!(estimate.to_string(), "Full in 5 hours");
}

#[test]
fn estimate_direction_follows_power_sign() {
    let c = calculator();
    for soc in [0.25, 0.5, 0.75, 0.98] {
        for power in [-3.0, -0.5, 0.5, 3.0] {
            if let Some(e) = c.battery_percentage_remaining(power, soc) {
                let expected = if power > 0.0 {
                    EstimateDirection::ToFull
                } else {
                    EstimateDirection::ToEmpty
                };
                assert_eq!(e.direction, expected);
            }
        }
    }
}

#[test]
fn descriptor_builds_same_calculator() {
    let descriptor = BatteryDescriptor {
        capacity_wh: 10_000,
        min_soc: 0.2,
    };
    assert_eq!(
        BatteryCapacityCalculator::from_descriptor(&descriptor),
        calculator()
    );
}
