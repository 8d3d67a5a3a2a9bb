use foxflow::battery::{BatteryCapacityEstimate, EstimateDirection};
use foxflow::config::DisplayConfig;
use foxflow::format::{DisplayUnit, format_energy, format_power, summary_lines};
use foxflow::status::{BatteryStatus, DerivedCurrentValues, StringPower};

fn values() -> DerivedCurrentValues {
    DerivedCurrentValues {
        grid_flow: -0.8,
        home_consumption: 1.3,
        solar_power: 2.5,
        ..Default::default()
    }
}

#[test]
fn summary_reports_flows_in_kilowatts() {
    let lines = summary_lines(&values(), &DisplayConfig::default());
    assert_eq!(
        lines,
        ["Solar: 2.50 kW", "Home: 1.30 kW", "Grid: importing 0.80 kW"]
    );
}

#[test]
fn summary_lists_strings_and_battery() {
    let mut values = values();
    values.grid_flow = 0.4;
    values.solar_string_powers = vec![StringPower {
        name: "Roof".to_string(),
        power: 1.25,
    }];
    values.battery = Some(BatteryStatus {
        charge_power: 1.0,
        state_of_charge: 0.5,
        effective_state_of_charge: 0.5,
        charge_amount_wh: Some(5000.0),
        temperature: None,
        residual_energy_wh: None,
        estimate: Some(BatteryCapacityEstimate {
            direction: EstimateDirection::ToFull,
            minutes: 300,
        }),
    });

    let lines = summary_lines(&values, &DisplayConfig::default());
    assert_eq!(lines[1], "  Roof: 1.25 kW");
    assert_eq!(lines[3], "Grid: exporting 0.40 kW");
    assert_eq!(
        lines[4],
        "Battery: 50% (5.00 kWh), charging 1.00 kW, Full in 5 hours"
    );
}

#[test]
fn adaptive_unit_switches_below_one_kilo_unit() {
    assert_eq!(format_power(0.45, DisplayUnit::Adaptive, 2), "450 W");
    assert_eq!(format_power(1.5, DisplayUnit::Adaptive, 1), "1.5 kW");
    assert_eq!(format_energy(0.25, DisplayUnit::Adaptive, 2), "250 Wh");
    assert_eq!(format_energy(12.0, DisplayUnit::Watts, 2), "12000 Wh");
}

#[test]
fn negative_zero_is_rendered_as_zero() {
    assert_eq!(format_power(-0.001, DisplayUnit::Kilowatts, 2), "0.00 kW");
}
