use super::*;

impl Default for PowerFlowConfig {
    fn default() -> Self {
        Self {
            should_invert_ct2: false,
            should_combine_ct2_with_pv_power: true,
            should_combine_ct2_with_loads_power: false,
            allow_negative_load: false,
            strings: PowerFlowStringsConfig::default(),
        }
    }
}

impl Default for PowerFlowStringsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strings: (1..=4)
                .map(|n| StringSetting {
                    variable: format!("pv{}Power", n),
                    name: format!("PV{}", n),
                    enabled: true,
                })
                .collect(),
        }
    }
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_wh: None,
            min_soc: None,
            include_unusable_capacity: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            unit: DisplayUnit::default(),
            decimal_places: 2,
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/foxflow.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}
