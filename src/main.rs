use anyhow::{Context, Result};
use foxflow::config::{Config, ConfigStore};
use foxflow::format::summary_lines;
use foxflow::logging::get_logger;
use foxflow::source::{FileTelemetrySource, TelemetrySource};
use foxflow::status::CurrentStatusCalculator;
use foxflow::telemetry::{DeviceDescriptor, variables};

const USAGE: &str = "usage: foxflow [--no-pv] [--json] <real-time-response.json | ->";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("foxflow {}", env!("APP_VERSION"));
        return Ok(());
    }
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let no_pv = args.iter().any(|a| a == "--no-pv");
    let json = args.iter().any(|a| a == "--json");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .with_context(|| USAGE.to_string())?;

    let config = Config::load().context("Failed to load configuration")?;
    foxflow::logging::init_logging(&config.logging)?;
    let store = ConfigStore::new(config).context("Invalid configuration")?;

    let source = FileTelemetrySource::new(path);
    let snapshot = source
        .fetch_real_time("")
        .await
        .with_context(|| format!("Failed to read telemetry from {}", path))?;

    let device = DeviceDescriptor {
        device_sn: snapshot.device_sn.clone(),
        has_pv: !no_pv,
        has_battery: snapshot.number(variables::STATE_OF_CHARGE).is_some(),
        ..Default::default()
    };
    get_logger("main").info(&format!(
        "Deriving current status for {} ({} variables)",
        device.device_sn,
        snapshot.datas.len()
    ));

    let calculator = CurrentStatusCalculator::new(snapshot, device, store.subscribe());
    let values = calculator.latest();

    if json {
        println!("{}", serde_json::to_string_pretty(values.as_ref())?);
    } else {
        for line in summary_lines(&values, &store.current().display) {
            println!("{}", line);
        }
    }
    Ok(())
}
