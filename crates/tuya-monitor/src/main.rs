//! Tuya water-quality monitor.
//!
//! Connects to a water-quality probe through a TCP-bridged UART (or an
//! in-process simulated probe), programs the alarm thresholds, and logs every
//! reading until interrupted.

mod config;
mod error;
mod sim;
mod tcp;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tuya_mcu_protocol::{LoopbackTransport, NetworkStatus};
use tuya_water_quality::{SensorData, SensorValue, WaterQualityMonitor};

use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::sim::SimulatedProbe;
use crate::tcp::TcpTransport;

#[derive(Parser, Debug)]
#[command(name = "tuya-monitor", version, about = "Monitor a Tuya water-quality probe")]
struct Cli {
    /// UART bridge to connect to
    #[arg(long, value_name = "HOST:PORT")]
    connect: Option<String>,

    /// YAML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Echo link traffic to stderr
    #[arg(long)]
    debug: bool,

    /// High temperature alarm in °C
    #[arg(long)]
    max_temp: Option<f64>,

    /// Low temperature alarm in °C
    #[arg(long)]
    min_temp: Option<f64>,

    /// High pH alarm
    #[arg(long)]
    max_ph: Option<f64>,

    /// Low pH alarm
    #[arg(long)]
    min_ph: Option<f64>,

    /// High TDS alarm in ppm
    #[arg(long)]
    max_tds: Option<i32>,

    /// Low TDS alarm in ppm
    #[arg(long)]
    min_tds: Option<i32>,

    /// Sleep between polls
    #[arg(long, value_name = "MS")]
    poll_delay_ms: Option<u64>,

    /// Give up on a frame whose remaining bytes stall this long
    #[arg(long, value_name = "MS")]
    frame_timeout_ms: Option<u64>,

    /// Run against a simulated probe instead of a real link
    #[arg(long)]
    simulate: bool,

    /// Seed for the simulated probe
    #[arg(long, default_value_t = 0x5EED)]
    seed: u64,
}

impl Cli {
    /// Flags take precedence over the config file.
    fn apply_to(&self, config: &mut MonitorConfig) {
        if let Some(addr) = &self.connect {
            config.connect = Some(addr.clone());
        }
        if let Some(ms) = self.poll_delay_ms {
            config.session.poll_delay_ms = ms;
        }
        if let Some(ms) = self.frame_timeout_ms {
            config.frame_timeout_ms = ms;
        }
        let t = &mut config.thresholds;
        t.max_temperature = self.max_temp.or(t.max_temperature);
        t.min_temperature = self.min_temp.or(t.min_temperature);
        t.max_ph = self.max_ph.or(t.max_ph);
        t.min_ph = self.min_ph.or(t.min_ph);
        t.max_tds = self.max_tds.or(t.max_tds);
        t.min_tds = self.min_tds.or(t.min_tds);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MonitorError> {
    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    cli.apply_to(&mut config);
    tuya_mcu_session::describe_metrics();

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let mut monitor = WaterQualityMonitor::with_config(config.session.clone());
    if cli.debug {
        monitor.session_mut().enable_debug(std::io::stderr());
    }
    monitor.on_sensor_data(log_snapshot);
    monitor.on_reset_pairing_mode(|| warn!("probe requested a Wi-Fi pairing reset"));

    let mut probe = if cli.simulate {
        let (module, mcu) = LoopbackTransport::pair();
        monitor.attach(module);
        info!("running against a simulated probe (seed {:#x})", cli.seed);
        Some(SimulatedProbe::new(mcu, cli.seed))
    } else {
        let addr = config.connect.clone().ok_or(MonitorError::NoEndpoint)?;
        let frame_timeout = Duration::from_millis(config.frame_timeout_ms);
        let transport = TcpTransport::connect(&addr, frame_timeout).map_err(|source| MonitorError::Connect {
            addr: addr.clone(),
            source,
        })?;
        info!("connected to UART bridge at {}", addr);
        monitor.attach(transport);
        None
    };

    let summary_interval = Duration::from_secs(config.summary_interval_secs.max(1));
    let mut last_summary = Instant::now();
    let mut configured = false;

    while running.load(Ordering::SeqCst) {
        if let Some(probe) = probe.as_mut() {
            probe.step();
        }
        monitor.poll();

        if !configured && monitor.session().is_initialized() {
            configured = true;
            monitor
                .session_mut()
                .set_network_status(NetworkStatus::CloudConnected)?;
            if !config.thresholds.is_empty() {
                info!("programming thresholds: {:?}", config.thresholds);
                config.thresholds.program(&mut monitor)?;
            }
            monitor.query_status()?;
        }

        if last_summary.elapsed() >= summary_interval {
            last_summary = Instant::now();
            print_summary(&monitor);
        }
    }

    if let Some(probe) = &probe {
        debug!("simulated probe stopped with {} frames queued", probe.pending());
    }
    let stats = monitor.session().link_stats();
    info!(
        "stopped; link stats: {}",
        serde_json::to_string(&stats).unwrap_or_else(|_| format!("{:?}", stats))
    );
    Ok(())
}

fn log_snapshot(data: &SensorData) {
    let now = chrono::Local::now().format("%H:%M:%S%.3f");
    info!(
        "[{}] temp {:.1} °C ({:.1}..{:.1}), pH {:.2} ({:.2}..{:.2}), TDS {:.0} ppm ({:.0}..{:.0})",
        now,
        data.temperature.value,
        data.temperature.min_threshold,
        data.temperature.max_threshold,
        data.ph.value,
        data.ph.min_threshold,
        data.ph.max_threshold,
        data.tds.value,
        data.tds.min_threshold,
        data.tds.max_threshold,
    );
}

fn alarm(value: &SensorValue) -> &'static str {
    if value.out_of_range() {
        "  ALARM"
    } else {
        ""
    }
}

fn print_summary(monitor: &WaterQualityMonitor) {
    let session = monitor.session();
    let data = monitor.sensor_data();
    println!("--- Water quality ({}) ---", session.handshake_state());
    println!(
        "Temperature: {:.1} C (min: {:.1}, max: {:.1}){}",
        monitor.temperature(),
        monitor.min_temperature(),
        monitor.max_temperature(),
        alarm(&data.temperature)
    );
    println!(
        "pH: {:.2} (min: {:.2}, max: {:.2}){}",
        monitor.ph(),
        monitor.min_ph(),
        monitor.max_ph(),
        alarm(&data.ph)
    );
    println!(
        "TDS: {} (min: {}, max: {}){}",
        monitor.tds(),
        monitor.min_tds(),
        monitor.max_tds(),
        alarm(&data.tds)
    );
    let stats = session.link_stats();
    println!(
        "Link: {} frames in, {} out, {} errors",
        stats.frames_received,
        stats.frames_sent,
        stats.receive_errors() + stats.decode_failures
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "tuya-monitor",
            "--connect",
            "10.0.0.5:4000",
            "--max-temp",
            "29.5",
            "--min-tds",
            "80",
            "--poll-delay-ms",
            "20",
            "--frame-timeout-ms",
            "250",
        ]);
        let mut config = MonitorConfig::default();
        config.thresholds.max_temperature = Some(31.0);
        config.thresholds.max_ph = Some(8.2);
        cli.apply_to(&mut config);

        assert_eq!(config.connect.as_deref(), Some("10.0.0.5:4000"));
        assert_eq!(config.session.poll_delay_ms, 20);
        assert_eq!(config.frame_timeout_ms, 250);
        assert_eq!(config.thresholds.max_temperature, Some(29.5));
        assert_eq!(config.thresholds.max_ph, Some(8.2));
        assert_eq!(config.thresholds.min_tds, Some(80));
        assert!(!cli.simulate);
    }
}
