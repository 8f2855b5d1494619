//! Sensor reports and threshold commands over a loopback link.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use approx::assert_relative_eq;
use parking_lot::Mutex;
use tuya_mcu_protocol::{
    Command, Datapoint, DeviceType, Frame, FrameCodec, LoopbackTransport, ProtocolError, Transport,
};
use tuya_mcu_session::{ManualClock, SessionConfig, SessionError};
use tuya_water_quality::{SensorData, WaterQualityDp, WaterQualityMonitor};

/// Sync report of temperature 0xC8 (20.0 °C), as sent by the probe.
const TEMPERATURE_SYNC_REPORT: [u8; 15] = [
    0x55, 0xAA, 0x00, 0x22, 0x00, 0x08, 0x08, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0xC8, 0xFF,
];

fn setup() -> (WaterQualityMonitor, LoopbackTransport) {
    let (module, mut mcu) = LoopbackTransport::pair();
    let mut monitor =
        WaterQualityMonitor::with_config(SessionConfig::immediate()).with_clock(ManualClock::new());
    monitor.attach(module);
    // First poll only sends the opening heartbeat
    monitor.poll();
    mcu.drain();
    (monitor, mcu)
}

fn report(mcu: &mut LoopbackTransport, command: Command, datapoint: &Datapoint) {
    let frame = Frame::new(DeviceType::Mcu, command, &datapoint.encode()).unwrap();
    mcu.write_all(&frame.to_bytes()).unwrap();
}

fn sent_frames(mcu: &mut LoopbackTransport) -> Vec<Frame> {
    let mut codec = FrameCodec::new();
    codec.push(&mcu.drain());
    codec.decode_all()
}

/// Forward every `SendCommand` the module sent back as a status report, the
/// way the probe confirms a new setting.
fn echo_commands(mcu: &mut LoopbackTransport) -> usize {
    let commands: Vec<Frame> = sent_frames(mcu)
        .into_iter()
        .filter(|f| f.command() == Command::SendCommand)
        .collect();
    for command in &commands {
        let echo = Frame::new(DeviceType::Mcu, Command::ReportStatusAsync, command.payload()).unwrap();
        mcu.write_all(&echo.to_bytes()).unwrap();
    }
    commands.len()
}

fn counting_callback(monitor: &mut WaterQualityMonitor) -> (Arc<AtomicUsize>, Arc<Mutex<Option<SensorData>>>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let last = Arc::new(Mutex::new(None));
    let (c, l) = (calls.clone(), last.clone());
    monitor.on_sensor_data(move |data| {
        c.fetch_add(1, Ordering::SeqCst);
        *l.lock() = Some(*data);
    });
    (calls, last)
}

#[test]
fn test_sync_temperature_report() {
    let (mut monitor, mut mcu) = setup();
    let (calls, last) = counting_callback(&mut monitor);

    mcu.write_all(&TEMPERATURE_SYNC_REPORT).unwrap();
    monitor.poll();

    assert_relative_eq!(monitor.temperature(), 20.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let snapshot = last.lock().expect("callback received a snapshot");
    assert_relative_eq!(snapshot.temperature.value, 20.0);

    let replies = sent_frames(&mut mcu);
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].command(), Command::ResponseStatusSync);
    assert_eq!(replies[0].payload(), &[0x01]);
}

#[test]
fn test_async_temperature_report() {
    let (mut monitor, mut mcu) = setup();
    let (calls, _) = counting_callback(&mut monitor);

    let payload = TEMPERATURE_SYNC_REPORT[6..14].to_vec();
    let frame = Frame::from_parts(0x00, 0x07, payload).unwrap();
    mcu.write_all(&frame.to_bytes()).unwrap();
    monitor.poll();

    assert_relative_eq!(monitor.temperature(), 20.0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sent_frames(&mut mcu).is_empty());
}

#[test]
fn test_temperature_threshold_round_trip() {
    let (mut monitor, mut mcu) = setup();

    monitor.set_max_temperature(23.4).unwrap();
    let frames = sent_frames(&mut mcu);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].device_type(), DeviceType::Module);
    assert_eq!(frames[0].command(), Command::SendCommand);
    assert_eq!(
        frames[0].payload(),
        &[0x66, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0xEA]
    );

    // Nothing is stored until the probe confirms
    assert_eq!(monitor.max_temperature(), 0.0);

    let echo = Frame::new(DeviceType::Mcu, Command::ReportStatusAsync, frames[0].payload()).unwrap();
    mcu.write_all(&echo.to_bytes()).unwrap();
    monitor.poll();
    assert_relative_eq!(monitor.max_temperature(), 23.4, epsilon = 1e-9);
}

#[test]
fn test_ph_and_tds_thresholds_round_trip() {
    let (mut monitor, mut mcu) = setup();

    monitor.set_min_ph(7.25).unwrap();
    assert_eq!(echo_commands(&mut mcu), 1);
    monitor.poll();
    assert_relative_eq!(monitor.min_ph(), 7.25, epsilon = 1e-9);

    monitor.set_max_ph(8.1).unwrap();
    assert_eq!(echo_commands(&mut mcu), 1);
    monitor.poll();
    assert_relative_eq!(monitor.max_ph(), 8.1, epsilon = 1e-9);

    monitor.set_max_tds(1200).unwrap();
    assert_eq!(echo_commands(&mut mcu), 1);
    monitor.poll();
    assert_eq!(monitor.max_tds(), 1200);

    monitor.set_min_tds(50).unwrap();
    monitor.set_min_temperature(18.0).unwrap();
    let payloads: Vec<Vec<u8>> = sent_frames(&mut mcu)
        .iter()
        .map(|f| f.payload().to_vec())
        .collect();
    assert_eq!(
        payloads,
        vec![
            Datapoint::value(0x71, 50).encode(),
            Datapoint::value(0x67, 180).encode(),
        ]
    );
}

#[test]
fn test_every_datapoint_lands_in_its_field() {
    let (mut monitor, mut mcu) = setup();
    let raws = [245, 300, 180, 712, 850, 650, 312, 1000, 20];
    for (dp, raw) in WaterQualityDp::ALL.into_iter().zip(raws) {
        report(&mut mcu, Command::ReportStatusAsync, &Datapoint::value(dp.id(), raw));
        monitor.poll();
    }

    assert_relative_eq!(monitor.temperature(), 24.5);
    assert_relative_eq!(monitor.max_temperature(), 30.0);
    assert_relative_eq!(monitor.min_temperature(), 18.0);
    assert_relative_eq!(monitor.ph(), 7.12, epsilon = 1e-9);
    assert_relative_eq!(monitor.max_ph(), 8.5);
    assert_relative_eq!(monitor.min_ph(), 6.5);
    assert_eq!(monitor.tds(), 312);
    assert_eq!(monitor.max_tds(), 1000);
    assert_eq!(monitor.min_tds(), 20);
}

#[test]
fn test_unknown_datapoint_rejected() {
    let (mut monitor, mut mcu) = setup();
    let (calls, _) = counting_callback(&mut monitor);

    report(&mut mcu, Command::ReportStatusSync, &Datapoint::value(0x09, 200));
    monitor.poll();

    assert_eq!(monitor.sensor_data(), &SensorData::default());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(monitor.session().link_stats().decode_failures, 1);
    assert_eq!(sent_frames(&mut mcu)[0].payload(), &[0x00]);
}

#[test]
fn test_wrong_type_rejected() {
    let (mut monitor, mut mcu) = setup();
    let (calls, _) = counting_callback(&mut monitor);

    report(&mut mcu, Command::ReportStatusAsync, &Datapoint::enumeration(0x08, 3));
    monitor.poll();

    assert_eq!(monitor.temperature(), 0.0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_negative_temperature() {
    let (mut monitor, mut mcu) = setup();
    report(&mut mcu, Command::ReportStatusAsync, &Datapoint::value(0x08, -55));
    monitor.poll();
    assert_relative_eq!(monitor.temperature(), -5.5);
}

#[test]
fn test_callback_replaced() {
    let (mut monitor, mut mcu) = setup();
    let (first, _) = counting_callback(&mut monitor);
    let (second, _) = counting_callback(&mut monitor);

    report(&mut mcu, Command::ReportStatusAsync, &Datapoint::value(0x6F, 410));
    monitor.poll();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_query_status_frame() {
    let (mut monitor, mut mcu) = setup();
    monitor.query_status().unwrap();
    assert_eq!(mcu.drain(), vec![0x55, 0xAA, 0x00, 0x08, 0x00, 0x00, 0x07]);
}

#[test]
fn test_commands_need_transport() {
    let mut monitor = WaterQualityMonitor::new().with_clock(ManualClock::new());
    assert!(matches!(monitor.query_status(), Err(SessionError::NoTransport)));
    assert!(matches!(
        monitor.set_max_temperature(25.0),
        Err(SessionError::NoTransport)
    ));
    assert!(matches!(monitor.set_min_tds(10), Err(SessionError::NoTransport)));
}

#[test]
fn test_setter_rejects_wrong_datapoint() {
    let (mut monitor, mut mcu) = setup();
    assert!(matches!(
        monitor.set_scaled_threshold(WaterQualityDp::HighTdsThreshold, 10.0),
        Err(SessionError::Protocol(ProtocolError::InvalidData(_)))
    ));
    assert!(matches!(
        monitor.set_threshold(WaterQualityDp::Temperature, 10),
        Err(SessionError::Protocol(ProtocolError::InvalidData(_)))
    ));
    assert!(mcu.drain().is_empty());
}
