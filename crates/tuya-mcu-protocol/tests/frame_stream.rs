//! Stream-level tests for frame decoding over a transport.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tuya_mcu_protocol::{
    Command, Datapoint, DeviceType, Frame, FrameReader, LoopbackTransport, ProtocolError,
    Transport, MAX_PAYLOAD_LEN,
};

fn report_frame() -> Frame {
    let payload = Datapoint::value(0x08, 200).encode();
    Frame::new(DeviceType::Mcu, Command::ReportStatusSync, &payload).unwrap()
}

#[test]
fn test_scenario_wire_bytes() {
    let bytes = report_frame().to_bytes();
    assert_eq!(
        bytes,
        vec![0x55, 0xAA, 0x03, 0x22, 0x00, 0x08, 0x08, 0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0xC8, 0x02]
    );
}

#[test]
fn test_garbage_before_frame_is_skipped() {
    let (mut module, mut mcu) = LoopbackTransport::pair();
    mcu.write_all(&[0x00, 0x13, 0x55, 0x37, 0xAA, 0x55]).unwrap();
    mcu.write_all(&report_frame().to_bytes()).unwrap();

    let frame = FrameReader::default().read(&mut module).unwrap();
    assert_eq!(frame, Some(report_frame()));
}

#[test]
fn test_overflow_does_not_over_read() {
    let (mut module, mut mcu) = LoopbackTransport::pair();
    let declared = (MAX_PAYLOAD_LEN + 1) as u16;
    let [hi, lo] = declared.to_be_bytes();
    mcu.write_all(&[0x55, 0xAA, 0x03, 0x07, hi, lo]).unwrap();
    mcu.write_all(&[0xEE; 16]).unwrap();

    let result = FrameReader::default().read(&mut module);
    assert_eq!(
        result,
        Err(ProtocolError::Overflow {
            max: MAX_PAYLOAD_LEN,
            declared: MAX_PAYLOAD_LEN + 1,
        })
    );
    assert_eq!(module.available(), 0);

    // The link is usable again straight away
    mcu.write_all(&report_frame().to_bytes()).unwrap();
    assert_eq!(
        FrameReader::default().read(&mut module),
        Ok(Some(report_frame()))
    );
}

#[test]
fn test_maximum_payload_accepted() {
    let (mut module, mut mcu) = LoopbackTransport::pair();
    let payload = vec![0x5A; MAX_PAYLOAD_LEN];
    let frame = Frame::new(DeviceType::Mcu, Command::SendWeatherData, &payload).unwrap();
    mcu.write_all(&frame.to_bytes()).unwrap();

    assert_eq!(FrameReader::default().read(&mut module), Ok(Some(frame)));
}

#[test]
fn test_empty_link_is_no_data() {
    let (mut module, _mcu) = LoopbackTransport::pair();
    assert_eq!(FrameReader::default().read(&mut module), Ok(None));
}

#[test]
fn test_checksum_mismatch_discards_input() {
    let (mut module, mut mcu) = LoopbackTransport::pair();
    let mut bytes = report_frame().to_bytes();
    let last = bytes.len() - 1;
    bytes[last] = bytes[last].wrapping_add(1);
    mcu.write_all(&bytes).unwrap();
    mcu.write_all(&report_frame().to_bytes()).unwrap();

    assert!(matches!(
        FrameReader::default().read(&mut module),
        Err(ProtocolError::Checksum { .. })
    ));
    assert_eq!(module.available(), 0);
}

#[test]
fn test_single_bit_corruption_is_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x55AA);
    let sent = report_frame();
    let clean = sent.to_bytes();
    let checksum_index = clean.len() - 1;

    for _ in 0..500 {
        let index = rng.gen_range(0..checksum_index);
        let bit = 1u8 << rng.gen_range(0..8);
        let mut corrupted = clean.clone();
        corrupted[index] ^= bit;

        let (mut module, mut mcu) = LoopbackTransport::pair();
        mcu.write_all(&corrupted).unwrap();
        let result = FrameReader::default().read(&mut module);

        match index {
            // version, command and payload bytes are covered by the checksum
            2 | 3 | 6.. => assert!(
                matches!(result, Err(ProtocolError::Checksum { .. })),
                "flip at byte {} bit {:#04x} gave {:?}",
                index,
                bit,
                result
            ),
            // header and length flips lose sync or misframe, but never
            // reproduce the sent frame
            _ => assert_ne!(
                result,
                Ok(Some(sent.clone())),
                "flip at byte {} bit {:#04x} was accepted",
                index,
                bit
            ),
        }
    }
}

#[test]
fn test_random_frames_survive_the_link() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0307);
    let mut lengths = vec![0, 1, MAX_PAYLOAD_LEN - 1, MAX_PAYLOAD_LEN];
    lengths.extend((0..60).map(|_| rng.gen_range(0..=MAX_PAYLOAD_LEN)));

    for len in lengths {
        let mut payload = vec![0u8; len];
        rng.fill(&mut payload[..]);
        let frame = Frame::from_parts(rng.gen(), rng.gen(), payload).unwrap();

        let (mut module, mut mcu) = LoopbackTransport::pair();
        mcu.write_all(&frame.to_bytes()).unwrap();
        let received = FrameReader::default().read(&mut module);

        assert_eq!(received, Ok(Some(frame.clone())), "payload length {}", len);
        assert_eq!(module.available(), 0);
    }
}
