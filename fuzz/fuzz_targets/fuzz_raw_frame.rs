//! Fuzz target: `RawFrame::into_reading`
//!
//! Feeds arbitrary 5-byte frames to frame validation and checks that a
//! frame is accepted only with a matching checksum and an in-envelope
//! reading.
//!
//! cargo fuzz run fuzz_raw_frame

#![no_main]

use envlogger::error::DecodeError;
use envlogger::sensors::dht11::RawFrame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(bytes) = <[u8; 5]>::try_from(data.get(..5).unwrap_or_default()) else {
        return;
    };
    let frame = RawFrame::from_bytes(bytes);

    match frame.into_reading() {
        Ok(reading) => {
            assert!(frame.checksum_ok(), "accepted a frame with a bad checksum");
            assert!((0.0..=100.0).contains(&reading.humidity));
            assert!((-40.0..=80.0).contains(&reading.temperature));
        }
        Err(DecodeError::ChecksumMismatch) => assert!(!frame.checksum_ok()),
        Err(DecodeError::OutOfRange) => assert!(frame.checksum_ok()),
        Err(other) => panic!("frame validation returned {other:?}"),
    }
});
