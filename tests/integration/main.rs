//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below exercises the task loops end to end against the mock
//! ports in `mock_hw`. Everything runs on the host with no hardware.

#![cfg(not(target_os = "espidf"))]

mod alert_tests;
mod mock_hw;
mod pipeline_tests;
