//! EnvLogger firmware library.
//!
//! Every task loop and domain rule lives here so it can be tested on the
//! host. ESP-IDF specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module, with a simulation fallback beside it.
//!
//! ```text
//!  acquisition ──publish──▶ telemetry channel ──take──▶ forwarder ─▶ CloudMirror
//!                                │
//!                                ├──peek──▶ alert monitor ─▶ annunciator, NotificationSink
//!                                └──peek──▶ display observer ─▶ DisplayPort
//! ```

#![deny(unused_must_use)]

pub mod acquisition;
pub mod adapters;
pub mod alert;
pub mod app;
pub mod config;
pub mod display;
pub mod drivers;
pub mod error;
pub mod forwarder;
pub mod pins;
pub mod scheduler;
pub mod sensors;
pub mod shared;
pub mod telemetry;
