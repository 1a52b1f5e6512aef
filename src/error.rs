//! Unified error types for the EnvLogger firmware.
//!
//! Each subsystem has its own small `Copy` error enum; the top-level
//! [`Error`] wraps them so bootstrap code can use `?` uniformly. None of
//! these conditions is fatal to a running task: every consumer recovers
//! locally (retry, stale value, skip the cycle).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The single-wire climate sensor could not be decoded.
    Decode(DecodeError),
    /// Telemetry channel publish/take/peek did not complete.
    Channel(ChannelError),
    /// A threshold update was rejected or could not be applied.
    Config(ConfigError),
    /// An outbound sink (cloud mirror, notification) failed.
    Sink(SinkError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "decode: {e}"),
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Sink(e) => write!(f, "sink: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Single-wire decode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The sensor never acknowledged the start signal.
    NoResponse,
    /// Bit `n` (0..40) did not complete within the per-bit budget.
    BitTimeout(u8),
    /// Byte 4 does not equal the wrapping sum of bytes 0..4.
    ChecksumMismatch,
    /// Checksum passed but the values are outside the sensor envelope.
    OutOfRange,
    /// The GPIO line itself reported an error.
    Bus,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoResponse => write!(f, "no response from sensor"),
            Self::BitTimeout(bit) => write!(f, "timeout on bit {bit}"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Bus => write!(f, "GPIO line error"),
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

// ---------------------------------------------------------------------------
// Telemetry channel errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// Publish found the buffer full; the new sample was dropped.
    Full,
    /// Take/peek found nothing within the timeout.
    Timeout,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "buffer full, sample dropped"),
            Self::Timeout => write!(f, "no sample within timeout"),
        }
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The threshold guard could not be acquired in time.
    LockTimeout,
    /// The proposed configuration failed validation.
    Invalid(&'static str),
    /// A parameter update could not be parsed.
    Malformed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockTimeout => write!(f, "configuration lock timeout"),
            Self::Invalid(why) => write!(f, "invalid configuration: {why}"),
            Self::Malformed => write!(f, "malformed parameter update"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The upstream link is down.
    NotConnected,
    /// The upstream rejected the payload.
    Rejected,
    /// The sink did not accept the payload in time.
    Timeout,
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Rejected => write!(f, "payload rejected"),
            Self::Timeout => write!(f, "sink timeout"),
        }
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}
