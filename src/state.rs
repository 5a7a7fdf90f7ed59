//! Translation of backend result codes into the crate's error model.
//!
//! Every code a backend can report maps onto exactly one [`ResultState`].
//! Codes outside the known range are treated as `ProcessingError`, never as
//! success.

use crate::error::{DensityError, Result};
use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultState {
    Ok = 0,
    InputBufferTooSmall = 1,
    OutputBufferTooSmall = 2,
    ProcessingError = 3,
    InvalidContext = 4,
    InvalidAlgorithm = 5,
}

impl ResultState {
    /// Total mapping from a raw backend code.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ResultState::Ok,
            1 => ResultState::InputBufferTooSmall,
            2 => ResultState::OutputBufferTooSmall,
            3 => ResultState::ProcessingError,
            4 => ResultState::InvalidContext,
            5 => ResultState::InvalidAlgorithm,
            _ => ResultState::ProcessingError,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_ok(self) -> bool {
        self == ResultState::Ok
    }

    pub fn description(self) -> &'static str {
        describe(self.code())
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(DensityError::from_state(self))
        }
    }
}

/// Fixed human-readable description of a raw code. `Ok` and unknown codes
/// have an empty description.
pub fn describe(code: u8) -> &'static str {
    match code {
        1 => "input buffer too small",
        2 => "output buffer too small",
        3 => "error during processing",
        4 => "invalid context",
        5 => "invalid algorithm",
        _ => "",
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultState::Ok => f.write_str("ok"),
            other => f.write_str(other.description()),
        }
    }
}

impl Default for ResultState {
    fn default() -> Self {
        ResultState::Ok
    }
}

/// Exit status of a codec kernel, before translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelStatus {
    Finished,
    InputStall,
    OutputStall,
    Error,
}

impl From<KernelStatus> for ResultState {
    fn from(status: KernelStatus) -> Self {
        match status {
            KernelStatus::Finished => ResultState::Ok,
            KernelStatus::InputStall => ResultState::InputBufferTooSmall,
            KernelStatus::OutputStall => ResultState::OutputBufferTooSmall,
            KernelStatus::Error => ResultState::ProcessingError,
        }
    }
}

/// Outcome of a single backend invocation. The byte counts are only
/// meaningful when `state` is `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProcessingResult {
    pub state: ResultState,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl ProcessingResult {
    pub fn ok(bytes_read: u64, bytes_written: u64) -> Self {
        Self { state: ResultState::Ok, bytes_read, bytes_written }
    }

    pub fn failed(state: ResultState) -> Self {
        Self { state, bytes_read: 0, bytes_written: 0 }
    }

    pub fn into_result(self) -> Result<Self> {
        self.state.into_result().map(|_| self)
    }
}
