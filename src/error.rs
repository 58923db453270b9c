//! Our error types for the regulation screens.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error type for setpoint, gateway and registry operations.
///
/// The parameter gateway only ever reports [`Error::RangeError`] or
/// [`Error::UnknownName`] from a set; `Ok(())` is the third outcome.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("Value out of range")]
    RangeError,
    #[error("Unknown parameter name")]
    UnknownName,
    #[error("Value buffer too small")]
    BufferError,
    #[error("Screen registry is full")]
    RegistryFull,
    #[error("Screen id {0} is already registered")]
    DuplicateScreen(u8),
    #[error("No screen with id {0}")]
    UnknownScreen(u8),
    #[error("No screen registered")]
    NoScreen,
}
