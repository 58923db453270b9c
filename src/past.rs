//! Persistent storage of setpoints.
//!
//! Values are kept in a flash-backed key/value store addressed by 32-bit keys.
//! The store itself lives outside this crate; [`Past`] is the interface we need
//! from it and [`MemoryPast`] is a RAM implementation of it.
//!
//! # Unit encoding
//!
//! Every setpoint is stored as exactly [`UNIT_WIDTH`] bytes: the internal value
//! as a little-endian two's complement `i32`. The width is a fixed contract and
//! does not follow the in-memory type. Units of any other length are treated
//! as foreign and ignored on restore.

use modular_bitfield::prelude::*;
use thiserror::Error;

/// Byte width of one stored setpoint.
pub const UNIT_WIDTH: usize = 4;

/// Largest unit [`MemoryPast`] can hold.
pub const UNIT_CAPACITY: usize = 16;

/// Key of one stored unit: `(screen << 24) | slot`.
#[bitfield]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastKey {
    pub slot: B24,
    pub screen: B8,
}

impl PastKey {
    pub fn for_slot(screen: u8, slot: u32) -> Self {
        PastKey::new().with_screen(screen).with_slot(slot)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PastError {
    #[error("Store has no room for key {0:#010x}")]
    Full(u32),
    #[error("Unit of {0} bytes is too large")]
    UnitTooLarge(usize),
    #[error("Write to key {0:#010x} failed")]
    WriteFailed(u32),
}

/// The key/value store the screens persist into.
pub trait Past {
    /// Store `data` under `key`, replacing any previous unit.
    fn write_unit(&mut self, key: PastKey, data: &[u8]) -> Result<(), PastError>;

    /// Return the unit stored under `key`, if any.
    fn read_unit(&self, key: PastKey) -> Option<&[u8]>;
}

/// Encode a setpoint value as a stored unit.
pub const fn encode_unit(value: i32) -> [u8; UNIT_WIDTH] {
    value.to_le_bytes()
}

/// Decode a stored unit. Returns `None` unless it is exactly [`UNIT_WIDTH`] bytes.
pub fn decode_unit(unit: &[u8]) -> Option<i32> {
    <[u8; UNIT_WIDTH]>::try_from(unit)
        .ok()
        .map(i32::from_le_bytes)
}

/// A fixed-capacity [`Past`] kept in RAM.
pub struct MemoryPast<const N: usize> {
    units: heapless::LinearMap<u32, heapless::Vec<u8, UNIT_CAPACITY>, N>,
    /// Flag to simulate flash write errors
    should_error_on_write: bool,
}

impl<const N: usize> MemoryPast<N> {
    pub fn new() -> Self {
        Self {
            units: heapless::LinearMap::new(),
            should_error_on_write: false,
        }
    }

    /// Number of stored units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Configure whether write operations should fail with an error
    pub fn set_write_error(&mut self, should_error: bool) {
        self.should_error_on_write = should_error;
    }
}

impl<const N: usize> Default for MemoryPast<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Past for MemoryPast<N> {
    fn write_unit(&mut self, key: PastKey, data: &[u8]) -> Result<(), PastError> {
        let raw_key = u32::from(key);
        if self.should_error_on_write {
            return Err(PastError::WriteFailed(raw_key));
        }
        let unit = heapless::Vec::from_slice(data).map_err(|_| PastError::UnitTooLarge(data.len()))?;
        self.units
            .insert(raw_key, unit)
            .map_err(|_| PastError::Full(raw_key))?;
        Ok(())
    }

    fn read_unit(&self, key: PastKey) -> Option<&[u8]> {
        self.units.get(&u32::from(key)).map(|unit| unit.as_slice())
    }
}
