//! Name-keyed access to the setpoints of a screen.
//!
//! Values cross this boundary as decimal integer strings in SI milli-units
//! (millivolts, milliamperes), whatever the screen holds internally. A set goes
//! through [`RegulationScreen::commit`], exactly like an edit on the panel.

use core::fmt::Write;

use log::warn;

use crate::{
    error::{Error, Result},
    hw::{Display, PowerControl},
    screen::RegulationScreen,
    types::Quantity,
};

/// Room for any `i32` in decimal, sign included.
pub const PARAM_VALUE_LEN: usize = 12;

/// A formatted parameter value.
pub type ParamValue = heapless::String<PARAM_VALUE_LEN>;

/// Parse the leading signed decimal integer of `text`.
///
/// Leading ASCII whitespace and one sign are accepted, then digits are read
/// up to the first non-digit. Text with no leading digits parses as `0`, so
/// `"12abc"` is `12` and `"abc"` is `0`. Out of range values saturate.
/// The sign is kept, so callers scaling the result see C-style truncation
/// toward zero.
pub fn parse_leading_int(text: &str) -> i32 {
    let text = text.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let limit = i64::from(i32::MAX) + 1;
    let mut magnitude: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        magnitude = (magnitude * 10 + i64::from(digit - b'0')).min(limit);
    }

    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

impl RegulationScreen {
    /// Set a parameter from its SI string value.
    ///
    /// Returns [`Error::UnknownName`] for a name this screen does not expose and
    /// [`Error::RangeError`] when the converted value falls outside the
    /// setpoint's bounds. Neither changes anything.
    ///
    /// Conversion truncates toward zero before the bounds check, so a small
    /// negative voltage such as `"-9"` mV becomes 0 cV and is accepted.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: &str,
        power: &mut impl PowerControl,
        display: &mut impl Display,
    ) -> Result<()> {
        let si = parse_leading_int(value);
        let quantity = self.resolve(name)?;
        let internal = self.config().scaling.si_to_internal(quantity, si);
        self.commit(quantity, internal, power, display)
    }

    /// Read a parameter as its SI string value.
    pub fn get_parameter(&self, name: &str) -> Result<ParamValue> {
        let quantity = self.resolve(name)?;
        let si = self
            .config()
            .scaling
            .internal_to_si(quantity, self.setpoint(quantity).value());

        let mut out = ParamValue::new();
        write!(out, "{si}").map_err(|_| Error::BufferError)?;
        Ok(out)
    }

    fn resolve(&self, name: &str) -> Result<Quantity> {
        match self.config().parameter(name) {
            Some(parameter) => Ok(parameter.quantity),
            None => {
                warn!("[{}] unknown parameter '{}'", self.name(), name);
                Err(Error::UnknownName)
            }
        }
    }
}
