use crate::error::ExchangeError;

use nom::number::complete::{be_u16, be_u32};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Width {
    U16,
    U32,
}

impl Width {
    pub fn len(self) -> usize {
        match self {
            Width::U16 => 2,
            Width::U32 => 4,
        }
    }
}

/// Big-endian u16 scaled by 10^exponent.
pub fn decode_u16(bytes: [u8; 2], exponent: i32) -> f64 {
    scale(u16::from_be_bytes(bytes).into(), exponent)
}

/// Big-endian u32 scaled by 10^exponent.
pub fn decode_u32(bytes: [u8; 4], exponent: i32) -> f64 {
    scale(u32::from_be_bytes(bytes).into(), exponent)
}

/// Reads a `width`-sized big-endian integer at `offset` in `input`.
pub fn read_raw(input: &[u8], offset: usize, width: Width) -> Result<u32, ExchangeError> {
    let short = || {
        ExchangeError::Framing(format!(
            "payload of {} bytes too short for {:?} at offset {}",
            input.len(),
            width,
            offset
        ))
    };
    let rest = input.get(offset..).ok_or_else(short)?;

    let parsed = match width {
        Width::U16 => be_u16::<_, nom::error::Error<&[u8]>>(rest).map(|(_, v)| u32::from(v)),
        Width::U32 => be_u32::<_, nom::error::Error<&[u8]>>(rest).map(|(_, v)| v),
    };
    parsed.map_err(|_| short())
}

/// Decodes the field at `offset`, returning the raw integer alongside its
/// scaled value.
pub fn read_scaled(
    input: &[u8],
    offset: usize,
    width: Width,
    exponent: i32,
) -> Result<(u32, f64), ExchangeError> {
    let raw = read_raw(input, offset, width)?;
    let value = match width {
        // read as u16, the cast cannot truncate
        Width::U16 => decode_u16((raw as u16).to_be_bytes(), exponent),
        Width::U32 => decode_u32(raw.to_be_bytes(), exponent),
    };
    Ok((raw, value))
}

/// Multiplies `raw` by 10^exponent then rounds half-up to `-exponent` places.
pub fn scale(raw: u32, exponent: i32) -> f64 {
    if exponent == 0 {
        return f64::from(raw);
    }
    round(f64::from(raw) * 10f64.powi(exponent), -exponent)
}

pub fn round(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor + 0.5).trunc() / factor
}
