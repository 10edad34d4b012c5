//! PTP string and array primitives
//!
//! Two string shapes appear on the wire:
//! - bare null-terminated UTF-16LE (channel init names)
//! - PTP strings: a one-byte character count (terminator included) followed
//!   by that many UTF-16LE code units; an empty string is a lone zero count

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::{BufMut, BytesMut};

/// Longest PTP string: the count byte includes the terminator
pub const MAX_PTP_STRING_CHARS: usize = 254;

/// Append `s` as null-terminated UTF-16LE
pub fn put_utf16z(buf: &mut BytesMut, s: &str) {
    for unit in s.encode_utf16() {
        buf.put_u16_le(unit);
    }
    buf.put_u16_le(0);
}

/// Decode null-terminated UTF-16LE
///
/// Stops at the first terminator or at the end of `data`. A trailing odd byte
/// is ignored. Returns the string and the bytes consumed, terminator included.
pub fn get_utf16z(data: &[u8]) -> (String, usize) {
    let mut units = Vec::with_capacity(data.len() / 2);
    let mut consumed = 0;

    for chunk in data.chunks_exact(2) {
        consumed += 2;
        let unit = u16::from_le_bytes([chunk[0], chunk[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
    }

    (String::from_utf16_lossy(&units), consumed)
}

/// Append `s` as a count-prefixed PTP string
///
/// Strings longer than [`MAX_PTP_STRING_CHARS`] code units are cut.
pub fn put_ptp_string(buf: &mut BytesMut, s: &str) {
    if s.is_empty() {
        buf.put_u8(0);
        return;
    }

    let units: Vec<u16> = s.encode_utf16().take(MAX_PTP_STRING_CHARS).collect();
    buf.put_u8((units.len() + 1) as u8);
    for unit in units {
        buf.put_u16_le(unit);
    }
    buf.put_u16_le(0);
}

/// Read a count-prefixed PTP string
///
/// Fails with `UnexpectedEof` when the declared characters are not all present.
pub fn read_ptp_string<R: Read>(reader: &mut R) -> io::Result<String> {
    let count = reader.read_u8()? as usize;
    if count == 0 {
        return Ok(String::new());
    }

    let mut units = vec![0u16; count];
    reader.read_u16_into::<LittleEndian>(&mut units)?;

    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    Ok(String::from_utf16_lossy(&units[..end]))
}

/// Append a `u32` element count followed by `u16` elements
pub fn put_u16_array(buf: &mut BytesMut, values: impl ExactSizeIterator<Item = u16>) {
    buf.put_u32_le(values.len() as u32);
    for value in values {
        buf.put_u16_le(value);
    }
}

/// Read a `u32` element count followed by `u16` elements
///
/// `remaining` bounds the count so a corrupt length cannot trigger a huge
/// allocation.
pub fn read_u16_array<R: Read>(reader: &mut R, remaining: usize) -> io::Result<Vec<u16>> {
    let count = reader.read_u32::<LittleEndian>()? as usize;
    if count.saturating_mul(2) > remaining.saturating_sub(4) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("array of {} elements exceeds remaining data", count),
        ));
    }

    let mut values = vec![0u16; count];
    reader.read_u16_into::<LittleEndian>(&mut values)?;
    Ok(values)
}

/// Read a `u32` element count followed by `u32` elements
pub fn read_u32_array<R: Read>(reader: &mut R, remaining: usize) -> io::Result<Vec<u32>> {
    let count = reader.read_u32::<LittleEndian>()? as usize;
    if count.saturating_mul(4) > remaining.saturating_sub(4) {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("array of {} elements exceeds remaining data", count),
        ));
    }

    let mut values = vec![0u32; count];
    reader.read_u32_into::<LittleEndian>(&mut values)?;
    Ok(values)
}
