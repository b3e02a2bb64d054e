// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common helpers

use crate::error::Error;

/// Turn a bool into a u16 coil value
#[must_use]
pub const fn bool_to_u16_coil(state: bool) -> u16 {
    if state { 0xFF00 } else { 0x0000 }
}

/// Calculate the number of bytes required for a given number of coils.
#[must_use]
pub const fn packed_coils_len(bitcount: usize) -> usize {
    bitcount.div_ceil(8)
}

///  Pack coils into a byte array.
///
///  It returns the number of bytes used to pack the coils.
pub fn pack_coils(coils: &[bool], bytes: &mut [u8]) -> Result<usize, Error> {
    let packed_size = packed_coils_len(coils.len());
    if bytes.len() < packed_size {
        return Err(Error::BufferSize);
    }
    bytes[..packed_size].fill(0);
    coils.iter().enumerate().for_each(|(i, b)| {
        let v = u8::from(*b);
        bytes[i / 8] |= v << (i % 8);
    });
    Ok(packed_size)
}

/// Read a single coil out of packed coil bytes.
#[must_use]
pub fn coil_at(bytes: &[u8], idx: usize) -> Option<bool> {
    bytes.get(idx / 8).map(|b| (b >> (idx % 8)) & 0b1 > 0)
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Upper case hex representation of a byte.
#[must_use]
pub const fn byte_to_hex(byte: u8) -> [u8; 2] {
    [
        HEX_DIGITS[(byte >> 4) as usize],
        HEX_DIGITS[(byte & 0x0F) as usize],
    ]
}

const fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Parse two hex characters into a byte.
#[must_use]
pub const fn hex_to_byte(hi: u8, lo: u8) -> Option<u8> {
    match (hex_digit(hi), hex_digit(lo)) {
        (Some(hi), Some(lo)) => Some(hi << 4 | lo),
        _ => None,
    }
}
