// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus ASCII
//!
//! A frame is `':'` followed by the upper case hex digits of
//! `[device][PDU][LRC]`. The terminating CR LF is appended by the
//! transport, see [`FRAME_END`].

use alloc::vec::Vec;

use crate::{
    checksum::lrc,
    error::Error,
    frame::DeviceAddress,
    util::{byte_to_hex, hex_to_byte},
};

/// Start of every ASCII frame.
pub const FRAME_START: u8 = b':';

/// Line end a transport sends after each frame.
pub const FRAME_END: &[u8; 2] = b"\r\n";

/// Line length in characters of a frame with `adu_len` binary bytes,
/// colon and CR LF included.
#[must_use]
pub const fn frame_len(adu_len: usize) -> usize {
    1 + adu_len * 2 + FRAME_END.len()
}

/// Encode an ASCII request without the trailing CR LF.
#[must_use]
pub fn encode_request(device: DeviceAddress, pdu: &[u8]) -> Vec<u8> {
    let mut adu = Vec::with_capacity(pdu.len() + 2);
    adu.push(device);
    adu.extend_from_slice(pdu);
    adu.push(lrc(&adu));

    let mut buf = Vec::with_capacity(1 + adu.len() * 2);
    buf.push(FRAME_START);
    for byte in adu {
        buf.extend_from_slice(&byte_to_hex(byte));
    }
    buf
}

/// Verify an ASCII response line and return its decoded PDU.
///
/// A trailing CR LF is accepted but not required.
pub fn extract_pdu(device: DeviceAddress, buf: &[u8]) -> Result<Vec<u8>, Error> {
    let buf = buf.strip_suffix(FRAME_END.as_slice()).unwrap_or(buf);
    let Some((&FRAME_START, hex)) = buf.split_first() else {
        return Err(Error::AsciiFrame);
    };
    if hex.len() % 2 != 0 {
        return Err(Error::AsciiFrame);
    }
    let mut adu = hex
        .chunks_exact(2)
        .map(|c| hex_to_byte(c[0], c[1]))
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::AsciiFrame)?;
    // device address, function code and LRC
    if adu.len() < 3 {
        return Err(Error::BufferSize);
    }
    let Some(expected_lrc) = adu.pop() else {
        return Err(Error::BufferSize);
    };
    let actual_lrc = lrc(&adu);
    if expected_lrc != actual_lrc {
        return Err(Error::Lrc(expected_lrc, actual_lrc));
    }
    if adu[0] != device {
        return Err(Error::DeviceAddress(device, adu[0]));
    }
    adu.remove(0);
    Ok(adu)
}
