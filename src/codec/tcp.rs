// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus TCP

use alloc::vec::Vec;

use byteorder::{BigEndian, ByteOrder};

use crate::{error::Error, frame::DeviceAddress};

/// MBAP header length.
pub const HEADER_LEN: usize = 7;

// [MODBUS MESSAGING ON TCP/IP IMPLEMENTATION GUIDE V1.0b](http://modbus.org/docs/Modbus_Messaging_Implementation_Guide_V1_0b.pdf), page 18
// "a MODBUS request needs a maximum of 256 bytes + the MBAP header size"
const MAX_FRAME_LEN: usize = 256 + HEADER_LEN;

/// Encode a TCP request: MBAP header followed by the PDU.
#[must_use]
pub fn encode_request(transaction_id: u16, unit_id: DeviceAddress, pdu: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + pdu.len());
    buf.resize(HEADER_LEN, 0);
    BigEndian::write_u16(&mut buf[..2], transaction_id);
    // protocol id stays 0
    BigEndian::write_u16(&mut buf[4..6], pdu.len() as u16 + 1);
    buf[6] = unit_id;
    buf.extend_from_slice(pdu);
    buf
}

/// Verify the MBAP header of a TCP response and return its PDU.
pub fn extract_pdu(
    transaction_id: u16,
    unit_id: DeviceAddress,
    buf: &[u8],
) -> Result<&[u8], Error> {
    if buf.len() <= HEADER_LEN || buf.len() > MAX_FRAME_LEN {
        return Err(Error::BufferSize);
    }
    let (adu_buf, pdu_data) = buf.split_at(HEADER_LEN);
    let (transaction_buf, adu_buf) = adu_buf.split_at(2);
    let (protocol_buf, adu_buf) = adu_buf.split_at(2);
    let (length_buf, adu_buf) = adu_buf.split_at(2);
    let protocol_id = BigEndian::read_u16(protocol_buf);
    if protocol_id != 0 {
        return Err(Error::ProtocolNotModbus(protocol_id));
    }
    let transaction = BigEndian::read_u16(transaction_buf);
    if transaction != transaction_id {
        return Err(Error::TransactionId(transaction_id, transaction));
    }
    let m_length = BigEndian::read_u16(length_buf) as usize;
    if m_length != pdu_data.len() + 1 {
        return Err(Error::LengthMismatch(m_length, pdu_data.len() + 1));
    }
    let unit = adu_buf[0];
    if unit != unit_id {
        return Err(Error::DeviceAddress(unit_id, unit));
    }
    Ok(pdu_data)
}
