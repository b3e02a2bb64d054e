// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modbus RTU

use alloc::vec::Vec;

use crate::{checksum::crc16, error::Error, frame::DeviceAddress};

// [MODBUS over Serial Line Specification and Implementation Guide V1.02](http://modbus.org/docs/Modbus_over_serial_line_V1_02.pdf), page 13
// "The maximum size of a MODBUS RTU frame is 256 bytes."
pub const MAX_FRAME_LEN: usize = 256;

/// Device address, function code and CRC.
const MIN_FRAME_LEN: usize = 4;

/// Encode an RTU request: `[device][PDU][crc lo][crc hi]`.
#[must_use]
pub fn encode_request(device: DeviceAddress, pdu: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(pdu.len() + 3);
    buf.push(device);
    buf.extend_from_slice(pdu);
    let crc = crc16(&buf);
    buf.extend_from_slice(&crc.to_le_bytes());
    buf
}

/// Verify an RTU response frame and return its PDU.
pub fn extract_pdu(device: DeviceAddress, buf: &[u8]) -> Result<&[u8], Error> {
    if buf.len() < MIN_FRAME_LEN || buf.len() > MAX_FRAME_LEN {
        return Err(Error::BufferSize);
    }
    let (adu_buf, crc_buf) = buf.split_at(buf.len() - 2);
    // Read trailing CRC and verify ADU
    let expected_crc = u16::from_le_bytes([crc_buf[0], crc_buf[1]]);
    let actual_crc = crc16(adu_buf);
    if expected_crc != actual_crc {
        return Err(Error::Crc(expected_crc, actual_crc));
    }
    let (slave_id, pdu_data) = adu_buf.split_at(1);
    if slave_id[0] != device {
        return Err(Error::DeviceAddress(device, slave_id[0]));
    }
    Ok(pdu_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_read_holding_registers_request() {
        let req = encode_request(0x01, &[0x03, 0x00, 0x00, 0x00, 0x0A]);
        assert_eq!(req, &[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD]);
    }

    #[test]
    fn encode_write_single_register_request() {
        let req = encode_request(0x12, &[0x06, 0x22, 0x22, 0xAB, 0xCD]);
        assert_eq!(
            req,
            &[
                0x12, // slave address
                0x06, // function code
                0x22, // addr
                0x22, // addr
                0xAB, // value
                0xCD, // value
                0x9F, // crc
                0xBE, // crc
            ]
        );
    }

    #[test]
    fn extract_write_single_register_response() {
        let rsp = &[0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x9F, 0xBE];
        assert_eq!(
            extract_pdu(0x12, rsp).unwrap(),
            &[0x06, 0x22, 0x22, 0xAB, 0xCD]
        );
    }

    #[test]
    fn extract_bad_crc_response() {
        let rsp = &[0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x5F, 0xBE];
        assert_eq!(
            extract_pdu(0x12, rsp).unwrap_err(),
            Error::Crc(0xBE5F, 0xBE9F)
        );
    }

    #[test]
    fn extract_response_of_other_device() {
        let rsp = &[0x12, 0x06, 0x22, 0x22, 0xAB, 0xCD, 0x9F, 0xBE];
        assert_eq!(
            extract_pdu(0x01, rsp).unwrap_err(),
            Error::DeviceAddress(0x01, 0x12)
        );
    }

    #[test]
    fn extract_short_response() {
        assert_eq!(extract_pdu(0x12, &[]).unwrap_err(), Error::BufferSize);
        assert_eq!(
            extract_pdu(0x12, &[0x12, 0x06, 0x9F]).unwrap_err(),
            Error::BufferSize
        );
    }
}
