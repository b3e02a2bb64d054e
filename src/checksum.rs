// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Frame checksums

/// Calculate the CRC (Cyclic Redundancy Check) sum.
///
/// The result is the raw CRC register. On the wire the low byte is
/// transmitted first.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFF;
    for x in data {
        crc ^= u16::from(*x);
        for _ in 0..8 {
            // if we followed clippy's suggestion to move out the crc >>= 1, the condition may not be met any more
            #[allow(clippy::branches_sharing_code)]
            if (crc & 0x0001) != 0 {
                crc >>= 1;
                crc ^= 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Calculate the LRC (Longitudinal Redundancy Check) sum.
///
/// Two's complement of the 8 bit sum of all bytes.
#[must_use]
pub fn lrc(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |sum, x| sum.wrapping_add(*x))
        .wrapping_neg()
}
