// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::fmt;

use crate::frame::{ElemType, TableType};

/// modbus-dataunit Error
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Too many bits or registers for one request (count, limit)
    CapacityExceeded(usize, usize),
    /// Byte order is not a permutation of the element bytes
    InvalidByteOrder,
    /// Start address plus quantity runs past `0xFFFF` (address, quantity)
    AddressOverflow(u16, usize),
    /// Write request for a read-only table
    ReadOnlyTable(TableType),
    /// Element type not usable in this table
    ElemType(ElemType, TableType),
    /// Write request without a value for every element
    MissingValue,
    /// Value does not match the element type (expected, actual)
    ValueType(ElemType, ElemType),
    /// Malformed configuration entry
    Config(&'static str),
    /// Response length differs from the expected one
    UnexpectedLength { expected: usize, actual: usize },
    /// Response function code is neither the request nor its exception code
    UnexpectedFunctionCode { expected: u8, actual: u8 },
    /// Exception reply of the device
    DeviceException {
        code: u8,
        description: &'static str,
    },
    /// Invalid buffer size
    BufferSize,
    /// Invalid byte count field
    ByteCount(u8),
    /// Write response does not echo the request
    EchoMismatch,
    /// Invalid CRC
    Crc(u16, u16),
    /// Invalid LRC
    Lrc(u8, u8),
    /// Malformed ASCII frame
    AsciiFrame,
    /// Response from another device (expected, actual)
    DeviceAddress(u8, u8),
    /// Response to another transaction (expected, actual)
    TransactionId(u16, u16),
    /// Length Mismatch
    LengthMismatch(usize, usize),
    /// Protocol not Modbus
    ProtocolNotModbus(u16),
}

impl Error {
    /// Returns `true` for errors that can only be fixed by changing the
    /// configuration of the data unit.
    ///
    /// All other errors belong to a single poll attempt.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded(..)
                | Self::InvalidByteOrder
                | Self::AddressOverflow(..)
                | Self::ReadOnlyTable(_)
                | Self::ElemType(..)
                | Self::MissingValue
                | Self::ValueType(..)
                | Self::Config(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;

        match self {
            CapacityExceeded(cnt, max) => {
                write!(f, "Capacity exceeded: {cnt} element(s), allowed 1..={max}")
            }
            InvalidByteOrder => write!(f, "Invalid byte order"),
            AddressOverflow(addr, cnt) => {
                write!(f, "Address overflow: {cnt} element(s) starting at {addr}")
            }
            ReadOnlyTable(table) => write!(f, "Table is read-only: {table}"),
            ElemType(elem_type, table) => {
                write!(f, "Element type {elem_type} is not supported by {table}")
            }
            MissingValue => write!(f, "Missing value for write request"),
            ValueType(expected, actual) => write!(
                f,
                "Value type mismatch: expected = {expected}, actual = {actual}"
            ),
            Config(msg) => write!(f, "Invalid configuration: {msg}"),
            UnexpectedLength { expected, actual } => write!(
                f,
                "Unexpected length: expected = {expected}, actual = {actual}"
            ),
            UnexpectedFunctionCode { expected, actual } => write!(
                f,
                "Unexpected function code: expected = 0x{expected:0>2X}, actual = 0x{actual:0>2X}"
            ),
            DeviceException { code, description } => {
                write!(f, "Device exception 0x{code:0>2X}: {description}")
            }
            BufferSize => write!(f, "Invalid buffer size"),
            ByteCount(cnt) => write!(f, "Invalid byte count: {cnt}"),
            EchoMismatch => write!(f, "Write response does not match the request"),
            Crc(expected, actual) => write!(
                f,
                "Invalid CRC: expected = 0x{expected:0>4X}, actual = 0x{actual:0>4X}"
            ),
            Lrc(expected, actual) => write!(
                f,
                "Invalid LRC: expected = 0x{expected:0>2X}, actual = 0x{actual:0>2X}"
            ),
            AsciiFrame => write!(f, "Malformed ASCII frame"),
            DeviceAddress(expected, actual) => write!(
                f,
                "Unexpected device address: expected = {expected}, actual = {actual}"
            ),
            TransactionId(expected, actual) => write!(
                f,
                "Unexpected transaction id: expected = {expected}, actual = {actual}"
            ),
            LengthMismatch(length_field, pdu_len) => write!(
                f,
                "Length Mismatch: Length Field: {length_field}, PDU Len + 1: {pdu_len}"
            ),
            ProtocolNotModbus(protocol_id) => {
                write!(f, "Protocol not Modbus(0), received {protocol_id} instead")
            }
        }
    }
}

impl core::error::Error for Error {}
