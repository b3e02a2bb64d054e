// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::{fmt, str::FromStr};

mod byte_order;
mod elem;
mod unit;

pub use self::{byte_order::*, elem::*, unit::*};
use crate::error::Error;

/// A Modbus function code.
///
/// It is represented by an unsigned 8 bit integer.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCode {
    /// Modbus Function Code: `01` (`0x01`).
    ReadCoils,

    /// Modbus Function Code: `02` (`0x02`).
    ReadDiscreteInputs,

    /// Modbus Function Code: `05` (`0x05`).
    WriteSingleCoil,

    /// Modbus Function Code: `06` (`0x06`).
    WriteSingleRegister,

    /// Modbus Function Code: `03` (`0x03`).
    ReadHoldingRegisters,

    /// Modbus Function Code: `04` (`0x04`).
    ReadInputRegisters,

    /// Modbus Function Code: `15` (`0x0F`).
    WriteMultipleCoils,

    /// Modbus Function Code: `16` (`0x10`).
    WriteMultipleRegisters,

    /// Any other function code.
    Custom(u8),
}

impl FunctionCode {
    /// Create a new [`FunctionCode`] with `value`.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        match value {
            0x01 => Self::ReadCoils,
            0x02 => Self::ReadDiscreteInputs,
            0x05 => Self::WriteSingleCoil,
            0x06 => Self::WriteSingleRegister,
            0x03 => Self::ReadHoldingRegisters,
            0x04 => Self::ReadInputRegisters,
            0x0F => Self::WriteMultipleCoils,
            0x10 => Self::WriteMultipleRegisters,
            code => FunctionCode::Custom(code),
        }
    }

    /// Get the [`u8`] value of the current [`FunctionCode`].
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ReadCoils => 0x01,
            Self::ReadDiscreteInputs => 0x02,
            Self::WriteSingleCoil => 0x05,
            Self::WriteSingleRegister => 0x06,
            Self::ReadHoldingRegisters => 0x03,
            Self::ReadInputRegisters => 0x04,
            Self::WriteMultipleCoils => 0x0F,
            Self::WriteMultipleRegisters => 0x10,
            Self::Custom(code) => code,
        }
    }

    /// The function code a device answers with if it rejects the request.
    #[must_use]
    pub const fn exception_value(self) -> u8 {
        self.value() | 0x80
    }

    /// Select the function code for an operation on a table.
    ///
    /// Returns `None` for writes to read-only tables.
    #[must_use]
    pub const fn for_request(table: TableType, op: Operation) -> Option<Self> {
        use Operation as O;
        use TableType as T;

        let code = match (table, op) {
            (T::DiscreteInputs, O::Read) => Self::ReadDiscreteInputs,
            (T::Coils, O::Read) => Self::ReadCoils,
            (T::InputRegisters, O::Read) => Self::ReadInputRegisters,
            (T::HoldingRegisters, O::Read) => Self::ReadHoldingRegisters,
            (T::Coils, O::WriteSingle) => Self::WriteSingleCoil,
            (T::Coils, O::WriteMultiple) => Self::WriteMultipleCoils,
            (T::HoldingRegisters, O::WriteSingle) => Self::WriteSingleRegister,
            (T::HoldingRegisters, O::WriteMultiple) => Self::WriteMultipleRegisters,
            (T::DiscreteInputs | T::InputRegisters, O::WriteSingle | O::WriteMultiple) => {
                return None;
            }
        };
        Some(code)
    }
}

impl From<u8> for FunctionCode {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<FunctionCode> for u8 {
    fn from(code: FunctionCode) -> Self {
        code.value()
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value().fmt(f)
    }
}

/// A Modbus address is represented by 16 bit (from `0` to `65535`).
pub type Address = u16;

/// Number of items to process (`0` - `65535`).
pub type Quantity = u16;

/// Address of a device on the bus (RTU slave id or TCP unit id).
pub type DeviceAddress = u8;

/// One of the four addressable Modbus data tables.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableType {
    /// Read-only bits.
    DiscreteInputs,
    /// Read-write bits.
    Coils,
    /// Read-only 16 bit registers.
    InputRegisters,
    /// Read-write 16 bit registers.
    HoldingRegisters,
}

impl TableType {
    /// `true` if the table is addressed bit by bit.
    #[must_use]
    pub const fn is_bits(self) -> bool {
        matches!(self, Self::DiscreteInputs | Self::Coils)
    }

    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::DiscreteInputs | Self::InputRegisters)
    }

    /// Maximum number of bits or registers of one read request.
    #[must_use]
    pub const fn max_elem_count(self) -> usize {
        if self.is_bits() { 2000 } else { 125 }
    }

    /// Maximum number of bits or registers of one write multiple request.
    #[must_use]
    pub const fn max_write_count(self) -> usize {
        if self.is_bits() { 1968 } else { 123 }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::DiscreteInputs => "discrete inputs",
            Self::Coils => "coils",
            Self::InputRegisters => "input registers",
            Self::HoldingRegisters => "holding registers",
        }
    }
}

impl fmt::Display for TableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table = match s.trim() {
            s if s.eq_ignore_ascii_case("di")
                || s.eq_ignore_ascii_case("discrete_inputs")
                || s.eq_ignore_ascii_case("discrete inputs") =>
            {
                Self::DiscreteInputs
            }
            s if s.eq_ignore_ascii_case("c")
                || s.eq_ignore_ascii_case("co")
                || s.eq_ignore_ascii_case("coils") =>
            {
                Self::Coils
            }
            s if s.eq_ignore_ascii_case("ir")
                || s.eq_ignore_ascii_case("input_registers")
                || s.eq_ignore_ascii_case("input registers") =>
            {
                Self::InputRegisters
            }
            s if s.eq_ignore_ascii_case("hr")
                || s.eq_ignore_ascii_case("holding_registers")
                || s.eq_ignore_ascii_case("holding registers") =>
            {
                Self::HoldingRegisters
            }
            _ => return Err(Error::Config("unknown table type")),
        };
        Ok(table)
    }
}

/// Kind of access a data unit performs on its table.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operation {
    #[default]
    Read,
    WriteSingle,
    WriteMultiple,
}

/// Transport framing of a request.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransMode {
    /// Binary serial framing with CRC.
    #[cfg(feature = "rtu")]
    Rtu,
    /// Hex text serial framing with LRC.
    #[cfg(feature = "ascii")]
    Ascii,
    /// MBAP header framing.
    #[cfg(feature = "tcp")]
    Tcp,
}

impl fmt::Display for TransMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            #[cfg(feature = "rtu")]
            Self::Rtu => "RTU",
            #[cfg(feature = "ascii")]
            Self::Ascii => "ASCII",
            #[cfg(feature = "tcp")]
            Self::Tcp => "TCP",
        };
        f.write_str(s)
    }
}

impl FromStr for TransMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        #[cfg(feature = "rtu")]
        if s.eq_ignore_ascii_case("rtu") {
            return Ok(Self::Rtu);
        }
        #[cfg(feature = "ascii")]
        if s.eq_ignore_ascii_case("ascii") {
            return Ok(Self::Ascii);
        }
        #[cfg(feature = "tcp")]
        if s.eq_ignore_ascii_case("tcp") {
            return Ok(Self::Tcp);
        }
        Err(Error::Config("unknown transfer mode"))
    }
}

/// A server (slave) exception.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    IllegalFunction = 0x01,
    IllegalDataAddress = 0x02,
    IllegalDataValue = 0x03,
    ServerDeviceFailure = 0x04,
    Acknowledge = 0x05,
    ServerDeviceBusy = 0x06,
    MemoryParityError = 0x08,
    GatewayPathUnavailable = 0x0A,
    GatewayTargetDevice = 0x0B,
}

const UNKNOWN_EXCEPTION: &str = "Unknown Exception";

impl Exception {
    /// Look up a known exception code.
    #[must_use]
    pub const fn new(code: u8) -> Option<Self> {
        let ex = match code {
            0x01 => Self::IllegalFunction,
            0x02 => Self::IllegalDataAddress,
            0x03 => Self::IllegalDataValue,
            0x04 => Self::ServerDeviceFailure,
            0x05 => Self::Acknowledge,
            0x06 => Self::ServerDeviceBusy,
            0x08 => Self::MemoryParityError,
            0x0A => Self::GatewayPathUnavailable,
            0x0B => Self::GatewayTargetDevice,
            _ => return None,
        };
        Some(ex)
    }

    const fn get_name(self) -> &'static str {
        match self {
            Self::IllegalFunction => "Illegal Function",
            Self::IllegalDataAddress => "Illegal Data Address",
            Self::IllegalDataValue => "Illegal Data Value",
            Self::ServerDeviceFailure => "Slave Device Failure",
            Self::Acknowledge => "Acknowledge",
            Self::ServerDeviceBusy => "Slave Device Busy",
            Self::MemoryParityError => "Memory Parity Error",
            Self::GatewayPathUnavailable => "Gateway Path Unavailable",
            Self::GatewayTargetDevice => "Gateway Target Device Failed to Respond",
        }
    }

    /// Human readable description of any exception code.
    #[must_use]
    pub const fn describe(code: u8) -> &'static str {
        match Self::new(code) {
            Some(ex) => ex.get_name(),
            None => UNKNOWN_EXCEPTION,
        }
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.get_name())
    }
}
