// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::string::String;
use core::{fmt, str::FromStr};

use super::ByteOrder;
use crate::error::Error;

/// Numeric type of an element.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ElemType {
    /// A bit, or a register that is `0` or not.
    Bool,
    /// Low byte of a register.
    Byte,
    Short,
    #[default]
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
}

impl ElemType {
    /// Number of registers the type occupies.
    #[must_use]
    pub const fn reg_len(self) -> usize {
        match self {
            Self::Bool | Self::Byte | Self::Short | Self::UShort => 1,
            Self::Int | Self::UInt | Self::Float => 2,
            Self::Long | Self::ULong | Self::Double => 4,
        }
    }

    /// Number of register bytes the type occupies.
    #[must_use]
    pub const fn byte_len(self) -> usize {
        self.reg_len() * 2
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElemType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const NAMES: &[(&str, ElemType)] = &[
            ("bool", ElemType::Bool),
            ("bit", ElemType::Bool),
            ("byte", ElemType::Byte),
            ("u8", ElemType::Byte),
            ("short", ElemType::Short),
            ("i16", ElemType::Short),
            ("ushort", ElemType::UShort),
            ("u16", ElemType::UShort),
            ("int", ElemType::Int),
            ("i32", ElemType::Int),
            ("uint", ElemType::UInt),
            ("u32", ElemType::UInt),
            ("long", ElemType::Long),
            ("i64", ElemType::Long),
            ("ulong", ElemType::ULong),
            ("u64", ElemType::ULong),
            ("float", ElemType::Float),
            ("f32", ElemType::Float),
            ("double", ElemType::Double),
            ("f64", ElemType::Double),
        ];
        let s = s.trim();
        NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, elem_type)| *elem_type)
            .ok_or(Error::Config("unknown element type"))
    }
}

/// A decoded or to be written element value.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
}

impl Value {
    #[must_use]
    pub const fn elem_type(&self) -> ElemType {
        match self {
            Self::Bool(_) => ElemType::Bool,
            Self::Byte(_) => ElemType::Byte,
            Self::Short(_) => ElemType::Short,
            Self::UShort(_) => ElemType::UShort,
            Self::Int(_) => ElemType::Int,
            Self::UInt(_) => ElemType::UInt,
            Self::Long(_) => ElemType::Long,
            Self::ULong(_) => ElemType::ULong,
            Self::Float(_) => ElemType::Float,
            Self::Double(_) => ElemType::Double,
        }
    }

    /// The value as a double, as archives store it.
    ///
    /// 64 bit integers beyond `2^53` lose precision.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Bool(v) => f64::from(u8::from(v)),
            Self::Byte(v) => f64::from(v),
            Self::Short(v) => f64::from(v),
            Self::UShort(v) => f64::from(v),
            Self::Int(v) => f64::from(v),
            Self::UInt(v) => f64::from(v),
            Self::Long(v) => v as f64,
            Self::ULong(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
        }
    }

    /// Convert a command value into the given element type.
    ///
    /// Integers saturate at the bounds of the type.
    #[must_use]
    pub fn from_f64(elem_type: ElemType, v: f64) -> Self {
        match elem_type {
            ElemType::Bool => Self::Bool(v != 0.0),
            ElemType::Byte => Self::Byte(v as u8),
            ElemType::Short => Self::Short(v as i16),
            ElemType::UShort => Self::UShort(v as u16),
            ElemType::Int => Self::Int(v as i32),
            ElemType::UInt => Self::UInt(v as u32),
            ElemType::Long => Self::Long(v as i64),
            ElemType::ULong => Self::ULong(v as u64),
            ElemType::Float => Self::Float(v as f32),
            ElemType::Double => Self::Double(v),
        }
    }

    /// Big-endian representation, padded to whole registers.
    fn to_value_bytes(self, buf: &mut [u8; 8]) -> usize {
        fn put<const N: usize>(buf: &mut [u8; 8], bytes: [u8; N]) -> usize {
            buf[..N].copy_from_slice(&bytes);
            N
        }
        match self {
            Self::Bool(v) => put(buf, u16::from(v).to_be_bytes()),
            Self::Byte(v) => put(buf, u16::from(v).to_be_bytes()),
            Self::Short(v) => put(buf, v.to_be_bytes()),
            Self::UShort(v) => put(buf, v.to_be_bytes()),
            Self::Int(v) => put(buf, v.to_be_bytes()),
            Self::UInt(v) => put(buf, v.to_be_bytes()),
            Self::Long(v) => put(buf, v.to_be_bytes()),
            Self::ULong(v) => put(buf, v.to_be_bytes()),
            Self::Float(v) => put(buf, v.to_be_bytes()),
            Self::Double(v) => put(buf, v.to_be_bytes()),
        }
    }

    fn from_value_bytes(elem_type: ElemType, b: &[u8]) -> Self {
        let mut buf = [0; 8];
        buf[..b.len()].copy_from_slice(b);
        let b2 = [buf[0], buf[1]];
        let b4 = [buf[0], buf[1], buf[2], buf[3]];
        match elem_type {
            ElemType::Bool => Self::Bool(u16::from_be_bytes(b2) != 0),
            ElemType::Byte => Self::Byte(buf[1]),
            ElemType::Short => Self::Short(i16::from_be_bytes(b2)),
            ElemType::UShort => Self::UShort(u16::from_be_bytes(b2)),
            ElemType::Int => Self::Int(i32::from_be_bytes(b4)),
            ElemType::UInt => Self::UInt(u32::from_be_bytes(b4)),
            ElemType::Long => Self::Long(i64::from_be_bytes(buf)),
            ElemType::ULong => Self::ULong(u64::from_be_bytes(buf)),
            ElemType::Float => Self::Float(f32::from_be_bytes(b4)),
            ElemType::Double => Self::Double(f64::from_be_bytes(buf)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => v.fmt(f),
            Self::Byte(v) => v.fmt(f),
            Self::Short(v) => v.fmt(f),
            Self::UShort(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::UInt(v) => v.fmt(f),
            Self::Long(v) => v.fmt(f),
            Self::ULong(v) => v.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::Double(v) => v.fmt(f),
        }
    }
}

/// One logical value mapped onto consecutive bits or registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Elem {
    name: String,
    elem_type: ElemType,
    byte_order: Option<ByteOrder>,
}

impl Elem {
    pub fn new(name: impl Into<String>, elem_type: ElemType) -> Self {
        Self {
            name: name.into(),
            elem_type,
            byte_order: None,
        }
    }

    /// Use a device specific byte order instead of the type's default.
    #[must_use]
    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = Some(byte_order);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn elem_type(&self) -> ElemType {
        self.elem_type
    }

    /// The configured byte order, if any.
    #[must_use]
    pub const fn configured_byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }

    /// The byte order applied when encoding and decoding.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder {
        match self.byte_order {
            Some(order) => order,
            None => ByteOrder::default_for(self.elem_type),
        }
    }

    /// Number of registers the element occupies in a register table.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.elem_type.reg_len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Check the configured byte order against the element size.
    pub const fn validate(&self) -> Result<(), Error> {
        match self.byte_order {
            Some(order) if order.len() != self.elem_type.byte_len() => {
                Err(Error::InvalidByteOrder)
            }
            _ => Ok(()),
        }
    }

    /// Decode the element from its register bytes.
    pub fn decode(&self, regs: &[u8]) -> Result<Value, Error> {
        let mut value = [0; 8];
        let len = self.elem_type.byte_len();
        self.byte_order().decode(regs, &mut value[..len])?;
        Ok(Value::from_value_bytes(self.elem_type, &value[..len]))
    }

    /// Encode a value into the element's register bytes.
    pub fn encode(&self, value: Value, regs: &mut [u8]) -> Result<(), Error> {
        if value.elem_type() != self.elem_type {
            return Err(Error::ValueType(self.elem_type, value.elem_type()));
        }
        let mut buf = [0; 8];
        let len = value.to_value_bytes(&mut buf);
        self.byte_order().encode(&buf[..len], regs)
    }
}
