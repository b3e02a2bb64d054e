// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use core::{fmt, str::FromStr};

use super::ElemType;
use crate::error::Error;

/// Largest element: 4 registers.
pub const MAX_ORDER_LEN: usize = 8;

/// Layout of an element's bytes inside its registers.
///
/// `order[i]` is the position in the register bytes that receives byte
/// `i` of the big-endian value representation. The identity order
/// therefore is big-endian within each register with the most
/// significant register first.
///
/// Parsed from a digit string (`"2301"`, one position per value byte)
/// or from a letter string (`"CDAB"`, the value bytes `A`..`H` as they
/// appear in the registers).
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "alloc::string::String", into = "alloc::string::String")
)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteOrder {
    order: [u8; MAX_ORDER_LEN],
    len: u8,
}

impl ByteOrder {
    /// Validate a permutation of `0..order.len()`.
    pub fn new(order: &[u8]) -> Result<Self, Error> {
        if order.is_empty() || order.len() > MAX_ORDER_LEN {
            return Err(Error::InvalidByteOrder);
        }
        let mut seen = [false; MAX_ORDER_LEN];
        for &pos in order {
            let pos = pos as usize;
            if pos >= order.len() || seen[pos] {
                return Err(Error::InvalidByteOrder);
            }
            seen[pos] = true;
        }
        let mut buf = [0; MAX_ORDER_LEN];
        buf[..order.len()].copy_from_slice(order);
        Ok(Self {
            order: buf,
            len: order.len() as u8,
        })
    }

    /// The identity order of `len` bytes.
    #[must_use]
    pub const fn identity(len: usize) -> Self {
        let len = if len > MAX_ORDER_LEN { MAX_ORDER_LEN } else { len };
        let mut order = [0; MAX_ORDER_LEN];
        let mut i = 0;
        while i < len {
            order[i] = i as u8;
            i += 1;
        }
        Self {
            order,
            len: len as u8,
        }
    }

    /// Big-endian registers in ascending address order.
    #[must_use]
    pub const fn default_for(elem_type: ElemType) -> Self {
        Self::identity(elem_type.byte_len())
    }

    /// Number of bytes the order covers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.order[..self.len()]
    }

    /// Place the value bytes into register bytes.
    pub fn encode(&self, value: &[u8], regs: &mut [u8]) -> Result<(), Error> {
        if value.len() != self.len() || regs.len() != self.len() {
            return Err(Error::InvalidByteOrder);
        }
        for (i, &pos) in self.as_slice().iter().enumerate() {
            regs[pos as usize] = value[i];
        }
        Ok(())
    }

    /// Gather the value bytes out of register bytes.
    pub fn decode(&self, regs: &[u8], value: &mut [u8]) -> Result<(), Error> {
        if value.len() != self.len() || regs.len() != self.len() {
            return Err(Error::InvalidByteOrder);
        }
        for (i, &pos) in self.as_slice().iter().enumerate() {
            value[i] = regs[pos as usize];
        }
        Ok(())
    }
}

impl fmt::Debug for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteOrder({self})")
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in self.as_slice() {
            write!(f, "{pos}")?;
        }
        Ok(())
    }
}

impl FromStr for ByteOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().as_bytes();
        if s.is_empty() || s.len() > MAX_ORDER_LEN {
            return Err(Error::InvalidByteOrder);
        }
        let mut order = [0; MAX_ORDER_LEN];
        if s.iter().all(u8::is_ascii_digit) {
            for (i, c) in s.iter().enumerate() {
                order[i] = c - b'0';
            }
        } else {
            // Letters name the value bytes, their index is the position.
            let mut found = [false; MAX_ORDER_LEN];
            for (pos, c) in s.iter().enumerate() {
                let byte = match c.to_ascii_uppercase() {
                    c @ b'A'..=b'H' => (c - b'A') as usize,
                    _ => return Err(Error::InvalidByteOrder),
                };
                if byte >= s.len() || found[byte] {
                    return Err(Error::InvalidByteOrder);
                }
                found[byte] = true;
                order[byte] = pos as u8;
            }
        }
        Self::new(&order[..s.len()])
    }
}

impl TryFrom<alloc::string::String> for ByteOrder {
    type Error = Error;

    fn try_from(s: alloc::string::String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ByteOrder> for alloc::string::String {
    fn from(order: ByteOrder) -> Self {
        use alloc::string::ToString;
        order.to_string()
    }
}
