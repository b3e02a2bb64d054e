// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

#![doc = include_str!("../README.md")]
#![no_std]

extern crate alloc;

mod checksum;
mod codec;
mod config;
mod error;
mod frame;
mod util;

pub use checksum::{crc16, lrc};
#[cfg(feature = "ascii")]
pub use codec::ascii;
#[cfg(feature = "rtu")]
pub use codec::rtu;
#[cfg(feature = "tcp")]
pub use codec::tcp;
pub use codec::RequestAdu;
pub use config::*;
pub use error::*;
pub use frame::*;
