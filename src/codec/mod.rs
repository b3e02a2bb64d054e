// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::{borrow::Cow, vec::Vec};

use crate::{error::*, frame::*};

#[cfg(feature = "ascii")]
pub mod ascii;
#[cfg(feature = "rtu")]
pub mod rtu;
#[cfg(feature = "tcp")]
pub mod tcp;

type Result<T> = core::result::Result<T, Error>;

/// A request PDU wrapped for one transport.
///
/// The bytes are immutable and can be sent on every poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestAdu {
    mode: TransMode,
    device: DeviceAddress,
    transaction_id: u16,
    bytes: Vec<u8>,
    resp_pdu_len: usize,
    resp_adu_len: usize,
}

impl RequestPdu {
    /// Wrap the request PDU into the framing of `mode`.
    #[must_use]
    pub fn init_request_adu(&self, mode: TransMode, device: DeviceAddress) -> RequestAdu {
        let pdu = self.as_bytes();
        let resp_pdu_len = self.resp_pdu_len();
        let (bytes, resp_adu_len) = match mode {
            #[cfg(feature = "rtu")]
            TransMode::Rtu => (rtu::encode_request(device, pdu), resp_pdu_len + 3),
            #[cfg(feature = "ascii")]
            TransMode::Ascii => (ascii::encode_request(device, pdu), resp_pdu_len + 2),
            #[cfg(feature = "tcp")]
            TransMode::Tcp => (tcp::encode_request(0, device, pdu), resp_pdu_len + 7),
        };
        #[cfg(feature = "log")]
        log::debug!(
            "Data unit '{}' framed for {mode}, device {device}: {:X?}",
            self.unit().name(),
            bytes
        );
        RequestAdu {
            mode,
            device,
            transaction_id: 0,
            bytes,
            resp_pdu_len,
            resp_adu_len,
        }
    }
}

impl RequestAdu {
    #[must_use]
    pub const fn mode(&self) -> TransMode {
        self.mode
    }

    #[must_use]
    pub const fn device(&self) -> DeviceAddress {
        self.device
    }

    #[must_use]
    pub const fn transaction_id(&self) -> u16 {
        self.transaction_id
    }

    /// Use another MBAP transaction identifier.
    ///
    /// Only TCP frames carry one, other frames are returned unchanged.
    #[must_use]
    pub fn with_transaction_id(mut self, transaction_id: u16) -> Self {
        #[cfg(feature = "tcp")]
        if self.mode == TransMode::Tcp {
            self.bytes[..2].copy_from_slice(&transaction_id.to_be_bytes());
            self.transaction_id = transaction_id;
        }
        #[cfg(not(feature = "tcp"))]
        let _ = transaction_id;
        self
    }

    /// The bytes to send.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of a successful response ADU in binary bytes.
    ///
    /// For ASCII this counts the decoded address, PDU and LRC bytes.
    #[must_use]
    pub const fn resp_adu_len(&self) -> usize {
        self.resp_adu_len
    }

    /// Number of bytes a successful response occupies on the line.
    #[must_use]
    pub const fn resp_frame_len(&self) -> usize {
        match self.mode {
            #[cfg(feature = "ascii")]
            TransMode::Ascii => ascii::frame_len(self.resp_adu_len),
            #[allow(unreachable_patterns)]
            _ => self.resp_adu_len,
        }
    }

    /// Strip the framing off a received response and return its PDU.
    ///
    /// The response must have the expected length or the length of an
    /// exception response. Checksum, header fields and the device address
    /// are verified here, the PDU itself is validated by
    /// [`RequestPdu::decode_response`].
    pub fn extract_pdu<'b>(&self, buf: &'b [u8]) -> Result<Cow<'b, [u8]>> {
        let res = match self.mode {
            #[cfg(feature = "rtu")]
            TransMode::Rtu => self
                .check_adu_len(buf.len())
                .and_then(|()| rtu::extract_pdu(self.device, buf))
                .map(Cow::Borrowed),
            #[cfg(feature = "ascii")]
            TransMode::Ascii => ascii::extract_pdu(self.device, buf).and_then(|pdu| {
                // device address and LRC
                self.check_adu_len(pdu.len() + 2)?;
                Ok(Cow::Owned(pdu))
            }),
            #[cfg(feature = "tcp")]
            TransMode::Tcp => self
                .check_adu_len(buf.len())
                .and_then(|()| tcp::extract_pdu(self.transaction_id, self.device, buf))
                .map(Cow::Borrowed),
        };
        #[cfg(feature = "log")]
        if let Err(err) = &res {
            log::warn!("Failed to extract {} response PDU: {err}", self.mode);
        }
        res
    }

    /// Number of binary bytes an exception response of this request has.
    const fn exception_adu_len(&self) -> usize {
        // function code and exception code
        self.resp_adu_len - self.resp_pdu_len + 2
    }

    const fn check_adu_len(&self, actual: usize) -> Result<()> {
        if actual == self.resp_adu_len || actual == self.exception_adu_len() {
            return Ok(());
        }
        Err(Error::UnexpectedLength {
            expected: self.resp_adu_len,
            actual,
        })
    }
}
