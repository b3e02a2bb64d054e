// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Device configuration as read from configuration files.
//!
//! With the `serde` feature enabled all types can be deserialized, e.g.:
//!
//! ```json
//! {
//!   "address": 1,
//!   "trans_mode": "rtu",
//!   "units": [{
//!     "name": "meter",
//!     "table_type": "input_registers",
//!     "address": 0,
//!     "elems": [
//!       { "name": "voltage", "elem_type": "float", "byte_order": "CDAB" },
//!       { "name": "status" }
//!     ]
//!   }]
//! }
//! ```

use alloc::{string::String, vec::Vec};

use crate::{error::Error, frame::*};

/// One element of a data unit.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElemConfig {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Defaults to `bool` in bit tables and `ushort` in register tables.
    #[cfg_attr(feature = "serde", serde(default))]
    pub elem_type: Option<ElemType>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub byte_order: Option<String>,
    /// Value of a write request.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
}

/// One request of a device.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConfig {
    pub name: String,
    pub table_type: TableType,
    pub address: Address,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operation: Operation,
    #[cfg_attr(feature = "serde", serde(default))]
    pub elems: Vec<ElemConfig>,
}

/// A device on a communication line and its requests.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfig {
    pub address: DeviceAddress,
    pub trans_mode: TransMode,
    #[cfg_attr(feature = "serde", serde(default))]
    pub units: Vec<UnitConfig>,
}

impl ElemConfig {
    fn to_elem(&self, table: TableType) -> Result<Elem, Error> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("element without name"));
        }
        let elem_type = self.elem_type.unwrap_or(if table.is_bits() {
            ElemType::Bool
        } else {
            ElemType::UShort
        });
        let mut elem = Elem::new(self.name.clone(), elem_type);
        if let Some(order) = self.byte_order.as_deref().filter(|s| !s.trim().is_empty()) {
            elem = elem.with_byte_order(order.parse()?);
        }
        Ok(elem)
    }
}

impl TryFrom<&UnitConfig> for DataUnit {
    type Error = Error;

    fn try_from(config: &UnitConfig) -> Result<Self, Self::Error> {
        let mut unit = DataUnit::new(
            config.name.clone(),
            config.table_type,
            config.address,
            config.operation,
        );
        for elem_config in &config.elems {
            let elem = elem_config.to_elem(config.table_type)?;
            match (config.operation, elem_config.value) {
                (Operation::Read, None) => unit.push_elem(elem),
                (Operation::Read, Some(_)) => {
                    return Err(Error::Config("value of a read element"));
                }
                (_, Some(v)) => {
                    let value = Value::from_f64(elem.elem_type(), v);
                    unit.push_value(elem, value);
                }
                (_, None) => return Err(Error::MissingValue),
            }
        }
        Ok(unit)
    }
}

impl UnitConfig {
    /// Build the request PDU of the configured unit.
    pub fn init_request(&self) -> Result<RequestPdu, Error> {
        DataUnit::try_from(self)?.init_request()
    }
}

impl DeviceConfig {
    /// Build and frame all requests of the device.
    ///
    /// The first invalid unit aborts the build.
    pub fn init_requests(&self) -> Result<Vec<(RequestPdu, crate::RequestAdu)>, Error> {
        self.units
            .iter()
            .map(|config| {
                let pdu = config.init_request()?;
                let adu = pdu.init_request_adu(self.trans_mode, self.address);
                Ok((pdu, adu))
            })
            .collect()
    }
}
