// SPDX-FileCopyrightText: Copyright (c) 2018-2025 slowtec GmbH <post@slowtec.de>
// SPDX-License-Identifier: MIT OR Apache-2.0

use alloc::{string::String, vec, vec::Vec};

use byteorder::{BigEndian, ByteOrder as _};

use super::*;
use crate::util::*;

type Result<T> = core::result::Result<T, Error>;

/// Configuration of one request: a table range and the elements in it.
///
/// A data unit is turned into a [`RequestPdu`] once per configuration
/// change by [`DataUnit::init_request`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataUnit {
    name: String,
    table: TableType,
    address: Address,
    op: Operation,
    elems: Vec<Elem>,
    values: Vec<Value>,
}

impl DataUnit {
    /// A read request starting at `address`.
    pub fn read(name: impl Into<String>, table: TableType, address: Address) -> Self {
        Self::new(name, table, address, Operation::Read)
    }

    /// A write request for a single coil or register.
    pub fn write_single(
        name: impl Into<String>,
        table: TableType,
        address: Address,
        elem: Elem,
        value: Value,
    ) -> Self {
        Self::new(name, table, address, Operation::WriteSingle).with_value(elem, value)
    }

    /// A write request for consecutive coils or registers.
    pub fn write_multiple(name: impl Into<String>, table: TableType, address: Address) -> Self {
        Self::new(name, table, address, Operation::WriteMultiple)
    }

    pub fn new(name: impl Into<String>, table: TableType, address: Address, op: Operation) -> Self {
        Self {
            name: name.into(),
            table,
            address,
            op,
            elems: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append an element to a read request.
    #[must_use]
    pub fn with_elem(mut self, elem: Elem) -> Self {
        self.push_elem(elem);
        self
    }

    /// Append an element and the value to write.
    #[must_use]
    pub fn with_value(mut self, elem: Elem, value: Value) -> Self {
        self.push_value(elem, value);
        self
    }

    pub fn push_elem(&mut self, elem: Elem) {
        self.elems.push(elem);
    }

    pub fn push_value(&mut self, elem: Elem, value: Value) {
        self.elems.push(elem);
        self.values.push(value);
    }

    /// Append `count` bits, named by their address.
    #[must_use]
    pub fn with_bits(mut self, count: usize) -> Self {
        let start = usize::from(self.address) + self.elems.len();
        self.elems
            .extend((start..start + count).map(|addr| Elem::new(alloc::format!("{addr}"), ElemType::Bool)));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn table_type(&self) -> TableType {
        self.table
    }

    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.op
    }

    #[must_use]
    pub fn elems(&self) -> &[Elem] {
        &self.elems
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of bits or registers the unit addresses.
    #[must_use]
    pub fn quantity(&self) -> usize {
        if self.table.is_bits() {
            self.elems.len()
        } else {
            self.elems.iter().map(Elem::len).sum()
        }
    }

    fn max_quantity(&self) -> usize {
        match self.op {
            Operation::Read => self.table.max_elem_count(),
            Operation::WriteSingle => 1,
            Operation::WriteMultiple => self.table.max_write_count(),
        }
    }

    fn validate(&self) -> Result<(FunctionCode, Quantity)> {
        let func_code = FunctionCode::for_request(self.table, self.op)
            .ok_or(Error::ReadOnlyTable(self.table))?;
        for elem in &self.elems {
            if self.table.is_bits() && elem.elem_type() != ElemType::Bool {
                return Err(Error::ElemType(elem.elem_type(), self.table));
            }
            elem.validate()?;
        }
        match self.op {
            Operation::Read if !self.values.is_empty() => {
                return Err(Error::Config("values given for a read request"));
            }
            Operation::WriteSingle | Operation::WriteMultiple
                if self.values.len() != self.elems.len() =>
            {
                return Err(Error::MissingValue);
            }
            _ => {}
        }
        for (elem, value) in self.elems.iter().zip(&self.values) {
            if elem.elem_type() != value.elem_type() {
                return Err(Error::ValueType(elem.elem_type(), value.elem_type()));
            }
        }
        let quantity = self.quantity();
        let max = self.max_quantity();
        if quantity == 0 || quantity > max {
            return Err(Error::CapacityExceeded(quantity, max));
        }
        if usize::from(self.address) + quantity > usize::from(Address::MAX) + 1 {
            return Err(Error::AddressOverflow(self.address, quantity));
        }
        Ok((func_code, quantity as Quantity))
    }

    /// Build the request PDU.
    ///
    /// Fails if the unit can never be sent, e.g. because it addresses
    /// too many elements or a byte order does not fit its element.
    pub fn init_request(self) -> Result<RequestPdu> {
        let (func_code, quantity) = self.validate().inspect_err(|_err| {
            #[cfg(feature = "log")]
            log::warn!("Invalid data unit '{}': {_err}", self.name);
        })?;
        let pdu = self.encode_pdu(func_code, quantity)?;
        let resp_pdu_len = match self.op {
            Operation::Read if self.table.is_bits() => 2 + packed_coils_len(quantity.into()),
            Operation::Read => 2 + 2 * usize::from(quantity),
            Operation::WriteSingle | Operation::WriteMultiple => 5,
        };
        #[cfg(feature = "log")]
        log::debug!(
            "Data unit '{}': function code 0x{:0>2X}, {quantity} element(s), request {:X?}",
            self.name,
            func_code.value(),
            pdu
        );
        Ok(RequestPdu {
            unit: self,
            func_code,
            quantity,
            pdu,
            resp_pdu_len,
        })
    }

    fn encode_pdu(&self, func_code: FunctionCode, quantity: Quantity) -> Result<Vec<u8>> {
        let mut buf = vec![0; 5];
        buf[0] = func_code.value();
        BigEndian::write_u16(&mut buf[1..3], self.address);
        match func_code {
            FunctionCode::WriteSingleCoil => {
                let Some(Value::Bool(state)) = self.values.first() else {
                    return Err(Error::MissingValue);
                };
                BigEndian::write_u16(&mut buf[3..5], bool_to_u16_coil(*state));
            }
            FunctionCode::WriteSingleRegister => {
                let (Some(elem), Some(value)) = (self.elems.first(), self.values.first()) else {
                    return Err(Error::MissingValue);
                };
                elem.encode(*value, &mut buf[3..5])?;
            }
            FunctionCode::WriteMultipleCoils => {
                BigEndian::write_u16(&mut buf[3..5], quantity);
                let coils = self
                    .values
                    .iter()
                    .map(|v| matches!(v, Value::Bool(true)))
                    .collect::<Vec<_>>();
                let byte_count = packed_coils_len(coils.len());
                buf.push(byte_count as u8);
                buf.resize(6 + byte_count, 0);
                pack_coils(&coils, &mut buf[6..])?;
            }
            FunctionCode::WriteMultipleRegisters => {
                BigEndian::write_u16(&mut buf[3..5], quantity);
                let byte_count = usize::from(quantity) * 2;
                buf.push(byte_count as u8);
                buf.resize(6 + byte_count, 0);
                let mut offset = 6;
                for (elem, value) in self.elems.iter().zip(&self.values) {
                    let end = offset + elem.len() * 2;
                    elem.encode(*value, &mut buf[offset..end])?;
                    offset = end;
                }
            }
            _ => BigEndian::write_u16(&mut buf[3..5], quantity),
        }
        Ok(buf)
    }
}

/// Validated payload of a successful response.
#[cfg_attr(all(feature = "defmt", target_os = "none"), derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response<'r> {
    /// Packed bits of a discrete inputs or coils read.
    Bits(&'r [u8]),
    /// Register bytes of an input or holding registers read.
    Registers(&'r [u8]),
    /// Echo of a write request: start address and the written value or quantity.
    Written(Address, u16),
}

/// A data unit with its request PDU and the expected response length.
///
/// Immutable once built; it can be framed for any transport with
/// [`RequestPdu::init_request_adu`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPdu {
    unit: DataUnit,
    func_code: FunctionCode,
    quantity: Quantity,
    pdu: Vec<u8>,
    resp_pdu_len: usize,
}

impl RequestPdu {
    #[must_use]
    pub const fn unit(&self) -> &DataUnit {
        &self.unit
    }

    /// Give the configuration back, e.g. to modify and rebuild it.
    #[must_use]
    pub fn into_unit(self) -> DataUnit {
        self.unit
    }

    #[must_use]
    pub const fn func_code(&self) -> FunctionCode {
        self.func_code
    }

    #[must_use]
    pub const fn exception_func_code(&self) -> u8 {
        self.func_code.exception_value()
    }

    /// Number of bits or registers requested.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// The serialized request PDU.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pdu
    }

    /// Length of a successful response PDU, function code included.
    #[must_use]
    pub const fn resp_pdu_len(&self) -> usize {
        self.resp_pdu_len
    }

    /// Validate a response PDU against this request.
    pub fn decode_response<'r>(&self, buf: &'r [u8]) -> Result<Response<'r>> {
        let res = self.decode_response_pdu(buf);
        #[cfg(feature = "log")]
        if let Err(err) = res {
            log::warn!("Data unit '{}': {err}", self.unit.name);
        }
        res
    }

    fn decode_response_pdu<'r>(&self, buf: &'r [u8]) -> Result<Response<'r>> {
        let Some(&fn_code) = buf.first() else {
            return Err(Error::UnexpectedLength {
                expected: self.resp_pdu_len,
                actual: 0,
            });
        };
        if fn_code == self.func_code.value() {
            if buf.len() != self.resp_pdu_len {
                return Err(Error::UnexpectedLength {
                    expected: self.resp_pdu_len,
                    actual: buf.len(),
                });
            }
            return self.decode_payload(buf);
        }
        if fn_code == self.exception_func_code() {
            if buf.len() != 2 {
                return Err(Error::UnexpectedLength {
                    expected: 2,
                    actual: buf.len(),
                });
            }
            let code = buf[1];
            return Err(Error::DeviceException {
                code,
                description: Exception::describe(code),
            });
        }
        Err(Error::UnexpectedFunctionCode {
            expected: self.func_code.value(),
            actual: fn_code,
        })
    }

    fn decode_payload<'r>(&self, buf: &'r [u8]) -> Result<Response<'r>> {
        use FunctionCode as f;

        match self.func_code {
            f::ReadCoils | f::ReadDiscreteInputs | f::ReadInputRegisters | f::ReadHoldingRegisters => {
                let byte_count = buf[1];
                if usize::from(byte_count) != buf.len() - 2 {
                    return Err(Error::ByteCount(byte_count));
                }
                let data = &buf[2..];
                if self.unit.table.is_bits() {
                    Ok(Response::Bits(data))
                } else {
                    Ok(Response::Registers(data))
                }
            }
            _ => {
                if buf[..5] != self.pdu[..5] {
                    return Err(Error::EchoMismatch);
                }
                Ok(Response::Written(
                    BigEndian::read_u16(&buf[1..3]),
                    BigEndian::read_u16(&buf[3..5]),
                ))
            }
        }
    }

    /// Extract the element values out of a validated response.
    ///
    /// Write responses carry no values. A payload too short for the
    /// elements yields an error and ends the iteration.
    #[must_use]
    pub fn values<'r>(&'r self, rsp: Response<'r>) -> Values<'r> {
        Values {
            elems: &self.unit.elems,
            rsp,
            idx: 0,
            offset: 0,
        }
    }
}

/// Iterator over the element values of a response.
#[derive(Debug, Clone)]
pub struct Values<'r> {
    elems: &'r [Elem],
    rsp: Response<'r>,
    idx: usize,
    // bit or byte cursor into the payload
    offset: usize,
}

impl Values<'_> {
    fn next_bit(&mut self, data: &[u8]) -> Result<Value> {
        let bit = coil_at(data, self.offset).ok_or(Error::UnexpectedLength {
            expected: packed_coils_len(self.offset + 1),
            actual: data.len(),
        })?;
        self.offset += 1;
        Ok(Value::Bool(bit))
    }

    fn next_registers(&mut self, data: &[u8], elem: &Elem) -> Result<Value> {
        let end = self.offset + elem.len() * 2;
        let regs = data.get(self.offset..end).ok_or(Error::UnexpectedLength {
            expected: end,
            actual: data.len(),
        })?;
        self.offset = end;
        elem.decode(regs)
    }
}

impl<'r> Iterator for Values<'r> {
    type Item = Result<(&'r Elem, Value)>;

    fn next(&mut self) -> Option<Self::Item> {
        let elem = self.elems.get(self.idx)?;
        let res = match self.rsp {
            Response::Bits(data) => self.next_bit(data),
            Response::Registers(data) => self.next_registers(data, elem),
            Response::Written(..) => return None,
        };
        // the cursor is lost after the first error
        self.idx = if res.is_ok() {
            self.idx + 1
        } else {
            self.elems.len()
        };
        Some(res.map(|value| (elem, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holding_registers(count: usize) -> DataUnit {
        (0..count).fold(
            DataUnit::read("hr", TableType::HoldingRegisters, 0),
            |unit, i| unit.with_elem(Elem::new(alloc::format!("r{i}"), ElemType::UShort)),
        )
    }

    mod init_request {
        use super::*;

        #[test]
        fn read_holding_registers() {
            let pdu = holding_registers(10).init_request().unwrap();
            assert_eq!(pdu.as_bytes(), &[0x03, 0x00, 0x00, 0x00, 0x0A]);
            assert_eq!(pdu.resp_pdu_len(), 22);
            assert_eq!(pdu.func_code(), FunctionCode::ReadHoldingRegisters);
            assert_eq!(pdu.exception_func_code(), 0x83);
            assert_eq!(pdu.quantity(), 10);
        }

        #[test]
        fn read_multi_register_elements() {
            let unit = DataUnit::read("meter", TableType::InputRegisters, 0x1234)
                .with_elem(Elem::new("voltage", ElemType::Float))
                .with_elem(Elem::new("energy", ElemType::Double))
                .with_elem(Elem::new("status", ElemType::UShort));
            let pdu = unit.init_request().unwrap();
            assert_eq!(pdu.as_bytes(), &[0x04, 0x12, 0x34, 0x00, 0x07]);
            assert_eq!(pdu.resp_pdu_len(), 16);
        }

        #[test]
        fn read_coils() {
            let unit = DataUnit::read("c", TableType::Coils, 19).with_bits(19);
            let pdu = unit.init_request().unwrap();
            assert_eq!(pdu.as_bytes(), &[0x01, 0x00, 0x13, 0x00, 0x13]);
            assert_eq!(pdu.resp_pdu_len(), 5);
            assert_eq!(pdu.unit().elems()[0].name(), "19");
            assert_eq!(pdu.unit().elems()[18].name(), "37");
        }

        #[test]
        fn read_discrete_inputs() {
            let unit = DataUnit::read("di", TableType::DiscreteInputs, 0xC4).with_bits(22);
            let pdu = unit.init_request().unwrap();
            assert_eq!(pdu.as_bytes(), &[0x02, 0x00, 0xC4, 0x00, 0x16]);
            assert_eq!(pdu.resp_pdu_len(), 5);
        }

        #[test]
        fn bit_capacity() {
            let unit = DataUnit::read("c", TableType::Coils, 0).with_bits(2000);
            let pdu = unit.init_request().unwrap();
            assert_eq!(pdu.resp_pdu_len(), 252);

            let unit = DataUnit::read("c", TableType::Coils, 0).with_bits(2001);
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::CapacityExceeded(2001, 2000)
            );

            let unit = DataUnit::read("di", TableType::DiscreteInputs, 0).with_bits(2001);
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::CapacityExceeded(2001, 2000)
            );
        }

        #[test]
        fn register_capacity() {
            assert!(holding_registers(125).init_request().is_ok());
            assert_eq!(
                holding_registers(126).init_request().unwrap_err(),
                Error::CapacityExceeded(126, 125)
            );

            // 62 floats + 2 shorts = 126 registers
            let mut unit = DataUnit::read("ir", TableType::InputRegisters, 0);
            for i in 0..62 {
                unit.push_elem(Elem::new(alloc::format!("f{i}"), ElemType::Float));
            }
            let unit = unit
                .with_elem(Elem::new("a", ElemType::Short))
                .with_elem(Elem::new("b", ElemType::Short));
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::CapacityExceeded(126, 125)
            );
        }

        #[test]
        fn empty_unit() {
            let unit = DataUnit::read("empty", TableType::HoldingRegisters, 0);
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::CapacityExceeded(0, 125)
            );
        }

        #[test]
        fn address_overflow() {
            let unit = DataUnit::read("end", TableType::HoldingRegisters, 0xFFFF)
                .with_elem(Elem::new("last", ElemType::UShort));
            assert!(unit.init_request().is_ok());

            let unit = DataUnit::read("end", TableType::HoldingRegisters, 0xFFFF)
                .with_elem(Elem::new("last", ElemType::UInt));
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::AddressOverflow(0xFFFF, 2)
            );
        }

        #[test]
        fn invalid_byte_order() {
            let unit = DataUnit::read("hr", TableType::HoldingRegisters, 0)
                .with_elem(Elem::new("v", ElemType::Double).with_byte_order("CDAB".parse().unwrap()));
            assert_eq!(unit.init_request().unwrap_err(), Error::InvalidByteOrder);
        }

        #[test]
        fn non_bool_in_bit_table() {
            let unit = DataUnit::read("c", TableType::Coils, 0)
                .with_elem(Elem::new("v", ElemType::UShort));
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::ElemType(ElemType::UShort, TableType::Coils)
            );
        }

        #[test]
        fn write_read_only_table() {
            let unit = DataUnit::write_single(
                "ir",
                TableType::InputRegisters,
                0,
                Elem::new("v", ElemType::UShort),
                Value::UShort(1),
            );
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::ReadOnlyTable(TableType::InputRegisters)
            );
        }

        #[test]
        fn write_single_coil() {
            let unit = DataUnit::write_single(
                "pump",
                TableType::Coils,
                0xAC,
                Elem::new("pump", ElemType::Bool),
                Value::Bool(true),
            );
            let pdu = unit.init_request().unwrap();
            assert_eq!(pdu.as_bytes(), &[0x05, 0x00, 0xAC, 0xFF, 0x00]);
            assert_eq!(pdu.resp_pdu_len(), 5);
        }

        #[test]
        fn write_single_register() {
            let unit = DataUnit::write_single(
                "sp",
                TableType::HoldingRegisters,
                0x2222,
                Elem::new("sp", ElemType::UShort),
                Value::UShort(0xABCD),
            );
            let pdu = unit.init_request().unwrap();
            assert_eq!(pdu.as_bytes(), &[0x06, 0x22, 0x22, 0xAB, 0xCD]);
        }

        #[test]
        fn write_single_needs_one_register() {
            let unit = DataUnit::write_single(
                "sp",
                TableType::HoldingRegisters,
                0,
                Elem::new("sp", ElemType::Float),
                Value::Float(1.0),
            );
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::CapacityExceeded(2, 1)
            );
        }

        #[test]
        fn write_multiple_coils() {
            let unit = DataUnit::write_multiple("c", TableType::Coils, 0x13)
                .with_value(Elem::new("0", ElemType::Bool), Value::Bool(true))
                .with_value(Elem::new("1", ElemType::Bool), Value::Bool(false))
                .with_value(Elem::new("2", ElemType::Bool), Value::Bool(true))
                .with_value(Elem::new("3", ElemType::Bool), Value::Bool(true))
                .with_value(Elem::new("4", ElemType::Bool), Value::Bool(false))
                .with_value(Elem::new("5", ElemType::Bool), Value::Bool(false))
                .with_value(Elem::new("6", ElemType::Bool), Value::Bool(true))
                .with_value(Elem::new("7", ElemType::Bool), Value::Bool(true))
                .with_value(Elem::new("8", ElemType::Bool), Value::Bool(true))
                .with_value(Elem::new("9", ElemType::Bool), Value::Bool(false));
            let pdu = unit.init_request().unwrap();
            assert_eq!(
                pdu.as_bytes(),
                &[0x0F, 0x00, 0x13, 0x00, 0x0A, 0x02, 0xCD, 0x01]
            );
            assert_eq!(pdu.resp_pdu_len(), 5);
        }

        #[test]
        fn write_multiple_registers() {
            let unit = DataUnit::write_multiple("sp", TableType::HoldingRegisters, 0x01)
                .with_value(Elem::new("a", ElemType::UShort), Value::UShort(0x000A))
                .with_value(
                    Elem::new("b", ElemType::Float).with_byte_order("CDAB".parse().unwrap()),
                    Value::Float(123.456),
                );
            let pdu = unit.init_request().unwrap();
            assert_eq!(
                pdu.as_bytes(),
                &[0x10, 0x00, 0x01, 0x00, 0x03, 0x06, 0x00, 0x0A, 0xE9, 0x79, 0x42, 0xF6]
            );
        }

        #[test]
        fn write_capacity() {
            let mut unit = DataUnit::write_multiple("sp", TableType::HoldingRegisters, 0);
            for i in 0..124 {
                unit.push_value(Elem::new(alloc::format!("{i}"), ElemType::Short), Value::Short(0));
            }
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::CapacityExceeded(124, 123)
            );
        }

        #[test]
        fn write_missing_value() {
            let unit = DataUnit::write_multiple("sp", TableType::HoldingRegisters, 0)
                .with_value(Elem::new("a", ElemType::UShort), Value::UShort(1))
                .with_elem(Elem::new("b", ElemType::UShort));
            assert_eq!(unit.init_request().unwrap_err(), Error::MissingValue);
        }

        #[test]
        fn write_value_type_mismatch() {
            let unit = DataUnit::write_multiple("sp", TableType::HoldingRegisters, 0)
                .with_value(Elem::new("a", ElemType::UShort), Value::Short(1));
            assert_eq!(
                unit.init_request().unwrap_err(),
                Error::ValueType(ElemType::UShort, ElemType::Short)
            );
        }
    }

    mod decode_response {
        use super::*;

        #[test]
        fn read_holding_registers() {
            let pdu = DataUnit::read("hr", TableType::HoldingRegisters, 0x6B)
                .with_elem(Elem::new("a", ElemType::UShort))
                .with_elem(Elem::new("b", ElemType::Short))
                .with_elem(Elem::new("c", ElemType::UShort))
                .init_request()
                .unwrap();
            let buf = &[0x03, 0x06, 0x02, 0x2B, 0xFF, 0xFE, 0x00, 0x64];
            let rsp = pdu.decode_response(buf).unwrap();
            assert_eq!(rsp, Response::Registers(&buf[2..]));
            let values = pdu
                .values(rsp)
                .map(|v| v.unwrap().1)
                .collect::<Vec<_>>();
            assert_eq!(
                values,
                &[Value::UShort(0x022B), Value::Short(-2), Value::UShort(100)]
            );
        }

        #[test]
        fn read_mixed_elements() {
            let pdu = DataUnit::read("meter", TableType::InputRegisters, 0)
                .with_elem(Elem::new("voltage", ElemType::Float).with_byte_order("CDAB".parse().unwrap()))
                .with_elem(Elem::new("count", ElemType::ULong))
                .with_elem(Elem::new("mode", ElemType::Byte))
                .init_request()
                .unwrap();
            let buf = &[
                0x04, 0x0E, // header
                0xE9, 0x79, 0x42, 0xF6, // voltage
                0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, // count
                0x00, 0x07, // mode
            ];
            let rsp = pdu.decode_response(buf).unwrap();
            let mut values = pdu.values(rsp);
            let (elem, value) = values.next().unwrap().unwrap();
            assert_eq!(elem.name(), "voltage");
            assert_eq!(value, Value::Float(123.456));
            let (elem, value) = values.next().unwrap().unwrap();
            assert_eq!(elem.name(), "count");
            assert_eq!(value, Value::ULong(0x0001_0002));
            assert_eq!(values.next().unwrap().unwrap().1, Value::Byte(7));
            assert!(values.next().is_none());
        }

        #[test]
        fn read_coils() {
            let pdu = DataUnit::read("c", TableType::Coils, 0x13)
                .with_bits(10)
                .init_request()
                .unwrap();
            let buf = &[0x01, 0x02, 0xCD, 0x01];
            let rsp = pdu.decode_response(buf).unwrap();
            let bits = pdu
                .values(rsp)
                .map(|v| v.unwrap().1 == Value::Bool(true))
                .collect::<Vec<_>>();
            assert_eq!(
                bits,
                &[true, false, true, true, false, false, true, true, true, false]
            );
        }

        #[test]
        fn truncated_payload_yields_error() {
            let pdu = DataUnit::read("meter", TableType::InputRegisters, 0)
                .with_elem(Elem::new("a", ElemType::UShort))
                .with_elem(Elem::new("b", ElemType::UInt))
                .init_request()
                .unwrap();
            let mut values = pdu.values(Response::Registers(&[0x00, 0x01, 0x00, 0x02]));
            assert_eq!(values.next().unwrap().unwrap().1, Value::UShort(1));
            assert_eq!(
                values.next().unwrap().unwrap_err(),
                Error::UnexpectedLength {
                    expected: 6,
                    actual: 4
                }
            );
            assert!(values.next().is_none());

            let pdu = DataUnit::read("c", TableType::Coils, 0)
                .with_bits(9)
                .init_request()
                .unwrap();
            let values = pdu.values(Response::Bits(&[0xFF])).collect::<Vec<_>>();
            assert_eq!(values.len(), 9);
            assert!(values[..8].iter().all(Result::is_ok));
            assert_eq!(
                values[8],
                Err(Error::UnexpectedLength {
                    expected: 2,
                    actual: 1
                })
            );
        }

        #[test]
        fn device_exception() {
            let pdu = holding_registers(10).init_request().unwrap();
            assert_eq!(
                pdu.decode_response(&[0x83, 0x02]).unwrap_err(),
                Error::DeviceException {
                    code: 2,
                    description: "Illegal Data Address"
                }
            );
            assert_eq!(
                pdu.decode_response(&[0x83, 0x42]).unwrap_err(),
                Error::DeviceException {
                    code: 0x42,
                    description: "Unknown Exception"
                }
            );
        }

        #[test]
        fn device_exception_with_wrong_length() {
            let pdu = holding_registers(10).init_request().unwrap();
            assert_eq!(
                pdu.decode_response(&[0x83, 0x02, 0x00]).unwrap_err(),
                Error::UnexpectedLength {
                    expected: 2,
                    actual: 3
                }
            );
        }

        #[test]
        fn unexpected_length() {
            let pdu = holding_registers(2).init_request().unwrap();
            assert_eq!(
                pdu.decode_response(&[0x03, 0x04, 0x00, 0x01, 0x00]).unwrap_err(),
                Error::UnexpectedLength {
                    expected: 6,
                    actual: 5
                }
            );
            assert_eq!(
                pdu.decode_response(&[0x03, 0x04, 0x00, 0x01, 0x00, 0x02, 0x00])
                    .unwrap_err(),
                Error::UnexpectedLength {
                    expected: 6,
                    actual: 7
                }
            );
            assert_eq!(
                pdu.decode_response(&[]).unwrap_err(),
                Error::UnexpectedLength {
                    expected: 6,
                    actual: 0
                }
            );
        }

        #[test]
        fn unexpected_function_code() {
            let pdu = holding_registers(2).init_request().unwrap();
            assert_eq!(
                pdu.decode_response(&[0x04, 0x04, 0x00, 0x01, 0x00, 0x02]).unwrap_err(),
                Error::UnexpectedFunctionCode {
                    expected: 0x03,
                    actual: 0x04
                }
            );
            assert_eq!(
                pdu.decode_response(&[0x84, 0x02]).unwrap_err(),
                Error::UnexpectedFunctionCode {
                    expected: 0x03,
                    actual: 0x84
                }
            );
        }

        #[test]
        fn invalid_byte_count() {
            let pdu = holding_registers(2).init_request().unwrap();
            assert_eq!(
                pdu.decode_response(&[0x03, 0x05, 0x00, 0x01, 0x00, 0x02]).unwrap_err(),
                Error::ByteCount(5)
            );
        }

        #[test]
        fn write_echo() {
            let pdu = DataUnit::write_single(
                "sp",
                TableType::HoldingRegisters,
                0x2222,
                Elem::new("sp", ElemType::UShort),
                Value::UShort(0xABCD),
            )
            .init_request()
            .unwrap();
            let rsp = pdu.decode_response(&[0x06, 0x22, 0x22, 0xAB, 0xCD]).unwrap();
            assert_eq!(rsp, Response::Written(0x2222, 0xABCD));
            assert!(pdu.values(rsp).next().is_none());
            assert_eq!(
                pdu.decode_response(&[0x06, 0x22, 0x22, 0xAB, 0xCE]).unwrap_err(),
                Error::EchoMismatch
            );
        }

        #[test]
        fn write_multiple_echo() {
            let pdu = DataUnit::write_multiple("sp", TableType::HoldingRegisters, 0x01)
                .with_value(Elem::new("a", ElemType::UInt), Value::UInt(7))
                .init_request()
                .unwrap();
            let rsp = pdu.decode_response(&[0x10, 0x00, 0x01, 0x00, 0x02]).unwrap();
            assert_eq!(rsp, Response::Written(0x01, 2));
            assert_eq!(
                pdu.decode_response(&[0x10, 0x00, 0x01, 0x00, 0x01]).unwrap_err(),
                Error::EchoMismatch
            );
        }
    }

    #[test]
    fn rebuild_after_config_change() {
        let pdu = holding_registers(2).init_request().unwrap();
        let unit = pdu
            .into_unit()
            .with_elem(Elem::new("r2", ElemType::UShort));
        let pdu = unit.init_request().unwrap();
        assert_eq!(pdu.quantity(), 3);
    }
}
