//! Datapoint records carried in status reports and commands.
//!
//! A datapoint is `id (1) | type (1) | len (2, big-endian) | data[len]`.
//! Report payloads may carry several records back to back.

use crate::constants::*;
use crate::error::ProtocolError;
use crate::types::DataType;

/// The fixed four-byte prefix of a datapoint record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatapointHeader {
    /// Datapoint id.
    pub id: u8,
    /// Type tag.
    pub data_type: DataType,
    /// Declared body length.
    pub len: u16,
}

impl DatapointHeader {
    /// Parse the header at the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < DP_HEADER_LEN {
            return Err(ProtocolError::PayloadTooShort {
                expected: DP_HEADER_LEN,
                actual: bytes.len(),
            });
        }
        Ok(DatapointHeader {
            id: bytes[0],
            data_type: DataType::from(bytes[1]),
            len: u16::from_be_bytes([bytes[2], bytes[3]]),
        })
    }

    /// Serialize the header.
    pub fn encode(&self) -> [u8; DP_HEADER_LEN] {
        let [hi, lo] = self.len.to_be_bytes();
        [self.id, self.data_type.into(), hi, lo]
    }
}

/// A datapoint record with its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datapoint {
    /// Datapoint id.
    pub id: u8,
    /// Type tag.
    pub data_type: DataType,
    /// Body bytes.
    pub data: Vec<u8>,
}

impl Datapoint {
    /// A raw datapoint.
    pub fn raw(id: u8, data: &[u8]) -> Self {
        Datapoint {
            id,
            data_type: DataType::Raw,
            data: data.to_vec(),
        }
    }

    /// A boolean datapoint.
    pub fn boolean(id: u8, value: bool) -> Self {
        Datapoint {
            id,
            data_type: DataType::Boolean,
            data: vec![value as u8],
        }
    }

    /// A 32-bit value datapoint.
    pub fn value(id: u8, value: i32) -> Self {
        Datapoint {
            id,
            data_type: DataType::Value,
            data: value.to_be_bytes().to_vec(),
        }
    }

    /// A string datapoint.
    pub fn string(id: u8, value: &str) -> Self {
        Datapoint {
            id,
            data_type: DataType::String,
            data: value.as_bytes().to_vec(),
        }
    }

    /// An enumeration datapoint.
    pub fn enumeration(id: u8, value: u8) -> Self {
        Datapoint {
            id,
            data_type: DataType::Enum,
            data: vec![value],
        }
    }

    /// A four-byte bitmap datapoint.
    pub fn bitmap(id: u8, value: u32) -> Self {
        Datapoint {
            id,
            data_type: DataType::Bitmap,
            data: value.to_be_bytes().to_vec(),
        }
    }

    /// Header describing this record.
    pub fn header(&self) -> DatapointHeader {
        DatapointHeader {
            id: self.id,
            data_type: self.data_type,
            len: self.data.len() as u16,
        }
    }

    /// Parse one record from the start of `bytes`.
    ///
    /// Returns the record and the number of bytes it occupied.
    pub fn decode(bytes: &[u8]) -> Result<(Self, usize), ProtocolError> {
        let header = DatapointHeader::decode(bytes)?;
        let end = DP_HEADER_LEN + header.len as usize;
        if bytes.len() < end {
            return Err(ProtocolError::PayloadTooShort {
                expected: end,
                actual: bytes.len(),
            });
        }
        Ok((
            Datapoint {
                id: header.id,
                data_type: header.data_type,
                data: bytes[DP_HEADER_LEN..end].to_vec(),
            },
            end,
        ))
    }

    /// Parse every record in a report payload.
    pub fn decode_all(mut bytes: &[u8]) -> Result<Vec<Self>, ProtocolError> {
        let mut records = Vec::new();
        while !bytes.is_empty() {
            let (record, used) = Self::decode(bytes)?;
            records.push(record);
            bytes = &bytes[used..];
        }
        Ok(records)
    }

    /// Append the wire form of this record to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.header().encode());
        buf.extend_from_slice(&self.data);
    }

    /// Wire form of this record.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(DP_HEADER_LEN + self.data.len());
        self.encode_into(&mut buf);
        buf
    }

    fn expect_type(&self, expected: DataType) -> Result<(), ProtocolError> {
        if self.data_type == expected {
            Ok(())
        } else {
            Err(ProtocolError::UnexpectedDataType {
                expected,
                actual: self.data_type,
            })
        }
    }

    fn expect_len(&self, expected: usize) -> Result<(), ProtocolError> {
        if self.data.len() < expected {
            return Err(ProtocolError::PayloadTooShort {
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    /// Body of a `Value` datapoint as a signed integer.
    pub fn as_value(&self) -> Result<i32, ProtocolError> {
        self.expect_type(DataType::Value)?;
        self.expect_len(DP_VALUE_LEN)?;
        Ok(i32::from_be_bytes([
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[3],
        ]))
    }

    /// Body of a `Boolean` datapoint.
    pub fn as_bool(&self) -> Result<bool, ProtocolError> {
        self.expect_type(DataType::Boolean)?;
        self.expect_len(1)?;
        Ok(self.data[0] != 0)
    }

    /// Body of an `Enum` datapoint.
    pub fn as_enum(&self) -> Result<u8, ProtocolError> {
        self.expect_type(DataType::Enum)?;
        self.expect_len(1)?;
        Ok(self.data[0])
    }

    /// Body of a `Bitmap` datapoint, widened to 32 bits.
    pub fn as_bitmap(&self) -> Result<u32, ProtocolError> {
        self.expect_type(DataType::Bitmap)?;
        match self.data.len() {
            1 | 2 | 4 => Ok(self
                .data
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | u32::from(b))),
            other => Err(ProtocolError::InvalidData(format!(
                "bitmap body of {} bytes",
                other
            ))),
        }
    }

    /// Body of a `String` datapoint.
    pub fn as_str(&self) -> Result<&str, ProtocolError> {
        self.expect_type(DataType::String)?;
        std::str::from_utf8(&self.data).map_err(|_| ProtocolError::InvalidUtf8)
    }
}
