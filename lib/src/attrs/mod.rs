#![allow(clippy::len_without_is_empty)]

use crate::constants::ATTR_HEADER_LEN;
use crate::error::ParsePacketErr;
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};

pub mod address_attr;
pub mod change_request;
pub mod errcode_attr;
pub mod fingerprint;
pub mod software;
pub mod xor_address;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttr {
    pub attr_type: u16,
    // 补齐后的长度
    pub attr_len: u16,
    pub value: Bytes,
}

impl RawAttr {
    pub fn new(attr_type: u16, value: &[u8]) -> Self {
        let value = util::pad_value(value);
        Self {
            attr_type,
            attr_len: value.len() as u16,
            value,
        }
    }

    pub fn len(&self) -> usize {
        self.attr_len as usize + ATTR_HEADER_LEN
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());

        buf.put_u16(self.attr_type);
        buf.put_u16(self.attr_len);
        buf.put_slice(&self.value);

        buf.freeze()
    }

    /// Decodes one attribute from the front of `buf` and returns it with the
    /// number of bytes consumed.
    pub fn unpack(buf: &[u8]) -> Result<(Self, usize), ParsePacketErr> {
        if buf.len() < ATTR_HEADER_LEN {
            return Err(ParsePacketErr::BufSize(format!(
                "attr buf len:{}",
                buf.len()
            )));
        }

        let attr_type = u16::from_be_bytes([buf[0], buf[1]]);
        let declared = u16::from_be_bytes([buf[2], buf[3]]) as usize;

        if buf.len() < ATTR_HEADER_LEN + declared {
            return Err(ParsePacketErr::BufSize(format!(
                "attr buf len:{} < {}",
                buf.len(),
                declared + ATTR_HEADER_LEN
            )));
        }

        let value = &buf[ATTR_HEADER_LEN..ATTR_HEADER_LEN + declared];

        // 最后一个属性可能没有补齐
        let consumed = util::attr_wire_len(declared).min(buf.len());

        Ok((Self::new(attr_type, value), consumed))
    }
}
