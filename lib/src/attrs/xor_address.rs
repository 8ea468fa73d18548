use crate::attrs::address_attr::{decode_address, encode_address};
use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::ParsePacketErr;
use crate::host::Host;
use bytes::Bytes;

// xor-mapped-address 端口和ip需要混淆
// port 和 magic cookie 的高16位做 xor
// address 的前4个字节和 magic cookie 做 xor

#[derive(Debug, Clone)]
pub struct XorMappedAddress {
    pub attr_type: u16,
    pub address: Host,
    pub cookie: u32,
}

impl XorMappedAddress {
    pub fn new(address: Host) -> Self {
        Self {
            attr_type: ATTR_XOR_MAPPED_ADDRESS,
            address,
            cookie: MAGIC_COOKIE,
        }
    }

    pub fn with_cookie(attr_type: u16, address: Host, cookie: u32) -> Self {
        Self {
            attr_type,
            address,
            cookie,
        }
    }

    pub fn is_xor_mapped(attr_type: u16) -> bool {
        attr_type == ATTR_XOR_MAPPED_ADDRESS || attr_type == ATTR_XOR_MAPPED_ADDRESS_EXP
    }

    pub fn from_raw_attr(raw: &RawAttr, cookie: u32) -> Result<Self, ParsePacketErr> {
        let address = decode_xor_address(&raw.value, cookie)?;
        Ok(Self {
            attr_type: raw.attr_type,
            address,
            cookie,
        })
    }
}

pub fn encode_xor_address(host: &Host, cookie: u32) -> Bytes {
    encode_address(&host.xor(cookie))
}

pub fn decode_xor_address(value: &[u8], cookie: u32) -> Result<Host, ParsePacketErr> {
    Ok(decode_address(value)?.xor(cookie))
}

impl From<XorMappedAddress> for RawAttr {
    fn from(attr: XorMappedAddress) -> Self {
        RawAttr::new(
            attr.attr_type,
            &encode_xor_address(&attr.address, attr.cookie),
        )
    }
}
