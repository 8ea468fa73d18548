use crate::attrs::RawAttr;
use crate::error::ParsePacketErr;
use crate::host::Host;
use bytes::{BufMut, Bytes, BytesMut};
use std::net::IpAddr;

// 地址类的attribute
//
// mapped-address  changed-address  source-address  other-address

// ipv4: family: 0x01, 4 bytes
// ipv6: family: 0x02, 16 bytes

#[derive(Debug, Clone)]
pub struct AddressAttr {
    pub attr_type: u16,
    pub address: Host,
}

impl AddressAttr {
    pub fn new(attr_type: u16, address: Host) -> Self {
        Self { attr_type, address }
    }
}

// reserved(1) family(1) port(2) address(4|16)
pub fn encode_address(host: &Host) -> Bytes {
    let ip_len = host.family().ip_len();
    let mut buf = BytesMut::with_capacity(4 + ip_len);

    buf.put_u8(0);
    buf.put_u8(host.family().to_wire());
    buf.put_u16(host.port());
    match host.ip() {
        IpAddr::V4(ip) => buf.put_slice(&ip.octets()),
        IpAddr::V6(ip) => buf.put_slice(&ip.octets()),
    }

    buf.freeze()
}

pub fn decode_address(value: &[u8]) -> Result<Host, ParsePacketErr> {
    Host::from_bytes(value)
}

impl From<AddressAttr> for RawAttr {
    fn from(attr: AddressAttr) -> Self {
        RawAttr::new(attr.attr_type, &encode_address(&attr.address))
    }
}

impl TryFrom<&RawAttr> for AddressAttr {
    type Error = ParsePacketErr;

    fn try_from(raw: &RawAttr) -> Result<Self, Self::Error> {
        let address = decode_address(&raw.value)?;
        Ok(Self {
            attr_type: raw.attr_type,
            address,
        })
    }
}
