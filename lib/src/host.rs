use crate::constants::{ATTR_FAMILY_IPV4, ATTR_FAMILY_IPV6};
use crate::error::ParsePacketErr;
use crate::util;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    pub fn from_wire(v: u8) -> Result<Self, ParsePacketErr> {
        match v {
            ATTR_FAMILY_IPV4 => Ok(Family::V4),
            ATTR_FAMILY_IPV6 => Ok(Family::V6),
            v => Err(ParsePacketErr::BadValue(format!("ip family: {}", v))),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Family::V4 => ATTR_FAMILY_IPV4,
            Family::V6 => ATTR_FAMILY_IPV6,
        }
    }

    pub fn ip_len(self) -> usize {
        match self {
            Family::V4 => 4,
            Family::V6 => 16,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// A transport address as seen on the wire: address family, IP and port.
///
/// The family always agrees with the IP, so a `Host` can only be built from
/// an [`IpAddr`] or from an address attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Host {
    family: Family,
    ip: IpAddr,
    port: u16,
}

impl Host {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        let family = match ip {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        };
        Self { family, ip, port }
    }

    // value: reserved(1) family(1) port(2) address(4|16)
    pub fn from_bytes(value: &[u8]) -> Result<Self, ParsePacketErr> {
        if value.len() < 4 {
            return Err(ParsePacketErr::BufSize(format!(
                "address buf len:{} < 4",
                value.len()
            )));
        }

        let family = Family::from_wire(value[1])?;
        let port = u16::from_be_bytes([value[2], value[3]]);

        let ip_len = family.ip_len();
        if value.len() < 4 + ip_len {
            return Err(ParsePacketErr::BufSize(format!(
                "{} buf len:{} < {}",
                family,
                value.len() - 4,
                ip_len
            )));
        }

        let ip = match family {
            Family::V4 => {
                let mut addr = [0_u8; 4];
                addr.copy_from_slice(&value[4..8]);
                IpAddr::V4(Ipv4Addr::from(addr))
            }
            Family::V6 => {
                let mut addr = [0_u8; 16];
                addr.copy_from_slice(&value[4..20]);
                IpAddr::V6(Ipv6Addr::from(addr))
            }
        };

        Ok(Self { family, ip, port })
    }

    pub fn from_xor_bytes(value: &[u8], cookie: u32) -> Result<Self, ParsePacketErr> {
        let masked = Self::from_bytes(value)?;
        Ok(masked.xor(cookie))
    }

    /// Applies the cookie mask to the port and the first 32 bits of the IP.
    /// The mask is its own inverse.
    pub fn xor(&self, cookie: u32) -> Self {
        let port = util::xor_port(self.port, cookie);
        let ip = match self.ip {
            IpAddr::V4(v) => {
                let mut octets = v.octets();
                util::xor_ip_bytes(&mut octets, cookie);
                IpAddr::V4(Ipv4Addr::from(octets))
            }
            IpAddr::V6(v) => {
                let mut octets = v.octets();
                util::xor_ip_bytes(&mut octets, cookie);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
        };
        Self::new(ip, port)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    // "1.2.3.4:80", "[::1]:80"
    pub fn transport_addr(&self) -> String {
        self.socket_addr().to_string()
    }
}

impl From<SocketAddr> for Host {
    fn from(addr: SocketAddr) -> Self {
        Host::new(addr.ip(), addr.port())
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.socket_addr())
    }
}
