use std::fmt;
use stun_nat::host::Host;

/// NAT topology, as classified by RFC 3489.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NatType {
    Error,
    Unknown,
    None,
    Blocked,
    Full,
    Symmetric,
    Restricted,
    PortRestricted,
    SymmetricUdpFirewall,
}

impl fmt::Display for NatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NatType::Error => "Test failed",
            NatType::Unknown => "Unexpected response from the STUN server",
            NatType::None => "Not behind a NAT",
            NatType::Blocked => "UDP is blocked",
            NatType::Full => "Full cone NAT",
            NatType::Symmetric => "Symmetric NAT",
            NatType::Restricted => "Restricted NAT",
            NatType::PortRestricted => "Port restricted NAT",
            NatType::SymmetricUdpFirewall => "Symmetric UDP firewall",
        };
        write!(f, "{}", s)
    }
}

/// Mapping or filtering behavior, RFC 4787 terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BehaviorType {
    Unknown,
    EndpointIndependent,
    AddressDependent,
    AddressAndPortDependent,
}

impl fmt::Display for BehaviorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BehaviorType::Unknown => "Unknown",
            BehaviorType::EndpointIndependent => "Endpoint-Independent",
            BehaviorType::AddressDependent => "Address-Dependent",
            BehaviorType::AddressAndPortDependent => "Address and Port-Dependent",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatBehavior {
    pub mapping: BehaviorType,
    pub filtering: BehaviorType,
    // None: 第一个请求没有响应
    pub host: Option<Host>,
    pub identical: bool,
}

impl NatBehavior {
    pub fn blocked() -> Self {
        Self {
            mapping: BehaviorType::Unknown,
            filtering: BehaviorType::Unknown,
            host: None,
            identical: false,
        }
    }

    /// Folds the two behaviors back into the RFC 3489 classification.
    pub fn normal_type(&self) -> NatType {
        if self.host.is_none() {
            return NatType::Blocked;
        }

        if self.identical {
            return match self.filtering {
                BehaviorType::EndpointIndependent => NatType::None,
                _ => NatType::SymmetricUdpFirewall,
            };
        }

        match self.mapping {
            BehaviorType::EndpointIndependent => match self.filtering {
                BehaviorType::EndpointIndependent => NatType::Full,
                BehaviorType::AddressDependent => NatType::Restricted,
                BehaviorType::AddressAndPortDependent => NatType::PortRestricted,
                BehaviorType::Unknown => NatType::Unknown,
            },
            BehaviorType::AddressDependent | BehaviorType::AddressAndPortDependent => {
                NatType::Symmetric
            }
            BehaviorType::Unknown => NatType::Unknown,
        }
    }
}
