use std::io;
use stun_nat::host::Host;
use thiserror::Error;

use crate::nat::NatType;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error("can't resolve server address: {0}")]
    Resolution(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ProbeError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        ProbeError::Protocol(msg.into())
    }
}

/// A discovery run that ended in [`NatType::Error`], with the mapped address
/// learned before the failure, if any.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct DiscoverError {
    pub host: Option<Host>,
    #[source]
    pub kind: ProbeError,
}

impl DiscoverError {
    pub fn new(kind: ProbeError, host: Option<Host>) -> Self {
        Self { host, kind }
    }

    pub fn nat_type(&self) -> NatType {
        NatType::Error
    }
}

impl From<ProbeError> for DiscoverError {
    fn from(kind: ProbeError) -> Self {
        Self { host: None, kind }
    }
}
