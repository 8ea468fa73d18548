use async_trait::async_trait;
use log::{debug, warn};
use std::net::SocketAddr;
use stun_nat::attrs::address_attr::AddressAttr;
use stun_nat::attrs::change_request::ChangeRequest;
use stun_nat::attrs::errcode_attr::ErrcodeAttr;
use stun_nat::attrs::xor_address::XorMappedAddress;
use stun_nat::constants::*;
use stun_nat::host::Host;
use stun_nat::message::Message;
use stun_nat::util::new_trans_id;

use crate::error::ProbeError;
use crate::response::Response;
use crate::socket::StunSocket;
use crate::transport::{send_request, Received, RetryPolicy};

/// The three binding tests of RFC 3489, 10.1.
#[async_trait]
pub trait Probes: Send {
    /// Plain binding request. Fills in the mapped and changed addresses.
    async fn test1(&mut self, dest: SocketAddr) -> Result<Response, ProbeError>;

    /// Binding request asking the server to answer from the other IP and port.
    async fn test2(&mut self, dest: SocketAddr) -> Result<Response, ProbeError>;

    /// Binding request asking the server to answer from the other port.
    async fn test3(&mut self, dest: SocketAddr) -> Result<Response, ProbeError>;
}

pub struct Prober<'a, S: ?Sized> {
    socket: &'a S,
    software: &'a str,
    policy: RetryPolicy,
}

impl<'a, S> Prober<'a, S>
where
    S: StunSocket + ?Sized,
{
    pub fn new(socket: &'a S, software: &'a str, policy: RetryPolicy) -> Self {
        Self {
            socket,
            software,
            policy,
        }
    }

    async fn send_binding_request(
        &self,
        dest: SocketAddr,
        change_request: Option<ChangeRequest>,
    ) -> Result<Option<Received>, ProbeError> {
        let request = Message::binding_request(new_trans_id(), self.software, change_request);
        let received = send_request(self.socket, &request, dest, &self.policy).await?;

        if let Some(v) = &received {
            debug!("received from: {}", v.from);
            if v.message.header.is_error_response() {
                warn!("error response from {}, {}", v.from, describe_error(&v.message));
            }
        }
        Ok(received)
    }

    async fn presence_only(
        &self,
        dest: SocketAddr,
        change_request: ChangeRequest,
    ) -> Result<Response, ProbeError> {
        let received = self
            .send_binding_request(dest, Some(change_request))
            .await?;

        Ok(match received {
            None => Response::none(),
            Some(v) => Response {
                message: Some(v.message),
                server_addr: Some(v.from),
                ..Response::default()
            },
        })
    }
}

#[async_trait]
impl<'a, S> Probes for Prober<'a, S>
where
    S: StunSocket + ?Sized,
{
    async fn test1(&mut self, dest: SocketAddr) -> Result<Response, ProbeError> {
        let received = match self.send_binding_request(dest, None).await? {
            None => return Ok(Response::none()),
            Some(v) => v,
        };

        let message = received.message;
        if message.header.is_error_response() {
            return Err(ProbeError::protocol(format!(
                "binding error response, {}",
                describe_error(&message)
            )));
        }

        // RFC 3489 doesn't require the server return XOR mapped address.
        let mapped_addr = find_mapped_address(&message)
            .ok_or_else(|| ProbeError::protocol("no mapped address"))?;

        let local_addr = self.socket.local_addr()?;
        let identical = local_addr.to_string() == mapped_addr.transport_addr();

        let changed_addr = find_changed_address(&message);

        debug!(
            "mapped: {}, changed: {:?}, identical: {}",
            mapped_addr, changed_addr, identical
        );

        Ok(Response {
            message: Some(message),
            server_addr: Some(received.from),
            mapped_addr: Some(mapped_addr),
            changed_addr,
            identical,
        })
    }

    async fn test2(&mut self, dest: SocketAddr) -> Result<Response, ProbeError> {
        self.presence_only(dest, ChangeRequest::new(true, true))
            .await
    }

    async fn test3(&mut self, dest: SocketAddr) -> Result<Response, ProbeError> {
        self.presence_only(dest, ChangeRequest::new(false, true))
            .await
    }
}

/// XOR-MAPPED-ADDRESS (either type code) first, then MAPPED-ADDRESS.
pub fn find_mapped_address(message: &Message) -> Option<Host> {
    let xor = message
        .attrs
        .iter()
        .find(|v| XorMappedAddress::is_xor_mapped(v.attr_type))
        .and_then(|raw| XorMappedAddress::from_raw_attr(raw, MAGIC_COOKIE).ok())
        .map(|v| v.address);

    xor.or_else(|| find_address(message, ATTR_MAPPED_ADDRESS))
}

/// CHANGED-ADDRESS, or OTHER-ADDRESS from an RFC 5780 server.
pub fn find_changed_address(message: &Message) -> Option<Host> {
    find_address(message, ATTR_CHANGED_ADDRESS)
        .or_else(|| find_address(message, ATTR_OTHER_ADDRESS))
}

fn find_address(message: &Message, attr_type: u16) -> Option<Host> {
    let raw = message.find_attr(attr_type)?;
    match AddressAttr::try_from(raw) {
        Ok(v) => Some(v.address),
        Err(e) => {
            debug!("bad address attr: {:#06x}, {}", attr_type, e);
            None
        }
    }
}

fn describe_error(message: &Message) -> String {
    match message.find_attr(ATTR_ERROR_CODE).map(ErrcodeAttr::try_from) {
        Some(Ok(v)) => format!("{} {}", v.code, v.reason),
        Some(Err(e)) => format!("bad error code attr, {}", e),
        None => "no error code".to_string(),
    }
}
