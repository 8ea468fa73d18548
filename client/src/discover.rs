use log::{debug, info};
use std::net::SocketAddr;
use stun_nat::host::Host;

use crate::error::{DiscoverError, ProbeError};
use crate::nat::{BehaviorType, NatBehavior, NatType};
use crate::probe::Probes;
use crate::response::Response;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    pub nat_type: NatType,
    // 外部地址, Blocked 时为 None
    pub host: Option<Host>,
}

impl Discovery {
    fn new(nat_type: NatType, host: Option<Host>) -> Self {
        info!("nat type: {}", nat_type);
        Self { nat_type, host }
    }
}

/// Runs the RFC 3489 discovery flow against `server`.
///
/// Every probe is sequential: the next destination depends on what the
/// previous response advertised.
pub async fn discover<P>(probes: &mut P, server: SocketAddr) -> Result<Discovery, DiscoverError>
where
    P: Probes + ?Sized,
{
    debug!("test1, send to: {}", server);
    let resp1 = probes.test1(server).await?;
    if !resp1.received() {
        return Ok(Discovery::new(NatType::Blocked, None));
    }

    let host = resp1.mapped_addr;
    let changed_addr = changed_addr_of(&resp1, host)?;
    let identical = resp1.identical;

    debug!("test2, send to: {}", server);
    let resp2 = probes.test2(server).await.map_err(with_host(host))?;

    if identical {
        return Ok(match resp2.received() {
            true => Discovery::new(NatType::None, host),
            false => Discovery::new(NatType::SymmetricUdpFirewall, host),
        });
    }

    if resp2.received() {
        return Ok(Discovery::new(NatType::Full, host));
    }

    let changed = changed_addr.socket_addr();
    debug!("test1, send to changed address: {}", changed);
    let resp3 = probes.test1(changed).await.map_err(with_host(host))?;
    if !resp3.received() {
        // 第一步已经收到过响应, 正常情况下不会走到这里
        return Ok(Discovery::new(NatType::Unknown, host));
    }

    let ex_ip = host.map(|v| v.ip());
    let host = resp3.mapped_addr.or(host);
    if resp3.mapped_addr.map(|v| v.ip()) != ex_ip {
        return Ok(Discovery::new(NatType::Symmetric, host));
    }

    let change_port_addr = SocketAddr::new(changed_addr.ip(), server.port());
    debug!("test3, send to: {}", change_port_addr);
    let resp4 = probes
        .test3(change_port_addr)
        .await
        .map_err(with_host(host))?;

    Ok(match resp4.received() {
        true => Discovery::new(NatType::Restricted, host),
        false => Discovery::new(NatType::PortRestricted, host),
    })
}

/// Classifies mapping and filtering behavior separately (RFC 5780, 4.3/4.4).
pub async fn behavior_test<P>(
    probes: &mut P,
    server: SocketAddr,
) -> Result<NatBehavior, DiscoverError>
where
    P: Probes + ?Sized,
{
    // (IP1, port1)
    debug!("mapping test I, send to: {}", server);
    let resp1 = probes.test1(server).await?;
    if !resp1.received() {
        return Ok(NatBehavior::blocked());
    }

    let host = resp1.mapped_addr;
    let changed_addr = changed_addr_of(&resp1, host)?;

    let mapping = match resp1.identical {
        true => BehaviorType::EndpointIndependent,
        false => mapping_behavior(probes, server, changed_addr, host)
            .await
            .map_err(with_host(host))?,
    };
    debug!("mapping behavior: {}", mapping);

    debug!("filtering test II, send to: {}", server);
    let filtering = match probes.test2(server).await.map_err(with_host(host))?.received() {
        true => BehaviorType::EndpointIndependent,
        false => {
            debug!("filtering test III, send to: {}", server);
            match probes.test3(server).await.map_err(with_host(host))?.received() {
                true => BehaviorType::AddressDependent,
                false => BehaviorType::AddressAndPortDependent,
            }
        }
    };
    debug!("filtering behavior: {}", filtering);

    let behavior = NatBehavior {
        mapping,
        filtering,
        host,
        identical: resp1.identical,
    };
    info!("nat type: {}", behavior.normal_type());
    Ok(behavior)
}

async fn mapping_behavior<P>(
    probes: &mut P,
    server: SocketAddr,
    changed_addr: Host,
    host: Option<Host>,
) -> Result<BehaviorType, ProbeError>
where
    P: Probes + ?Sized,
{
    // (IP2, port1)
    let alt_ip_addr = SocketAddr::new(changed_addr.ip(), server.port());
    debug!("mapping test II, send to: {}", alt_ip_addr);
    let resp2 = probes.test1(alt_ip_addr).await?;
    if !resp2.received() {
        return Ok(BehaviorType::Unknown);
    }
    if resp2.mapped_addr == host {
        return Ok(BehaviorType::EndpointIndependent);
    }

    // (IP2, port2)
    let alt_addr = changed_addr.socket_addr();
    debug!("mapping test III, send to: {}", alt_addr);
    let resp3 = probes.test1(alt_addr).await?;
    if !resp3.received() {
        return Ok(BehaviorType::Unknown);
    }

    Ok(match resp3.mapped_addr == resp2.mapped_addr {
        true => BehaviorType::AddressDependent,
        false => BehaviorType::AddressAndPortDependent,
    })
}

fn changed_addr_of(resp: &Response, host: Option<Host>) -> Result<Host, DiscoverError> {
    resp.changed_addr.ok_or_else(|| {
        DiscoverError::new(ProbeError::protocol("no changed address"), host)
    })
}

fn with_host(host: Option<Host>) -> impl Fn(ProbeError) -> DiscoverError {
    move |e| DiscoverError::new(e, host)
}
