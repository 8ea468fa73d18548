use log::debug;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::{lookup_host, UdpSocket};

use crate::discover::{self, Discovery};
use crate::error::{DiscoverError, ProbeError};
use crate::nat::NatBehavior;
use crate::probe::Prober;
use crate::transport::RetryPolicy;

pub const DEFAULT_SERVER_ADDR: &str = "stun.ekiga.net:3478";
pub const DEFAULT_SOFTWARE_NAME: &str = "StunClient";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    // host:port, 域名在第一次使用时解析
    pub server: String,
    pub software: String,
    // None: 绑定 0.0.0.0:0
    pub local_addr: Option<SocketAddr>,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER_ADDR.to_string(),
            software: DEFAULT_SOFTWARE_NAME.to_string(),
            local_addr: None,
            retry: RetryPolicy::default(),
        }
    }
}

/// Entry point for one host's discovery runs.
///
/// The socket and the resolved server address are created on first use and
/// kept until [`Client::reset`].
pub struct Client {
    config: ClientConfig,
    server_addr: Option<SocketAddr>,
    socket: Option<UdpSocket>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            server_addr: None,
            socket: None,
        }
    }

    /// Uses an already bound socket instead of binding one.
    pub fn with_socket(config: ClientConfig, socket: UdpSocket) -> Self {
        Self {
            config,
            server_addr: None,
            socket: Some(socket),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn set_server_addr(&mut self, server: &str) {
        self.config.server = server.to_string();
        self.server_addr = None;
    }

    /// Resolves `host` now and keeps the first address.
    pub async fn set_server_host(&mut self, host: &str, port: u16) -> Result<(), ProbeError> {
        let addr = resolve(&format!("{}:{}", host, port)).await?;
        self.config.server = addr.to_string();
        self.server_addr = Some(addr);
        Ok(())
    }

    pub fn set_software(&mut self, name: &str) {
        self.config.software = name.to_string();
    }

    /// Drops the socket and the resolved server address.
    pub fn reset(&mut self) {
        self.server_addr = None;
        self.socket = None;
    }

    pub async fn discover(&mut self) -> Result<Discovery, DiscoverError> {
        let server = self.prepare().await?;
        let socket = self.socket()?;

        let mut prober = Prober::new(socket, &self.config.software, self.config.retry);
        discover::discover(&mut prober, server).await
    }

    pub async fn behavior_test(&mut self) -> Result<NatBehavior, DiscoverError> {
        let server = self.prepare().await?;
        let socket = self.socket()?;

        let mut prober = Prober::new(socket, &self.config.software, self.config.retry);
        discover::behavior_test(&mut prober, server).await
    }

    async fn prepare(&mut self) -> Result<SocketAddr, ProbeError> {
        let server = match self.server_addr {
            Some(v) => v,
            None => {
                let v = resolve(&self.config.server).await?;
                self.server_addr = Some(v);
                v
            }
        };

        if self.socket.is_none() {
            let local = self.config.local_addr.unwrap_or_else(|| match server {
                SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
                SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
            });
            let socket = UdpSocket::bind(local).await?;
            debug!("local addr: {:?}", socket.local_addr());
            self.socket = Some(socket);
        }

        Ok(server)
    }

    fn socket(&self) -> Result<&UdpSocket, ProbeError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ProbeError::Transport(std::io::ErrorKind::NotConnected.into()))
    }
}

pub async fn resolve(server: &str) -> Result<SocketAddr, ProbeError> {
    let mut addrs = lookup_host(server)
        .await
        .map_err(|e| ProbeError::Resolution(format!("{}, {}", server, e)))?;

    let addr = addrs
        .next()
        .ok_or_else(|| ProbeError::Resolution(format!("no address for {}", server)))?;
    debug!("server {} resolved to {}", server, addr);
    Ok(addr)
}
