use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// The datagram capability the transport needs from a bound socket.
#[async_trait]
pub trait StunSocket: Send + Sync {
    fn local_addr(&self) -> io::Result<SocketAddr>;

    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize>;

    /// Waits at most `timeout` for one datagram. An elapsed timeout is
    /// reported as [`io::ErrorKind::TimedOut`].
    async fn recv_from(
        &self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<(usize, SocketAddr)>;
}

#[async_trait]
impl StunSocket for UdpSocket {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }

    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, target).await
    }

    async fn recv_from(
        &self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<(usize, SocketAddr)> {
        match tokio::time::timeout(timeout, UdpSocket::recv_from(self, buf)).await {
            Ok(v) => v,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "recv timeout")),
        }
    }
}

pub fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
