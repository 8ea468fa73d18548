use std::net::SocketAddr;
use stun_nat::host::Host;
use stun_nat::message::Message;

/// What one probe observed.
#[derive(Debug, Clone, Default)]
pub struct Response {
    // 服务端的原始响应, None 表示没有收到
    pub message: Option<Message>,
    // 响应从哪个地址发出
    pub server_addr: Option<SocketAddr>,
    // nat 外部地址
    pub mapped_addr: Option<Host>,
    pub changed_addr: Option<Host>,
    // mapped_addr 和本地地址相同, 没有经过 nat
    pub identical: bool,
}

impl Response {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn received(&self) -> bool {
        self.message.is_some()
    }
}
