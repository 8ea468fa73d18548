use log::{debug, trace, warn};
use std::net::SocketAddr;
use std::time::Duration;
use stun_nat::message::Message;
use stun_nat::util::print_bytes;
use tokio::time::Instant;

use crate::error::ProbeError;
use crate::socket::{is_timeout, StunSocket};

const RECV_BUF_LEN: usize = 2048;

/// Retransmission schedule for one request.
///
/// RFC 3489: start at 100ms, double every retransmit until 1.6s, then keep
/// 1.6s until 9 requests have been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_timeout: Duration,
    pub max_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 9,
            initial_timeout: Duration::from_millis(100),
            max_timeout: Duration::from_millis(1600),
        }
    }
}

impl RetryPolicy {
    pub fn timeouts(&self) -> impl Iterator<Item = Duration> + '_ {
        let mut timeout = self.initial_timeout;
        (0..self.max_attempts).map(move |_| {
            let current = timeout;
            timeout = (timeout * 2).min(self.max_timeout);
            current
        })
    }
}

/// A response matched to the request, with the address it came from.
#[derive(Debug, Clone)]
pub struct Received {
    pub message: Message,
    pub from: SocketAddr,
}

/// Sends `request` to `dest` and waits for the response carrying the same
/// transaction id.
///
/// `Ok(None)` means every attempt timed out.
pub async fn send_request<S>(
    sock: &S,
    request: &Message,
    dest: SocketAddr,
    policy: &RetryPolicy,
) -> Result<Option<Received>, ProbeError>
where
    S: StunSocket + ?Sized,
{
    let data = request.pack();
    trace!(
        "request len: {}, --> {}\n{}",
        data.len(),
        dest,
        print_bytes(&data, " ", 8)
    );

    let mut recv_buf = vec![0u8; RECV_BUF_LEN];

    for (attempt, timeout) in policy.timeouts().enumerate() {
        let sent = sock.send_to(&data, dest).await?;
        if sent != data.len() {
            return Err(ProbeError::ShortWrite {
                sent,
                expected: data.len(),
            });
        }
        debug!(
            "attempt {}, sent {} bytes to {}, wait {:?}",
            attempt + 1,
            sent,
            dest,
            timeout
        );

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let (len, from) = match sock.recv_from(&mut recv_buf, remaining).await {
                Ok(v) => v,
                Err(e) if is_timeout(&e) => break,
                Err(e) => return Err(e.into()),
            };

            let buf = &recv_buf[..len];
            trace!("<-- {}, len: {}\n{}", from, len, print_bytes(buf, " ", 8));

            let response = match Message::unpack(buf) {
                Ok(v) => v,
                Err(e) => {
                    debug!("discard datagram from {}, {}", from, e);
                    continue;
                }
            };

            if response.trans_id() != request.trans_id() {
                debug!("discard datagram from {}, transaction id not match", from);
                continue;
            }

            if response.verify_fingerprint() == Some(false) {
                warn!("discard response from {}, bad fingerprint", from);
                continue;
            }

            return Ok(Some(Received {
                message: response,
                from,
            }));
        }
    }

    debug!("no response from {}", dest);
    Ok(None)
}
