#![allow(dead_code)]

use async_trait::async_trait;
use nat_probe::socket::StunSocket;
use std::collections::VecDeque;
use std::io;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;
use stun_nat::attrs::address_attr::AddressAttr;
use stun_nat::attrs::errcode_attr::ErrcodeAttr;
use stun_nat::attrs::fingerprint::Fingerprint;
use stun_nat::attrs::xor_address::XorMappedAddress;
use stun_nat::attrs::RawAttr;
use stun_nat::constants::*;
use stun_nat::header::Header;
use stun_nat::host::Host;
use stun_nat::message::Message;

pub type Responder = Box<dyn Fn(&Message) -> Vec<u8> + Send>;

pub enum Reply {
    Timeout,
    Error(io::ErrorKind),
    Datagram(Responder),
}

/// A socket driven by a script of replies. Once the script runs out every
/// read times out.
pub struct FakeSocket {
    pub local: SocketAddr,
    pub peer: SocketAddr,
    pub short_write: bool,
    pub sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    pub waits: Mutex<Vec<Duration>>,
    pub replies: Mutex<VecDeque<Reply>>,
}

impl FakeSocket {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            local: "192.168.1.10:40000".parse().unwrap(),
            peer: "1.1.1.1:3478".parse().unwrap(),
            short_write: false,
            sent: Mutex::new(vec![]),
            waits: Mutex::new(vec![]),
            replies: Mutex::new(replies.into()),
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl StunSocket for FakeSocket {
    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }

    async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.sent.lock().unwrap().push((buf.to_vec(), target));
        match self.short_write {
            true => Ok(buf.len() - 1),
            false => Ok(buf.len()),
        }
    }

    async fn recv_from(
        &self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> io::Result<(usize, SocketAddr)> {
        self.waits.lock().unwrap().push(timeout);

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            None | Some(Reply::Timeout) => Err(io::ErrorKind::TimedOut.into()),
            Some(Reply::Error(kind)) => Err(kind.into()),
            Some(Reply::Datagram(f)) => {
                let request = {
                    let sent = self.sent.lock().unwrap();
                    let (last, _) = sent.last().expect("nothing sent");
                    Message::unpack(last).expect("bad request")
                };
                let data = f(&request);
                buf[..data.len()].copy_from_slice(&data);
                Ok((data.len(), self.peer))
            }
        }
    }
}

pub fn host(s: &str) -> Host {
    s.parse::<SocketAddr>().unwrap().into()
}

pub fn binding_response(trans_id: [u8; TRANS_ID_LEN], attrs: Vec<RawAttr>) -> Message {
    Message::new(Header::new(MESSAGE_TYPE_BIND_RES, trans_id), attrs)
}

/// A datagram answering the request with the given mapped and changed
/// addresses.
pub fn answer(mapped: Host, changed: Option<Host>) -> Responder {
    Box::new(move |req: &Message| {
        let mut attrs: Vec<RawAttr> = vec![XorMappedAddress::new(mapped).into()];
        if let Some(changed) = changed {
            attrs.push(AddressAttr::new(ATTR_CHANGED_ADDRESS, changed).into());
        }
        binding_response(req.header.trans_id, attrs).pack().to_vec()
    })
}

pub fn answer_with_foreign_id() -> Responder {
    Box::new(|req: &Message| {
        let mut trans_id = req.header.trans_id;
        trans_id[0] ^= 0xff;
        binding_response(trans_id, vec![]).pack().to_vec()
    })
}

// rfc 5769, 2.2: SOFTWARE 长度 11, 用空格补齐
pub const RFC5769_RESPONSE: [u8; 80] = [
    0x01, 0x01, 0x00, 0x3c, 0x21, 0x12, 0xa4, 0x42, 0xb7, 0xe7, 0xa7, 0x01, 0xbc, 0x34, 0xd6, 0x86,
    0xfa, 0x87, 0xdf, 0xae, 0x80, 0x22, 0x00, 0x0b, 0x74, 0x65, 0x73, 0x74, 0x20, 0x76, 0x65, 0x63,
    0x74, 0x6f, 0x72, 0x20, 0x00, 0x20, 0x00, 0x08, 0x00, 0x01, 0xa1, 0x47, 0xe1, 0x12, 0xa6, 0x43,
    0x00, 0x08, 0x00, 0x14, 0x2b, 0x91, 0xf5, 0x99, 0xfd, 0x9e, 0x90, 0xc3, 0x8c, 0x74, 0x89, 0xf9,
    0x2a, 0xf9, 0xba, 0x53, 0xf0, 0x6b, 0xe7, 0xd7, 0x80, 0x28, 0x00, 0x04, 0xc0, 0x7d, 0x4c, 0x96,
];

/// The RFC 5769 response re-stamped with the request's transaction id and a
/// fingerprint recomputed over the bytes as sent.
pub fn answer_rfc5769() -> Responder {
    Box::new(|req: &Message| {
        let mut data = RFC5769_RESPONSE.to_vec();
        data[8..HEADER_LEN].copy_from_slice(&req.header.trans_id);
        let at = data.len() - 4;
        let crc = Fingerprint::compute(&data[..at - ATTR_HEADER_LEN]).crc;
        data[at..].copy_from_slice(&crc.to_be_bytes());
        data
    })
}

/// A Binding Error Response carrying ERROR-CODE.
pub fn answer_error(code: u16, reason: &'static str) -> Responder {
    Box::new(move |req: &Message| {
        let header = Header::new(MESSAGE_TYPE_BIND_ERR_RES, req.header.trans_id);
        let mut res = Message::new(header, vec![ErrcodeAttr::new(code, reason).into()]);
        res.add_fingerprint();
        res.pack().to_vec()
    })
}
