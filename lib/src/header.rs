#![allow(clippy::len_without_is_empty)]

use crate::constants::*;
use bytes::{BufMut, Bytes, BytesMut};

use crate::error::ParsePacketErr;

pub type TransId = [u8; TRANS_ID_LEN];

// rfc 5389, 6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub msg_type: u16,

    // 不包括header的20字节
    pub msg_len: u16,

    pub cookie: u32,

    pub trans_id: TransId,
}

impl Header {
    pub fn new(msg_type: u16, trans_id: TransId) -> Self {
        Self {
            msg_type,
            msg_len: 0,
            cookie: MAGIC_COOKIE,
            trans_id,
        }
    }

    pub fn len(&self) -> usize {
        HEADER_LEN
    }

    pub fn pack(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_LEN);
        buf.put_u16(self.msg_type);
        buf.put_u16(self.msg_len);
        buf.put_u32(self.cookie);
        buf.put_slice(&self.trans_id);
        buf.freeze()
    }

    pub fn unpack(buf: &[u8]) -> Result<Self, ParsePacketErr> {
        // 只检查长度，不检查有效性
        if buf.len() < HEADER_LEN {
            return Err(ParsePacketErr::BufSize(format!(
                "header buf len:{} < {}",
                buf.len(),
                HEADER_LEN
            )));
        }

        let msg_type = u16::from_be_bytes([buf[0], buf[1]]);
        let msg_len = u16::from_be_bytes([buf[2], buf[3]]);
        let cookie = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);

        let mut trans_id = [0_u8; TRANS_ID_LEN];
        trans_id.copy_from_slice(&buf[8..HEADER_LEN]);

        Ok(Self {
            msg_type,
            msg_len,
            cookie,
            trans_id,
        })
    }

    pub fn is_error_response(&self) -> bool {
        self.msg_type == MESSAGE_TYPE_BIND_ERR_RES
    }
}
