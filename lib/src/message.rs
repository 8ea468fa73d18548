use crate::attrs::change_request::ChangeRequest;
use crate::attrs::fingerprint::Fingerprint;
use crate::attrs::software::Software;
use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::ParsePacketErr;
use crate::header::{Header, TransId};
use crate::util;
use bytes::{BufMut, Bytes, BytesMut};
use log::trace;

// header 20字节 + 属性列表
// header 里的 msg_len 总是等于属性部分的字节数

#[derive(Debug, Clone)]
pub struct Message {
    pub header: Header,
    pub attrs: Vec<RawAttr>,
    // 解码得到的消息: fingerprint 之前的原始字节
    fingerprint_covered: Option<Bytes>,
}

impl Message {
    pub fn new(header: Header, attrs: Vec<RawAttr>) -> Self {
        let mut message = Self {
            header,
            attrs,
            fingerprint_covered: None,
        };
        message.update_header_len();
        message
    }

    /// Builds a Binding Request: SOFTWARE, an optional CHANGE-REQUEST, then
    /// FINGERPRINT over everything before it.
    pub fn binding_request(
        trans_id: TransId,
        software: &str,
        change_request: Option<ChangeRequest>,
    ) -> Self {
        let header = Header::new(MESSAGE_TYPE_BIND_REQ, trans_id);
        let mut request = Message::new(header, vec![]);

        request.add_attr(Software::new(software).into());
        if let Some(change) = change_request {
            request.add_attr(change.into());
        }
        request.add_fingerprint();

        request
    }

    fn update_header_len(&mut self) {
        let total = self.attrs.iter().fold(0_usize, |acc, x| acc + x.len());
        self.header.msg_len = total as u16;
    }

    pub fn add_attr(&mut self, attr: RawAttr) {
        self.fingerprint_covered = None;
        self.attrs.push(attr);
        self.update_header_len();
    }

    // 长度字段先算上 fingerprint 自身的 8 字节, 再计算 crc
    pub fn add_fingerprint(&mut self) {
        self.header.msg_len += util::attr_wire_len(4) as u16;
        let fingerprint = Fingerprint::compute(&self.pack_without_len_update());
        self.add_attr(fingerprint.into());
    }

    pub fn trans_id(&self) -> &TransId {
        &self.header.trans_id
    }

    /// First attribute of `attr_type`, in insertion order.
    pub fn find_attr(&self, attr_type: u16) -> Option<&RawAttr> {
        self.attrs.iter().find(|v| v.attr_type == attr_type)
    }

    pub fn pack(&self) -> Bytes {
        let mut message = self.clone();
        message.update_header_len();
        message.pack_without_len_update()
    }

    fn pack_without_len_update(&self) -> Bytes {
        let total = self.attrs.iter().fold(HEADER_LEN, |acc, x| acc + x.len());
        let mut buf = BytesMut::with_capacity(total);
        buf.put_slice(&self.header.pack());
        for v in self.attrs.iter() {
            buf.put_slice(&v.pack());
        }

        buf.freeze()
    }

    pub fn unpack(buf: &[u8]) -> Result<Self, ParsePacketErr> {
        let header = Header::unpack(buf)?;

        let mut rest = &buf[HEADER_LEN..];
        let mut attr_list = vec![];
        let mut fingerprint_covered = None;

        while rest.len() >= ATTR_HEADER_LEN {
            if attr_list.len() == MAX_ATTRS {
                return Err(ParsePacketErr::TooManyAttrs);
            }

            let offset = buf.len() - rest.len();
            let (attr, consumed) = RawAttr::unpack(rest)?;
            if attr.attr_type == ATTR_FINGERPRINT && fingerprint_covered.is_none() {
                fingerprint_covered = Some(Bytes::copy_from_slice(&buf[..offset]));
            }
            attr_list.push(attr);
            rest = &rest[consumed..];
        }

        // 不足一个属性头的尾部字节直接忽略
        if !rest.is_empty() {
            trace!("ignore {} trailing bytes after attributes", rest.len());
        }

        // msg_len 保留对端填写的值
        let actual = buf.len() - HEADER_LEN;
        if header.msg_len as usize != actual {
            trace!("msg_len: {}, actual: {}", header.msg_len, actual);
        }

        Ok(Self {
            header,
            attrs: attr_list,
            fingerprint_covered,
        })
    }

    /// Checks the FINGERPRINT attribute, if the message carries one.
    ///
    /// Returns `None` when there is no fingerprint, otherwise whether the
    /// CRC matches the bytes preceding it. A decoded message is checked
    /// against the bytes as received, since peers may write unpadded
    /// lengths and non-zero padding.
    pub fn verify_fingerprint(&self) -> Option<bool> {
        let index = self
            .attrs
            .iter()
            .position(|v| v.attr_type == ATTR_FINGERPRINT)?;

        let expected = match Fingerprint::try_from(&self.attrs[index]) {
            Ok(v) => v,
            Err(_) => return Some(false),
        };

        if let Some(covered) = &self.fingerprint_covered {
            return Some(expected.matches(covered));
        }

        let covered = Message {
            header: self.header.clone(),
            attrs: self.attrs[..index].to_vec(),
            fingerprint_covered: None,
        };
        Some(expected.matches(&covered.pack_without_len_update()))
    }
}
