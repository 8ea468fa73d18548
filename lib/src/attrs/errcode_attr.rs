use crate::attrs::RawAttr;
use crate::constants::ATTR_ERROR_CODE;
use crate::error::ParsePacketErr;
use crate::util;
use bytes::{BufMut, BytesMut};

// class:  3 bit        1-6
// number: 8 bit        0-99

#[derive(Debug, Clone)]
pub struct ErrcodeAttr {
    pub code: u16,
    pub reason: String,
}

impl ErrcodeAttr {
    pub fn new(code: u16, reason: &str) -> Self {
        Self {
            code,
            reason: reason.to_string(),
        }
    }
}

impl From<ErrcodeAttr> for RawAttr {
    fn from(attr: ErrcodeAttr) -> Self {
        let mut bytes_buf = BytesMut::with_capacity(4 + attr.reason.len());
        bytes_buf.put_u16(0);
        bytes_buf.put_u16(util::pack_error_code(attr.code));
        bytes_buf.put_slice(attr.reason.as_bytes());

        RawAttr::new(ATTR_ERROR_CODE, &bytes_buf)
    }
}

impl TryFrom<&RawAttr> for ErrcodeAttr {
    type Error = ParsePacketErr;

    fn try_from(raw: &RawAttr) -> Result<Self, Self::Error> {
        if raw.value.len() < 4 {
            return Err(ParsePacketErr::BufSize(format!(
                "err_code attr buf len:{} < 4",
                raw.value.len()
            )));
        }

        let value = &raw.value;
        let code = util::unpack_error_code(u16::from_be_bytes([value[2], value[3]]));

        let reason = match std::str::from_utf8(&value[4..]) {
            Ok(v) => v.trim_end_matches('\0').trim().to_string(),
            Err(_e) => {
                return Err(ParsePacketErr::NotUtf8);
            }
        };

        Ok(Self { code, reason })
    }
}
