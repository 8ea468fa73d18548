use crate::attrs::RawAttr;
use crate::constants::{ATTR_FINGERPRINT, FINGERPRINT_XOR};
use crate::error::ParsePacketErr;

/// CRC-32 (IEEE) of everything preceding the attribute, XORed with `0x5354554e`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub crc: u32,
}

impl Fingerprint {
    pub fn compute(message_bytes: &[u8]) -> Self {
        Self {
            crc: crc32fast::hash(message_bytes) ^ FINGERPRINT_XOR,
        }
    }

    pub fn matches(&self, message_bytes: &[u8]) -> bool {
        *self == Self::compute(message_bytes)
    }
}

pub fn encode_fingerprint(message_bytes: &[u8]) -> [u8; 4] {
    Fingerprint::compute(message_bytes).crc.to_be_bytes()
}

impl From<Fingerprint> for RawAttr {
    fn from(attr: Fingerprint) -> Self {
        RawAttr::new(ATTR_FINGERPRINT, &attr.crc.to_be_bytes())
    }
}

impl TryFrom<&RawAttr> for Fingerprint {
    type Error = ParsePacketErr;

    fn try_from(raw: &RawAttr) -> Result<Self, Self::Error> {
        if raw.value.len() != 4 {
            return Err(ParsePacketErr::BufSize(format!(
                "fingerprint attr len:{} != 4",
                raw.value.len()
            )));
        }

        let crc = u32::from_be_bytes([raw.value[0], raw.value[1], raw.value[2], raw.value[3]]);
        Ok(Self { crc })
    }
}
