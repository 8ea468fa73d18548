use crate::attrs::RawAttr;
use crate::constants::*;
use crate::error::ParsePacketErr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeRequest {
    pub change_ip: bool,
    pub change_port: bool,
}

impl ChangeRequest {
    pub fn new(change_ip: bool, change_port: bool) -> Self {
        Self {
            change_ip,
            change_port,
        }
    }

    pub fn encode(&self) -> [u8; 4] {
        let mut flag: u32 = 0;
        if self.change_ip {
            flag |= CHANGE_IP_FLAG;
        }
        if self.change_port {
            flag |= CHANGE_PORT_FLAG;
        }
        flag.to_be_bytes()
    }
}

impl From<ChangeRequest> for RawAttr {
    fn from(attr: ChangeRequest) -> Self {
        RawAttr::new(ATTR_CHANGE_REQUEST, &attr.encode())
    }
}

impl TryFrom<&RawAttr> for ChangeRequest {
    type Error = ParsePacketErr;

    fn try_from(raw: &RawAttr) -> Result<Self, Self::Error> {
        if raw.value.len() != 4 {
            return Err(ParsePacketErr::BufSize(format!(
                "change_request attr len:{} !=4",
                raw.value.len()
            )));
        }

        let flag = u32::from_be_bytes([raw.value[0], raw.value[1], raw.value[2], raw.value[3]]);

        Ok(Self {
            change_ip: flag & CHANGE_IP_FLAG == CHANGE_IP_FLAG,
            change_port: flag & CHANGE_PORT_FLAG == CHANGE_PORT_FLAG,
        })
    }
}
