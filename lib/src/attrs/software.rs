use crate::attrs::RawAttr;
use crate::constants::ATTR_SOFTWARE;
use crate::error::ParsePacketErr;

// 只用于标识客户端, 不参与协议逻辑
#[derive(Debug, Clone)]
pub struct Software {
    pub name: String,
}

impl Software {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl From<Software> for RawAttr {
    fn from(attr: Software) -> Self {
        RawAttr::new(ATTR_SOFTWARE, attr.name.as_bytes())
    }
}

impl TryFrom<&RawAttr> for Software {
    type Error = ParsePacketErr;

    fn try_from(raw: &RawAttr) -> Result<Self, Self::Error> {
        let name = std::str::from_utf8(&raw.value).map_err(|_| ParsePacketErr::NotUtf8)?;
        Ok(Self {
            name: name.trim_end_matches('\0').to_string(),
        })
    }
}
