use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParsePacketErr {
    // 长度或值不匹配
    #[error("length mismatch, {0}")]
    NotMatch(String),

    // buf不够
    #[error("buffer too short, {0}")]
    BufSize(String),

    //字段的值不合规
    #[error("bad value, {0}")]
    BadValue(String),

    // 不是utf8字符串
    #[error("value is not utf8")]
    NotUtf8,

    // attribute过多
    #[error("too many attributes")]
    TooManyAttrs,
}
