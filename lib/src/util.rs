use crate::constants::{ATTR_HEADER_LEN, TRANS_ID_LEN};
use crate::header::TransId;
use bytes::{BufMut, Bytes, BytesMut};
use rand::prelude::*;
use std::fmt::Write as _;

pub fn print_bytes(buf: &[u8], separator: &str, row_width: usize) -> String {
    let mut hex = String::new();
    buf.iter().enumerate().for_each(|(x, y)| {
        let _ = write!(hex, "{:02X}", y);
        if (x + 1) % row_width == 0 {
            hex.push('\n');
        } else {
            hex.push_str(separator);
        }
    });

    hex
}

pub fn new_trans_id() -> TransId {
    let mut trans_id = [0u8; TRANS_ID_LEN];
    rand::thread_rng().fill_bytes(&mut trans_id);
    trans_id
}

/// Rounds `n` up to the next multiple of 4.
pub fn align4(n: usize) -> usize {
    (n + 3) & !3
}

// 补0到4字节对齐, 不截断
pub fn pad_value(value: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(align4(value.len()));
    buf.put_slice(value);
    buf.put_bytes(0, align4(value.len()) - value.len());
    buf.freeze()
}

/// Size of an attribute on the wire, TLV header included.
pub fn attr_wire_len(value_len: usize) -> usize {
    ATTR_HEADER_LEN + align4(value_len)
}

// port 和 cookie 的高16位做 xor
pub fn xor_port(port: u16, cookie: u32) -> u16 {
    port ^ (cookie >> 16) as u16
}

// 只混淆地址的前4个字节, ipv6 剩余的 12 字节保持原样
pub fn xor_ip_bytes(ip: &mut [u8], cookie: u32) {
    let mask = cookie.to_be_bytes();
    for (b, m) in ip.iter_mut().zip(mask.iter()) {
        *b ^= m;
    }
}

pub fn pack_error_code(code: u16) -> u16 {
    let class = code / 100;
    let number = code % 100;

    class << 8 | number
}

pub fn unpack_error_code(code: u16) -> u16 {
    let number = code & 0x00ff;
    let class = (code >> 8) & 0x07;
    class * 100 + number
}
