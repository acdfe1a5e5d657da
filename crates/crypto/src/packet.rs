//! # OpenPGPパケット
//!
//! RFC 4880 §4 のパケットフレーミング（旧形式・新形式ヘッダー）と、
//! パケット本文を読み進めるためのカーソル。

use crate::CryptoError;

/// 署名パケット
pub const TAG_SIGNATURE: u8 = 2;
/// 公開鍵パケット
pub const TAG_PUBLIC_KEY: u8 = 6;
/// ユーザーIDパケット
pub const TAG_USER_ID: u8 = 13;
/// 公開サブ鍵パケット
pub const TAG_PUBLIC_SUBKEY: u8 = 14;

/// パケット1件（本文は入力バッファを借用する）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Packet<'a> {
    pub tag: u8,
    pub body: &'a [u8],
}

/// パケット本文を先頭から読み進めるカーソル。
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], CryptoError> {
        if n > self.remaining() {
            return Err(CryptoError::Packet(format!(
                "データが不足しています（要求 {n} バイト、残り {} バイト）",
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, CryptoError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, CryptoError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CryptoError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// MPI（2オクテットのビット長 + 大きさのバイト列）を読み、大きさ部分を返す。
    pub(crate) fn mpi(&mut self) -> Result<&'a [u8], CryptoError> {
        let bits = usize::from(self.u16()?);
        self.take(bits.div_ceil(8))
    }
}

/// パケット列を分解する。
///
/// 部分ボディ長（新形式 224〜254）はリテラルデータ等にしか使われないため未対応。
pub fn parse_packets(data: &[u8]) -> Result<Vec<Packet<'_>>, CryptoError> {
    let mut reader = Reader::new(data);
    let mut packets = Vec::new();

    while !reader.is_empty() {
        let ctb = reader.u8()?;
        if ctb & 0x80 == 0 {
            return Err(CryptoError::Packet(format!(
                "オフセット {} のCTBが不正です: 0x{ctb:02X}",
                reader.position() - 1
            )));
        }

        let (tag, len) = if ctb & 0x40 != 0 {
            let first = reader.u8()?;
            let len = match first {
                0..=191 => usize::from(first),
                192..=223 => ((usize::from(first) - 192) << 8) + usize::from(reader.u8()?) + 192,
                255 => reader.u32()? as usize,
                _ => {
                    return Err(CryptoError::Unsupported(
                        "部分ボディ長のパケット".to_string(),
                    ))
                }
            };
            (ctb & 0x3F, len)
        } else {
            let len = match ctb & 0x03 {
                0 => usize::from(reader.u8()?),
                1 => usize::from(reader.u16()?),
                2 => reader.u32()? as usize,
                // 不定長: 残り全部
                _ => reader.remaining(),
            };
            ((ctb >> 2) & 0x0F, len)
        };

        let body = reader.take(len)?;
        packets.push(Packet { tag, body });
    }

    Ok(packets)
}

/// 新形式ヘッダーでパケットをエンコードする。
pub fn encode_packet(tag: u8, body: &[u8]) -> Vec<u8> {
    let len = body.len();
    let mut out = Vec::with_capacity(len + 6);
    out.push(0xC0 | tag);
    if len < 192 {
        out.push(len as u8);
    } else if len < 8384 {
        let v = len - 192;
        out.push(((v >> 8) + 192) as u8);
        out.push((v & 0xFF) as u8);
    } else {
        out.push(0xFF);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    out.extend_from_slice(body);
    out
}

/// 大きさのバイト列をMPIとしてエンコードする（先頭のゼロは除去）。
pub fn encode_mpi(magnitude: &[u8]) -> Vec<u8> {
    let start = magnitude
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(magnitude.len());
    let trimmed = &magnitude[start..];
    let bits = match trimmed.first() {
        Some(&top) => (trimmed.len() - 1) * 8 + (8 - top.leading_zeros() as usize),
        None => 0,
    };
    let mut out = Vec::with_capacity(trimmed.len() + 2);
    out.extend_from_slice(&(bits as u16).to_be_bytes());
    out.extend_from_slice(trimmed);
    out
}

/// 先頭をゼロ埋めして `width` バイトに揃える。
pub(crate) fn left_pad(bytes: &[u8], width: usize) -> Result<Vec<u8>, CryptoError> {
    if bytes.len() > width {
        return Err(CryptoError::Packet(format!(
            "値が {width} バイトを超えています: {} バイト",
            bytes.len()
        )));
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}
