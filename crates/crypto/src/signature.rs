//! # 署名パケット
//!
//! v4署名パケット (RFC 4880 §5.2.3) の解析と検証。
//!
//! 署名対象のハッシュ入力は
//! `データ || ハッシュ対象部 || 0x04 0xFF || u32(ハッシュ対象部の長さ)` で、
//! ハッシュ対象部はバージョンオクテットからハッシュ対象サブパケット領域の終端まで。

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::armor::{self, ArmorKind};
use crate::key::{PublicKey, ALGO_ECDSA, ALGO_ED25519, ALGO_EDDSA_LEGACY};
use crate::packet::{self, left_pad, Reader, TAG_SIGNATURE};
use crate::CryptoError;

/// 署名作成時刻
pub(crate) const SUBPACKET_CREATION_TIME: u8 = 2;
/// 発行者鍵ID
pub(crate) const SUBPACKET_ISSUER: u8 = 16;
/// 鍵フラグ
pub(crate) const SUBPACKET_KEY_FLAGS: u8 = 27;
/// 発行者フィンガープリント
pub(crate) const SUBPACKET_ISSUER_FINGERPRINT: u8 = 33;

const SUBPACKET_CRITICAL: u8 = 0x80;

/// 署名のハッシュアルゴリズム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            8 => Some(Self::Sha256),
            9 => Some(Self::Sha384),
            10 => Some(Self::Sha512),
            11 => Some(Self::Sha224),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Sha256 => 8,
            Self::Sha384 => 9,
            Self::Sha512 => 10,
            Self::Sha224 => 11,
        }
    }

    /// クリアテキスト署名の `Hash:` ヘッダーでの名前
    pub fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SHA224" => Some(Self::Sha224),
            "SHA256" => Some(Self::Sha256),
            "SHA384" => Some(Self::Sha384),
            "SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// 複数の断片を連結したもののダイジェストを計算する。
    pub fn digest(self, parts: &[&[u8]]) -> Vec<u8> {
        fn run<D: Digest>(parts: &[&[u8]]) -> Vec<u8> {
            let mut hasher = D::new();
            for part in parts {
                hasher.update(part);
            }
            hasher.finalize().to_vec()
        }
        match self {
            Self::Sha224 => run::<Sha224>(parts),
            Self::Sha256 => run::<Sha256>(parts),
            Self::Sha384 => run::<Sha384>(parts),
            Self::Sha512 => run::<Sha512>(parts),
        }
    }
}

/// 署名タイプ（データ署名のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    /// 0x00: バイナリ文書
    Binary,
    /// 0x01: テキスト文書（改行をCRLFに正規化して署名）
    Text,
}

impl SignatureType {
    pub fn id(self) -> u8 {
        match self {
            Self::Binary => 0x00,
            Self::Text => 0x01,
        }
    }
}

/// 署名値
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SignatureMaterial {
    Ed25519([u8; 64]),
    /// スカラーは先頭ゼロを除いた大きさ（検証時に曲線の長さへ揃える）
    Ecdsa { r: Vec<u8>, s: Vec<u8> },
}

/// 解析済みのv4データ署名。
#[derive(Debug, Clone)]
pub struct Signature {
    sig_type: SignatureType,
    pub_algorithm: u8,
    hash: HashAlgorithm,
    hashed_part: Vec<u8>,
    created: u32,
    issuer_key_id: Option<[u8; 8]>,
    issuer_fingerprint: Option<[u8; 20]>,
    left16: [u8; 2],
    material: SignatureMaterial,
}

#[derive(Default)]
struct SubpacketInfo {
    created: Option<u32>,
    issuer_key_id: Option<[u8; 8]>,
    issuer_fingerprint: Option<[u8; 20]>,
}

fn read_subpackets(area: &[u8], hashed: bool, info: &mut SubpacketInfo) -> Result<(), CryptoError> {
    let mut reader = Reader::new(area);
    while !reader.is_empty() {
        let first = reader.u8()?;
        let len = match first {
            0..=191 => usize::from(first),
            192..=254 => ((usize::from(first) - 192) << 8) + usize::from(reader.u8()?) + 192,
            255 => reader.u32()? as usize,
        };
        if len == 0 {
            return Err(CryptoError::Packet("長さ0のサブパケット".to_string()));
        }
        let raw = reader.take(len)?;
        let kind = raw[0] & !SUBPACKET_CRITICAL;
        let critical = raw[0] & SUBPACKET_CRITICAL != 0;
        let data = &raw[1..];

        match kind {
            SUBPACKET_CREATION_TIME => {
                // 作成時刻はハッシュ対象領域のもののみ信頼する
                if hashed {
                    let bytes: [u8; 4] = data.try_into().map_err(|_| {
                        CryptoError::Packet("作成時刻サブパケットの長さが不正です".to_string())
                    })?;
                    info.created = Some(u32::from_be_bytes(bytes));
                }
            }
            SUBPACKET_ISSUER => {
                if let Ok(id) = <[u8; 8]>::try_from(data) {
                    info.issuer_key_id.get_or_insert(id);
                }
            }
            SUBPACKET_ISSUER_FINGERPRINT => {
                if let Some((&4, fp)) = data.split_first() {
                    if let Ok(fp) = <[u8; 20]>::try_from(fp) {
                        info.issuer_fingerprint.get_or_insert(fp);
                    }
                }
            }
            other if critical => {
                return Err(CryptoError::Unsupported(format!(
                    "クリティカルなサブパケット {other}"
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// ハッシュ入力の末尾（v4トレーラー）
pub(crate) fn hash_trailer(hashed_part_len: usize) -> [u8; 6] {
    let len = (hashed_part_len as u32).to_be_bytes();
    [0x04, 0xFF, len[0], len[1], len[2], len[3]]
}

/// サブパケット1件をエンコードする（本文191バイト未満のみ）。
pub(crate) fn encode_subpacket(kind: u8, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 2);
    out.push((data.len() + 1) as u8);
    out.push(kind);
    out.extend_from_slice(data);
    out
}

/// テキスト署名用に改行をCRLFへ正規化する（単独のCR・LFもCRLFにする）。
pub fn normalize_line_endings(content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + content.len() / 16);
    let mut iter = content.iter().peekable();
    while let Some(&b) = iter.next() {
        match b {
            b'\r' => {
                if iter.peek() == Some(&&b'\n') {
                    iter.next();
                }
                out.extend_from_slice(b"\r\n");
            }
            b'\n' => out.extend_from_slice(b"\r\n"),
            other => out.push(other),
        }
    }
    out
}

impl Signature {
    /// 署名パケット本文を解析する。
    pub fn parse(body: &[u8]) -> Result<Self, CryptoError> {
        let mut reader = Reader::new(body);
        let version = reader.u8()?;
        if version != 4 {
            return Err(CryptoError::Unsupported(format!("署名パケットバージョン {version}")));
        }

        let sig_type = match reader.u8()? {
            0x00 => SignatureType::Binary,
            0x01 => SignatureType::Text,
            other => {
                return Err(CryptoError::Unsupported(format!("署名タイプ 0x{other:02X}")));
            }
        };
        let pub_algorithm = reader.u8()?;
        let hash_id = reader.u8()?;
        let hash = HashAlgorithm::from_id(hash_id)
            .ok_or_else(|| CryptoError::Unsupported(format!("ハッシュアルゴリズム {hash_id}")))?;

        let mut info = SubpacketInfo::default();
        let hashed_len = usize::from(reader.u16()?);
        read_subpackets(reader.take(hashed_len)?, true, &mut info)?;
        let hashed_part = body[..reader.position()].to_vec();

        let unhashed_len = usize::from(reader.u16()?);
        read_subpackets(reader.take(unhashed_len)?, false, &mut info)?;

        let left = reader.take(2)?;
        let left16 = [left[0], left[1]];

        let material = match pub_algorithm {
            ALGO_EDDSA_LEGACY => {
                let r = left_pad(reader.mpi()?, 32)?;
                let s = left_pad(reader.mpi()?, 32)?;
                let mut bytes = [0u8; 64];
                bytes[..32].copy_from_slice(&r);
                bytes[32..].copy_from_slice(&s);
                SignatureMaterial::Ed25519(bytes)
            }
            ALGO_ED25519 => {
                let mut bytes = [0u8; 64];
                bytes.copy_from_slice(reader.take(64)?);
                SignatureMaterial::Ed25519(bytes)
            }
            ALGO_ECDSA => SignatureMaterial::Ecdsa {
                r: reader.mpi()?.to_vec(),
                s: reader.mpi()?.to_vec(),
            },
            other => {
                return Err(CryptoError::Unsupported(format!("署名アルゴリズム {other}")));
            }
        };

        let created = info
            .created
            .ok_or_else(|| CryptoError::Packet("署名作成時刻がありません".to_string()))?;

        Ok(Self {
            sig_type,
            pub_algorithm,
            hash,
            hashed_part,
            created,
            issuer_key_id: info.issuer_key_id,
            issuer_fingerprint: info.issuer_fingerprint,
            left16,
            material,
        })
    }

    /// パケット列から署名をすべて取り出す。
    ///
    /// 未対応のアルゴリズム等による署名はスキップする。形式エラーは伝播する。
    pub fn parse_all(data: &[u8]) -> Result<Vec<Self>, CryptoError> {
        let mut signatures = Vec::new();
        for packet in packet::parse_packets(data)? {
            if packet.tag != TAG_SIGNATURE {
                return Err(CryptoError::Packet(format!(
                    "署名以外のパケットが含まれています: tag {}",
                    packet.tag
                )));
            }
            match Self::parse(packet.body) {
                Ok(sig) => signatures.push(sig),
                Err(CryptoError::Unsupported(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(signatures)
    }

    /// Armor (`BEGIN PGP SIGNATURE`) またはバイナリの分離署名を読み込む。
    pub fn from_armored_or_binary(input: &[u8]) -> Result<Vec<Self>, CryptoError> {
        let mut signatures = Vec::new();
        for block in armor::dearmor_or_binary(input, &ArmorKind::Signature)? {
            signatures.extend(Self::parse_all(&block)?);
        }
        Ok(signatures)
    }

    pub fn sig_type(&self) -> SignatureType {
        self.sig_type
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn pub_algorithm(&self) -> u8 {
        self.pub_algorithm
    }

    /// 署名作成時刻（UNIX秒）
    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn issuer_key_id(&self) -> Option<[u8; 8]> {
        self.issuer_key_id
    }

    pub fn issuer_fingerprint(&self) -> Option<[u8; 20]> {
        self.issuer_fingerprint
    }

    /// 発行者情報から、この鍵で作られた可能性があるかを判定する。
    /// 発行者情報がない署名はどの鍵でも候補とする。
    pub fn may_be_issued_by(&self, key: &PublicKey) -> bool {
        if let Some(fp) = &self.issuer_fingerprint {
            return fp == key.fingerprint();
        }
        if let Some(id) = &self.issuer_key_id {
            return *id == key.key_id();
        }
        true
    }

    /// 署名対象データに対して署名を検証する。
    pub fn verify(&self, key: &PublicKey, content: &[u8]) -> Result<(), CryptoError> {
        if key.algorithm() != self.pub_algorithm {
            return Err(CryptoError::SignatureVerifyError);
        }
        // 鍵の作成時刻より前の署名は無効
        if self.created < key.created() {
            return Err(CryptoError::SignatureVerifyError);
        }

        let normalized;
        let content = match self.sig_type {
            SignatureType::Binary => content,
            SignatureType::Text => {
                normalized = normalize_line_endings(content);
                normalized.as_slice()
            }
        };

        let trailer = hash_trailer(self.hashed_part.len());
        let digest = self.hash.digest(&[content, self.hashed_part.as_slice(), &trailer[..]]);
        if digest[..2] != self.left16 {
            return Err(CryptoError::SignatureVerifyError);
        }

        match (&self.material, key.ecdsa_scalar_len()) {
            (SignatureMaterial::Ecdsa { r, s }, Some(width)) => {
                let padded = SignatureMaterial::Ecdsa {
                    r: left_pad(r, width).map_err(|_| CryptoError::SignatureVerifyError)?,
                    s: left_pad(s, width).map_err(|_| CryptoError::SignatureVerifyError)?,
                };
                key.verify_digest(&digest, &padded)
            }
            (material, _) => key.verify_digest(&digest, material),
        }
    }
}
