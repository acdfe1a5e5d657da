//! # 公開鍵パケット
//!
//! v4 公開鍵 / 公開サブ鍵パケット (RFC 4880 §5.5.2, RFC 9580 §5.5.5) の解析、
//! v4フィンガープリント計算、およびダイジェストに対する署名検証。

use ecdsa::signature::hazmat::PrehashVerifier;
use sha1::{Digest, Sha1};

use crate::packet::{Reader, TAG_PUBLIC_KEY, TAG_PUBLIC_SUBKEY};
use crate::signature::SignatureMaterial;
use crate::CryptoError;

/// ECDSA (RFC 6637)
pub const ALGO_ECDSA: u8 = 19;
/// EdDSA（Ed25519、旧形式のOIDつき表現）
pub const ALGO_EDDSA_LEGACY: u8 = 22;
/// Ed25519 (RFC 9580)
pub const ALGO_ED25519: u8 = 27;

/// 1.3.6.1.4.1.11591.15.1
pub(crate) const OID_ED25519: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
/// 1.2.840.10045.3.1.7
const OID_NIST_P256: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];
/// 1.3.132.0.34
pub(crate) const OID_NIST_P384: &[u8] = &[0x2B, 0x81, 0x04, 0x00, 0x22];

/// EdDSA旧形式の公開鍵点プレフィックス（ネイティブ点表現）
pub(crate) const EDDSA_POINT_PREFIX: u8 = 0x40;

#[derive(Debug, Clone)]
enum KeyMaterial {
    Ed25519(ed25519_dalek::VerifyingKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
}

/// 署名検証に使える公開鍵1件（主鍵またはサブ鍵）。
#[derive(Debug, Clone)]
pub struct PublicKey {
    fingerprint: [u8; 20],
    created: u32,
    algorithm: u8,
    subkey: bool,
    material: KeyMaterial,
}

/// v4フィンガープリント: SHA-1(0x99 || 2オクテット長 || 鍵パケット本文)
pub fn v4_fingerprint(body: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update([0x99]);
    hasher.update((body.len() as u16).to_be_bytes());
    hasher.update(body);
    hasher.finalize().into()
}

fn read_oid<'a>(reader: &mut Reader<'a>) -> Result<&'a [u8], CryptoError> {
    let len = usize::from(reader.u8()?);
    if len == 0 || len == 0xFF {
        return Err(CryptoError::Packet(format!("曲線OID長が不正です: {len}")));
    }
    reader.take(len)
}

fn ed25519_key(bytes: &[u8]) -> Result<KeyMaterial, CryptoError> {
    let arr: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CryptoError::Packet("Ed25519公開鍵は32バイトである必要があります".to_string()))?;
    let key = ed25519_dalek::VerifyingKey::from_bytes(&arr)
        .map_err(|e| CryptoError::Packet(format!("Ed25519公開鍵のパースに失敗: {e}")))?;
    Ok(KeyMaterial::Ed25519(key))
}

impl PublicKey {
    /// 公開鍵 (tag 6) / 公開サブ鍵 (tag 14) パケットの本文を解析する。
    ///
    /// v4以外のバージョン、および対応外のアルゴリズム・曲線は
    /// [`CryptoError::Unsupported`] を返す。
    pub fn parse(tag: u8, body: &[u8]) -> Result<Self, CryptoError> {
        if tag != TAG_PUBLIC_KEY && tag != TAG_PUBLIC_SUBKEY {
            return Err(CryptoError::Packet(format!("鍵パケットではありません: tag {tag}")));
        }

        let mut reader = Reader::new(body);
        let version = reader.u8()?;
        if version != 4 {
            return Err(CryptoError::Unsupported(format!("鍵パケットバージョン {version}")));
        }
        let created = reader.u32()?;
        let algorithm = reader.u8()?;

        let material = match algorithm {
            ALGO_EDDSA_LEGACY => {
                let oid = read_oid(&mut reader)?;
                if oid != OID_ED25519 {
                    return Err(CryptoError::Unsupported(format!(
                        "EdDSA曲線OID {}",
                        hex::encode(oid)
                    )));
                }
                let point = reader.mpi()?;
                let raw = point.strip_prefix(&[EDDSA_POINT_PREFIX]).ok_or_else(|| {
                    CryptoError::Packet("EdDSA公開鍵点のプレフィックスが不正です".to_string())
                })?;
                ed25519_key(raw)?
            }
            ALGO_ED25519 => ed25519_key(reader.take(32)?)?,
            ALGO_ECDSA => {
                let oid = read_oid(&mut reader)?;
                let point = reader.mpi()?;
                if oid == OID_NIST_P256 {
                    let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(point)
                        .map_err(|e| CryptoError::Packet(format!("P-256公開鍵のパースに失敗: {e}")))?;
                    KeyMaterial::EcdsaP256(key)
                } else if oid == OID_NIST_P384 {
                    let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(point)
                        .map_err(|e| CryptoError::Packet(format!("P-384公開鍵のパースに失敗: {e}")))?;
                    KeyMaterial::EcdsaP384(key)
                } else {
                    return Err(CryptoError::Unsupported(format!(
                        "ECDSA曲線OID {}",
                        hex::encode(oid)
                    )));
                }
            }
            other => {
                return Err(CryptoError::Unsupported(format!("公開鍵アルゴリズム {other}")));
            }
        };

        Ok(Self {
            fingerprint: v4_fingerprint(body),
            created,
            algorithm,
            subkey: tag == TAG_PUBLIC_SUBKEY,
            material,
        })
    }

    pub fn fingerprint(&self) -> &[u8; 20] {
        &self.fingerprint
    }

    /// 大文字16進数のフィンガープリント（GnuPGの表示形式から空白を除いたもの）
    pub fn fingerprint_hex(&self) -> String {
        hex::encode_upper(self.fingerprint)
    }

    /// v4鍵ID（フィンガープリントの下位8オクテット）
    pub fn key_id(&self) -> [u8; 8] {
        let mut id = [0u8; 8];
        id.copy_from_slice(&self.fingerprint[12..]);
        id
    }

    /// 鍵の作成時刻（UNIX秒）
    pub fn created(&self) -> u32 {
        self.created
    }

    pub fn algorithm(&self) -> u8 {
        self.algorithm
    }

    pub fn is_subkey(&self) -> bool {
        self.subkey
    }

    /// 署名対象のダイジェストに対して署名値を検証する。
    pub(crate) fn verify_digest(
        &self,
        digest: &[u8],
        signature: &SignatureMaterial,
    ) -> Result<(), CryptoError> {
        match (&self.material, signature) {
            (KeyMaterial::Ed25519(key), SignatureMaterial::Ed25519(bytes)) => {
                let sig = ed25519_dalek::Signature::from_bytes(bytes);
                key.verify_strict(digest, &sig)
                    .map_err(|_| CryptoError::SignatureVerifyError)
            }
            (KeyMaterial::EcdsaP256(key), SignatureMaterial::Ecdsa { r, s }) => {
                let raw = [r.as_slice(), s.as_slice()].concat();
                let sig = p256::ecdsa::Signature::from_slice(&raw)
                    .map_err(|_| CryptoError::SignatureVerifyError)?;
                key.verify_prehash(digest, &sig)
                    .map_err(|_| CryptoError::SignatureVerifyError)
            }
            (KeyMaterial::EcdsaP384(key), SignatureMaterial::Ecdsa { r, s }) => {
                let raw = [r.as_slice(), s.as_slice()].concat();
                let sig = p384::ecdsa::Signature::from_slice(&raw)
                    .map_err(|_| CryptoError::SignatureVerifyError)?;
                key.verify_prehash(digest, &sig)
                    .map_err(|_| CryptoError::SignatureVerifyError)
            }
            _ => Err(CryptoError::SignatureVerifyError),
        }
    }

    /// ECDSA署名値のスカラー長（曲線の位数バイト長）
    pub(crate) fn ecdsa_scalar_len(&self) -> Option<usize> {
        match self.material {
            KeyMaterial::EcdsaP256(_) => Some(32),
            KeyMaterial::EcdsaP384(_) => Some(48),
            KeyMaterial::Ed25519(_) => None,
        }
    }
}
