//! # 信頼済み公開鍵セット
//!
//! 起動時に取得した公開鍵素材から一度だけ構築し、プロセス終了まで変更しない。
//! 検証関数には明示的に渡す（グローバル状態は持たない）。

use shortlink_crypto::armor::{self, ArmorKind};
use shortlink_crypto::packet::{parse_packets, TAG_PUBLIC_KEY, TAG_PUBLIC_SUBKEY};
use shortlink_crypto::{CryptoError, PublicKey, Signature};
use shortlink_types::KeyInfo;

use crate::error::BootstrapError;

/// 信頼済み公開鍵（主鍵・サブ鍵）の集合。
#[derive(Debug, Clone, Default)]
pub struct TrustedKeySet {
    keys: Vec<PublicKey>,
}

impl TrustedKeySet {
    /// Armor（複数ブロック可）またはバイナリの公開鍵素材から鍵セットを構築する。
    ///
    /// 対応していないアルゴリズムの鍵は警告を出してスキップする。
    /// 利用可能な鍵が1件もなければ [`BootstrapError::NoUsableKeys`]。
    pub fn bootstrap(material: &[u8]) -> Result<Self, BootstrapError> {
        let blocks = armor::dearmor_or_binary(material, &ArmorKind::PublicKeyBlock)?;

        let mut keys = Vec::new();
        for block in &blocks {
            for packet in parse_packets(block)? {
                if packet.tag != TAG_PUBLIC_KEY && packet.tag != TAG_PUBLIC_SUBKEY {
                    continue;
                }
                match PublicKey::parse(packet.tag, packet.body) {
                    Ok(key) => keys.push(key),
                    Err(CryptoError::Unsupported(reason)) => {
                        tracing::warn!(
                            tag = packet.tag,
                            reason = %reason,
                            "対応していない鍵をスキップします"
                        );
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if keys.is_empty() {
            return Err(BootstrapError::NoUsableKeys);
        }

        let set = Self { keys };
        tracing::info!(
            count = set.len(),
            fingerprints = ?set.fingerprints(),
            "信頼済み公開鍵をインポートしました"
        );
        Ok(set)
    }

    /// 解析済みの鍵から直接構築する。空の集合に対する検証は常に失敗する。
    pub fn from_keys(keys: Vec<PublicKey>) -> Self {
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublicKey> {
        self.keys.iter()
    }

    /// 署名の発行者情報に合致する鍵
    pub fn candidates_for<'a>(
        &'a self,
        signature: &'a Signature,
    ) -> impl Iterator<Item = &'a PublicKey> + 'a {
        self.keys
            .iter()
            .filter(move |key| signature.may_be_issued_by(key))
    }

    pub fn fingerprints(&self) -> Vec<String> {
        self.keys.iter().map(PublicKey::fingerprint_hex).collect()
    }

    /// 公開用の鍵情報一覧
    pub fn key_infos(&self) -> Vec<KeyInfo> {
        self.keys
            .iter()
            .map(|key| KeyInfo {
                fingerprint: key.fingerprint_hex(),
                algorithm: key.algorithm(),
                created: u64::from(key.created()),
                subkey: key.is_subkey(),
            })
            .collect()
    }
}
