//! # 署名検証
//!
//! クリアテキスト署名・分離署名を信頼済み鍵セットで検証する。
//! 検証失敗は値（`valid=false`）として返し、理由は外に出さない。

use shortlink_crypto::{CleartextMessage, PublicKey, Signature};

use crate::artifact::SignatureArtifact;
use crate::keystore::TrustedKeySet;

/// 署名検証の結果。`valid=false` のときは他のフィールドはすべて `None`。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationResult {
    /// 信頼済み鍵による正しい署名か
    pub valid: bool,
    /// 署名した鍵のフィンガープリント（大文字16進数）
    pub fingerprint: Option<String>,
    /// 署名作成時刻（UNIX秒）
    pub timestamp: Option<u64>,
    /// クリアテキスト署名に埋め込まれた本文（分離署名では常に `None`）
    pub raw_embedded_payload: Option<String>,
}

impl VerificationResult {
    pub fn invalid() -> Self {
        Self::default()
    }

    fn signed_by(key: &PublicKey, signature: &Signature, payload: Option<String>) -> Self {
        Self {
            valid: true,
            fingerprint: Some(key.fingerprint_hex()),
            timestamp: Some(u64::from(signature.created())),
            raw_embedded_payload: payload,
        }
    }
}

/// 署名群のうち、信頼済み鍵で検証できる最初の組を探す。
fn find_valid<'a>(
    signatures: &'a [Signature],
    content: &[u8],
    keys: &'a TrustedKeySet,
) -> Option<(&'a PublicKey, &'a Signature)> {
    signatures.iter().find_map(|signature| {
        keys.candidates_for(signature)
            .find(|key| signature.verify(key, content).is_ok())
            .map(|key| (key, signature))
    })
}

/// クリアテキスト署名を検証する。
///
/// 成功時は埋め込まれた本文を `raw_embedded_payload` として返す。
/// 鍵セットが空の場合は常に失敗する。
pub fn verify(artifact: &SignatureArtifact, keys: &TrustedKeySet) -> VerificationResult {
    if keys.is_empty() {
        tracing::warn!("信頼済み鍵がないため署名を拒否します");
        return VerificationResult::invalid();
    }

    let text = match artifact.as_text() {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(error = %e, "署名データを読み取れません");
            return VerificationResult::invalid();
        }
    };
    let message = match CleartextMessage::parse(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(error = %e, "クリアテキスト署名を解析できません");
            return VerificationResult::invalid();
        }
    };

    let signed_text = message.signed_text();
    match find_valid(message.signatures(), &signed_text, keys) {
        Some((key, signature)) => {
            VerificationResult::signed_by(key, signature, Some(message.text()))
        }
        None => {
            tracing::debug!(
                signatures = message.signatures().len(),
                "信頼済み鍵で検証できる署名がありません"
            );
            VerificationResult::invalid()
        }
    }
}

/// 分離署名（Armorまたはバイナリ）を本文に対して検証する。
pub fn verify_detached(
    signature: &[u8],
    content: &[u8],
    keys: &TrustedKeySet,
) -> VerificationResult {
    if keys.is_empty() {
        tracing::warn!("信頼済み鍵がないため署名を拒否します");
        return VerificationResult::invalid();
    }

    let signatures = match Signature::from_armored_or_binary(signature) {
        Ok(signatures) => signatures,
        Err(e) => {
            tracing::debug!(error = %e, "分離署名を解析できません");
            return VerificationResult::invalid();
        }
    };

    match find_valid(&signatures, content, keys) {
        Some((key, signature)) => VerificationResult::signed_by(key, signature, None),
        None => VerificationResult::invalid(),
    }
}
