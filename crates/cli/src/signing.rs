//! # 署名鍵と署名付きリクエスト
//!
//! 書き込みリクエストの本文を整形JSONとしてクリアテキスト署名し、
//! Base64化して `Authorization` ヘッダー値にする。
//! 送信する本文は署名対象と同じJSON値のコンパクト表現（Gatewayは構造で比較する）。

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use clap::Args;
use shortlink_crypto::Ed25519Signer;

/// Base64エンジン（Standard）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("署名鍵がありません（SIGNING_KEY または --signing-key）")]
    MissingKey,
    #[error("署名鍵は32バイトの16進数である必要があります")]
    InvalidKey,
    #[error("本文のシリアライズに失敗: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 署名鍵の指定。鍵の作成時刻はフィンガープリントに含まれるため、
/// 公開鍵を登録したときと同じ値を指定すること。
#[derive(Args, Debug, Clone)]
pub struct SigningKeyArgs {
    /// Ed25519秘密鍵シード（16進数）
    #[arg(long = "signing-key", env = "SIGNING_KEY", hide_env_values = true)]
    pub seed: Option<String>,

    /// 鍵の作成時刻（UNIX秒）
    #[arg(long = "key-created", env = "SIGNING_KEY_CREATED", default_value_t = 0)]
    pub created: u32,

    /// 公開鍵に載せるユーザーID
    #[arg(long = "user-id", env = "SIGNING_KEY_USER_ID", default_value = "shortlink")]
    pub user_id: String,
}

impl SigningKeyArgs {
    pub fn signer(&self) -> Result<Ed25519Signer, SigningError> {
        let seed = self.seed.as_deref().ok_or(SigningError::MissingKey)?;
        let bytes = hex::decode(seed.trim()).map_err(|_| SigningError::InvalidKey)?;
        let seed: [u8; 32] = bytes.try_into().map_err(|_| SigningError::InvalidKey)?;
        Ok(Ed25519Signer::from_seed(seed, self.user_id.clone(), self.created))
    }
}

/// 送信用に署名済みのリクエスト
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// `Authorization` ヘッダー値（クリアテキスト署名のBase64）
    pub authorization: String,
    /// リクエスト本文
    pub body: String,
}

/// 本文を指定時刻で署名する。
pub fn sign_payload(
    signer: &Ed25519Signer,
    payload: &serde_json::Value,
    created: u32,
) -> Result<SignedRequest, SigningError> {
    let signed_text = serde_json::to_string_pretty(payload)?;
    let clearsigned = signer.clearsign(&signed_text, created);
    Ok(SignedRequest {
        authorization: b64().encode(clearsigned),
        body: serde_json::to_string(payload)?,
    })
}

/// 現在のUNIX時刻（秒）
pub fn now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
