//! # 書き込みリクエスト認証
//!
//! 署名検証（[`crate::verify`]）とペイロードバインド（[`crate::bind_payload`]）の両方が
//! 成立した場合のみ `true` を返す。比較する本文は検証済みの署名対象そのもの。
//! 鮮度はAuthorizer側で判定する。

use shortlink_types::RequestContext;

use crate::artifact::SignatureArtifact;
use crate::binder::bind_payload;
use crate::keystore::TrustedKeySet;
use crate::verifier::verify;

/// Base64の署名ヘッダーとリクエスト本文を検証する。
pub fn authenticate(signature_header_b64: &str, request_body: &str, keys: &TrustedKeySet) -> bool {
    let artifact = match SignatureArtifact::from_base64(signature_header_b64) {
        Ok(artifact) => artifact,
        Err(e) => {
            tracing::info!(error = %e, "Authorizationヘッダーを拒否しました");
            return false;
        }
    };

    let result = verify(&artifact, keys);
    if !result.valid {
        tracing::info!("署名が無効です");
        return false;
    }

    let Some(payload) = result.raw_embedded_payload.as_deref() else {
        return false;
    };
    let bound = bind_payload(payload, request_body);
    tracing::info!(
        fingerprint = result.fingerprint.as_deref().unwrap_or_default(),
        bound,
        "書き込みリクエストを検証しました"
    );
    bound
}

/// リクエストコンテキストの `Authorization` ヘッダーと本文で検証する。
pub fn authenticate_request(ctx: &RequestContext, keys: &TrustedKeySet) -> bool {
    match ctx.authorization() {
        Some(header) => authenticate(header, &ctx.body, keys),
        None => {
            tracing::info!("Authorizationヘッダーがありません");
            false
        }
    }
}
