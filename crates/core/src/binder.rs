//! # ペイロードバインド
//!
//! クリアテキスト署名に埋め込まれたJSONと、実際のリクエスト本文を
//! パース後の構造で比較する（キー順序・空白の違いは無視）。
//!
//! この判定は「本文が署名対象と一致する」ことだけを示し、署名が正しいことは示さない。
//! アクセス制御に使う場合は、必ず [`crate::verify`] による検証と組み合わせること
//! （[`crate::authenticate`] は両方を行う）。

use serde_json::Value;
use shortlink_crypto::cleartext;

/// クリアテキスト署名のテキストから本文を取り出し、リクエスト本文と比較する。
///
/// 枠組みが不正、またはどちらかがJSONとして解釈できなければ `false`。
pub fn bind(signed_header_text: &str, request_body: &str) -> bool {
    match cleartext::extract_text(signed_header_text) {
        Ok(payload) => bind_payload(&payload, request_body),
        Err(e) => {
            tracing::debug!(error = %e, "署名済みペイロードを取り出せません");
            false
        }
    }
}

/// 取り出し済みの署名対象テキストとリクエスト本文を構造比較する。
pub fn bind_payload(signed_payload: &str, request_body: &str) -> bool {
    let signed: Value = match serde_json::from_str(signed_payload) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "署名済みペイロードがJSONではありません");
            return false;
        }
    };
    let body: Value = match serde_json::from_str(request_body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "リクエスト本文がJSONではありません");
            return false;
        }
    };
    signed == body
}
