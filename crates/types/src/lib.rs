//! # Shortlink 共有型定義
//!
//! Gateway・コア・CLIで共有するデータ構造をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - Base64: `Authorization` ヘッダーに載せるクリアテキスト署名
//! - 16進数（大文字）: OpenPGP鍵フィンガープリント

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// リクエストコンテキスト
// ---------------------------------------------------------------------------

/// 認証処理に渡すリクエストの最小表現。
///
/// 特定のHTTPフレームワークやゲートウェイのイベント形式に依存しないよう、
/// ヘッダーと本文のみを保持する。ヘッダー名は小文字に正規化して格納する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// ヘッダー（キーは小文字）
    pub headers: HashMap<String, String>,
    /// リクエスト本文（JSONテキスト）
    pub body: String,
}

impl RequestContext {
    /// ヘッダー一覧と本文から構築する。ヘッダー名は小文字に正規化される。
    pub fn new<I, K, V>(headers: I, body: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            body: body.into(),
        }
    }

    /// ヘッダー値を大文字小文字を区別せずに取得する。
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `Authorization` ヘッダーの値。
    pub fn authorization(&self) -> Option<&str> {
        self.header("authorization")
    }
}

// ---------------------------------------------------------------------------
// 認可判定
// ---------------------------------------------------------------------------

/// Authorizerの判定結果。
///
/// 呼び出し元のゲートウェイ層が後段のハンドラを実行するかどうかだけを伝える。
/// 拒否理由は含めない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationOutcome {
    /// trueの場合のみハンドラを実行してよい
    #[serde(rename = "isAuthorized")]
    pub authorize: bool,
}

impl AuthorizationOutcome {
    /// 許可
    pub fn allow() -> Self {
        Self { authorize: true }
    }

    /// 拒否
    pub fn deny() -> Self {
        Self { authorize: false }
    }
}

// ---------------------------------------------------------------------------
// スラッグ操作
// ---------------------------------------------------------------------------

/// POST/PUT /{slug} のリクエスト本文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugTarget {
    /// リダイレクト先URL
    pub target: String,
}

/// DELETE /{slug} で署名する本文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugDeletion {
    /// 削除対象のスラッグ
    pub slug: String,
}

/// エラーレスポンス本文。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTPステータスコード
    pub code: u16,
    /// メッセージ
    pub message: String,
}

// ---------------------------------------------------------------------------
// 信頼情報公開 (/.well-known/shortlink-keys)
// ---------------------------------------------------------------------------

/// 信頼済み公開鍵1件の公開情報。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// 大文字16進数のv4フィンガープリント
    pub fingerprint: String,
    /// OpenPGP公開鍵アルゴリズムID
    pub algorithm: u8,
    /// 鍵の作成時刻（UNIX秒）
    pub created: u64,
    /// サブ鍵かどうか
    pub subkey: bool,
}

/// Gatewayが受け付ける署名の条件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustInfo {
    /// 信頼済み公開鍵一覧
    pub keys: Vec<KeyInfo>,
    /// 署名の猶予期間（秒）
    pub grace_period_secs: u64,
}
