//! # Shortlink Core
//!
//! 書き込みリクエストの署名認証・認可を行う。
//!
//! ## 構成
//! | モジュール | 役割 |
//! |-----------|------|
//! | [`keystore`] | 起動時に一度だけ構築する信頼済み公開鍵セット |
//! | [`verifier`] | クリアテキスト署名・分離署名の検証 |
//! | [`freshness`] | 署名時刻と猶予期間による鮮度判定 |
//! | [`binder`] | 署名済みペイロードとリクエスト本文の構造比較 |
//! | [`authorizer`] | Authorizerフロー（検証 + 鮮度）による許可/拒否 |
//! | [`authenticator`] | 書き込みフロー（検証 + 本文バインド）による判定 |
//!
//! ## エラー方針
//! リクエスト処理中の関数はすべて値（`bool` / [`VerificationResult`] /
//! [`AuthorizationOutcome`](shortlink_types::AuthorizationOutcome)）を返し、
//! 攻撃者が制御できる入力によってエラーを伝播させない。
//! 起動時の [`TrustedKeySet::bootstrap`] のみが [`BootstrapError`] を返す。

pub mod artifact;
pub mod authenticator;
pub mod authorizer;
pub mod binder;
pub mod error;
pub mod freshness;
pub mod keystore;
pub mod verifier;

#[cfg(test)]
mod fixtures;

pub use artifact::SignatureArtifact;
pub use authenticator::{authenticate, authenticate_request};
pub use authorizer::{authorize_request, decide, decide_at};
pub use binder::{bind, bind_payload};
pub use error::{BootstrapError, InputFormatError};
pub use freshness::{is_fresh, unix_now, GracePeriod};
pub use keystore::TrustedKeySet;
pub use verifier::{verify, verify_detached, VerificationResult};
