//! # Shortlink OpenPGP処理
//!
//! 書き込みリクエストの署名認証に必要なOpenPGP (RFC 4880 / RFC 9580) のサブセットを実装する。
//!
//! ## 対応範囲
//! | 項目 | 内容 |
//! |------|------|
//! | 形式 | ASCII Armor (CRC-24)、Cleartext Signature Framework、バイナリパケット |
//! | 鍵 | v4 公開鍵 / 公開サブ鍵パケット |
//! | 署名 | v4 署名パケット（バイナリ 0x00 / テキスト 0x01） |
//! | 公開鍵アルゴリズム | EdDSA(22, Ed25519)、Ed25519(27)、ECDSA(19, P-256 / P-384) |
//! | ハッシュ | SHA-224 / SHA-256 / SHA-384 / SHA-512 |
//! | フィンガープリント | v4 (SHA-1) |
//!
//! 署名の生成は [`Ed25519Signer`] のみ対応する（CLI・テスト用）。

pub mod armor;
pub mod cleartext;
pub mod key;
pub mod packet;
pub mod signature;
pub mod signer;

pub use armor::{ArmorBlock, ArmorKind};
pub use cleartext::CleartextMessage;
pub use key::PublicKey;
pub use signature::{HashAlgorithm, Signature, SignatureType};
pub use signer::Ed25519Signer;

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// ASCII Armorの形式エラー
    #[error("ASCII Armorの形式が不正です: {0}")]
    Armor(String),
    /// CRC-24チェックサム不一致
    #[error("CRC-24チェックサムが一致しません")]
    Checksum,
    /// パケットの形式エラー
    #[error("パケットの形式が不正です: {0}")]
    Packet(String),
    /// クリアテキスト署名の枠組みが不正
    #[error("クリアテキスト署名の形式が不正です: {0}")]
    Cleartext(String),
    /// 未対応のバージョン・アルゴリズム
    #[error("未対応の形式です: {0}")]
    Unsupported(String),
    /// 署名検証エラー
    #[error("署名検証に失敗しました")]
    SignatureVerifyError,
}
